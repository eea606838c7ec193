//! Contains the setup defaults used by the [`Server`](crate::Server) builder.

use std::ops::RangeInclusive;

pub(crate) const DEFAULT_GREETING: &str = "Welcome to the lanftp FTP server";
pub(crate) const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 600;
pub(crate) const DEFAULT_PASSIVE_PORTS: RangeInclusive<u16> = 49152..=65534;
pub(crate) const DEFAULT_MAX_SESSIONS: usize = 64;
pub(crate) const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
