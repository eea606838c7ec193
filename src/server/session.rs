//! The per-connection state shared between the control channel loop and the
//! command handlers.

use crate::{
    auth::UserAccount,
    server::{chancomms::ControlChanMsg, datachan::DataChannel},
    vfs::{Resolved, VirtualFs},
};
use std::{fmt, path::PathBuf, sync::Arc};
use tokio::sync::{mpsc::Sender, Mutex};
use uuid::Uuid;

/// Where a session is in the login conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Fresh connection, no USER seen yet.
    New,
    /// USER was accepted, waiting for PASS.
    WaitPass { username: String },
    /// Logged in, commands are allowed.
    WaitCmd,
}

/// How file contents are declared to be transferred (`TYPE`). Tracked for
/// protocol compliance; transfers are byte-faithful either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

/// Correlates all log lines of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn new() -> Self {
        TraceId(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        TraceId::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// This is where we keep the state for one FTP session.
pub struct Session {
    pub trace_id: TraceId,
    /// Rooted at the share directory until login; replaced with a view
    /// rooted at the account's home once authentication succeeds.
    pub vfs: Arc<VirtualFs>,
    /// Set once PASS succeeds.
    pub user: Option<UserAccount>,
    pub state: SessionState,
    /// The virtual working directory, always absolute.
    pub cwd: PathBuf,
    /// The source of a pending RNFR, consumed by RNTO.
    pub rename_from: Option<Resolved>,
    pub transfer_type: TransferType,
    /// Offset for the next transfer, set by REST.
    pub start_pos: u64,
    /// The outcome of the last PASV or PORT, consumed by the next transfer
    /// command. A new PASV or PORT replaces it.
    pub data_channel: Option<DataChannel>,
    /// Present while a data transfer runs; ABOR sends on it.
    pub data_abort_tx: Option<Sender<()>>,
    /// Lets data transfer tasks report back to the control loop.
    pub control_msg_tx: Sender<ControlChanMsg>,
    /// True once AUTH TLS upgraded the control channel.
    pub cmd_tls: bool,
    /// True once PROT P was accepted.
    pub data_tls: bool,
}

impl Session {
    pub fn new(vfs: Arc<VirtualFs>, control_msg_tx: Sender<ControlChanMsg>) -> Self {
        Session {
            trace_id: TraceId::new(),
            vfs,
            user: None,
            state: SessionState::New,
            cwd: "/".into(),
            rename_from: None,
            transfer_type: TransferType::Binary,
            start_pos: 0,
            data_channel: None,
            data_abort_tx: None,
            control_msg_tx,
            cmd_tls: false,
            data_tls: false,
        }
    }

    /// True when the login conversation completed.
    pub fn logged_in(&self) -> bool {
        self.state == SessionState::WaitCmd
    }

    /// True when the logged-in account holds all of `wanted`.
    pub fn allows(&self, wanted: crate::auth::Permissions) -> bool {
        self.user.as_ref().is_some_and(|u| u.allows(wanted))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("trace_id", &self.trace_id)
            .field("user", &self.user)
            .field("state", &self.state)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::chancomms::ControlChanMsg;
    use tokio::sync::mpsc::channel;

    #[test]
    fn fresh_session_starts_at_root() {
        let (tx, _rx) = channel::<ControlChanMsg>(1);
        let session = Session::new(Arc::new(VirtualFs::new("/srv/share")), tx);
        assert_eq!(session.state, SessionState::New);
        assert_eq!(session.cwd, PathBuf::from("/"));
        assert_eq!(session.transfer_type, TransferType::Binary);
        assert!(!session.logged_in());
    }
}
