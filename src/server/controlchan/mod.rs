//! Contains the code that processes the FTP *control* channel: parsing
//! command lines, dispatching to per-command handlers and writing replies.

pub(crate) mod codecs;
pub(crate) mod command;
pub(crate) mod commands;
mod control_loop;
pub(crate) mod error;
pub(crate) mod handler;
pub(crate) mod line_parser;
mod reply;

pub(crate) use command::Command;
pub(crate) use control_loop::{spawn_loop, LoopConfig};
pub use reply::{Reply, ReplyCode};
