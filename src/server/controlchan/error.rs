//! Contains the error type of the control channel.

use crate::server::controlchan::line_parser::{ParseError, ParseErrorKind};

use derive_more::Display;
use thiserror::Error;

/// The error type produced while running a control channel loop.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A list specifying categories of control channel errors.
#[derive(Eq, PartialEq, Debug, Display)]
pub enum ControlChanErrorKind {
    /// We encountered a system IO error.
    #[display("Failed to perform IO")]
    Io,
    /// We encountered a non-UTF8 character in the command.
    #[display("Non-UTF8 character in command")]
    Utf8,
    /// The client issued a command we don't know about.
    #[display("Unknown command: {command}")]
    UnknownCommand { command: String },
    /// The client issued a command that we know about, but in an invalid way
    /// (e.g. `USER` without a username).
    #[display("Invalid command (invalid parameter)")]
    InvalidCommand,
    /// The timer on the control channel elapsed.
    #[display("Encountered read timeout on the control channel")]
    ControlChannelTimeout,
}

impl ControlChanError {
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    pub fn kind(&self) -> &ControlChanErrorKind {
        &self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError::new(kind)
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Io,
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::Utf8,
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseError> for ControlChanError {
    fn from(err: ParseError) -> ControlChanError {
        let kind = match err.kind() {
            ParseErrorKind::UnknownCommand { command } => ControlChanErrorKind::UnknownCommand { command: command.clone() },
            ParseErrorKind::InvalidUtf8 => ControlChanErrorKind::Utf8,
            ParseErrorKind::InvalidCommand | ParseErrorKind::InvalidEol => ControlChanErrorKind::InvalidCommand,
        };
        ControlChanError {
            kind,
            source: Some(Box::new(err)),
        }
    }
}
