//! Contains code pertaining to the communication between the data and control channels.

use crate::vfs;
use std::{fmt, path::PathBuf};

/// A transfer command handed to the data channel task, with the paths already
/// resolved and sandbox-checked by the control channel.
#[derive(PartialEq, Eq, Debug)]
pub enum DataChanCmd {
    Retr {
        /// The path as the client spelled it, echoed back in replies.
        path: String,
        /// The real location inside the share root.
        real: PathBuf,
    },
    Stor {
        path: String,
        real: PathBuf,
    },
    List {
        real: PathBuf,
    },
    Nlst {
        real: PathBuf,
    },
}

/// Messages that can be sent to the control channel loop.
#[derive(Debug)]
pub enum ControlChanMsg {
    /// Data was successfully sent to the client during a RETR.
    SentData { path: String, bytes: u64 },
    /// The data from the client was written to disk.
    WrittenData { path: String, bytes: u64 },
    /// Listed the directory successfully.
    DirectoryListed,
    /// The running transfer was cancelled by ABOR.
    TransferAborted,
    /// The data connection could not be opened in time.
    DataConnectionFailed,
    /// The data connection was unexpectedly closed mid-transfer.
    ConnectionReset,
    /// The filesystem side of the transfer failed.
    TransferFailed(vfs::Error),
    /// Quit the client connection.
    ExitControlLoop,
    /// Sent to switch the control channel to TLS mode.
    SecureControlChannel,
}

impl fmt::Display for ControlChanMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ControlChanMsg::*;
        match self {
            SentData { bytes, .. } => write!(f, "SentData({bytes})"),
            WrittenData { bytes, .. } => write!(f, "WrittenData({bytes})"),
            DirectoryListed => write!(f, "DirectoryListed"),
            TransferAborted => write!(f, "TransferAborted"),
            DataConnectionFailed => write!(f, "DataConnectionFailed"),
            ConnectionReset => write!(f, "ConnectionReset"),
            TransferFailed(e) => write!(f, "TransferFailed({e})"),
            ExitControlLoop => write!(f, "ExitControlLoop"),
            SecureControlChannel => write!(f, "SecureControlChannel"),
        }
    }
}
