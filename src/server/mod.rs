//! Contains the code that makes up the FTP server: the listener, the control
//! channel loop, the data channel and the session state shared between them.

pub(crate) mod chancomms;
pub(crate) mod controlchan;
pub(crate) mod datachan;
mod ftpserver;
mod password;
pub(crate) mod session;
pub(crate) mod shutdown;
pub(crate) mod tls;

pub use controlchan::{Reply, ReplyCode};
pub use ftpserver::{error::ServerError, Server};
