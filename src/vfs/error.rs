use derive_more::Display;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error returned by the virtual filesystem.
#[derive(Debug, Error)]
#[error("vfs error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new vfs error wrapping an underlying cause.
    pub fn new<E>(kind: ErrorKind, source: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: Some(source.into()),
        }
    }

    /// Tells what kind of failure this is, which in turn decides the FTP reply code.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::new(ErrorKind::NotFound, err),
            std::io::ErrorKind::PermissionDenied => Error::new(ErrorKind::PermissionDenied, err),
            _ => Error::new(ErrorKind::LocalError, err),
        }
    }
}

/// The failure categories produced by [`VirtualFs`](crate::vfs::VirtualFs).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// The requested path would resolve outside the account's home directory.
    #[display("path escapes the shared directory")]
    Escape,
    /// The requested path does not exist.
    #[display("file or directory not found")]
    NotFound,
    /// The path exists but is a directory where a file was required.
    #[display("not a regular file")]
    NotAFile,
    /// The path exists but is a file where a directory was required.
    #[display("not a directory")]
    NotADirectory,
    /// The operating system denied the operation.
    #[display("permission denied")]
    PermissionDenied,
    /// Processing failed locally (I/O error on the server side).
    #[display("local error in processing")]
    LocalError,
}

/// Result type used throughout the vfs module.
pub type Result<T> = std::result::Result<T, Error>;
