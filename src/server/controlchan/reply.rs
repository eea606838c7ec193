/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    None,
    CodeAndMsg { code: ReplyCode, msg: String },
    MultiLine { code: ReplyCode, lines: Vec<String> },
}

/// The reply codes according to RFC 959.
//
// The three digits form a code. Codes between 100 and 199 indicate marks;
// codes between 200 and 399 indicate acceptance; codes between 400 and 599
// indicate rejection. Clients should not look past the first digit; the
// other two, and the text, are primarily for human consumption (exceptions:
// greetings and responses with code 227 have a special format).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u32)]
pub enum ReplyCode {
    FileStatusOkay = 150,

    CommandOkay = 200,
    SystemStatus = 211,
    FileStatus = 213,
    SystemType = 215,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    ClosingDataConnection = 226,
    EnteringPassiveMode = 227,
    UserLoggedIn = 230,
    AuthOkayNoDataNeeded = 234,
    FileActionOkay = 250,
    DirCreated = 257,

    NeedPassword = 331,
    FileActionPending = 350,

    ServiceNotAvailable = 421,
    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    TransientFileError = 450,
    LocalError = 451,

    CommandSyntaxError = 500,
    ParameterSyntaxError = 501,
    CommandNotImplemented = 502,
    BadCommandSequence = 503,
    CommandNotImplementedForParameter = 504,
    NotLoggedIn = 530,
    FileError = 550,
}

impl Reply {
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| format!("{}", item)).collect(),
        }
    }

    // A no-reply
    pub fn none() -> Self {
        Reply::None
    }
}

/// Turns a filesystem failure into the numeric reply the client gets to see.
impl From<crate::vfs::Error> for Reply {
    fn from(err: crate::vfs::Error) -> Reply {
        use crate::vfs::ErrorKind::*;
        match err.kind() {
            Escape => Reply::new(ReplyCode::FileError, "Path escapes the shared directory"),
            NotFound => Reply::new(ReplyCode::FileError, "File or directory not found"),
            NotAFile => Reply::new(ReplyCode::FileError, "Not a regular file"),
            NotADirectory => Reply::new(ReplyCode::FileError, "Not a directory"),
            PermissionDenied => Reply::new(ReplyCode::FileError, "Permission denied"),
            LocalError => Reply::new(ReplyCode::LocalError, "Local error in processing"),
        }
    }
}
