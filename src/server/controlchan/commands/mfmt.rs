//! The Modify Fact: Modification Time (`MFMT`) command
//
// From the draft-somers-ftp-mfxx specification: sets the modification time
// of an existing file to the given `YYYYMMDDHHMMSS` UTC timestamp.

use crate::{
    auth::Permissions,
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};

#[derive(Debug)]
pub struct Mfmt {
    timestamp: String,
    path: String,
}

impl Mfmt {
    pub fn new(timestamp: String, path: String) -> Self {
        Mfmt { timestamp, path }
    }
}

#[async_trait]
impl CommandHandler for Mfmt {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        if !session.allows(Permissions::CHMTIME) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let naive = match NaiveDateTime::parse_from_str(&self.timestamp, "%Y%m%d%H%M%S") {
            Ok(naive) => naive,
            Err(_) => return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid timestamp")),
        };
        let mtime = Utc.from_utc_datetime(&naive);
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.set_mtime(&resolved.real_path, mtime).await {
            Ok(()) => Ok(Reply::new_with_string(
                ReplyCode::FileStatus,
                format!("Modify={}; {}", self.timestamp, resolved.virtual_path.display()),
            )),
            Err(err) => Ok(err.into()),
        }
    }
}
