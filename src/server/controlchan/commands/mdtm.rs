//! The RFC 3659 Modification Time (`MDTM`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct Mdtm {
    path: String,
}

impl Mdtm {
    pub fn new(path: String) -> Self {
        Mdtm { path }
    }
}

#[async_trait]
impl CommandHandler for Mdtm {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.metadata(&resolved.real_path).await {
            Ok(meta) => match meta.modified() {
                Some(modified) => {
                    let stamp = DateTime::<Utc>::from(modified).format("%Y%m%d%H%M%S");
                    Ok(Reply::new_with_string(ReplyCode::FileStatus, stamp.to_string()))
                }
                None => Ok(Reply::new(ReplyCode::FileError, "Could not determine the modification time")),
            },
            Err(err) => Ok(err.into()),
        }
    }
}
