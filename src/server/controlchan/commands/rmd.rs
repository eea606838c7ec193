//! The RFC 959 Remove Directory (`RMD`) command

use crate::{
    auth::Permissions,
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rmd {
    path: String,
}

impl Rmd {
    pub fn new(path: String) -> Self {
        Rmd { path }
    }
}

#[async_trait]
impl CommandHandler for Rmd {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        if !session.allows(Permissions::REMOVE) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.rmd(&resolved.real_path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Directory successfully removed")),
            Err(err) => Ok(err.into()),
        }
    }
}
