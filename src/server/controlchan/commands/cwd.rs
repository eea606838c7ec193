//! The RFC 959 Change Working Directory (`CWD`) command

use crate::{
    server::controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    vfs::ErrorKind,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl CommandHandler for Cwd {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.metadata(&resolved.real_path).await {
            Ok(meta) if meta.is_dir() => {
                session.cwd = resolved.virtual_path;
                Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully changed working directory"))
            }
            Ok(_) => Ok(crate::vfs::Error::from(ErrorKind::NotADirectory).into()),
            Err(err) => Ok(err.into()),
        }
    }
}
