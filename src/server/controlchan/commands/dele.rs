//! The RFC 959 Delete (`DELE`) command

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
pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl CommandHandler for Dele {
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
        match session.vfs.del(&resolved.real_path).await {
            Ok(()) => {
                slog::info!(args.logger, "Deleted file"; "path" => %resolved.virtual_path.display());
                Ok(Reply::new(ReplyCode::FileActionOkay, "File successfully removed"))
            }
            Err(err) => Ok(err.into()),
        }
    }
}
