//! The RFC 959 Rename To (`RNTO`) command

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
pub struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Self {
        Rnto { path }
    }
}

#[async_trait]
impl CommandHandler for Rnto {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if !session.allows(Permissions::RENAME) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let from = match session.rename_from.take() {
            Some(from) => from,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please tell me what file you want to rename first")),
        };
        let to = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.rename(&from.real_path, &to.real_path).await {
            Ok(()) => {
                slog::info!(
                    args.logger,
                    "Renamed";
                    "from" => %from.virtual_path.display(),
                    "to" => %to.virtual_path.display(),
                );
                Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully renamed"))
            }
            Err(err) => Ok(err.into()),
        }
    }
}
