//! The RFC 959 Rename From (`RNFR`) command

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
pub struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Self {
        Rnfr { path }
    }
}

#[async_trait]
impl CommandHandler for Rnfr {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if !session.allows(Permissions::RENAME) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        // The source must exist at this point already; RNTO does the move.
        if let Err(err) = session.vfs.metadata(&resolved.real_path).await {
            return Ok(err.into());
        }
        session.rename_from = Some(resolved);
        Ok(Reply::new(ReplyCode::FileActionPending, "Tell me the new name"))
    }
}
