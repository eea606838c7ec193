//! The RFC 959 Make Directory (`MKD`) command

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
pub struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Self {
        Mkd { path }
    }
}

#[async_trait]
impl CommandHandler for Mkd {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        if !session.allows(Permissions::MKDIR) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let resolved = match session.vfs.resolve(&session.cwd, &self.path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.vfs.mkd(&resolved.real_path).await {
            Ok(()) => Ok(Reply::new_with_string(
                ReplyCode::DirCreated,
                format!("\"{}\" directory created", resolved.virtual_path.display()),
            )),
            Err(err) => Ok(err.into()),
        }
    }
}
