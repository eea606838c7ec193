//! The RFC 959 Change To Parent Directory (`CDUP`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Cdup;

#[async_trait]
impl CommandHandler for Cdup {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // CDUP at the root stays at the root.
        if let Some(parent) = session.cwd.parent() {
            session.cwd = parent.to_path_buf();
        }
        Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully changed working directory"))
    }
}
