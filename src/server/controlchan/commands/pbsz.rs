//! The RFC 2228 Protection Buffer Size (`PBSZ`) command
//
// For TLS the only meaningful buffer size is zero; the parser already
// rejected anything else.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pbsz;

#[async_trait]
impl CommandHandler for Pbsz {
    #[tracing_attributes::instrument(skip(_args))]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandOkay, "OK"))
    }
}
