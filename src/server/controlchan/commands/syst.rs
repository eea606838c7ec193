//! The RFC 959 System (`SYST`) command
//
// This reply describes the operating system at the server. Every server and
// client out there expects the UNIX answer, so that is what they get.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Syst;

#[async_trait]
impl CommandHandler for Syst {
    #[tracing_attributes::instrument(skip(_args))]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::SystemType, "UNIX Type: L8"))
    }
}
