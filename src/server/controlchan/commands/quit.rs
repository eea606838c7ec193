//! The RFC 959 Logout (`QUIT`) command

use crate::server::{
    chancomms::ControlChanMsg,
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Quit;

#[async_trait]
impl CommandHandler for Quit {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // The loop closes the connection when it picks this up, right after
        // the 221 below went out.
        if let Err(err) = args.tx.send(ControlChanMsg::ExitControlLoop).await {
            slog::warn!(args.logger, "Could not send internal message: QUIT. {}", err);
        }
        Ok(Reply::new(ReplyCode::ClosingControlConnection, "Bye!"))
    }
}
