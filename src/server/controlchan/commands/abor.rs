//! The RFC 959 Abort (`ABOR`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Abor;

#[async_trait]
impl CommandHandler for Abor {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // Any not-yet-consumed PASV/PORT negotiation dies with the abort.
        session.data_channel = None;
        match session.data_abort_tx.take() {
            Some(tx) => {
                let _ = tx.send(()).await;
                // The cancelled transfer task reports back through the
                // control message channel; the 426 goes out from there.
                Ok(Reply::none())
            }
            None => Ok(Reply::new(ReplyCode::ClosingDataConnection, "No transfer to abort")),
        }
    }
}
