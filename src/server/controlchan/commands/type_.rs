//! The RFC 959 Representation Type (`TYPE`) command

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    session::TransferType,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Type {
    param: TransferType,
}

impl Type {
    pub fn new(param: TransferType) -> Self {
        Type { param }
    }
}

#[async_trait]
impl CommandHandler for Type {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // The declared type is remembered for protocol compliance, but
        // transfers are byte-faithful either way.
        let mut session = args.session.lock().await;
        session.transfer_type = self.param;
        let msg = match self.param {
            TransferType::Ascii => "Type set to A",
            TransferType::Binary => "Type set to I",
        };
        Ok(Reply::new(ReplyCode::CommandOkay, msg))
    }
}
