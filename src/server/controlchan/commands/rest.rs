//! The RFC 959 Restart (`REST`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rest {
    offset: u64,
}

impl Rest {
    pub fn new(offset: u64) -> Self {
        Rest { offset }
    }
}

#[async_trait]
impl CommandHandler for Rest {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.start_pos = self.offset;
        Ok(Reply::new_with_string(
            ReplyCode::FileActionPending,
            format!("Restarting at {}. Send STORE or RETRIEVE", self.offset),
        ))
    }
}
