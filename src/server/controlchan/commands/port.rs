//! The RFC 959 Data Port (`PORT`) command
//
// The client tells us where it listens for the data connection; we connect
// out when the next transfer command arrives (active mode).

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    datachan::DataChannel,
};
use async_trait::async_trait;
use std::net::{SocketAddr, SocketAddrV4};

#[derive(Debug)]
pub struct Port {
    addr: SocketAddrV4,
}

impl Port {
    pub fn new(addr: SocketAddrV4) -> Self {
        Port { addr }
    }
}

#[async_trait]
impl CommandHandler for Port {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // A fresh negotiation replaces any unconsumed one.
        session.data_channel = Some(DataChannel::active(SocketAddr::V4(self.addr)));
        Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
    }
}
