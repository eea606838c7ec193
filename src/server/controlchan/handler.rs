use crate::{
    auth::Authenticator,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{error::ControlChanError, Command, Reply},
        session::SharedSession,
        tls::FtpsConfig,
    },
};
use async_trait::async_trait;
use std::{net::SocketAddr, ops::RangeInclusive, result::Result, sync::Arc};
use tokio::sync::mpsc::Sender;

#[async_trait]
pub trait CommandHandler: Send + Sync + std::fmt::Debug {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError>;
}

/// Convenience struct to group command args
#[derive(Debug)]
pub struct CommandContext {
    pub parsed_command: Command,
    pub session: SharedSession,
    pub authenticator: Arc<dyn Authenticator>,
    pub tls_configured: bool,
    pub ftps_config: FtpsConfig,
    pub passive_ports: RangeInclusive<u16>,
    pub tx: Sender<ControlChanMsg>,
    pub local_addr: SocketAddr,
    pub logger: slog::Logger,
}
