//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server to listen on a data port (not its default
// data port) and wait for a connection rather than initiate one upon receipt
// of a transfer command. The response includes the host and port address the
// server is listening on.

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    datachan::DataChannel,
};
use async_trait::async_trait;
use std::net::SocketAddr;

#[derive(Debug)]
pub struct Pasv;

#[async_trait]
impl CommandHandler for Pasv {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // The 227 reply format only exists for IPv4.
        let conn_addr = match args.local_addr {
            SocketAddr::V4(addr) => addr,
            SocketAddr::V6(_) => {
                slog::warn!(args.logger, "PASV on an IPv6 control connection");
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "PASV requires IPv4"));
            }
        };

        let (channel, addr) = match DataChannel::passive(args.local_addr.ip(), args.passive_ports.clone()).await {
            Ok(bound) => bound,
            Err(err) => {
                slog::warn!(args.logger, "Could not bind a passive port: {}", err);
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established"));
            }
        };

        // A fresh negotiation replaces any unconsumed one.
        let mut session = args.session.lock().await;
        session.data_channel = Some(channel);

        let octets = conn_addr.ip().octets();
        let port = addr.port();
        let p1 = port >> 8;
        let p2 = port - (p1 * 256);
        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!(
                "Entering Passive Mode ({},{},{},{},{},{})",
                octets[0], octets[1], octets[2], octets[3], p1, p2
            ),
        ))
    }
}
