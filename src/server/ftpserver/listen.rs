//! Contains the code that listens for control channel connections.

use super::error::ServerError;
use crate::server::{controlchan, shutdown};
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::Semaphore,
};

// Listener listens for control channel connections on a TCP port and spawns
// a control channel loop in a new task for each incoming connection, as long
// as the session bound allows it.
pub struct Listener {
    pub bind_address: SocketAddr,
    pub logger: slog::Logger,
    pub config: controlchan::LoopConfig,
    pub shutdown_topic: Arc<shutdown::Notifier>,
    pub session_limit: Arc<Semaphore>,
}

impl Listener {
    pub async fn listen(self) -> Result<(), ServerError> {
        let Listener {
            logger,
            bind_address,
            config,
            shutdown_topic,
            session_limit,
        } = self;
        let listener = TcpListener::bind(bind_address).await?;
        slog::info!(logger, "Listening"; "address" => %bind_address);
        loop {
            match listener.accept().await {
                Ok((tcp_stream, socket_addr)) => {
                    slog::info!(logger, "Incoming control connection from {:?}", socket_addr);
                    let permit = match session_limit.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            slog::warn!(logger, "Session limit reached, refusing connection from {:?}", socket_addr);
                            refuse(tcp_stream).await;
                            continue;
                        }
                    };
                    let shutdown_listener = shutdown_topic.subscribe().await;
                    let result = controlchan::spawn_loop(config.clone(), tcp_stream, shutdown_listener, permit).await;
                    if let Err(err) = result {
                        slog::error!(
                            logger,
                            "Could not spawn control channel loop for connection from {:?}: {:?}",
                            socket_addr,
                            err
                        );
                    }
                }
                Err(err) => {
                    slog::error!(logger, "Error accepting incoming control connection {:?}", err);
                }
            }
        }
    }
}

// Turned away before a session ever starts, so this bypasses the codec.
async fn refuse(mut tcp_stream: TcpStream) {
    let _ = tcp_stream.write_all(b"421 Too many connections\r\n").await;
    let _ = tcp_stream.shutdown().await;
}
