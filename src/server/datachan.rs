//! Contains code pertaining to the FTP *data* channel: negotiating it
//! (passive and active mode) and running a single transfer over it.

use crate::{
    server::{
        chancomms::{ControlChanMsg, DataChanCmd},
        session::Session,
        tls::FtpsConfig,
    },
    vfs::VirtualFs,
};
use std::{
    io,
    net::{IpAddr, SocketAddr},
    ops::RangeInclusive,
    sync::Arc,
    time::Duration,
};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpSocket, TcpStream},
    sync::mpsc::{channel, Receiver, Sender},
};

const BIND_RETRIES: u8 = 10;

/// How long we wait for the client to show up on a negotiated data channel.
pub const OPEN_TIMEOUT: Duration = Duration::from_secs(30);

trait AsyncReadWrite: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncReadWrite for T {}

/// The outcome of a PASV or PORT command: a way to open one data connection
/// when the next transfer command arrives.
#[derive(Debug)]
pub enum DataChannel {
    /// We listen, the client connects (PASV).
    Passive { listener: TcpListener },
    /// The client listens, we connect (PORT).
    Active { peer: SocketAddr },
}

impl DataChannel {
    /// Binds a listener on a random port from the configured passive range,
    /// retrying a bounded number of times on collisions. Returns the channel
    /// and the address to advertise in the `227` reply.
    #[tracing_attributes::instrument]
    pub async fn passive(local_ip: IpAddr, passive_ports: RangeInclusive<u16>) -> io::Result<(DataChannel, SocketAddr)> {
        let listener = try_port_range(local_ip, passive_ports)?;
        let addr = listener.local_addr()?;
        Ok((DataChannel::Passive { listener }, addr))
    }

    /// Records the target of a `PORT` command; the connection happens at
    /// transfer time.
    pub fn active(peer: SocketAddr) -> DataChannel {
        DataChannel::Active { peer }
    }

    /// Opens the single data connection this negotiation is good for,
    /// failing when the peer does not show up within [`OPEN_TIMEOUT`].
    pub async fn open(self) -> io::Result<TcpStream> {
        let open = async {
            match self {
                DataChannel::Passive { listener } => listener.accept().await.map(|(socket, _)| socket),
                DataChannel::Active { peer } => TcpStream::connect(peer).await,
            }
        };
        tokio::time::timeout(OPEN_TIMEOUT, open)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "data connection timed out"))?
    }
}

#[tracing_attributes::instrument]
fn try_port_range(local_ip: IpAddr, passive_ports: RangeInclusive<u16>) -> io::Result<TcpListener> {
    let rng_length = u32::from(passive_ports.end() - passive_ports.start()) + 1;

    let mut listener: io::Result<TcpListener> = Err(io::Error::new(io::ErrorKind::InvalidInput, "Bind retries cannot be 0"));

    for _ in 0..BIND_RETRIES {
        let random_u32 = {
            let mut data = [0; 4];
            getrandom::fill(&mut data).map_err(io::Error::other)?;
            u32::from_ne_bytes(data)
        };
        let port = (random_u32 % rng_length + u32::from(*passive_ports.start())) as u16;

        let socket = match local_ip {
            IpAddr::V4(_) => TcpSocket::new_v4()?,
            IpAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;

        listener = socket.bind(SocketAddr::new(local_ip, port)).and_then(|_| socket.listen(1024));
        if listener.is_ok() {
            break;
        }
    }

    listener
}

/// Everything a transfer task needs, captured from the session at the moment
/// the transfer command arrives.
#[derive(Debug)]
struct DataCommandExecutor {
    vfs: Arc<VirtualFs>,
    start_pos: u64,
    ftps_mode: FtpsConfig,
    logger: slog::Logger,
}

impl DataCommandExecutor {
    async fn execute(self, chan: DataChannel, cmd: DataChanCmd) -> ControlChanMsg {
        let socket = match chan.open().await {
            Ok(socket) => socket,
            Err(err) => {
                slog::warn!(self.logger, "Could not open data connection: {}", err);
                return ControlChanMsg::DataConnectionFailed;
            }
        };
        let mut socket: Box<dyn AsyncReadWrite> = match self.ftps_mode.acceptor() {
            None => Box::new(socket),
            Some(acceptor) => match acceptor.accept(socket).await {
                Ok(tls_socket) => Box::new(tls_socket),
                Err(err) => {
                    slog::warn!(self.logger, "TLS handshake on data connection failed: {}", err);
                    return ControlChanMsg::DataConnectionFailed;
                }
            },
        };

        match cmd {
            DataChanCmd::Retr { path, real } => {
                let mut input = match self.vfs.open_read(&real, self.start_pos).await {
                    Ok(input) => input,
                    Err(err) => return ControlChanMsg::TransferFailed(err),
                };
                match tokio::io::copy(&mut input, &mut socket).await {
                    Ok(bytes) => {
                        if let Err(err) = socket.shutdown().await {
                            slog::warn!(self.logger, "Could not shutdown data stream after RETR: {}", err);
                        }
                        ControlChanMsg::SentData { path, bytes }
                    }
                    Err(err) => {
                        slog::warn!(self.logger, "Error copying streams during RETR: {}", err);
                        ControlChanMsg::ConnectionReset
                    }
                }
            }
            DataChanCmd::Stor { path, real } => match self.vfs.store(&real, &mut socket, self.start_pos).await {
                Ok(bytes) => ControlChanMsg::WrittenData { path, bytes },
                Err(err) => ControlChanMsg::TransferFailed(err),
            },
            DataChanCmd::List { real } => match self.vfs.list_fmt(&real).await {
                Ok(mut lines) => Self::send_listing(self.logger, &mut lines, socket).await,
                Err(err) => ControlChanMsg::TransferFailed(err),
            },
            DataChanCmd::Nlst { real } => match self.vfs.nlst(&real).await {
                Ok(mut lines) => Self::send_listing(self.logger, &mut lines, socket).await,
                Err(err) => ControlChanMsg::TransferFailed(err),
            },
        }
    }

    async fn send_listing(logger: slog::Logger, lines: &mut std::io::Cursor<Vec<u8>>, mut socket: Box<dyn AsyncReadWrite>) -> ControlChanMsg {
        match tokio::io::copy(lines, &mut socket).await {
            Ok(_) => {
                if let Err(err) = socket.shutdown().await {
                    slog::warn!(logger, "Could not shutdown data stream after listing: {}", err);
                }
                ControlChanMsg::DirectoryListed
            }
            Err(err) => {
                slog::warn!(logger, "Error sending directory listing: {}", err);
                ControlChanMsg::ConnectionReset
            }
        }
    }
}

/// Runs `cmd` over `chan` in its own task so that the control channel stays
/// responsive; an ABOR cancels the transfer through the abort channel that
/// this installs on the session.
pub fn spawn_transfer(logger: slog::Logger, session: &mut Session, chan: DataChannel, cmd: DataChanCmd, ftps_mode: FtpsConfig) {
    let (abort_tx, mut abort_rx): (Sender<()>, Receiver<()>) = channel(1);
    session.data_abort_tx = Some(abort_tx);

    let executor = DataCommandExecutor {
        vfs: session.vfs.clone(),
        start_pos: session.start_pos,
        ftps_mode: if session.data_tls { ftps_mode } else { FtpsConfig::Off },
        logger: logger.clone(),
    };
    let tx: Sender<ControlChanMsg> = session.control_msg_tx.clone();

    tokio::spawn(async move {
        let msg = tokio::select! {
            msg = executor.execute(chan, cmd) => msg,
            _ = abort_rx.recv() => {
                slog::info!(logger, "Data channel abort received");
                ControlChanMsg::TransferAborted
            }
        };
        if let Err(err) = tx.send(msg).await {
            slog::warn!(logger, "Could not notify control channel of transfer result: {}", err);
        }
    });
}
