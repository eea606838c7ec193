use crate::{
    auth::Authenticator,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{
            codecs::FtpCodec,
            command::Command,
            commands,
            error::{ControlChanError, ControlChanErrorKind},
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        session::{Session, SharedSession},
        shutdown,
        tls::FtpsConfig,
    },
    vfs::VirtualFs,
};
use futures_util::{SinkExt, StreamExt};
use std::{ops::RangeInclusive, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::{mpsc::channel, Mutex, OwnedSemaphorePermit},
};
use tokio_util::codec::{Decoder, Framed};

trait AsyncReadAsyncWriteSendUnpin: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncReadAsyncWriteSendUnpin for T {}

/// An event happening on the control channel: a line from the client or a
/// message from a data transfer task.
#[derive(Debug)]
enum Event {
    Command(Command),
    InternalMsg(ControlChanMsg),
}

/// The per-connection configuration, shared by every session the listener
/// spawns.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub vfs: Arc<VirtualFs>,
    pub greeting: &'static str,
    pub authenticator: Arc<dyn Authenticator>,
    pub passive_ports: RangeInclusive<u16>,
    pub ftps_config: FtpsConfig,
    pub idle_session_timeout: Duration,
    pub logger: slog::Logger,
}

/// Starts the control loop for one freshly accepted client connection. The
/// loop runs in its own task; the semaphore permit bounding concurrent
/// sessions is released when that task ends.
pub async fn spawn_loop(
    config: LoopConfig,
    tcp_stream: TcpStream,
    mut shutdown_listener: shutdown::Listener,
    permit: OwnedSemaphorePermit,
) -> Result<(), ControlChanError> {
    let LoopConfig {
        vfs,
        greeting,
        authenticator,
        passive_ports,
        ftps_config,
        idle_session_timeout,
        logger,
    } = config;

    let local_addr = tcp_stream.local_addr()?;
    let tls_configured = matches!(ftps_config, FtpsConfig::On { .. });

    let (control_msg_tx, mut control_msg_rx) = channel::<ControlChanMsg>(1);
    let session = Session::new(vfs, control_msg_tx.clone());
    let logger = logger.new(slog::o!("trace-id" => format!("{}", session.trace_id)));
    let shared_session: SharedSession = Arc::new(Mutex::new(session));

    let codec = FtpCodec::new();
    let cmd_and_reply_stream: Framed<Box<dyn AsyncReadAsyncWriteSendUnpin>, FtpCodec> = codec.framed(Box::new(tcp_stream));
    let (mut reply_sink, mut command_source) = cmd_and_reply_stream.split();

    reply_sink.send(Reply::new(ReplyCode::ServiceReady, greeting)).await?;
    reply_sink.flush().await?;

    tokio::spawn(async move {
        // Held for the duration of the session so the listener's session
        // bound stays accurate.
        let _permit = permit;

        slog::info!(logger, "Starting control loop");
        loop {
            let mut incoming: Option<Result<Event, ControlChanError>> = None;
            let timeout_delay = tokio::time::sleep(idle_session_timeout);
            tokio::select! {
                cmd_result = command_source.next() => {
                    match cmd_result {
                        Some(Ok(Ok(cmd))) => incoming = Some(Ok(Event::Command(cmd))),
                        // A bad command line gets its error reply below and
                        // the session carries on.
                        Some(Ok(Err(parse_err))) => incoming = Some(Err(parse_err.into())),
                        Some(Err(err)) => incoming = Some(Err(err)),
                        None => {
                            slog::info!(logger, "Control connection closed by peer");
                            return;
                        }
                    }
                },
                Some(msg) = control_msg_rx.recv() => {
                    incoming = Some(Ok(Event::InternalMsg(msg)));
                },
                _ = timeout_delay => {
                    slog::info!(logger, "Control connection timed out");
                    incoming = Some(Err(ControlChanError::new(ControlChanErrorKind::ControlChannelTimeout)));
                },
                _ = shutdown_listener.listen() => {
                    slog::info!(logger, "Shutting down control connection");
                    let _ = reply_sink.send(Reply::new(ReplyCode::ServiceNotAvailable, "Service shutting down")).await;
                    return;
                }
            };

            match incoming {
                None => {
                    // Should not happen.
                    slog::warn!(logger, "No event polled in control channel...");
                    return;
                }
                Some(Ok(event)) => {
                    if let Event::InternalMsg(ControlChanMsg::ExitControlLoop) = event {
                        slog::info!(logger, "Quit received");
                        return;
                    }

                    if let Event::InternalMsg(ControlChanMsg::SecureControlChannel) = event {
                        slog::info!(logger, "Upgrading control channel to TLS");
                        shared_session.lock().await.cmd_tls = true;

                        // Get back the original stream, run the handshake on
                        // it and wrap it in a fresh codec.
                        let framed = match reply_sink.reunite(command_source) {
                            Ok(framed) => framed,
                            Err(err) => {
                                slog::error!(logger, "Could not reunite control channel halves: {}", err);
                                return;
                            }
                        };
                        let io = framed.into_inner();
                        let acceptor = match ftps_config.acceptor() {
                            Some(acceptor) => acceptor,
                            // AUTH TLS was already refused when TLS is off.
                            None => {
                                slog::error!(logger, "TLS upgrade requested without TLS configured");
                                return;
                            }
                        };
                        let io: Box<dyn AsyncReadAsyncWriteSendUnpin> = match acceptor.accept(io).await {
                            Ok(tls_stream) => Box::new(tls_stream),
                            Err(err) => {
                                slog::warn!(logger, "TLS handshake failed: {}", err);
                                return;
                            }
                        };
                        let (sink, source) = FtpCodec::new().framed(io).split();
                        reply_sink = sink;
                        command_source = source;
                        continue;
                    }

                    let reply = match dispatch(
                        &logger,
                        event,
                        shared_session.clone(),
                        authenticator.clone(),
                        tls_configured,
                        ftps_config.clone(),
                        passive_ports.clone(),
                        control_msg_tx.clone(),
                        local_addr,
                    )
                    .await
                    {
                        Ok(reply) => reply,
                        Err(err) => {
                            slog::warn!(logger, "Error processing event: {:?}", err);
                            return;
                        }
                    };
                    if reply_sink.send(reply).await.is_err() {
                        slog::warn!(logger, "Could not send reply to client");
                        return;
                    }
                }
                Some(Err(err)) => {
                    let reply = handle_control_channel_error(&logger, err);
                    let close_connection = matches!(
                        reply,
                        Reply::CodeAndMsg {
                            code: ReplyCode::ClosingControlConnection,
                            ..
                        }
                    );
                    if reply_sink.send(reply).await.is_err() {
                        slog::warn!(logger, "Could not send error reply to client");
                        return;
                    }
                    if close_connection {
                        return;
                    }
                }
            }
        }
    });

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn dispatch(
    logger: &slog::Logger,
    event: Event,
    session: SharedSession,
    authenticator: Arc<dyn Authenticator>,
    tls_configured: bool,
    ftps_config: FtpsConfig,
    passive_ports: RangeInclusive<u16>,
    tx: tokio::sync::mpsc::Sender<ControlChanMsg>,
    local_addr: std::net::SocketAddr,
) -> Result<Reply, ControlChanError> {
    slog::debug!(logger, "Processing control channel event {:?}", event);
    match event {
        Event::Command(cmd) => {
            if requires_login(&cmd) && !session.lock().await.logged_in() {
                return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate"));
            }
            handle_command(
                logger.clone(),
                cmd,
                session,
                authenticator,
                tls_configured,
                ftps_config,
                passive_ports,
                tx,
                local_addr,
            )
            .await
        }
        Event::InternalMsg(msg) => handle_internal_msg(msg, session).await,
    }
}

// USER, PASS and the TLS negotiation commands have to work before login;
// everything else gets a 530 until then.
fn requires_login(cmd: &Command) -> bool {
    !matches!(
        cmd,
        Command::User { .. }
            | Command::Pass { .. }
            | Command::Auth { .. }
            | Command::Pbsz
            | Command::Prot { .. }
            | Command::Feat
            | Command::Noop
            | Command::Quit
    )
}

#[allow(clippy::too_many_arguments)]
#[tracing_attributes::instrument(skip(logger, session, authenticator, tx))]
async fn handle_command(
    logger: slog::Logger,
    cmd: Command,
    session: SharedSession,
    authenticator: Arc<dyn Authenticator>,
    tls_configured: bool,
    ftps_config: FtpsConfig,
    passive_ports: RangeInclusive<u16>,
    tx: tokio::sync::mpsc::Sender<ControlChanMsg>,
    local_addr: std::net::SocketAddr,
) -> Result<Reply, ControlChanError> {
    let args = CommandContext {
        parsed_command: cmd.clone(),
        session,
        authenticator,
        tls_configured,
        ftps_config,
        passive_ports,
        tx,
        local_addr,
        logger,
    };

    let handler: Box<dyn CommandHandler> = match cmd {
        Command::User { username } => Box::new(commands::User::new(username)),
        Command::Pass { password } => Box::new(commands::Pass::new(password)),
        Command::Quit => Box::new(commands::Quit),
        Command::Syst => Box::new(commands::Syst),
        Command::Feat => Box::new(commands::Feat),
        Command::Noop => Box::new(commands::Noop),
        Command::Type { param } => Box::new(commands::Type::new(param)),
        Command::Pwd => Box::new(commands::Pwd),
        Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
        Command::Cdup => Box::new(commands::Cdup),
        Command::List { .. } => Box::new(commands::List),
        Command::Nlst { .. } => Box::new(commands::Nlst),
        Command::Retr { .. } => Box::new(commands::Retr),
        Command::Stor { .. } => Box::new(commands::Stor),
        Command::Dele { path } => Box::new(commands::Dele::new(path)),
        Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
        Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
        Command::Rnfr { path } => Box::new(commands::Rnfr::new(path)),
        Command::Rnto { path } => Box::new(commands::Rnto::new(path)),
        Command::Pasv => Box::new(commands::Pasv),
        Command::Port { addr } => Box::new(commands::Port::new(addr)),
        Command::Abor => Box::new(commands::Abor),
        Command::Rest { offset } => Box::new(commands::Rest::new(offset)),
        Command::Mdtm { path } => Box::new(commands::Mdtm::new(path)),
        Command::Mfmt { timestamp, path } => Box::new(commands::Mfmt::new(timestamp, path)),
        Command::Auth { protocol } => Box::new(commands::Auth::new(protocol)),
        Command::Pbsz => Box::new(commands::Pbsz),
        Command::Prot { param } => Box::new(commands::Prot::new(param)),
    };

    handler.handle(args).await
}

#[tracing_attributes::instrument(skip(session))]
async fn handle_internal_msg(msg: ControlChanMsg, session: SharedSession) -> Result<Reply, ControlChanError> {
    use ControlChanMsg::*;

    match msg {
        SentData { bytes, .. } => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(Reply::new_with_string(
                ReplyCode::ClosingDataConnection,
                format!("Successfully sent {} bytes", bytes),
            ))
        }
        WrittenData { bytes, .. } => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(Reply::new_with_string(
                ReplyCode::ClosingDataConnection,
                format!("File successfully written ({} bytes)", bytes),
            ))
        }
        DirectoryListed => {
            session.lock().await.data_abort_tx = None;
            Ok(Reply::new(ReplyCode::ClosingDataConnection, "Listed the directory"))
        }
        // The restart offset is good for exactly one transfer attempt, so
        // it clears on the failure paths as well.
        TransferAborted => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(Reply::new(ReplyCode::ConnectionClosed, "Transfer aborted. Closing data connection"))
        }
        DataConnectionFailed => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Can't open data connection"))
        }
        ConnectionReset => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(Reply::new(ReplyCode::ConnectionClosed, "Data connection unexpectedly closed"))
        }
        TransferFailed(err) => {
            let mut session = session.lock().await;
            session.start_pos = 0;
            session.data_abort_tx = None;
            Ok(err.into())
        }
        // Reached only in obscure shutdown races; the loop normally catches
        // this variant before dispatch and closes the connection.
        ExitControlLoop => Ok(Reply::new(ReplyCode::ClosingControlConnection, "Bye!")),
        SecureControlChannel => {
            session.lock().await.cmd_tls = true;
            Ok(Reply::none())
        }
    }
}

fn handle_control_channel_error(logger: &slog::Logger, error: ControlChanError) -> Reply {
    slog::warn!(logger, "Control channel error: {}", error);
    match error.kind() {
        ControlChanErrorKind::UnknownCommand { .. } => Reply::new(ReplyCode::CommandNotImplemented, "Command not implemented"),
        ControlChanErrorKind::Utf8 => Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"),
        ControlChanErrorKind::InvalidCommand => Reply::new(ReplyCode::ParameterSyntaxError, "Invalid parameter"),
        ControlChanErrorKind::ControlChannelTimeout => {
            Reply::new(ReplyCode::ClosingControlConnection, "Session timed out. Closing control connection")
        }
        _ => Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"),
    }
}
