//! Contains the [`Server`] builder, the public entry point of the crate.

pub mod error;
mod listen;
pub mod options;

use crate::{
    auth::{AnonymousAuthenticator, Authenticator, SingleUserAuthenticator},
    server::{controlchan, shutdown, tls, tls::FtpsConfig},
    vfs::VirtualFs,
};
use error::ServerError;
use slog::Drain;
use std::{future::Future, net::SocketAddr, ops::RangeInclusive, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::Semaphore;

/// An instance of an FTP(S) server sharing one local directory. It holds a
/// reference to an [`Authenticator`] that will be used for authentication;
/// everything it serves comes from the directory given to [`with_root`].
///
/// The server can be started with the [`listen`] method.
///
/// # Example
///
/// ```rust,no_run
/// use lanftp::Server;
///
/// #[tokio::main]
/// async fn main() {
///     let server = Server::with_root("/srv/share").greeting("Welcome");
///     server.listen("0.0.0.0:2121").await.unwrap();
/// }
/// ```
///
/// [`with_root`]: Server::with_root
/// [`listen`]: Server::listen
pub struct Server {
    root: PathBuf,
    greeting: &'static str,
    authenticator: Arc<dyn Authenticator>,
    passive_ports: RangeInclusive<u16>,
    certs_and_key: Option<(PathBuf, PathBuf)>,
    idle_session_timeout: Duration,
    max_sessions: usize,
    shutdown_grace: Duration,
    logger: slog::Logger,
}

impl Server {
    /// Create a new `Server` sharing the given directory, allowing anonymous
    /// access. The other parameters take their defaults.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        Server {
            authenticator: Arc::new(AnonymousAuthenticator::new(root.clone())),
            root,
            greeting: options::DEFAULT_GREETING,
            passive_ports: options::DEFAULT_PASSIVE_PORTS,
            certs_and_key: None,
            idle_session_timeout: Duration::from_secs(options::DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            max_sessions: options::DEFAULT_MAX_SESSIONS,
            shutdown_grace: Duration::from_secs(options::DEFAULT_SHUTDOWN_GRACE_SECS),
            logger: slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()),
        }
    }

    /// Set the greeting that will be sent to the client after connecting.
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = greeting;
        self
    }

    /// Set the [`Authenticator`] that will be used for authentication.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Require the given username/password pair, replacing the default
    /// anonymous access. Shorthand for installing a
    /// [`SingleUserAuthenticator`] with full permissions on the share root.
    pub fn credentials<U: Into<String>, P: Into<String>>(mut self, username: U, password: P) -> Self {
        self.authenticator = Arc::new(SingleUserAuthenticator::new(username, password, self.root.clone()));
        self
    }

    /// Set the range of ports that we'll use for passive (PASV) connections.
    pub fn passive_ports(mut self, range: RangeInclusive<u16>) -> Self {
        self.passive_ports = range;
        self
    }

    /// Enable FTPS by pointing the server to a PEM certificate chain and the
    /// matching PEM private key. The files are loaded when `listen` starts.
    pub fn ftps<P: Into<PathBuf>>(mut self, certs_file: P, key_file: P) -> Self {
        self.certs_and_key = Some((certs_file.into(), key_file.into()));
        self
    }

    /// Set the idle timeout after which a silent session is disconnected.
    pub fn idle_session_timeout(mut self, timeout: Duration) -> Self {
        self.idle_session_timeout = timeout;
        self
    }

    /// Bound the number of concurrent sessions. Connections beyond the bound
    /// get a `421` and are closed immediately.
    pub fn max_sessions(mut self, limit: usize) -> Self {
        self.max_sessions = limit;
        self
    }

    /// How long [`listen_until`](Server::listen_until) waits for running
    /// sessions after the shutdown signal fires.
    pub fn shutdown_grace_period(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Set the [`slog`] logger all server components log to. The default
    /// forwards to the standard `log` facade.
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        self.logger = logger.into().unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()));
        self
    }

    /// Runs the server on the given address until the process ends.
    pub async fn listen(self, bind_address: &str) -> Result<(), ServerError> {
        self.listen_until(bind_address, std::future::pending::<()>()).await
    }

    /// Runs the server on the given address until `shutdown` resolves, then
    /// notifies all sessions and lingers up to the configured grace period
    /// before returning.
    pub async fn listen_until<F>(self, bind_address: &str, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let bind_address: SocketAddr = bind_address.parse()?;

        if self.passive_ports.is_empty() {
            return Err(ServerError::msg(format!(
                "invalid passive port range {}..={}",
                self.passive_ports.start(),
                self.passive_ports.end()
            )));
        }

        let root_meta = std::fs::metadata(&self.root).map_err(|e| ServerError::new("cannot access the share root", e))?;
        if !root_meta.is_dir() {
            return Err(ServerError::msg(format!("share root {} is not a directory", self.root.display())));
        }

        let ftps_config = match &self.certs_and_key {
            Some((certs_file, key_file)) => FtpsConfig::On {
                tls_config: tls::new_config(certs_file, key_file)?,
            },
            None => FtpsConfig::Off,
        };

        let logger = self.logger.clone();
        let config = controlchan::LoopConfig {
            vfs: Arc::new(VirtualFs::new(self.root.clone())),
            greeting: self.greeting,
            authenticator: self.authenticator.clone(),
            passive_ports: self.passive_ports.clone(),
            ftps_config,
            idle_session_timeout: self.idle_session_timeout,
            logger: logger.clone(),
        };

        let shutdown_topic = Arc::new(shutdown::Notifier::new());
        let listener = listen::Listener {
            bind_address,
            logger: logger.clone(),
            config,
            shutdown_topic: shutdown_topic.clone(),
            session_limit: Arc::new(Semaphore::new(self.max_sessions)),
        };

        tokio::select! {
            result = listener.listen() => result,
            _ = shutdown => {
                slog::info!(logger, "Shutting down");
                shutdown_topic.notify().await;
                if tokio::time::timeout(self.shutdown_grace, shutdown_topic.linger()).await.is_err() {
                    slog::warn!(logger, "Graceful shutdown period elapsed with sessions still active");
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("root", &self.root)
            .field("greeting", &self.greeting)
            .field("passive_ports", &self.passive_ports)
            .field("ftps", &self.certs_and_key.is_some())
            .field("idle_session_timeout", &self.idle_session_timeout)
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}
