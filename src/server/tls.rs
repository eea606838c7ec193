//! TLS (FTPS) configuration for the control and data channels.

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_rustls::TlsAcceptor;

/// Tells whether, and how, TLS security is configured for the server or a
/// particular channel.
#[derive(Clone)]
pub enum FtpsConfig {
    Off,
    On { tls_config: Arc<ServerConfig> },
}

impl std::fmt::Debug for FtpsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FtpsConfig::Off => write!(f, "Off"),
            FtpsConfig::On { .. } => write!(f, "On"),
        }
    }
}

impl FtpsConfig {
    /// Yields an acceptor when TLS is configured.
    pub fn acceptor(&self) -> Option<TlsAcceptor> {
        match self {
            FtpsConfig::Off => None,
            FtpsConfig::On { tls_config } => Some(TlsAcceptor::from(tls_config.clone())),
        }
    }
}

/// Error returned when the certificate or key PEM files cannot be turned
/// into a working TLS configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read PEM file: {0}")]
    Load(#[from] std::io::Error),
    #[error("no private key found in key file")]
    NoPrivateKey,
    #[error("TLS setup error: {0}")]
    Setup(#[from] rustls::Error),
}

/// Builds the rustls server configuration from PEM files. Called once at
/// server startup.
pub fn new_config<P: AsRef<Path>>(certs_file: P, key_file: P) -> Result<Arc<ServerConfig>, ConfigError> {
    let certs = load_certs(certs_file)?;
    let key = load_private_key(key_file)?;
    let config = ServerConfig::builder().with_no_client_auth().with_single_cert(certs, key)?;
    Ok(Arc::new(config))
}

fn load_certs<P: AsRef<Path>>(filename: P) -> Result<Vec<CertificateDer<'static>>, ConfigError> {
    let certfile = File::open(filename)?;
    let mut reader = BufReader::new(certfile);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    Ok(certs)
}

fn load_private_key<P: AsRef<Path>>(filename: P) -> Result<PrivateKeyDer<'static>, ConfigError> {
    let keyfile = File::open(filename)?;
    let mut reader = BufReader::new(keyfile);
    rustls_pemfile::private_key(&mut reader)?.ok_or(ConfigError::NoPrivateKey)
}
