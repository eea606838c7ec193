//! Contains the error type used by `Server`

use std::net::AddrParseError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by the [`Server::listen`](crate::Server::listen) method.
#[derive(Error, Debug)]
#[error("server error: {msg}")]
pub struct ServerError {
    msg: String,
    #[source]
    source: Option<BoxError>,
}

impl ServerError {
    pub(crate) fn new<E: std::error::Error + Send + Sync + 'static>(msg: impl Into<String>, source: E) -> ServerError {
        ServerError {
            msg: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn msg(msg: impl Into<String>) -> ServerError {
        ServerError {
            msg: msg.into(),
            source: None,
        }
    }
}

impl From<AddrParseError> for ServerError {
    fn from(e: AddrParseError) -> Self {
        ServerError::new("could not parse address", e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::AddrInUse => ServerError::new("address already in use", e),
            _ => ServerError::new("io error", e),
        }
    }
}

impl From<crate::server::tls::ConfigError> for ServerError {
    fn from(e: crate::server::tls::ConfigError) -> Self {
        ServerError::new(format!("error with TLS configuration: {}", e), e)
    }
}
