//! The interface between the control channel and whatever decides who gets in.

use crate::auth::UserAccount;
use async_trait::async_trait;
use thiserror::Error;

/// The error returned by [`Authenticator::authenticate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The username/password pair did not match the configured credentials.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// A credential pair is configured, so anonymous logins are refused.
    #[error("anonymous access is disabled")]
    AnonymousDisabled,
}

/// Maps login attempts to a [`UserAccount`].
///
/// Implementations must be cheap to call concurrently: one server instance
/// shares a single authenticator between all sessions without locking.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Authenticate the given username with the given password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, AuthError>;

    /// Authenticate a credential-less (anonymous) login. The default refuses.
    async fn authenticate_anonymous(&self) -> Result<UserAccount, AuthError> {
        Err(AuthError::AnonymousDisabled)
    }
}
