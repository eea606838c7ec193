//! An authenticator for shares protected by exactly one username/password pair.

use crate::auth::{AuthError, Authenticator, Permissions, UserAccount};
use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use std::path::PathBuf;

/// [`Authenticator`](crate::auth::Authenticator) implementation backed by the
/// single credential pair from the server configuration. Anonymous logins are
/// refused, and both username and password must match exactly.
pub struct SingleUserAuthenticator {
    username: String,
    password: String,
    home: PathBuf,
    permissions: Permissions,
}

impl SingleUserAuthenticator {
    /// Creates an authenticator for the given credential pair, homing the
    /// account at `home` with the full permission set.
    pub fn new<U, P, H>(username: U, password: P, home: H) -> Self
    where
        U: Into<String>,
        P: Into<String>,
        H: Into<PathBuf>,
    {
        SingleUserAuthenticator {
            username: username.into(),
            password: password.into(),
            home: home.into(),
            permissions: Permissions::full(),
        }
    }

    /// Restricts the account to the given permission set.
    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}

impl std::fmt::Debug for SingleUserAuthenticator {
    // The password stays out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SingleUserAuthenticator")
            .field("username", &self.username)
            .field("home", &self.home)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authenticator for SingleUserAuthenticator {
    #[tracing_attributes::instrument(skip(password))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, AuthError> {
        // Compare both parts unconditionally so a username mismatch takes the
        // same time as a password mismatch.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if user_ok & pass_ok {
            Ok(UserAccount::new(self.username.clone(), self.home.clone(), self.permissions))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn authenticator() -> SingleUserAuthenticator {
        SingleUserAuthenticator::new("kas", "hunter2", "/srv/share")
    }

    #[tokio::test]
    async fn accepts_the_configured_pair() {
        let account = authenticator().authenticate("kas", "hunter2").await.unwrap();
        assert_eq!(account.username, "kas");
        assert!(account.allows(Permissions::WRITE));
    }

    #[tokio::test]
    async fn rejects_a_wrong_password() {
        assert_eq!(
            authenticator().authenticate("kas", "hunter3").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn rejects_an_empty_password() {
        assert_eq!(authenticator().authenticate("kas", "").await, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_a_wrong_username_with_the_right_password() {
        assert_eq!(
            authenticator().authenticate("guest", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn refuses_anonymous_when_credentials_are_set() {
        assert_eq!(authenticator().authenticate_anonymous().await, Err(AuthError::AnonymousDisabled));
    }
}
