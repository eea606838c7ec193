//! This module provides an authenticator that admits everyone as "anonymous".

use crate::auth::{ANONYMOUS_USER, AuthError, Authenticator, Permissions, UserAccount};
use async_trait::async_trait;
use std::path::PathBuf;

/// [`Authenticator`](crate::auth::Authenticator) implementation used when no
/// credentials are configured: every connection logs in as the anonymous
/// account with the full permission set on the shared directory.
#[derive(Debug)]
pub struct AnonymousAuthenticator {
    home: PathBuf,
}

impl AnonymousAuthenticator {
    /// Creates an anonymous authenticator whose account lives in `home`.
    pub fn new<P: Into<PathBuf>>(home: P) -> Self {
        AnonymousAuthenticator { home: home.into() }
    }

    fn account(&self) -> UserAccount {
        UserAccount::new(ANONYMOUS_USER, self.home.clone(), Permissions::full())
    }
}

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    #[tracing_attributes::instrument(skip(_password))]
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<UserAccount, AuthError> {
        // Any password is fine, per FTP convention clients send an email address.
        Ok(self.account())
    }

    async fn authenticate_anonymous(&self) -> Result<UserAccount, AuthError> {
        Ok(self.account())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn accepts_any_credentials() {
        let auth = AnonymousAuthenticator::new("/srv/share");
        let account = auth.authenticate("whoever", "whatever").await.unwrap();
        assert_eq!(account.username, ANONYMOUS_USER);
        assert_eq!(account.home, PathBuf::from("/srv/share"));
    }

    #[tokio::test]
    async fn accepts_anonymous() {
        let auth = AnonymousAuthenticator::new("/srv/share");
        assert!(auth.authenticate_anonymous().await.is_ok());
    }
}
