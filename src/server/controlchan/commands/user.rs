//! The RFC 959 User Name (`USER`) command

use crate::{
    auth::{AuthError, ANONYMOUS_USER},
    server::{
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        session::SessionState,
    },
    vfs::VirtualFs,
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl CommandHandler for User {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::New | SessionState::WaitPass { .. } => {
                // Anonymous can skip the PASS step entirely, but only when
                // the authenticator is set up for it.
                if self.username == ANONYMOUS_USER {
                    match args.authenticator.authenticate_anonymous().await {
                        Ok(account) => {
                            slog::info!(args.logger, "Anonymous login");
                            // Jail the session to the account home.
                            session.vfs = Arc::new(VirtualFs::new(account.home.clone()));
                            session.user = Some(account);
                            session.state = SessionState::WaitCmd;
                            return Ok(Reply::new(ReplyCode::UserLoggedIn, "Anonymous login granted"));
                        }
                        Err(AuthError::AnonymousDisabled) => {
                            // Fall through: treated like any other username.
                        }
                        Err(_) => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed")),
                    }
                }
                session.state = SessionState::WaitPass {
                    username: self.username.clone(),
                };
                Ok(Reply::new(ReplyCode::NeedPassword, "Password required"))
            }
            SessionState::WaitCmd => Ok(Reply::new(
                ReplyCode::BadCommandSequence,
                "Please create a new connection to switch user",
            )),
        }
    }
}
