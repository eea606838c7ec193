//! The RFC 959 Password (`PASS`) command

use crate::{
    server::{
        controlchan::{
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        password::Password,
        session::SessionState,
    },
    vfs::VirtualFs,
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct Pass {
    password: Password,
}

impl Pass {
    pub fn new(password: Password) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl CommandHandler for Pass {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match &session.state {
            SessionState::WaitPass { username } => {
                let username = username.clone();
                match args.authenticator.authenticate(&username, self.password.unsecure()).await {
                    Ok(account) => {
                        slog::info!(args.logger, "User logged in"; "username" => &username);
                        // The session is jailed to the account home from
                        // here on; every resolve roots there.
                        session.vfs = Arc::new(VirtualFs::new(account.home.clone()));
                        session.user = Some(account);
                        session.state = SessionState::WaitCmd;
                        Ok(Reply::new(ReplyCode::UserLoggedIn, "User logged in, proceed"))
                    }
                    Err(err) => {
                        slog::warn!(args.logger, "Failed login attempt: {}", err; "username" => &username);
                        session.state = SessionState::New;
                        Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"))
                    }
                }
            }
            SessionState::New => Ok(Reply::new(ReplyCode::BadCommandSequence, "Please supply a username first")),
            SessionState::WaitCmd => Ok(Reply::new(ReplyCode::BadCommandSequence, "Already logged in")),
        }
    }
}
