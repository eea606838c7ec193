//! The RFC 2228 Authentication/Security Mechanism (`AUTH`) command

use crate::server::{
    chancomms::ControlChanMsg,
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
};
use async_trait::async_trait;

/// The security mechanism the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthParam {
    Tls,
    Ssl,
}

#[derive(Debug)]
pub struct Auth {
    protocol: AuthParam,
}

impl Auth {
    pub fn new(protocol: AuthParam) -> Self {
        Auth { protocol }
    }
}

#[async_trait]
impl CommandHandler for Auth {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        match (args.tls_configured, self.protocol) {
            (true, AuthParam::Tls) => {
                // The handshake happens in the control loop right after the
                // 234 below went out in plaintext.
                if let Err(err) = args.tx.send(ControlChanMsg::SecureControlChannel).await {
                    slog::warn!(args.logger, "Could not send internal message: SecureControlChannel. {}", err);
                }
                Ok(Reply::new(ReplyCode::AuthOkayNoDataNeeded, "AUTH TLS OK"))
            }
            (true, AuthParam::Ssl) => Ok(Reply::new(
                ReplyCode::CommandNotImplementedForParameter,
                "AUTH SSL is not supported",
            )),
            (false, _) => Ok(Reply::new(ReplyCode::CommandNotImplemented, "TLS is not configured")),
        }
    }
}
