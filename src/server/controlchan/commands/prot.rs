//! The RFC 2228 Data Channel Protection Level (`PROT`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

/// The protection level the client asked for. Only `Clear` and `Private`
/// exist in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtParam {
    Clear,
    Safe,
    Confidential,
    Private,
}

#[derive(Debug)]
pub struct Prot {
    param: ProtParam,
}

impl Prot {
    pub fn new(param: ProtParam) -> Self {
        Prot { param }
    }
}

#[async_trait]
impl CommandHandler for Prot {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        if !args.tls_configured {
            return Ok(Reply::new(ReplyCode::CommandNotImplemented, "TLS is not configured"));
        }
        let mut session = args.session.lock().await;
        match self.param {
            ProtParam::Clear => {
                session.data_tls = false;
                Ok(Reply::new(ReplyCode::CommandOkay, "PROT C OK"))
            }
            ProtParam::Private => {
                session.data_tls = true;
                Ok(Reply::new(ReplyCode::CommandOkay, "PROT P OK"))
            }
            ProtParam::Safe | ProtParam::Confidential => Ok(Reply::new(
                ReplyCode::CommandNotImplementedForParameter,
                "Only PROT C and PROT P are supported",
            )),
        }
    }
}
