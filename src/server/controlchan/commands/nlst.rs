//! The RFC 959 Name List (`NLST`) command

use crate::{
    auth::Permissions,
    server::{
        chancomms::DataChanCmd,
        controlchan::{
            command::Command,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            Reply, ReplyCode,
        },
        datachan,
    },
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Nlst;

#[async_trait]
impl CommandHandler for Nlst {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let path = match args.parsed_command.clone() {
            Command::Nlst { path } => path.unwrap_or_else(|| ".".to_string()),
            _ => panic!("Programmer error, expected command to be NLST"),
        };

        let mut session = args.session.lock().await;
        if !session.allows(Permissions::LIST) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        let resolved = match session.vfs.resolve(&session.cwd, &path) {
            Ok(resolved) => resolved,
            Err(err) => return Ok(err.into()),
        };
        match session.data_channel.take() {
            Some(chan) => {
                datachan::spawn_transfer(
                    args.logger.clone(),
                    &mut session,
                    chan,
                    DataChanCmd::Nlst { real: resolved.real_path },
                    args.ftps_config.clone(),
                );
                Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending name list"))
            }
            None => Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")),
        }
    }
}
