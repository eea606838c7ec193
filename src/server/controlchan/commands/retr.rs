//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server to transfer a copy of the file at the
// specified path to the client over the data connection.

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
pub struct Retr;

#[async_trait]
impl CommandHandler for Retr {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let path = match args.parsed_command.clone() {
            Command::Retr { path } => path,
            _ => panic!("Programmer error, expected command to be RETR"),
        };

        let mut session = args.session.lock().await;
        if !session.allows(Permissions::READ) {
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
                    DataChanCmd::Retr {
                        path,
                        real: resolved.real_path,
                    },
                    args.ftps_config.clone(),
                );
                Ok(Reply::new(ReplyCode::FileStatusOkay, "Ready to send data"))
            }
            None => Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")),
        }
    }
}
