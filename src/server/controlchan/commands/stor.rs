//! The RFC 959 Store (`STOR`) command
//
// This command causes the server to accept the data transferred via the data
// connection and store it as a file. An existing file at the given path is
// replaced; a new file is created otherwise.

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
pub struct Stor;

#[async_trait]
impl CommandHandler for Stor {
    #[tracing_attributes::instrument(skip(args))]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let path = match args.parsed_command.clone() {
            Command::Stor { path } => path,
            _ => panic!("Programmer error, expected command to be STOR"),
        };

        let mut session = args.session.lock().await;
        if !session.allows(Permissions::WRITE) {
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
                    DataChanCmd::Stor {
                        path,
                        real: resolved.real_path,
                    },
                    args.ftps_config.clone(),
                );
                Ok(Reply::new(ReplyCode::FileStatusOkay, "Ready to receive data"))
            }
            None => Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")),
        }
    }
}
