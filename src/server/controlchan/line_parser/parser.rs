use super::error::{ParseErrorKind, Result};
use crate::server::{
    controlchan::{
        command::Command,
        commands::{AuthParam, ProtParam},
    },
    password::Password,
    session::TransferType,
};

use std::net::{Ipv4Addr, SocketAddrV4};
use std::str;

/// Parse the given line into a [`Command`].
pub fn parse<T>(line: T) -> Result<Command>
where
    T: AsRef<[u8]>,
{
    let line = str::from_utf8(line.as_ref())?;
    let mut iter = line.splitn(2, [' ', '\r', '\n']);
    let cmd_token = iter.next().unwrap_or("").to_uppercase();
    let cmd_params = parse_to_eol(iter.next().unwrap_or("\n"))?;

    let cmd = match &*cmd_token {
        "USER" => {
            let username = required(cmd_params)?;
            Command::User {
                username: username.to_string(),
            }
        }
        "PASS" => Command::Pass {
            password: Password::new(cmd_params),
        },
        "QUIT" => {
            no_params(cmd_params)?;
            Command::Quit
        }
        "SYST" => {
            no_params(cmd_params)?;
            Command::Syst
        }
        "FEAT" => {
            no_params(cmd_params)?;
            Command::Feat
        }
        "NOOP" => {
            // NOOP params are prohibited
            no_params(cmd_params)?;
            Command::Noop
        }
        "TYPE" => {
            let param = match required(cmd_params)?.to_uppercase().as_str() {
                "A" => TransferType::Ascii,
                "I" => TransferType::Binary,
                _ => return Err(ParseErrorKind::InvalidCommand.into()),
            };
            Command::Type { param }
        }
        "PWD" | "XPWD" => {
            no_params(cmd_params)?;
            Command::Pwd
        }
        "CWD" | "XCWD" => {
            let path = required(cmd_params)?;
            Command::Cwd { path: path.to_string() }
        }
        "CDUP" => {
            no_params(cmd_params)?;
            Command::Cdup
        }
        "LIST" => {
            // Ignore ls-style options some clients insist on sending.
            let path = cmd_params.split(' ').find(|s| !s.is_empty() && !s.starts_with('-')).map(String::from);
            Command::List { path }
        }
        "NLST" => {
            let path = if cmd_params.is_empty() { None } else { Some(cmd_params.to_string()) };
            Command::Nlst { path }
        }
        "RETR" => {
            let path = required(cmd_params)?;
            Command::Retr { path: path.to_string() }
        }
        "STOR" => {
            let path = required(cmd_params)?;
            Command::Stor { path: path.to_string() }
        }
        "DELE" => {
            let path = required(cmd_params)?;
            Command::Dele { path: path.to_string() }
        }
        "MKD" | "XMKD" => {
            let path = required(cmd_params)?;
            Command::Mkd { path: path.to_string() }
        }
        "RMD" | "XRMD" => {
            let path = required(cmd_params)?;
            Command::Rmd { path: path.to_string() }
        }
        "RNFR" => {
            let path = required(cmd_params)?;
            Command::Rnfr { path: path.to_string() }
        }
        "RNTO" => {
            let path = required(cmd_params)?;
            Command::Rnto { path: path.to_string() }
        }
        "PASV" => {
            no_params(cmd_params)?;
            Command::Pasv
        }
        "PORT" => {
            let addr = parse_port_argument(required(cmd_params)?)?;
            Command::Port { addr }
        }
        "ABOR" => {
            no_params(cmd_params)?;
            Command::Abor
        }
        "REST" => {
            let offset = required(cmd_params)?.parse::<u64>().map_err(|_| ParseErrorKind::InvalidCommand)?;
            Command::Rest { offset }
        }
        "MDTM" => {
            let path = required(cmd_params)?;
            Command::Mdtm { path: path.to_string() }
        }
        "MFMT" => {
            let params = required(cmd_params)?;
            let (timestamp, path) = params.split_once(' ').ok_or(ParseErrorKind::InvalidCommand)?;
            if timestamp.is_empty() || path.is_empty() {
                return Err(ParseErrorKind::InvalidCommand.into());
            }
            Command::Mfmt {
                timestamp: timestamp.to_string(),
                path: path.to_string(),
            }
        }
        "AUTH" => {
            let protocol = match required(cmd_params)?.to_uppercase().as_str() {
                "TLS" => AuthParam::Tls,
                "SSL" => AuthParam::Ssl,
                _ => return Err(ParseErrorKind::InvalidCommand.into()),
            };
            Command::Auth { protocol }
        }
        "PBSZ" => {
            // Only a zero protection buffer size makes sense for TLS.
            if required(cmd_params)? != "0" {
                return Err(ParseErrorKind::InvalidCommand.into());
            }
            Command::Pbsz
        }
        "PROT" => {
            let param = match required(cmd_params)?.to_uppercase().as_str() {
                "C" => ProtParam::Clear,
                "S" => ProtParam::Safe,
                "E" => ProtParam::Confidential,
                "P" => ProtParam::Private,
                _ => return Err(ParseErrorKind::InvalidCommand.into()),
            };
            Command::Prot { param }
        }
        _ => {
            return Err(ParseErrorKind::UnknownCommand { command: cmd_token }.into());
        }
    };

    Ok(cmd)
}

/// Strips the line terminator, rejecting stray CR or LF in the middle of the
/// parameter text.
fn parse_to_eol(text: &str) -> Result<&str> {
    // An empty remainder means the terminator itself was the split
    // delimiter (e.g. `QUIT\n`): no parameters.
    if text.is_empty() {
        return Ok(text);
    }
    let text = text.strip_suffix('\n').ok_or(ParseErrorKind::InvalidEol)?;
    let text = text.strip_suffix('\r').unwrap_or(text);
    if text.contains(['\r', '\n']) {
        return Err(ParseErrorKind::InvalidEol.into());
    }
    Ok(text)
}

fn required(params: &str) -> Result<&str> {
    if params.is_empty() {
        return Err(ParseErrorKind::InvalidCommand.into());
    }
    Ok(params)
}

fn no_params(params: &str) -> Result<()> {
    if !params.is_empty() {
        return Err(ParseErrorKind::InvalidCommand.into());
    }
    Ok(())
}

/// Assembles a socket address from the `h1,h2,h3,h4,p1,p2` notation of RFC
/// 959.
fn parse_port_argument(params: &str) -> Result<SocketAddrV4> {
    let mut octets = [0u8; 6];
    let mut count = 0;
    for part in params.split(',') {
        if count == 6 {
            return Err(ParseErrorKind::InvalidCommand.into());
        }
        octets[count] = part.trim().parse::<u8>().map_err(|_| ParseErrorKind::InvalidCommand)?;
        count += 1;
    }
    if count != 6 {
        return Err(ParseErrorKind::InvalidCommand.into());
    }
    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) | u16::from(octets[5]);
    Ok(SocketAddrV4::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_user_with_argument() {
        assert_eq!(
            parse("USER alice\r\n").unwrap(),
            Command::User {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn command_token_is_case_insensitive() {
        assert_eq!(parse("noop\r\n").unwrap(), Command::Noop);
        assert_eq!(parse("NoOp\n").unwrap(), Command::Noop);
    }

    #[test]
    fn pass_allows_empty_password() {
        // An empty PASS line is syntactically fine; rejecting it is the
        // authenticator's job.
        assert_eq!(
            parse("PASS \r\n").unwrap(),
            Command::Pass {
                password: Password::new("")
            }
        );
    }

    #[test]
    fn user_without_argument_is_invalid() {
        assert_eq!(parse("USER \r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn noop_rejects_arguments() {
        assert_eq!(parse("NOOP hi\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn unknown_command_is_reported_with_its_name() {
        assert_eq!(
            parse("EPSV\r\n").unwrap_err().kind(),
            &ParseErrorKind::UnknownCommand { command: "EPSV".to_string() }
        );
    }

    #[test]
    fn parses_port_octets() {
        assert_eq!(
            parse("PORT 127,0,0,1,217,0\r\n").unwrap(),
            Command::Port {
                addr: SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 217 * 256)
            }
        );
    }

    #[test]
    fn port_with_wrong_arity_is_invalid() {
        assert_eq!(parse("PORT 127,0,0,1,217\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
        assert_eq!(parse("PORT 127,0,0,1,217,0,1\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
        assert_eq!(parse("PORT 300,0,0,1,217,0\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn parses_type_params() {
        assert_eq!(parse("TYPE I\r\n").unwrap(), Command::Type { param: TransferType::Binary });
        assert_eq!(parse("TYPE a\r\n").unwrap(), Command::Type { param: TransferType::Ascii });
        assert_eq!(parse("TYPE X\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn parses_rest_offset() {
        assert_eq!(parse("REST 1024\r\n").unwrap(), Command::Rest { offset: 1024 });
        assert_eq!(parse("REST many\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn parses_mfmt_timestamp_and_path() {
        assert_eq!(
            parse("MFMT 20240101120000 some/file.txt\r\n").unwrap(),
            Command::Mfmt {
                timestamp: "20240101120000".to_string(),
                path: "some/file.txt".to_string(),
            }
        );
        assert_eq!(parse("MFMT 20240101120000\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }

    #[test]
    fn list_swallows_ls_options() {
        assert_eq!(parse("LIST -la\r\n").unwrap(), Command::List { path: None });
        assert_eq!(
            parse("LIST -la photos\r\n").unwrap(),
            Command::List {
                path: Some("photos".to_string())
            }
        );
        assert_eq!(parse("LIST\r\n").unwrap(), Command::List { path: None });
    }

    #[test]
    fn rejects_bare_carriage_return() {
        assert_eq!(parse("NOOP x\ry\n").unwrap_err().kind(), &ParseErrorKind::InvalidEol);
    }

    #[test]
    fn rejects_non_utf8_input() {
        assert_eq!(parse(b"USER \xff\xfe\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidUtf8);
    }

    #[test]
    fn parses_auth_and_prot() {
        assert_eq!(parse("AUTH tls\r\n").unwrap(), Command::Auth { protocol: AuthParam::Tls });
        assert_eq!(parse("PROT P\r\n").unwrap(), Command::Prot { param: ProtParam::Private });
        assert_eq!(parse("PBSZ 0\r\n").unwrap(), Command::Pbsz);
        assert_eq!(parse("PBSZ 1024\r\n").unwrap_err().kind(), &ParseErrorKind::InvalidCommand);
    }
}
