use crate::server::{
    controlchan::commands::{AuthParam, ProtParam},
    password::Password,
    session::TransferType,
};
use std::net::SocketAddrV4;

/// The parsed form of one control channel line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    User {
        username: String,
    },
    Pass {
        password: Password,
    },
    Quit,
    Syst,
    Feat,
    Noop,
    Type {
        param: TransferType,
    },
    Pwd,
    Cwd {
        path: String,
    },
    Cdup,
    List {
        path: Option<String>,
    },
    Nlst {
        path: Option<String>,
    },
    Retr {
        path: String,
    },
    Stor {
        path: String,
    },
    Dele {
        path: String,
    },
    Mkd {
        path: String,
    },
    Rmd {
        path: String,
    },
    Rnfr {
        path: String,
    },
    Rnto {
        path: String,
    },
    Pasv,
    Port {
        /// The address the client told us to connect to, already assembled
        /// from the six h1,h2,h3,h4,p1,p2 octets.
        addr: SocketAddrV4,
    },
    Abor,
    Rest {
        offset: u64,
    },
    Mdtm {
        path: String,
    },
    Mfmt {
        /// The new modification time as a `YYYYMMDDHHMMSS` string; validated
        /// by the handler.
        timestamp: String,
        path: String,
    },
    Auth {
        protocol: AuthParam,
    },
    Pbsz,
    Prot {
        param: ProtParam,
    },
}
