//! One module per implemented FTP command.

mod abor;
mod auth;
mod cdup;
mod cwd;
mod dele;
mod feat;
mod list;
mod mdtm;
mod mfmt;
mod mkd;
mod nlst;
mod noop;
mod pass;
mod pasv;
mod pbsz;
mod port;
mod prot;
mod pwd;
mod quit;
mod rest;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod stor;
mod syst;
mod type_;
mod user;

pub use abor::Abor;
pub use auth::{Auth, AuthParam};
pub use cdup::Cdup;
pub use cwd::Cwd;
pub use dele::Dele;
pub use feat::Feat;
pub use list::List;
pub use mdtm::Mdtm;
pub use mfmt::Mfmt;
pub use mkd::Mkd;
pub use nlst::Nlst;
pub use noop::Noop;
pub use pass::Pass;
pub use pasv::Pasv;
pub use pbsz::Pbsz;
pub use port::Port;
pub use prot::{Prot, ProtParam};
pub use pwd::Pwd;
pub use quit::Quit;
pub use rest::Rest;
pub use retr::Retr;
pub use rmd::Rmd;
pub use rnfr::Rnfr;
pub use rnto::Rnto;
pub use stor::Stor;
pub use syst::Syst;
pub use type_::Type;
pub use user::User;
