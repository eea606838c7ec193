//! lanftp is an embeddable, async FTP(S) server library for sharing a single
//! local directory on a trusted network.
//!
//! It implements the protocol core: the control connection state machine,
//! passive and active data channel negotiation, a sandboxed virtual
//! filesystem rooted at the shared directory, and a pluggable authenticator.
//! Everything runs on [tokio]; one task per control session, one per running
//! data transfer.
//!
//! # Quick start
//!
//! Share a directory anonymously:
//!
//! ```rust,no_run
//! use lanftp::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::with_root("/srv/share");
//!     server.listen("0.0.0.0:2121").await.unwrap();
//! }
//! ```
//!
//! Require credentials and enable FTPS:
//!
//! ```rust,no_run
//! use lanftp::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::with_root("/srv/share")
//!         .credentials("alice", "correct horse")
//!         .ftps("/etc/lanftp/cert.pem", "/etc/lanftp/key.pem");
//!     server.listen("0.0.0.0:2121").await.unwrap();
//! }
//! ```
//!
//! The client-supplied side of every path is resolved lexically against the
//! share root before any filesystem call happens, so a session can never
//! read or write outside the shared directory, whatever mix of `..` and
//! absolute paths it sends.
//!
//! [tokio]: https://tokio.rs

pub mod auth;
mod server;
pub mod vfs;

pub use server::{Reply, ReplyCode, Server, ServerError};
