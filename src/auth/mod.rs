//! Contains the [`Authenticator`] trait and the account types used to decide
//! who may log in to the server and what they are allowed to do.
//!
//! Two implementations ship with the crate: [`AnonymousAuthenticator`] for
//! open shares and [`SingleUserAuthenticator`] for shares protected by one
//! username/password pair. Both are created once at server start from the
//! builder and are read-only afterwards.

pub mod anonymous;
pub use anonymous::AnonymousAuthenticator;

pub(crate) mod authenticator;
pub use authenticator::{AuthError, Authenticator};

mod single_user;
pub use single_user::SingleUserAuthenticator;

mod user;
pub use user::{Permissions, UserAccount};

/// The username under which credential-less logins are accepted.
pub const ANONYMOUS_USER: &str = "anonymous";
