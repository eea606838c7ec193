use bitflags::bitflags;
use std::fmt;
use std::path::PathBuf;

bitflags! {
    /// The set of operations an account is allowed to perform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u8 {
        /// Download files (RETR).
        const READ = 0b0000_0001;
        /// Upload files (STOR).
        const WRITE = 0b0000_0010;
        /// List directory contents (LIST, NLST).
        const LIST = 0b0000_0100;
        /// Create directories (MKD).
        const MKDIR = 0b0000_1000;
        /// Delete files and remove directories (DELE, RMD).
        const REMOVE = 0b0001_0000;
        /// Rename files and directories (RNFR/RNTO).
        const RENAME = 0b0010_0000;
        /// Change a file's modification time (MFMT).
        const CHMTIME = 0b0100_0000;
    }
}

impl Permissions {
    /// The full permission set handed to accounts on a shared directory.
    pub fn full() -> Permissions {
        Permissions::all()
    }
}

/// An account as resolved by an [`Authenticator`](crate::auth::Authenticator).
///
/// Accounts are constructed at server start and never mutated at runtime. The
/// home directory is the real filesystem subtree the account is confined to;
/// every path a client supplies resolves inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// The name the client logged in with.
    pub username: String,
    /// The real directory this account is jailed to.
    pub home: PathBuf,
    /// What the account may do inside its home.
    pub permissions: Permissions,
}

impl UserAccount {
    /// Creates an account rooted at `home` with the given permissions.
    pub fn new<U: Into<String>, P: Into<PathBuf>>(username: U, home: P, permissions: Permissions) -> Self {
        UserAccount {
            username: username.into(),
            home: home.into(),
            permissions,
        }
    }

    /// Tells whether this account holds all permissions in `wanted`.
    pub fn allows(&self, wanted: Permissions) -> bool {
        self.permissions.contains(wanted)
    }
}

impl fmt::Display for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_permissions_allow_everything() {
        let account = UserAccount::new("kas", "/srv/share", Permissions::full());
        assert!(account.allows(Permissions::READ | Permissions::WRITE));
        assert!(account.allows(Permissions::CHMTIME));
    }

    #[test]
    fn read_only_account_cannot_write() {
        let account = UserAccount::new("guest", "/srv/share", Permissions::READ | Permissions::LIST);
        assert!(account.allows(Permissions::READ));
        assert!(!account.allows(Permissions::WRITE));
        assert!(!account.allows(Permissions::READ | Permissions::WRITE));
    }

    #[test]
    fn display_is_the_username() {
        let account = UserAccount::new("kas", "/srv/share", Permissions::full());
        assert_eq!(format!("{}", account), "kas");
    }
}
