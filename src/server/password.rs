use std::fmt;

/// A password submitted over the control channel. Wrapped so that it never
/// ends up in log output through a stray `{:?}`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new<S: Into<String>>(password: S) -> Self {
        Password(password.into())
    }

    /// Exposes the cleartext for the authenticator.
    pub fn unsecure(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn debug_redacts() {
        let p = Password::new("hunter2");
        assert_eq!(format!("{:?}", p), "********");
        assert_eq!(p.unsecure(), "hunter2");
    }
}
