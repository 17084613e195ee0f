//! Transport authentication.
//!
//! The auth mode of a remote is decided by its URL alone, through
//! [`AuthMode::from_url`]; every caller that needs it goes through that one
//! function.

pub mod credentials;

use std::fmt;

pub use credentials::{CredentialResolver, TransportAuth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Ssh,
    Https,
    /// No remote configured.
    None,
}

impl AuthMode {
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() {
            AuthMode::None
        } else if url
            .get(..4)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
        {
            AuthMode::Https
        } else {
            AuthMode::Ssh
        }
    }

    pub fn is_ssh(self) -> bool {
        self == AuthMode::Ssh
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::Ssh => "SSH",
            AuthMode::Https => "HTTPS",
            AuthMode::None => "NONE",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::AuthMode;

    #[test]
    fn mode_follows_url_scheme() {
        assert_eq!(AuthMode::from_url("https://github.com/org/repo.git"), AuthMode::Https);
        assert_eq!(AuthMode::from_url("HTTP://intranet/repo.git"), AuthMode::Https);
        assert_eq!(AuthMode::from_url("git@github.com:org/repo.git"), AuthMode::Ssh);
        assert_eq!(AuthMode::from_url("ssh://git@host/repo.git"), AuthMode::Ssh);
        assert_eq!(AuthMode::from_url(""), AuthMode::None);
        assert_eq!(AuthMode::from_url("   "), AuthMode::None);
    }
}
