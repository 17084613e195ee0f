use git2::Signature;

use super::core::GitRepo;
use crate::error::{Result, ResultExt};

impl GitRepo {
    /// Authorship comes from the acting user's configured email only.
    ///
    /// libgit2 rejects an empty display name, so the email doubles as the name;
    /// history rows fall back to the email for nameless authors anyway.
    pub(crate) fn create_signature(&self, email: &str) -> Result<Signature<'static>> {
        Signature::now(email, email)
            .git_context(format!("Failed to create signature for '{email}'"))
    }
}
