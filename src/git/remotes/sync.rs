use git2::{AutotagOption, FetchOptions};
use tracing::info;

use crate::error::{GitError, Result, ResultExt};
use crate::git::auth::TransportAuth;
use crate::git::merge::MergeOutcome;
use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Fetch every branch and tag the remote's refspecs name.
    pub fn fetch(&self, remote_name: &str, auth: &TransportAuth) -> Result<String> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .git_context(format!("Remote '{remote_name}' not found"))?;

        let mut options = FetchOptions::new();
        options
            .remote_callbacks(auth.remote_callbacks())
            .download_tags(AutotagOption::All);

        // An empty refspec list means "use the remote's configured refspecs"
        let no_refspecs: &[&str] = &[];
        remote
            .fetch(no_refspecs, Some(&mut options), None)
            .git_context(format!("Failed to fetch from remote '{remote_name}'"))?;

        let stats = remote.stats();
        let received_objects = stats.received_objects();
        let total_objects = stats.total_objects();

        let summary = if received_objects > 0 {
            format!("Fetched {received_objects}/{total_objects} objects from {remote_name}")
        } else {
            "Already up-to-date".to_string()
        };
        info!(remote = remote_name, received_objects, "fetched");
        Ok(summary)
    }

    /// Pull the current branch from its counterpart on `remote_name` (fetch + merge)
    pub fn pull(
        &self,
        remote_name: &str,
        auth: &TransportAuth,
        email: &str,
    ) -> Result<MergeOutcome> {
        let target_branch = self.current_branch()?;

        self.fetch(remote_name, auth)?;

        let remote_branch = format!("{remote_name}/{target_branch}");
        let remote_ref = format!("refs/remotes/{remote_branch}");
        let remote_commit = self
            .repo()
            .find_reference(&remote_ref)
            .and_then(|reference| reference.peel_to_commit())
            .map_err(|_| {
                GitError::Invalid(format!(
                    "Remote branch '{remote_branch}' not found after fetch"
                ))
            })?;

        let outcome = self.merge_commit(&remote_commit, &remote_branch, email)?;
        info!(remote = remote_name, branch = %target_branch, %outcome, "pulled");
        Ok(outcome)
    }
}
