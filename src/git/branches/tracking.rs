use git2::BranchType;
use tracing::debug;

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Create local `branch_name` at `remote_branch` (`remote/name`) and make
    /// it track that branch.
    pub fn create_tracking_branch(&self, branch_name: &str, remote_branch: &str) -> Result<()> {
        let remote = self
            .repo()
            .find_branch(remote_branch, BranchType::Remote)
            .map_err(|_| {
                GitError::Invalid(format!(
                    "Branch '{branch_name}' exists neither locally nor as '{remote_branch}'"
                ))
            })?;
        let commit = remote
            .get()
            .peel_to_commit()
            .git_context(format!("Failed to resolve '{remote_branch}'"))?;

        let mut local = self
            .repo()
            .branch(branch_name, &commit, false)
            .git_context(format!("Failed to create branch '{branch_name}'"))?;
        local
            .set_upstream(Some(remote_branch))
            .git_context(format!("Failed to track '{remote_branch}'"))?;

        debug!(branch = branch_name, upstream = remote_branch, "created tracking branch");
        Ok(())
    }

    /// Upstream of a local branch as `remote/branch`.
    pub fn upstream_of(&self, branch: &str) -> Result<String> {
        let branch_ref = format!("refs/heads/{branch}");

        let upstream = self
            .repo()
            .branch_upstream_name(&branch_ref)
            .git_context("No remote tracking branch")?;

        let upstream_str = upstream.as_str().ok_or_else(|| {
            GitError::Invalid("Failed to convert upstream name to string".to_string())
        })?;

        let tracking_branch = upstream_str
            .strip_prefix("refs/remotes/")
            .unwrap_or(upstream_str);

        Ok(tracking_branch.to_string())
    }
}
