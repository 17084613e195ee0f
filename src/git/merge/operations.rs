use std::fmt;

use git2::{build::CheckoutBuilder, Commit, MergeOptions, Oid};
use tracing::{info, warn};

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    UpToDate,
    FastForward(Oid),
    Merged(Oid),
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::UpToDate => write!(f, "Already up-to-date"),
            MergeOutcome::FastForward(oid) => write!(f, "Fast-forward: {oid}"),
            MergeOutcome::Merged(oid) => write!(f, "Merge commit created: {oid}"),
        }
    }
}

impl GitRepo {
    /// Merge `target` into the current branch, committing as `email`.
    ///
    /// `label` names the merged side in the merge commit message.
    pub fn merge_commit(&self, target: &Commit<'_>, label: &str, email: &str) -> Result<MergeOutcome> {
        let current_branch = self.current_branch()?;
        let branch_ref_name = format!("refs/heads/{current_branch}");

        // Unborn branch: adopt the target as-is
        if !self.has_commits() {
            self.repo()
                .reference(&branch_ref_name, target.id(), true, "Fast-forward merge")
                .git_context("Failed to update branch reference")?;
            self.checkout_commit_tree(target)?;
            return Ok(MergeOutcome::FastForward(target.id()));
        }

        let head_commit = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel_to_commit()
            .git_context("Failed to get current commit")?;

        // Check if already up-to-date
        if head_commit.id() == target.id() {
            return Ok(MergeOutcome::UpToDate);
        }

        let merge_base = self
            .repo()
            .merge_base(head_commit.id(), target.id())
            .git_context("Failed to find merge base")?;

        if merge_base == target.id() {
            // Local branch is ahead
            return Ok(MergeOutcome::UpToDate);
        }

        if merge_base == head_commit.id() {
            self.repo()
                .reference(&branch_ref_name, target.id(), true, "Fast-forward merge")
                .git_context("Failed to update branch reference")?;
            self.checkout_commit_tree(target)?;

            info!(branch = %current_branch, target = %target.id(), "fast-forwarded");
            return Ok(MergeOutcome::FastForward(target.id()));
        }

        // True merge required
        let annotated_commit = self
            .repo()
            .find_annotated_commit(target.id())
            .git_context("Failed to create annotated commit")?;

        let mut merge_options = MergeOptions::new();
        let mut checkout_opts = CheckoutBuilder::new();
        checkout_opts.conflict_style_merge(true);

        self.repo()
            .merge(
                &[&annotated_commit],
                Some(&mut merge_options),
                Some(&mut checkout_opts),
            )
            .git_context("Failed to perform merge")?;

        let mut index = self
            .repo()
            .index()
            .git_context("Failed to get index after merge")?;
        if index.has_conflicts() {
            warn!(branch = %current_branch, label, "merge left conflicts in the working tree");
            return Err(GitError::Invalid(format!(
                "Merge conflicts detected while merging '{label}'. Please resolve conflicts and commit manually."
            )));
        }

        let tree_id = index.write_tree().git_context("Failed to write merge tree")?;
        let tree = self
            .repo()
            .find_tree(tree_id)
            .git_context("Failed to find merge tree")?;

        let signature = self.create_signature(email)?;
        let commit_message = format!("Merge branch '{label}' into {current_branch}");

        let merge_commit_id = self
            .repo()
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &commit_message,
                &tree,
                &[&head_commit, target],
            )
            .git_context("Failed to create merge commit")?;

        self.repo()
            .cleanup_state()
            .git_context("Failed to cleanup merge state")?;

        info!(branch = %current_branch, commit = %merge_commit_id, "merge commit created");
        Ok(MergeOutcome::Merged(merge_commit_id))
    }

    fn checkout_commit_tree(&self, commit: &Commit<'_>) -> Result<()> {
        if self.is_bare() {
            return Ok(());
        }
        let tree = commit.tree().git_context("Failed to get target tree")?;
        let mut checkout_opts = CheckoutBuilder::new();
        checkout_opts.force();
        self.repo()
            .checkout_tree(tree.as_object(), Some(&mut checkout_opts))
            .git_context("Failed to checkout target tree")?;
        Ok(())
    }
}
