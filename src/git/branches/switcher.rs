use tracing::{info, warn};

use super::stash::StashApply;
use crate::config::StashConflictPolicy;
use crate::error::{GitError, Result};
use crate::git::repository::core::GitRepo;

/// What happened to the target branch's auto-stash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The target branch had no stash.
    Nothing,
    Restored,
    /// The stash conflicted with the checked out tree and was discarded.
    /// Its edits are lost.
    DiscardedOnConflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub from: String,
    pub to: String,
    /// Whether the source branch's changes were stashed.
    pub stashed: bool,
    pub restore: RestoreOutcome,
}

impl SwitchOutcome {
    pub fn lost_changes(&self) -> bool {
        self.restore == RestoreOutcome::DiscardedOnConflict
    }
}

/// Checks out branches without losing uncommitted work.
///
/// Leaving a dirty branch stashes its changes on that branch's behalf;
/// arriving on a branch re-applies its stash, if it has one.
pub struct BranchSwitcher<'r> {
    repo: &'r mut GitRepo,
    policy: StashConflictPolicy,
}

impl<'r> BranchSwitcher<'r> {
    pub fn new(repo: &'r mut GitRepo, policy: StashConflictPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn checkout(&mut self, target: &str) -> Result<SwitchOutcome> {
        let from = self.repo.current_branch()?;

        let stashed = if self.repo.has_commits() && self.repo.status()?.is_dirty() {
            self.repo.stash_for_branch(&from)?;
            true
        } else {
            false
        };

        if let Err(err) = self.repo.checkout_branch(target) {
            if stashed {
                self.restore_source(&from);
            }
            return Err(err);
        }

        let restore = self.restore(target)?;

        info!(from = %from, to = target, stashed, ?restore, "switched branch");
        Ok(SwitchOutcome {
            from,
            to: target.to_string(),
            stashed,
            restore,
        })
    }

    fn restore(&mut self, branch: &str) -> Result<RestoreOutcome> {
        let Some(record) = self.repo.branch_stash(branch)? else {
            return Ok(RestoreOutcome::Nothing);
        };

        match self.repo.apply_branch_stash(&record)? {
            StashApply::Applied => {
                self.repo.drop_branch_stash(&record)?;
                Ok(RestoreOutcome::Restored)
            }
            StashApply::Conflict => {
                self.repo.reset_hard()?;
                match self.policy {
                    StashConflictPolicy::Discard => {
                        warn!(branch, stash = %record.stash_id, "discarding conflicting auto-stash");
                        self.repo.drop_branch_stash(&record)?;
                        Ok(RestoreOutcome::DiscardedOnConflict)
                    }
                    StashConflictPolicy::Keep => Err(GitError::StashApplyConflict {
                        branch: branch.to_string(),
                    }),
                }
            }
        }
    }

    /// Put the source branch's changes back after a failed checkout.
    fn restore_source(&mut self, branch: &str) {
        let restored = self.repo.branch_stash(branch).and_then(|record| match record {
            Some(record) => match self.repo.apply_branch_stash(&record)? {
                StashApply::Applied => self.repo.drop_branch_stash(&record),
                StashApply::Conflict => Ok(()),
            },
            None => Ok(()),
        });
        if let Err(err) = restored {
            warn!(branch, error = %err, "could not restore stashed changes after failed checkout");
        }
    }
}
