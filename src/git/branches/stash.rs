//! Branch-owned stashes.
//!
//! Every auto-stash belongs to the branch it was taken on. Ownership is kept
//! in a small JSON index inside the repository's metadata directory rather
//! than inferred from stash messages, and there is at most one record per
//! branch.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use git2::{ErrorCode, Oid, Signature, StashApplyOptions, StashFlags};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

/// Human-readable marker carried in the stash message.
pub const STASH_PREFIX: &str = "auto-stash: ";
const STASH_INDEX_FILE: &str = "stashes.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashRecord {
    pub branch: String,
    pub stash_id: String,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StashIndex {
    #[serde(default)]
    stashes: BTreeMap<String, StashRecord>,
}

/// Result of trying to apply a branch's stash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashApply {
    Applied,
    Conflict,
}

impl GitRepo {
    fn stash_index_path(&self) -> PathBuf {
        self.metadata_dir().join(STASH_INDEX_FILE)
    }

    fn load_stash_index(&self) -> Result<StashIndex> {
        let path = self.stash_index_path();
        if !path.exists() {
            return Ok(StashIndex::default());
        }
        let content =
            fs::read_to_string(&path).map_err(|e| GitError::io_at("read stash index", &path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| GitError::Invalid(format!("Stash index '{}' is corrupt: {e}", path.display())))
    }

    fn save_stash_index(&self, index: &StashIndex) -> Result<()> {
        let path = self.stash_index_path();
        let dir = self.metadata_dir();
        fs::create_dir_all(&dir).map_err(|e| GitError::io_at("create metadata directory", &dir, e))?;
        let content = serde_json::to_string_pretty(index)
            .map_err(|e| GitError::Invalid(format!("Failed to serialize stash index: {e}")))?;
        fs::write(&path, content).map_err(|e| GitError::io_at("write stash index", &path, e))
    }

    /// Stash entries as (position, message, id), newest first.
    pub fn list_stashes(&mut self) -> Result<Vec<(usize, String, Oid)>> {
        let mut stashes = Vec::new();
        self.repo_mut()
            .stash_foreach(|index, message, oid| {
                stashes.push((index, message.to_string(), *oid));
                true
            })
            .git_context("Failed to list stashes")?;
        Ok(stashes)
    }

    fn stash_position(&mut self, stash_id: Oid) -> Result<Option<usize>> {
        Ok(self
            .list_stashes()?
            .into_iter()
            .find(|(_, _, oid)| *oid == stash_id)
            .map(|(index, _, _)| index))
    }

    fn stash_signature(&self) -> Result<Signature<'static>> {
        match self.repo().signature() {
            Ok(signature) => Ok(signature.to_owned()),
            Err(_) => Signature::now("project-git", "project-git@localhost")
                .git_context("Failed to create stash signature"),
        }
    }

    /// Stash every change, untracked files included, on behalf of `branch`.
    ///
    /// A stash already recorded for `branch` is superseded: it is dropped and
    /// the record replaced.
    pub fn stash_for_branch(&mut self, branch: &str) -> Result<Oid> {
        let signature = self.stash_signature()?;
        let message = format!("{STASH_PREFIX}{branch}");

        let stash_id = self
            .repo_mut()
            .stash_save(&signature, &message, Some(StashFlags::INCLUDE_UNTRACKED))
            .git_context(format!("Failed to stash changes of branch '{branch}'"))?;

        let mut index = self.load_stash_index()?;
        let previous = index.stashes.insert(
            branch.to_string(),
            StashRecord {
                branch: branch.to_string(),
                stash_id: stash_id.to_string(),
                created_at: Utc::now().to_rfc3339(),
            },
        );
        self.save_stash_index(&index)?;

        if let Some(previous) = previous {
            if let Some(position) = Oid::from_str(&previous.stash_id)
                .ok()
                .map(|oid| self.stash_position(oid))
                .transpose()?
                .flatten()
            {
                warn!(branch, stash = %previous.stash_id, "dropping superseded auto-stash");
                self.repo_mut()
                    .stash_drop(position)
                    .git_context("Failed to drop superseded stash")?;
            }
        }

        info!(branch, stash = %stash_id, "stashed working tree changes");
        Ok(stash_id)
    }

    /// The stash recorded for `branch`, if it still exists.
    ///
    /// Records whose stash has vanished are pruned.
    pub fn branch_stash(&mut self, branch: &str) -> Result<Option<StashRecord>> {
        let mut index = self.load_stash_index()?;
        let Some(record) = index.stashes.get(branch).cloned() else {
            return Ok(None);
        };

        let position = match Oid::from_str(&record.stash_id) {
            Ok(oid) => self.stash_position(oid)?,
            Err(_) => None,
        };
        if position.is_none() {
            debug!(branch, stash = %record.stash_id, "pruning stale stash record");
            index.stashes.remove(branch);
            self.save_stash_index(&index)?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Apply the stash recorded for `branch` onto the working tree.
    ///
    /// The stash and its record are left in place; callers decide whether to
    /// drop them.
    pub fn apply_branch_stash(&mut self, record: &StashRecord) -> Result<StashApply> {
        let stash_id = Oid::from_str(&record.stash_id)
            .map_err(|e| GitError::from_git("Invalid stash id in index", e))?;
        let position = self.stash_position(stash_id)?.ok_or_else(|| {
            GitError::Invalid(format!("Stash for branch '{}' no longer exists", record.branch))
        })?;

        let mut options = StashApplyOptions::new();
        match self.repo_mut().stash_apply(position, Some(&mut options)) {
            // Content conflicts against the new HEAD are written to the index
            // instead of failing the apply
            Ok(()) if self.index_has_conflicts()? => {
                warn!(branch = %record.branch, "stash applied with conflicts");
                Ok(StashApply::Conflict)
            }
            Ok(()) => Ok(StashApply::Applied),
            Err(err) if is_apply_conflict(&err) => {
                warn!(branch = %record.branch, error = %err, "stash does not apply cleanly");
                Ok(StashApply::Conflict)
            }
            Err(err) => Err(GitError::from_git(
                format!("Failed to apply stash of branch '{}'", record.branch),
                err,
            )),
        }
    }

    /// Drop the stash recorded for `branch` and forget the record.
    pub fn drop_branch_stash(&mut self, record: &StashRecord) -> Result<()> {
        if let Ok(stash_id) = Oid::from_str(&record.stash_id) {
            if let Some(position) = self.stash_position(stash_id)? {
                self.repo_mut()
                    .stash_drop(position)
                    .git_context(format!("Failed to drop stash of branch '{}'", record.branch))?;
            }
        }

        let mut index = self.load_stash_index()?;
        if index
            .stashes
            .get(&record.branch)
            .is_some_and(|current| current.stash_id == record.stash_id)
        {
            index.stashes.remove(&record.branch);
            self.save_stash_index(&index)?;
        }
        Ok(())
    }
}

impl GitRepo {
    fn index_has_conflicts(&self) -> Result<bool> {
        let index = self
            .repo()
            .index()
            .git_context("Failed to get repository index")?;
        Ok(index.has_conflicts())
    }
}

fn is_apply_conflict(err: &git2::Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::Conflict | ErrorCode::MergeConflict | ErrorCode::Unmerged | ErrorCode::Exists
    )
}
