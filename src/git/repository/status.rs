use std::collections::BTreeSet;

use git2::{Status, StatusOptions};

use super::core::GitRepo;
use crate::error::{Result, ResultExt};

/// Working tree state relative to the index and HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    /// Tracked files deleted from the working tree but not staged as deleted.
    pub missing: BTreeSet<String>,
    /// Tracked files whose working tree content differs from the index.
    pub modified: BTreeSet<String>,
    /// Files not tracked by the index.
    pub untracked: BTreeSet<String>,
    /// Files whose staged content differs from HEAD.
    pub changed: BTreeSet<String>,
    /// Every tracked path with a change not yet committed.
    pub uncommitted: BTreeSet<String>,
}

impl WorkingTreeStatus {
    pub fn is_dirty(&self) -> bool {
        !(self.missing.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.uncommitted.is_empty())
    }
}

impl GitRepo {
    pub fn status(&self) -> Result<WorkingTreeStatus> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo()
            .statuses(Some(&mut options))
            .git_context("Failed to compute working tree status")?;

        let mut status = WorkingTreeStatus::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let path = path.to_string();
            let flags = entry.status();

            if flags.contains(Status::WT_NEW) {
                status.untracked.insert(path.clone());
            }
            if flags.contains(Status::WT_DELETED) {
                status.missing.insert(path.clone());
            }
            if flags.intersects(Status::WT_MODIFIED | Status::WT_TYPECHANGE) {
                status.modified.insert(path.clone());
            }
            if flags.intersects(Status::INDEX_MODIFIED | Status::INDEX_TYPECHANGE) {
                status.changed.insert(path.clone());
            }
            if flags.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE
                    | Status::WT_MODIFIED
                    | Status::WT_DELETED
                    | Status::WT_TYPECHANGE
                    | Status::WT_RENAMED
                    | Status::CONFLICTED,
            ) {
                status.uncommitted.insert(path);
            }
        }

        Ok(status)
    }
}
