use std::fs;
use std::path::{Component, Path};

use git2::{build::CheckoutBuilder, ObjectType, ResetType};
use tracing::{debug, info};

use super::core::GitRepo;
use crate::error::{GitError, Result, ResultExt};

/// Reject paths that could name something outside the working tree.
fn ensure_inside_workdir(path: &str) -> Result<()> {
    let inside = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(GitError::Invalid(format!(
            "Path '{path}' is not relative to the working tree"
        )))
    }
}

fn is_under(file: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    file.trim_end_matches('/') == path
        || file
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Depth-first removal of empty directories. Returns whether `dir` was removed.
fn prune_empty(dir: &Path) -> Result<bool> {
    let entries = fs::read_dir(dir).map_err(|e| GitError::io_at("read directory", dir, e))?;
    let mut empty = true;
    for entry in entries {
        let entry = entry.map_err(|e| GitError::io_at("read directory", dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| GitError::io_at("read directory", dir, e))?
            .is_dir();
        if !(is_dir && prune_empty(&entry.path())?) {
            empty = false;
        }
    }
    if empty {
        fs::remove_dir(dir).map_err(|e| GitError::io_at("remove directory", dir, e))?;
    }
    Ok(empty)
}

impl GitRepo {
    pub fn workdir(&self) -> Result<&Path> {
        self.repo()
            .workdir()
            .ok_or_else(|| GitError::Invalid("Repository has no working tree".to_string()))
    }

    /// Revert the given paths to their HEAD state.
    ///
    /// Paths are relative to the working tree; absolute paths and `..`
    /// components are rejected before anything is touched. Changes under a
    /// path are unstaged, untracked files beneath it are deleted and tracked
    /// files are checked out from HEAD. Directories left empty are removed.
    pub fn discard_changes(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            ensure_inside_workdir(path)?;
        }
        let paths: Vec<&String> = paths.iter().collect();

        self.unstage(&paths)?;

        // Unstaged new files show up as untracked from here on
        let status = self.status()?;
        let untracked: Vec<&String> = status
            .untracked
            .iter()
            .filter(|file| paths.iter().any(|path| is_under(file, path)))
            .collect();
        for file in &untracked {
            self.remove_worktree_path(file)?;
        }

        let restored = self.checkout_from_head(&paths)?;
        for path in &paths {
            self.remove_empty_dirs(path)?;
        }

        info!(
            restored,
            untracked = untracked.len(),
            "discarded working tree changes"
        );
        Ok(())
    }

    fn unstage(&self, paths: &[&String]) -> Result<()> {
        if !self.has_commits() {
            let mut index = self.repo().index().git_context("Failed to get repository index")?;
            for path in paths {
                index
                    .remove_all([path.as_str()], None)
                    .git_context(format!("Failed to unstage '{path}'"))?;
            }
            index.write().git_context("Failed to write index")?;
            return Ok(());
        }

        let head = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel(ObjectType::Commit)
            .git_context("Failed to peel HEAD to commit")?;
        self.repo()
            .reset_default(Some(&head), paths.iter().map(|p| p.as_str()))
            .git_context("Failed to unstage paths")?;
        Ok(())
    }

    /// Force-checkout the paths that exist in HEAD. Returns how many did.
    fn checkout_from_head(&self, paths: &[&String]) -> Result<usize> {
        if !self.has_commits() {
            return Ok(0);
        }

        let head_tree = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel_to_tree()
            .git_context("Failed to get HEAD tree")?;

        let in_head: Vec<&&String> = paths
            .iter()
            .filter(|path| head_tree.get_path(Path::new(path.as_str())).is_ok())
            .collect();
        if in_head.is_empty() {
            return Ok(0);
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        for path in &in_head {
            checkout.path(path.as_str());
        }
        self.repo()
            .checkout_head(Some(&mut checkout))
            .git_context("Failed to check out paths from HEAD")?;
        Ok(in_head.len())
    }

    /// Remove `path` and the directories below it that hold no files.
    fn remove_empty_dirs(&self, path: &str) -> Result<()> {
        let full_path = self.workdir()?.join(path);
        let is_dir = fs::symlink_metadata(&full_path).is_ok_and(|meta| meta.is_dir());
        if is_dir {
            prune_empty(&full_path)?;
        }
        Ok(())
    }

    /// Delete every untracked file from the working tree.
    pub fn clean_untracked(&self) -> Result<usize> {
        let status = self.status()?;
        for path in &status.untracked {
            self.remove_worktree_path(path)?;
        }
        Ok(status.untracked.len())
    }

    /// Reset index and working tree to HEAD.
    pub fn reset_hard(&self) -> Result<()> {
        let head = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel(ObjectType::Commit)
            .git_context("Failed to peel HEAD to commit")?;

        self.repo()
            .reset(&head, ResetType::Hard, None)
            .git_context("Failed to hard reset to HEAD")?;
        Ok(())
    }

    fn remove_worktree_path(&self, path: &str) -> Result<()> {
        let full_path = self.workdir()?.join(path);
        if full_path.is_dir() {
            fs::remove_dir_all(&full_path)
                .map_err(|e| GitError::io_at("remove directory", &full_path, e))?;
        } else if full_path.exists() {
            fs::remove_file(&full_path).map_err(|e| GitError::io_at("remove file", &full_path, e))?;
        }
        debug!(path, "removed from working tree");
        Ok(())
    }
}
