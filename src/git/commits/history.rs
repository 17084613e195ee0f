use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, TimeZone};
use git2::{BranchType, Commit, Delta, Oid, Sort, Tree};
use tracing::debug;

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

pub const SHORT_HASH_LEN: usize = 7;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    /// Author name, or the email for nameless authors.
    pub author: String,
    pub date: String,
    /// Summary line of the message.
    pub message: String,
    pub parents: Vec<String>,
    /// Local and remote branches pointing at this commit, prefix stripped.
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
}

impl ChangeType {
    fn from_delta(delta: Delta) -> Option<Self> {
        match delta {
            Delta::Added => Some(ChangeType::Add),
            Delta::Modified | Delta::Typechange => Some(ChangeType::Modify),
            Delta::Deleted => Some(ChangeType::Delete),
            Delta::Renamed => Some(ChangeType::Rename),
            Delta::Copied => Some(ChangeType::Copy),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeType::Add => "ADD",
            ChangeType::Modify => "MODIFY",
            ChangeType::Delete => "DELETE",
            ChangeType::Rename => "RENAME",
            ChangeType::Copy => "COPY",
        };
        f.write_str(name)
    }
}

impl GitRepo {
    /// Commits reachable from HEAD, newest first, after skipping `skip`.
    pub fn log(&self, skip: usize, limit: usize) -> Result<Vec<CommitInfo>> {
        if !self.has_commits() {
            return Ok(Vec::new());
        }

        let decorations = self.ref_decorations()?;

        let mut revwalk = self.repo().revwalk().git_context("Failed to create revwalk")?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .git_context("Failed to set sorting")?;
        revwalk.push_head().git_context("Failed to push HEAD")?;

        let mut commits = Vec::new();
        for oid in revwalk.skip(skip).take(limit) {
            let oid = oid.git_context("Failed to get commit OID")?;
            let commit = self
                .repo()
                .find_commit(oid)
                .git_context("Failed to find commit")?;
            let refs = decorations.get(&oid).cloned().unwrap_or_default();
            commits.push(commit_info(&commit, refs));
        }

        debug!(skip, limit, returned = commits.len(), "read commit log");
        Ok(commits)
    }

    /// Map of commit id to the local and remote branch names pointing at it.
    /// Symbolic remote refs such as `origin/HEAD` decorate their target.
    fn ref_decorations(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut decorations: HashMap<Oid, Vec<String>> = HashMap::new();

        for branch_type in [BranchType::Local, BranchType::Remote] {
            let branches = self
                .repo()
                .branches(Some(branch_type))
                .git_context("Failed to list branches")?;

            for branch in branches {
                let (branch, _) = branch.git_context("Failed to read branch")?;
                let Some(name) = branch.name().ok().flatten() else {
                    continue;
                };
                let Ok(commit) = branch.get().peel_to_commit() else {
                    continue;
                };
                decorations
                    .entry(commit.id())
                    .or_default()
                    .push(name.to_string());
            }
        }

        Ok(decorations)
    }

    /// Files touched by a commit relative to its first parent, formatted as
    /// `CHANGE_TYPE:path`.
    pub fn commit_files(&self, hash: &str) -> Result<Vec<String>> {
        let commit = self.find_commit_by_hash(hash)?;
        let new_tree = commit.tree().git_context("Failed to get commit tree")?;
        let old_tree = self.first_parent_tree(&commit)?;

        let diff = self
            .repo()
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)
            .git_context("Failed to diff commit against its parent")?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let Some(change) = ChangeType::from_delta(delta.status()) else {
                continue;
            };
            let file = if change == ChangeType::Delete {
                delta.old_file()
            } else {
                delta.new_file()
            };
            if let Some(path) = file.path() {
                files.push(format!("{change}:{}", path.display()));
            }
        }

        Ok(files)
    }

    /// Content of `path` at the commit's first parent and at the commit.
    /// A side where the file does not exist is an empty string.
    pub fn commit_file_diff(&self, hash: &str, path: &str) -> Result<(String, String)> {
        let commit = self.find_commit_by_hash(hash)?;
        let new_tree = commit.tree().git_context("Failed to get commit tree")?;
        let new_content = self.blob_text(&new_tree, path)?.unwrap_or_default();

        let old_content = match self.first_parent_tree(&commit)? {
            Some(tree) => self.blob_text(&tree, path)?.unwrap_or_default(),
            None => String::new(),
        };

        Ok((old_content, new_content))
    }

    /// Tree of the HEAD commit, or `None` before the first commit.
    pub fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        if !self.has_commits() {
            return Ok(None);
        }
        let tree = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel_to_tree()
            .git_context("Failed to get HEAD tree")?;
        Ok(Some(tree))
    }

    /// UTF-8 text of the blob at `path` in `tree`, if there is one.
    pub fn blob_text(&self, tree: &Tree<'_>, path: &str) -> Result<Option<String>> {
        let Ok(entry) = tree.get_path(Path::new(path)) else {
            return Ok(None);
        };
        let object = entry
            .to_object(self.repo())
            .git_context(format!("Failed to load '{path}'"))?;
        Ok(object
            .as_blob()
            .map(|blob| String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn find_commit_by_hash(&self, hash: &str) -> Result<Commit<'_>> {
        let object = self
            .repo()
            .revparse_single(hash)
            .map_err(|_| GitError::Invalid(format!("Unknown commit '{hash}'")))?;
        object
            .peel_to_commit()
            .git_context(format!("'{hash}' is not a commit"))
    }

    fn first_parent_tree(&self, commit: &Commit<'_>) -> Result<Option<Tree<'_>>> {
        if commit.parent_count() == 0 {
            return Ok(None);
        }
        let parent = commit.parent(0).git_context("Failed to find parent commit")?;
        let tree = parent.tree().git_context("Failed to get parent tree")?;
        // Rebind to the repository lifetime rather than the commit's
        let tree = self
            .repo()
            .find_tree(tree.id())
            .git_context("Failed to find parent tree")?;
        Ok(Some(tree))
    }
}

fn commit_info(commit: &Commit<'_>, refs: Vec<String>) -> CommitInfo {
    let hash = commit.id().to_string();
    let author = commit.author();
    let author_name = match author.name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => author.email().unwrap_or_default().to_string(),
    };

    CommitInfo {
        short_hash: hash.chars().take(SHORT_HASH_LEN).collect(),
        hash,
        author: author_name,
        date: format_git_time(&author.when()),
        message: commit.summary().unwrap_or_default().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        refs,
    }
}

/// Format a commit timestamp in its own UTC offset.
fn format_git_time(time: &git2::Time) -> String {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .or_else(|| FixedOffset::east_opt(0));
    let Some(offset) = offset else {
        return String::new();
    };
    let local: Option<DateTime<FixedOffset>> = offset.timestamp_opt(time.seconds(), 0).single();
    local
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
