use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::info;

use crate::error::{GitError, Result, ResultExt};

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

pub struct GitRepo {
    path: PathBuf,
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            repo: Repository::open(path.as_ref()).git_context(format!(
                "Cannot open git repo at '{}'",
                path.as_ref().display()
            ))?,
        })
    }

    /// Whether `path` already holds a repository of its own.
    pub fn exists_at<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().join(".git").exists()
    }

    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        if Repository::open(path_ref).is_ok() {
            return Err(GitError::Invalid(format!(
                "Directory '{}' is already a git repository",
                path_ref.display()
            )));
        }

        std::fs::create_dir_all(path_ref)
            .map_err(|e| GitError::io_at("create project folder", path_ref, e))?;

        let repo = Repository::init(path_ref).git_context("Failed to initialize git repository")?;

        let git_repo = Self {
            path: path_ref.to_path_buf(),
            repo,
        };

        // The master branch is born with the first commit
        git_repo
            .repo
            .set_head("refs/heads/master")
            .git_context("Failed to set HEAD to master")?;

        info!(path = %path_ref.display(), "initialized repository");
        Ok(git_repo)
    }

    /// Initialize a new bare git repository
    pub fn init_bare<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        if Repository::open(path_ref).is_ok() {
            return Err(GitError::Invalid(format!(
                "Directory '{}' is already a git repository",
                path_ref.display()
            )));
        }

        let repo = Repository::init_bare(path_ref)
            .git_context("Failed to initialize bare git repository")?;

        let git_repo = Self {
            path: path_ref.to_path_buf(),
            repo,
        };

        git_repo
            .repo
            .set_head("refs/heads/master")
            .git_context("Failed to set HEAD to master")?;

        Ok(git_repo)
    }

    /// Turn off TLS certificate verification for HTTPS remotes. The
    /// transport callbacks in `git::auth` accept any certificate as well.
    pub fn disable_ssl_verification(&self) -> Result<()> {
        let mut config = self
            .repo
            .config()
            .git_context("Failed to get repository config")?;
        config
            .set_bool("http.sslVerify", false)
            .git_context("Failed to set http.sslVerify")?;
        Ok(())
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this is a bare repository
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// Whether HEAD points at a commit yet.
    pub fn has_commits(&self) -> bool {
        self.repo.head().ok().and_then(|h| h.target()).is_some()
    }

    /// Directory for this crate's own bookkeeping inside `.git`.
    pub(crate) fn metadata_dir(&self) -> PathBuf {
        self.repo.path().join("project-git")
    }

    /// Get access to the internal git2 Repository
    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    pub(crate) fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }
}
