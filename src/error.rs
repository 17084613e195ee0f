//! Error taxonomy for the git orchestration core.
//!
//! Every fallible core operation returns [`Result`], so callers can match on the
//! failure case instead of parsing a message. Engine errors are wrapped through
//! [`ResultExt::git_context`], which keeps the `anyhow`-style "Failed to ..."
//! context and sorts network failures into [`GitError::Transport`].

use std::fmt;
use std::path::Path;

use git2::{ErrorClass, ErrorCode};
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

pub type Result<T, E = GitError> = std::result::Result<T, E>;

/// Why the remote refused a reference update during push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    NonFastForward,
    NoDelete,
    RemoteChanged,
    Other,
}

impl RejectionKind {
    /// Classify the status string a remote reports for a rejected ref.
    pub fn from_remote_status(status: &str) -> Self {
        let status = status.to_ascii_lowercase();
        if status.contains("non-fast-forward")
            || status.contains("fetch first")
            || status.contains("not fast-forward")
        {
            RejectionKind::NonFastForward
        } else if status.contains("deletion prohibited") || status.contains("delete") {
            RejectionKind::NoDelete
        } else if status.contains("stale info") || status.contains("changed") {
            RejectionKind::RemoteChanged
        } else {
            RejectionKind::Other
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RejectionKind::NonFastForward => "REJECTED_NONFASTFORWARD",
            RejectionKind::NoDelete => "REJECTED_NODELETE",
            RejectionKind::RemoteChanged => "REJECTED_REMOTE_CHANGED",
            RejectionKind::Other => "REJECTED_OTHER_REASON",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git project '{project}' is not configured")]
    RepositoryNotConfigured { project: String },

    #[error("git user '{user}' is not configured for project '{project}'")]
    UserNotConfigured { project: String, user: String },

    #[error("no remote '{remote}' configured for project '{project}'; add a remote first")]
    NoRemoteConfigured { project: String, remote: String },

    #[error("project '{project}' is already registered")]
    AlreadyRegistered { project: String },

    #[error("{kind}: {message}")]
    RemoteRejected { kind: RejectionKind, message: String },

    #[error("stashed changes for branch '{branch}' conflict with the checked out tree")]
    StashApplyConflict { branch: String },

    #[error("cannot delete the currently checked out branch: {branch}")]
    CurrentBranchDeleteAttempt { branch: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: git2::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Git {
        context: String,
        #[source]
        source: git2::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GitError {
    /// Wrap an engine error, routing network and authentication failures to
    /// [`GitError::Transport`].
    pub fn from_git(context: impl Into<String>, source: git2::Error) -> Self {
        let context = context.into();
        if is_transport_error(&source) {
            GitError::Transport { context, source }
        } else {
            GitError::Git { context, source }
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        GitError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        GitError::io(format!("Failed to {action} '{}'", path.display()), source)
    }

    pub fn is_non_fast_forward(&self) -> bool {
        matches!(
            self,
            GitError::RemoteRejected {
                kind: RejectionKind::NonFastForward,
                ..
            }
        )
    }

    /// The underlying engine error code, if this wraps one.
    pub fn git_code(&self) -> Option<ErrorCode> {
        match self {
            GitError::Git { source, .. } | GitError::Transport { source, .. } => {
                Some(source.code())
            }
            _ => None,
        }
    }
}

fn is_transport_error(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::Auth | ErrorCode::Certificate)
        || matches!(
            err.class(),
            ErrorClass::Net
                | ErrorClass::Ssh
                | ErrorClass::Http
                | ErrorClass::Ssl
                | ErrorClass::Callback
        )
}

/// `.git_context("Failed to ...")` for engine and filesystem results.
pub trait ResultExt<T> {
    fn git_context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, git2::Error> {
    fn git_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|source| GitError::from_git(context, source))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn git_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|source| GitError::io(context, source))
    }
}
