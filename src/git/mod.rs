//! Git operations module
//!
//! This module provides a domain-driven structure for Git operations:
//!
//! - `repository`: Core repository operations (init, open, signatures, status, worktree)
//! - `auth`: Transport credentials and auth mode selection
//! - `branches`: Branch operations (create, checkout, list, tracking, auto-stash switching)
//! - `commits`: Commit operations (stage, commit, amend) and history
//! - `remotes`: Remote operations (add, push, fetch, pull)
//! - `merge`: Merge operations used by pull

pub mod auth;
pub mod branches;
pub mod commits;
pub mod merge;
pub mod remotes;
pub mod repository;

// Re-export the main types
pub use repository::core::{GitRepo, RemoteInfo};
