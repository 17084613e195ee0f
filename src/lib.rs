//! Git integration for managed projects.
//!
//! Every project lives in its own working copy under the configured data
//! directory. Callers open a [`session::Workspace`], bind it to a project and
//! an acting user with [`session::Workspace::session`] and drive the
//! repository through the resulting [`session::ProjectSession`].

pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod graph;
pub mod locks;
pub mod refresh;
pub mod registrar;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{GitError, Result};
pub use session::{ProjectSession, Workspace};
