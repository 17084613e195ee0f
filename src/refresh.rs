//! Host notification after the working copy changes under the host's feet.

use std::fmt;
use std::sync::Mutex;

/// What changed the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// A branch was checked out.
    Checkout { branch: String },
    /// A pull merged remote work. The flags say which host-side assets the
    /// caller asked to import along with the project.
    Pull {
        import_tags: bool,
        import_theme: bool,
        import_images: bool,
    },
    /// Working tree changes were discarded.
    Discard { paths: Vec<String> },
    /// A registration checked out content from a remote.
    Initialized,
}

impl fmt::Display for RepositoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryEvent::Checkout { branch } => write!(f, "checkout of '{branch}'"),
            RepositoryEvent::Pull { .. } => f.write_str("pull"),
            RepositoryEvent::Discard { paths } => write!(f, "discard of {} path(s)", paths.len()),
            RepositoryEvent::Initialized => f.write_str("initialization"),
        }
    }
}

/// Implemented by the host to reload a project after its files changed.
pub trait WorkspaceRefresher: Send + Sync {
    fn on_repository_state_changed(&self, project: &str, event: &RepositoryEvent);
}

/// Refresher for hosts that watch the filesystem themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresher;

impl WorkspaceRefresher for NoopRefresher {
    fn on_repository_state_changed(&self, _project: &str, _event: &RepositoryEvent) {}
}

/// Refresher that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingRefresher {
    events: Mutex<Vec<(String, RepositoryEvent)>>,
}

impl RecordingRefresher {
    pub fn events(&self) -> Vec<(String, RepositoryEvent)> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl WorkspaceRefresher for RecordingRefresher {
    fn on_repository_state_changed(&self, project: &str, event: &RepositoryEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((project.to_string(), event.clone()));
    }
}
