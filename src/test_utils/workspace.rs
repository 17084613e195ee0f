use std::sync::Arc;

use crate::config::{Config, StashConflictPolicy};
use crate::git::GitRepo;
use crate::refresh::RecordingRefresher;
use crate::session::{ProjectSession, Workspace};
use crate::store::{JsonRecordStore, UserCredentials};

/// Acting user of every fixture session.
pub const TEST_USER: &str = "admin";

/// A workspace rooted in a temporary data directory, recording refresh events.
pub struct TestWorkspace {
    pub temp_dir: assert_fs::TempDir,
    pub workspace: Workspace,
    pub refresher: Arc<RecordingRefresher>,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::with_policy(StashConflictPolicy::default())
    }

    pub fn with_policy(policy: StashConflictPolicy) -> Self {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let config = Config {
            stash_conflict_policy: policy,
            ..Config::with_data_dir(temp_dir.path().join("data"))
        };
        let store = JsonRecordStore::new(config.records_path());
        let refresher = Arc::new(RecordingRefresher::default());
        let workspace = Workspace::new(config, Arc::new(store)).with_refresher(refresher.clone());

        Self {
            temp_dir,
            workspace,
            refresher,
        }
    }

    pub fn session(&self, project: &str) -> ProjectSession<'_> {
        self.workspace.session(project, TEST_USER)
    }

    /// Register a local-only project as [`TEST_USER`].
    pub fn local_project(&self, project: &str) -> ProjectSession<'_> {
        let session = self.session(project);
        session.initialize_local_project("admin@example.com").unwrap();
        session
    }

    /// Register a project cloned from `remote`, a repository on disk.
    pub fn remote_project(&self, project: &str, remote: &GitRepo) -> ProjectSession<'_> {
        let session = self.session(project);
        let credentials = UserCredentials {
            email: "admin@example.com".to_string(),
            git_username: "admin".to_string(),
            ..UserCredentials::default()
        };
        session
            .initialize_project(remote.path().to_str().unwrap(), &credentials)
            .unwrap();
        session
    }

    /// A separate handle on a project's working copy.
    pub fn project_repo(&self, project: &str) -> GitRepo {
        GitRepo::open(self.workspace.config().project_path(project)).unwrap()
    }
}
