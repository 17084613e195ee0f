//! Per-project, per-user entry points.
//!
//! A [`Workspace`] owns everything shared between projects: configuration,
//! the record store, the repository locks and the host refresher. A
//! [`ProjectSession`] binds it to one project and one acting user; every
//! operation callers can invoke is a method on the session.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diff::{change_rows, ChangeRow};
use crate::error::{GitError, Result};
use crate::git::auth::{CredentialResolver, TransportAuth};
use crate::git::branches::{BranchSwitcher, SwitchOutcome};
use crate::git::commits::CommitInfo;
use crate::git::merge::MergeOutcome;
use crate::git::remotes::PushRequest;
use crate::git::{GitRepo, RemoteInfo};
use crate::locks::RepoLocks;
use crate::refresh::{NoopRefresher, RepositoryEvent, WorkspaceRefresher};
use crate::registrar::ProjectRegistrar;
use crate::store::{
    JsonRecordStore, RecordStore, RemoteCredentialRecord, UserCredentialRecord, UserCredentials,
};

pub struct Workspace {
    config: Config,
    store: Arc<dyn RecordStore>,
    locks: RepoLocks,
    refresher: Arc<dyn WorkspaceRefresher>,
}

impl Workspace {
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            store,
            locks: RepoLocks::new(),
            refresher: Arc::new(NoopRefresher),
        }
    }

    /// Workspace backed by the JSON record store under the configured data
    /// directory.
    pub fn open(config: Config) -> Self {
        let store = JsonRecordStore::new(config.records_path());
        Self::new(config, Arc::new(store))
    }

    pub fn with_refresher(mut self, refresher: Arc<dyn WorkspaceRefresher>) -> Self {
        self.refresher = refresher;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn locks(&self) -> &RepoLocks {
        &self.locks
    }

    pub(crate) fn notify(&self, project: &str, event: RepositoryEvent) {
        debug!(project, %event, "notifying host of repository change");
        self.refresher.on_repository_state_changed(project, &event);
    }

    pub fn session(&self, project: &str, user: &str) -> ProjectSession<'_> {
        ProjectSession {
            workspace: self,
            project: project.to_string(),
            user: user.to_string(),
        }
    }
}

/// One row of the commit history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRow {
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
    /// Decorating branch names, comma separated.
    pub refs: String,
}

impl From<CommitInfo> for CommitRow {
    fn from(commit: CommitInfo) -> Self {
        Self {
            hash: commit.hash,
            short_hash: commit.short_hash,
            author: commit.author,
            date: commit.date,
            message: commit.message,
            refs: commit.refs.join(", "),
        }
    }
}

pub struct ProjectSession<'w> {
    workspace: &'w Workspace,
    project: String,
    user: String,
}

impl<'w> ProjectSession<'w> {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Working copy of the project.
    pub fn path(&self) -> PathBuf {
        self.workspace.config.project_path(&self.project)
    }

    fn resolver(&self) -> CredentialResolver<'_> {
        CredentialResolver::new(self.workspace.store(), &self.project, &self.user)
    }

    fn prefixes(&self) -> &[String] {
        &self.workspace.config.resource_prefixes
    }

    fn open_repo(&self) -> Result<GitRepo> {
        self.resolver().repository()?;
        GitRepo::open(self.path())
    }

    fn read<T>(&self, f: impl FnOnce(&GitRepo) -> Result<T>) -> Result<T> {
        let path = self.path();
        self.workspace.locks.with_read(&path, || {
            let repo = self.open_repo()?;
            f(&repo)
        })
    }

    fn write<T>(&self, f: impl FnOnce(&mut GitRepo) -> Result<T>) -> Result<T> {
        let path = self.path();
        self.workspace.locks.with_write(&path, || {
            let mut repo = self.open_repo()?;
            f(&mut repo)
        })
    }

    fn remote_auth(&self, repo: &GitRepo, remote: &str) -> Result<TransportAuth> {
        if !repo.has_remote(remote) {
            return Err(GitError::NoRemoteConfigured {
                project: self.project.clone(),
                remote: remote.to_string(),
            });
        }
        let url = repo.remote_url(remote)?;
        self.resolver().resolve_for_remote(remote, &url)
    }

    fn user_record(&self) -> Result<UserCredentialRecord> {
        let (_, user) = self.resolver().user_credential()?;
        Ok(user)
    }

    // ===================== Transport ==================

    /// Fetch and merge the current branch from the default remote.
    ///
    /// The import flags are handed to the host refresher, which decides what
    /// to reload besides the project itself.
    pub fn pull(
        &self,
        import_tags: bool,
        import_theme: bool,
        import_images: bool,
    ) -> Result<MergeOutcome> {
        let remote = self.workspace.config.default_remote.as_str();
        let user = self.user_record()?;

        let outcome = self.write(|repo| {
            let auth = self.remote_auth(repo, remote)?;
            repo.pull(remote, &auth, &user.email)
        })?;

        info!(project = %self.project, %outcome, "pulled");
        self.workspace.notify(
            &self.project,
            RepositoryEvent::Pull {
                import_tags,
                import_theme,
                import_images,
            },
        );
        Ok(outcome)
    }

    pub fn fetch(&self, remote: &str) -> Result<String> {
        self.write(|repo| {
            let auth = self.remote_auth(repo, remote)?;
            repo.fetch(remote, &auth)
        })
    }

    /// Push to `remote`. A non-fast-forward rejection is reported as
    /// [`GitError::RemoteRejected`]; callers retry with `force` explicitly.
    pub fn push(
        &self,
        remote: &str,
        all_branches: bool,
        tags: bool,
        force: bool,
    ) -> Result<Vec<String>> {
        self.write(|repo| {
            let auth = self.remote_auth(repo, remote)?;
            repo.push(
                remote,
                &auth,
                PushRequest {
                    all_branches,
                    tags,
                    force,
                },
            )
        })
    }

    // ===================== Working tree ==================

    /// Stage `paths` and commit them as the acting user.
    pub fn commit(&self, paths: &[String], message: &str, amend: bool) -> Result<bool> {
        let user = self.user_record()?;
        self.write(|repo| repo.commit(paths, message, amend, &user.email))?;
        Ok(true)
    }

    pub fn uncommitted_changes(&self) -> Result<Vec<ChangeRow>> {
        self.read(|repo| {
            let status = repo.status()?;
            Ok(change_rows(&status, repo.workdir()?, self.prefixes()))
        })
    }

    pub fn discard_changes(&self, paths: &[String]) -> Result<bool> {
        self.write(|repo| repo.discard_changes(paths))?;
        self.workspace.notify(
            &self.project,
            RepositoryEvent::Discard {
                paths: paths.to_vec(),
            },
        );
        Ok(true)
    }

    // ===================== Branches ==================

    pub fn current_branch(&self) -> Result<String> {
        self.read(|repo| repo.current_branch())
    }

    pub fn local_branches(&self) -> Result<Vec<String>> {
        self.read(|repo| repo.local_branches())
    }

    pub fn remote_branches(&self) -> Result<Vec<String>> {
        self.read(|repo| repo.remote_branches())
    }

    pub fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<()> {
        self.write(|repo| repo.create_branch(name, start_point))
    }

    /// Switch branches, carrying uncommitted work through auto-stashes.
    pub fn checkout_branch(&self, name: &str) -> Result<SwitchOutcome> {
        let policy = self.workspace.config.stash_conflict_policy;
        let result = self.write(|repo| BranchSwitcher::new(repo, policy).checkout(name));

        let changed = match &result {
            Ok(outcome) => {
                if outcome.lost_changes() {
                    warn!(
                        project = %self.project,
                        branch = name,
                        "stashed changes conflicted with the branch and were discarded"
                    );
                }
                true
            }
            // The branch is checked out even though its stash stayed behind
            Err(GitError::StashApplyConflict { .. }) => true,
            Err(_) => false,
        };

        if changed {
            self.workspace.notify(
                &self.project,
                RepositoryEvent::Checkout {
                    branch: name.to_string(),
                },
            );
        }
        result
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.write(|repo| repo.delete_branch(name))
    }

    // ===================== Registration & credentials ==================

    pub fn is_project_registered(&self) -> Result<bool> {
        Ok(self.workspace.store().find_repository(&self.project)?.is_some())
    }

    /// Whether the acting user has credentials on this project.
    pub fn is_registered_user(&self) -> Result<bool> {
        match self.resolver().user_credential() {
            Ok(_) => Ok(true),
            Err(GitError::RepositoryNotConfigured { .. } | GitError::UserNotConfigured { .. }) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub fn initialize_project(&self, remote_uri: &str, credentials: &UserCredentials) -> Result<()> {
        ProjectRegistrar::new(self.workspace).initialize_project(
            &self.project,
            remote_uri,
            &self.user,
            credentials,
        )
    }

    pub fn initialize_local_project(&self, email: &str) -> Result<()> {
        ProjectRegistrar::new(self.workspace).initialize_local_project(
            &self.project,
            &self.user,
            email,
        )
    }

    pub fn is_ssh_authentication(&self) -> Result<bool> {
        Ok(self.resolver().repository()?.auth_mode().is_ssh())
    }

    /// Create or update the acting user's credentials. Blank password or key
    /// keep the stored value.
    pub fn save_user_credentials(&self, credentials: &UserCredentials) -> Result<()> {
        let repository = self.resolver().repository()?;
        let store = self.workspace.store();

        let mut record = store
            .find_user(repository.id, &self.user)?
            .unwrap_or_else(|| UserCredentialRecord::new(repository.id, &self.user));
        record.apply_update(credentials);
        store.save_user(record)?;

        info!(project = %self.project, user = %self.user, "saved user credentials");
        Ok(())
    }

    pub fn user_email(&self) -> Result<String> {
        Ok(self.user_record()?.email)
    }

    pub fn user_git_username(&self) -> Result<String> {
        Ok(self.user_record()?.git_username)
    }

    // ===================== History & diffs ==================

    pub fn resource_diff(&self, path: &str) -> Result<(String, String)> {
        self.read(|repo| repo.resource_diff(path, self.prefixes()))
    }

    /// Commits newest first with their parents, for graph layout.
    pub fn commit_log(&self, skip: usize, limit: usize) -> Result<Vec<CommitInfo>> {
        self.read(|repo| repo.log(skip, limit))
    }

    pub fn commit_history(&self, skip: usize, limit: usize) -> Result<Vec<CommitRow>> {
        let log = self.commit_log(skip, limit)?;
        Ok(log.into_iter().map(CommitRow::from).collect())
    }

    pub fn commit_files(&self, hash: &str) -> Result<Vec<String>> {
        self.read(|repo| repo.commit_files(hash))
    }

    pub fn commit_file_diff(&self, hash: &str, path: &str) -> Result<(String, String)> {
        self.read(|repo| repo.commit_file_diff(hash, path))
    }

    // ===================== Remotes ==================

    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        self.read(|repo| repo.list_remotes())
    }

    /// Add a remote. Adding the default remote also makes it the project's
    /// registered URI.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.write(|repo| repo.add_remote(name, url))?;
        if name == self.workspace.config.default_remote {
            self.set_registered_uri(url)?;
        }
        Ok(())
    }

    /// Remove a remote along with the acting user's credentials for it.
    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.write(|repo| repo.remove_remote(name))?;

        let repository = self.resolver().repository()?;
        let store = self.workspace.store();
        if let Some(credential) = store.find_remote_credential(repository.id, &self.user, name)? {
            store.delete_remote_credential(credential.id)?;
        }
        if name == self.workspace.config.default_remote {
            self.set_registered_uri("")?;
        }
        Ok(())
    }

    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<()> {
        self.write(|repo| repo.set_remote_url(name, url))?;
        if name == self.workspace.config.default_remote {
            self.set_registered_uri(url)?;
        }
        Ok(())
    }

    /// Store credentials the acting user uses for one named remote only.
    pub fn save_remote_credentials(
        &self,
        remote: &str,
        git_username: &str,
        password: &str,
        ssh_key: &str,
    ) -> Result<()> {
        let repository = self.resolver().repository()?;
        let store = self.workspace.store();

        let mut record = store
            .find_remote_credential(repository.id, &self.user, remote)?
            .unwrap_or_else(|| RemoteCredentialRecord {
                project_id: repository.id,
                user: self.user.clone(),
                remote_name: remote.to_string(),
                ..RemoteCredentialRecord::default()
            });
        record.git_username = git_username.to_string();
        if !password.is_empty() {
            record.password = password.to_string();
        }
        if !ssh_key.is_empty() {
            record.ssh_key = ssh_key.to_string();
        }
        store.save_remote_credential(record)?;

        info!(project = %self.project, remote, "saved remote credentials");
        Ok(())
    }

    fn set_registered_uri(&self, uri: &str) -> Result<()> {
        let mut repository = self.resolver().repository()?;
        repository.uri = uri.to_string();
        self.workspace.store().update_repository(&repository)?;
        Ok(())
    }

    /// Browsable https address of the registered remote, "" when local-only.
    pub fn repo_url(&self) -> Result<String> {
        Ok(self.resolver().repository()?.browse_url())
    }

    pub fn has_remote_repository(&self) -> Result<bool> {
        Ok(self.resolver().repository()?.has_remote())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::StashConflictPolicy,
        diff::ChangeKind,
        error::GitError,
        git::{branches::RestoreOutcome, merge::MergeOutcome},
        refresh::RepositoryEvent,
        store::UserCredentials,
        test_utils::{
            create_test_bare_repo, create_test_repo, RepoAssertions, RepoTestOperations,
            TestWorkspace, TEST_USER,
        },
    };

    #[test]
    fn operations_on_unregistered_project_fail() {
        let fixture = TestWorkspace::new();
        let session = fixture.session("ghost");

        assert!(!session.is_project_registered().unwrap());
        assert!(!session.is_registered_user().unwrap());
        assert!(matches!(
            session.current_branch(),
            Err(GitError::RepositoryNotConfigured { .. })
        ));
        assert!(matches!(
            session.commit(&[], "Nothing", false),
            Err(GitError::RepositoryNotConfigured { .. })
        ));
    }

    #[test]
    fn commit_uses_the_acting_users_email() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        let repo = fixture.project_repo("plant");
        repo.add_file("notes.txt", "first")?;

        assert!(session.commit(&["notes.txt".to_string()], "Add notes", false)?);

        let history = session.commit_history(0, 10)?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "Add notes");
        assert_eq!(history[0].author, "admin@example.com");
        assert_eq!(history[0].short_hash.len(), 7);
        assert_eq!(history[0].refs, "master");
        Ok(())
    }

    #[test]
    fn uncommitted_changes_are_reported_as_rows() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        let repo = fixture.project_repo("plant");
        repo.add_file_and_commit("tracked.txt", "v1", "Add tracked")?;
        repo.add_file("tracked.txt", "v2")?.add_file(
            "com.inductiveautomation.perspective/views/Main/view.json",
            "{}",
        )?;

        let rows = session.uncommitted_changes()?;

        let summary: Vec<(&str, ChangeKind)> =
            rows.iter().map(|r| (r.resource.as_str(), r.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("tracked.txt", ChangeKind::Uncommitted),
                (
                    "com.inductiveautomation.perspective/views/Main",
                    ChangeKind::Created
                ),
            ]
        );
        Ok(())
    }

    #[test]
    fn discard_restores_and_notifies() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        let repo = fixture.project_repo("plant");
        repo.add_file_and_commit("tracked.txt", "v1", "Add tracked")?;
        repo.add_file("tracked.txt", "v2")?.add_file("scratch.txt", "tmp")?;

        session.discard_changes(&["tracked.txt".to_string(), "scratch.txt".to_string()])?;

        assert!(session.uncommitted_changes()?.is_empty());
        repo.assert_file_not_exists("scratch.txt");
        assert_eq!(std::fs::read_to_string(repo.path().join("tracked.txt"))?, "v1");
        assert!(matches!(
            fixture.refresher.events().last(),
            Some((project, RepositoryEvent::Discard { paths })) if project == "plant" && paths.len() == 2
        ));
        Ok(())
    }

    #[test]
    fn branch_operations_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        let repo = fixture.project_repo("plant");
        repo.add_file_and_commit("shared.txt", "base\n", "Add shared")?;

        session.create_branch("feature", None)?;
        assert_eq!(session.local_branches()?, vec!["feature", "master"]);

        repo.add_file("shared.txt", "work in progress\n")?;
        let outcome = session.checkout_branch("feature")?;
        assert!(outcome.stashed);
        assert_eq!(session.current_branch()?, "feature");

        let back = session.checkout_branch("master")?;
        assert_eq!(back.restore, RestoreOutcome::Restored);
        assert_eq!(
            std::fs::read_to_string(repo.path().join("shared.txt"))?,
            "work in progress\n"
        );

        assert!(matches!(
            session.delete_branch("master"),
            Err(GitError::CurrentBranchDeleteAttempt { .. })
        ));
        session.delete_branch("feature")?;
        assert_eq!(session.local_branches()?, vec!["master"]);

        let checkouts = fixture
            .refresher
            .events()
            .into_iter()
            .filter(|(_, e)| matches!(e, RepositoryEvent::Checkout { .. }))
            .count();
        assert_eq!(checkouts, 2);
        Ok(())
    }

    #[test]
    fn keep_policy_reports_conflict_and_keeps_stash() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::with_policy(StashConflictPolicy::Keep);
        let session = fixture.local_project("plant");
        let mut repo = fixture.project_repo("plant");
        repo.add_file_and_commit("base.txt", "base\n", "Add base")?;
        session.create_branch("b", None)?;

        // Stash an edit on master, then move master under it
        repo.add_file("base.txt", "master edit\n")?;
        session.checkout_branch("b")?;
        repo.add_file_and_commit("base.txt", "b version\n", "Edit on b")?;
        let b_head = repo.repo().head()?.peel_to_commit()?.id();
        repo.repo()
            .reference("refs/heads/master", b_head, true, "move master")?;

        let result = session.checkout_branch("master");

        assert!(matches!(result, Err(GitError::StashApplyConflict { .. })));
        repo.assert_current_branch("master");
        assert_eq!(repo.list_stashes()?.len(), 1);
        Ok(())
    }

    #[test]
    fn credentials_are_updated_partially() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        assert_eq!(session.user_git_username()?, TEST_USER);

        session.save_user_credentials(&UserCredentials {
            email: "ops@example.com".to_string(),
            git_username: "ops".to_string(),
            password: "s3cret".to_string(),
            ssh_key: String::new(),
        })?;
        session.save_user_credentials(&UserCredentials {
            email: "ops@example.com".to_string(),
            git_username: "ops-bot".to_string(),
            ..UserCredentials::default()
        })?;

        assert_eq!(session.user_email()?, "ops@example.com");
        assert_eq!(session.user_git_username()?, "ops-bot");
        let repository = fixture.workspace.store().find_repository("plant")?.unwrap();
        let user = fixture
            .workspace
            .store()
            .find_user(repository.id, TEST_USER)?
            .unwrap();
        assert_eq!(user.password, "s3cret");
        Ok(())
    }

    #[test]
    fn credentials_for_a_new_user_are_created() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        fixture.local_project("plant");
        let operator = fixture.workspace.session("plant", "operator");
        assert!(!operator.is_registered_user()?);

        operator.save_user_credentials(&UserCredentials {
            email: "operator@example.com".to_string(),
            git_username: "operator".to_string(),
            ..UserCredentials::default()
        })?;

        assert!(operator.is_registered_user()?);
        assert_eq!(operator.user_email()?, "operator@example.com");
        Ok(())
    }

    #[test]
    fn pull_and_push_require_a_remote() {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");

        assert!(!session.has_remote_repository().unwrap());
        assert_eq!(session.repo_url().unwrap(), "");
        assert!(matches!(
            session.pull(false, false, false),
            Err(GitError::NoRemoteConfigured { .. })
        ));
        assert!(matches!(
            session.push("origin", false, false, false),
            Err(GitError::NoRemoteConfigured { .. })
        ));
    }

    #[test]
    fn default_remote_updates_registration() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");

        session.add_remote("origin", "git@github.com:acme/plant.git")?;
        session.add_remote("mirror", "https://mirror.local/plant.git")?;
        session.save_remote_credentials("mirror", "bot", "token", "")?;

        assert!(session.has_remote_repository()?);
        assert!(session.is_ssh_authentication()?);
        assert_eq!(session.repo_url()?, "https://github.com/acme/plant");
        assert_eq!(session.list_remotes()?.len(), 2);

        session.set_remote_url("origin", "https://github.com/acme/plant.git")?;
        assert!(!session.is_ssh_authentication()?);

        session.remove_remote("mirror")?;
        let repository = fixture.workspace.store().find_repository("plant")?.unwrap();
        assert!(fixture
            .workspace
            .store()
            .find_remote_credential(repository.id, TEST_USER, "mirror")?
            .is_none());

        session.remove_remote("origin")?;
        assert!(!session.has_remote_repository()?);
        Ok(())
    }

    #[test]
    fn pull_merges_remote_work_and_notifies() -> Result<(), Box<dyn std::error::Error>> {
        let (_remote_dir, remote) = create_test_bare_repo();
        let (_seed_dir, seed) = create_test_repo();
        seed.add_file_and_commit("README.md", "v1", "Initial commit")?
            .add_local_remote("origin", &remote)?;
        seed.push("origin", &crate::git::auth::TransportAuth::Anonymous, Default::default())?;

        let fixture = TestWorkspace::new();
        let session = fixture.remote_project("plant", &remote);

        seed.add_file_and_commit("README.md", "v2", "Update readme")?;
        seed.push("origin", &crate::git::auth::TransportAuth::Anonymous, Default::default())?;

        let outcome = session.pull(true, false, true)?;

        assert!(matches!(outcome, MergeOutcome::FastForward(_)));
        assert_eq!(
            std::fs::read_to_string(session.path().join("README.md"))?,
            "v2"
        );
        assert!(matches!(
            fixture.refresher.events().last(),
            Some((_, RepositoryEvent::Pull { import_tags: true, import_theme: false, import_images: true }))
        ));
        Ok(())
    }

    #[test]
    fn diverged_push_is_rejected_until_forced() -> Result<(), Box<dyn std::error::Error>> {
        let (_remote_dir, remote) = create_test_bare_repo();
        let (_seed_dir, seed) = create_test_repo();
        seed.add_file_and_commit("README.md", "v1", "Initial commit")?
            .add_local_remote("origin", &remote)?;
        seed.push("origin", &crate::git::auth::TransportAuth::Anonymous, Default::default())?;

        let fixture = TestWorkspace::new();
        let session = fixture.remote_project("plant", &remote);

        seed.add_file_and_commit("README.md", "upstream", "Upstream change")?;
        seed.push("origin", &crate::git::auth::TransportAuth::Anonymous, Default::default())?;

        let repo = fixture.project_repo("plant");
        repo.add_file("README.md", "local")?;
        session.commit(&["README.md".to_string()], "Local change", false)?;

        let rejected = session.push("origin", false, false, false);
        assert!(matches!(&rejected, Err(e) if e.is_non_fast_forward()));

        session.push("origin", false, false, true)?;
        let local_head = repo.repo().head()?.peel_to_commit()?.id();
        let remote_head = remote.repo().find_reference("refs/heads/master")?.peel_to_commit()?.id();
        assert_eq!(local_head, remote_head);
        Ok(())
    }

    #[test]
    fn resource_diff_and_commit_details() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = TestWorkspace::new();
        let session = fixture.local_project("plant");
        let repo = fixture.project_repo("plant");
        let view = "com.inductiveautomation.perspective/views/Main";
        repo.add_file(&format!("{view}/resource.json"), "{}")?
            .add_file_and_commit(&format!("{view}/view.json"), "old\n", "Add view")?;
        repo.add_file(&format!("{view}/view.json"), "new\n")?;

        let (old, new) = session.resource_diff(view)?;
        assert_eq!((old.as_str(), new.as_str()), ("old\n", "new\n"));

        let history = session.commit_history(0, 1)?;
        let head = &history[0];
        assert_eq!(
            session.commit_files(&head.hash)?,
            vec![format!("ADD:{view}/view.json")]
        );
        let (before, after) = session.commit_file_diff(&head.hash, &format!("{view}/view.json"))?;
        assert_eq!(before, "");
        assert_eq!(after, "old\n");
        Ok(())
    }
}
