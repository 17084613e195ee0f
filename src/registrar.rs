//! Project registration: records first, repository second, records removed
//! again when the repository cannot be set up.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{GitError, Result};
use crate::git::auth::{AuthMode, CredentialResolver};
use crate::git::remotes::PushRequest;
use crate::git::GitRepo;
use crate::refresh::RepositoryEvent;
use crate::session::Workspace;
use crate::store::{RepositoryRecord, UserCredentialRecord, UserCredentials};

const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Branches checked out from a populated remote, in order of preference.
const PREFERRED_BRANCHES: [&str; 2] = ["master", "main"];

pub struct ProjectRegistrar<'w> {
    workspace: &'w Workspace,
}

impl<'w> ProjectRegistrar<'w> {
    pub fn new(workspace: &'w Workspace) -> Self {
        Self { workspace }
    }

    /// Register `project` against `remote_uri` and set up its working copy.
    ///
    /// Only the secret matching the URI's auth mode is stored: the password
    /// for https remotes, the SSH key otherwise.
    pub fn initialize_project(
        &self,
        project: &str,
        remote_uri: &str,
        user: &str,
        credentials: &UserCredentials,
    ) -> Result<()> {
        let mut record = UserCredentialRecord {
            email: credentials.email.clone(),
            git_username: credentials.git_username.clone(),
            ..UserCredentialRecord::default()
        };
        match AuthMode::from_url(remote_uri) {
            AuthMode::Https => record.password = credentials.password.clone(),
            AuthMode::Ssh | AuthMode::None => record.ssh_key = credentials.ssh_key.clone(),
        }

        self.register(project, remote_uri, user, record, |path| {
            self.setup_remote_repository(project, user, path)
        })
    }

    /// Register `project` without a remote: `git init` and commit whatever
    /// the project folder holds. The git username defaults to `user`.
    pub fn initialize_local_project(&self, project: &str, user: &str, email: &str) -> Result<()> {
        let record = UserCredentialRecord {
            email: email.to_string(),
            git_username: user.to_string(),
            ..UserCredentialRecord::default()
        };

        self.register(project, "", user, record, |path| {
            setup_local_repository(path, email)?;
            Ok(false)
        })
    }

    /// Create both records, run `setup`, and remove what was created if it
    /// fails. `setup` returns whether it checked out remote content.
    fn register(
        &self,
        project: &str,
        uri: &str,
        user: &str,
        mut user_record: UserCredentialRecord,
        setup: impl FnOnce(&Path) -> Result<bool>,
    ) -> Result<()> {
        let store = self.workspace.store();
        if store.find_repository(project)?.is_some() {
            return Err(GitError::AlreadyRegistered {
                project: project.to_string(),
            });
        }

        let repository = store.insert_repository(project, uri)?;
        user_record.project_id = repository.id;
        user_record.user = user.to_string();
        let user_record = match store.save_user(user_record) {
            Ok(saved) => saved,
            Err(err) => {
                self.rollback(&repository, None, None);
                return Err(err.into());
            }
        };

        let path = self.workspace.config().project_path(project);
        let had_repository = GitRepo::exists_at(&path);

        let result = self
            .workspace
            .locks()
            .with_write(&path, || setup(&path));

        match result {
            Ok(checked_out) => {
                info!(project, remote = uri, "registered project");
                if checked_out {
                    self.workspace
                        .notify(project, RepositoryEvent::Initialized);
                }
                Ok(())
            }
            Err(err) => {
                warn!(project, error = %err, "repository setup failed, removing registration");
                let created = (!had_repository).then_some(path.as_path());
                self.rollback(&repository, Some(user_record.id), created);
                Err(err)
            }
        }
    }

    /// Best-effort removal of a failed registration. Failures are logged,
    /// never returned, so the original error reaches the caller.
    fn rollback(&self, repository: &RepositoryRecord, user_id: Option<u64>, created: Option<&Path>) {
        let store = self.workspace.store();

        if let Some(user_id) = user_id {
            if let Err(err) = store.delete_user(user_id) {
                warn!(project = %repository.project_name, error = %err, "rollback: could not delete user record");
            }
        }
        if let Err(err) = store.delete_repository(repository.id) {
            warn!(project = %repository.project_name, error = %err, "rollback: could not delete repository record");
        }

        if let Some(path) = created {
            let git_dir = path.join(".git");
            if git_dir.exists() {
                if let Err(err) = fs::remove_dir_all(&git_dir) {
                    warn!(path = %git_dir.display(), error = %err, "rollback: could not remove repository");
                }
            }
        }
    }

    fn setup_remote_repository(&self, project: &str, user: &str, path: &Path) -> Result<bool> {
        if GitRepo::exists_at(path) {
            info!(path = %path.display(), "project folder already holds a repository");
            return Ok(false);
        }

        let resolver = CredentialResolver::new(self.workspace.store(), project, user);
        let (repository, user_record) = resolver.user_credential()?;
        let remote = self.workspace.config().default_remote.as_str();

        let repo = GitRepo::init(path)?;
        repo.disable_ssl_verification()?;
        repo.add_remote(remote, &repository.uri)?;

        let auth = resolver.resolve_for_remote(remote, &repository.uri)?;
        repo.fetch(remote, &auth)?;

        let prefix = format!("{remote}/");
        let remote_branches = repo.remote_branches()?;
        let available: Vec<&str> = remote_branches
            .iter()
            .filter_map(|branch| branch.strip_prefix(&prefix))
            .collect();

        let Some(&first) = available.first() else {
            // Empty remote: publish the project folder as its first commit
            repo.commit_all(INITIAL_COMMIT_MESSAGE, &user_record.email)?;
            repo.push(remote, &auth, PushRequest::default())?;
            info!(project, remote, "published project to empty remote");
            return Ok(false);
        };

        let branch = PREFERRED_BRANCHES
            .iter()
            .find_map(|preferred| available.iter().copied().find(|b| b == preferred))
            .unwrap_or(first);

        repo.create_tracking_branch(branch, &format!("{remote}/{branch}"))?;
        repo.force_checkout_branch(branch)?;
        repo.clean_untracked()?;
        repo.reset_hard()?;

        info!(project, branch, "checked out project from remote");
        Ok(true)
    }
}

fn setup_local_repository(path: &Path, email: &str) -> Result<()> {
    if GitRepo::exists_at(path) {
        info!(path = %path.display(), "project folder already holds a repository");
        return Ok(());
    }

    let repo = GitRepo::init(path)?;
    repo.disable_ssl_verification()?;
    repo.commit_all(INITIAL_COMMIT_MESSAGE, email)?;
    Ok(())
}
