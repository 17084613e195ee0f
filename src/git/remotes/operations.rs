use std::cell::RefCell;

use git2::{ErrorCode, PushOptions};
use tracing::{info, warn};

use crate::error::{GitError, RejectionKind, Result, ResultExt};
use crate::git::auth::TransportAuth;
use crate::git::repository::core::{GitRepo, RemoteInfo};

/// What a push should send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushRequest {
    /// Every local branch instead of only the current one.
    pub all_branches: bool,
    pub tags: bool,
    /// Overwrite the remote refs even when the update is not a fast-forward.
    pub force: bool,
}

impl GitRepo {
    /// Add a remote repository
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo()
            .remote(name, url)
            .git_context(format!("Failed to add remote '{name}' with URL '{url}'"))?;

        info!(remote = name, url, "added remote");
        Ok(())
    }

    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.repo()
            .remote_delete(name)
            .git_context(format!("Failed to remove remote '{name}'"))?;

        info!(remote = name, "removed remote");
        Ok(())
    }

    /// Set the URL of an existing remote
    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<()> {
        self.repo()
            .remote_set_url(name, url)
            .git_context(format!("Failed to set URL for remote '{name}'"))?;

        info!(remote = name, url, "changed remote url");
        Ok(())
    }

    /// List all remotes with their URLs
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let remotes = self
            .repo()
            .remotes()
            .git_context("Failed to get remotes list")?;

        let mut remote_infos = Vec::new();
        for name in remotes.iter().flatten() {
            let remote = self
                .repo()
                .find_remote(name)
                .git_context(format!("Failed to find remote '{name}'"))?;

            remote_infos.push(RemoteInfo {
                name: name.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            });
        }

        Ok(remote_infos)
    }

    pub fn has_remote(&self, name: &str) -> bool {
        self.repo().find_remote(name).is_ok()
    }

    /// Get the URL of a specific remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        let remote = self
            .repo()
            .find_remote(name)
            .git_context(format!("Failed to find remote '{name}'"))?;

        let url = remote
            .url()
            .ok_or_else(|| GitError::Invalid(format!("Remote '{name}' has no URL")))?;

        Ok(url.to_string())
    }

    /// Push to `remote_name` and return the refspecs that were sent.
    ///
    /// A non-fast-forward update fails with
    /// [`RejectionKind::NonFastForward`] unless `request.force` is set; force
    /// is never applied implicitly.
    pub fn push(
        &self,
        remote_name: &str,
        auth: &TransportAuth,
        request: PushRequest,
    ) -> Result<Vec<String>> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .git_context(format!("Failed to find remote '{remote_name}'"))?;

        let refspecs = self.push_refspecs(request)?;
        if refspecs.is_empty() {
            return Err(GitError::Invalid("Nothing to push".to_string()));
        }

        let rejections: RefCell<Vec<(String, String)>> = RefCell::new(Vec::new());
        let mut callbacks = auth.remote_callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                rejections
                    .borrow_mut()
                    .push((refname.to_string(), status.to_string()));
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec_refs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        let pushed = remote.push(&refspec_refs, Some(&mut options));
        drop(options);

        if let Err(err) = pushed {
            if err.code() == ErrorCode::NotFastForward {
                warn!(remote = remote_name, "push rejected as non-fast-forward");
                return Err(GitError::RemoteRejected {
                    kind: RejectionKind::NonFastForward,
                    message: err.message().to_string(),
                });
            }
            return Err(GitError::from_git(
                format!("Failed to push to remote '{remote_name}'"),
                err,
            ));
        }

        if let Some((refname, status)) = rejections.into_inner().into_iter().next() {
            let kind = RejectionKind::from_remote_status(&status);
            warn!(remote = remote_name, refname, %kind, "remote rejected update");
            return Err(GitError::RemoteRejected {
                kind,
                message: format!("{refname}: {status}"),
            });
        }

        info!(remote = remote_name, refs = ?refspecs, force = request.force, "pushed");
        Ok(refspecs)
    }

    fn push_refspecs(&self, request: PushRequest) -> Result<Vec<String>> {
        let prefix = if request.force { "+" } else { "" };

        let branches = if request.all_branches {
            self.local_branches()?
        } else {
            vec![self.current_branch()?]
        };

        let mut refspecs: Vec<String> = branches
            .iter()
            .map(|branch| format!("{prefix}refs/heads/{branch}:refs/heads/{branch}"))
            .collect();

        if request.tags {
            let tags = self.repo().tag_names(None).git_context("Failed to list tags")?;
            refspecs.extend(
                tags.iter()
                    .flatten()
                    .map(|tag| format!("{prefix}refs/tags/{tag}:refs/tags/{tag}")),
            );
        }

        Ok(refspecs)
    }
}
