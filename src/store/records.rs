use serde::{Deserialize, Serialize};

use crate::git::auth::AuthMode;

/// Project → remote URI registration. An empty URI means local-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub project_name: String,
    pub uri: String,
}

impl RepositoryRecord {
    pub fn has_remote(&self) -> bool {
        !self.uri.trim().is_empty()
    }

    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::from_url(&self.uri)
    }

    /// Browsable https address of the remote, or "" when local-only.
    ///
    /// `git@host:owner/repo.git` and `ssh://git@host/owner/repo.git` both
    /// become `https://host/owner/repo`.
    pub fn browse_url(&self) -> String {
        browse_url(&self.uri)
    }
}

fn browse_url(uri: &str) -> String {
    let uri = uri.trim();
    if uri.is_empty() {
        return String::new();
    }

    let (host_and_path, scp_like) = match uri.split_once("://") {
        Some((_, rest)) => (rest, false),
        None => (uri, true),
    };
    // Drop user info such as `git@` or `user:token@`
    let host_and_path = match host_and_path.split_once('@') {
        Some((_, rest)) => rest,
        None => host_and_path,
    };
    let host_and_path = if scp_like {
        host_and_path.replacen(':', "/", 1)
    } else {
        host_and_path.to_string()
    };
    let trimmed = host_and_path.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    format!("https://{trimmed}")
}

/// Credential values supplied by a caller when registering or updating a
/// user. Blank secrets mean "leave unchanged" on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCredentials {
    pub email: String,
    pub git_username: String,
    pub password: String,
    pub ssh_key: String,
}

/// Credentials of one acting user for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentialRecord {
    pub id: u64,
    pub project_id: u64,
    pub user: String,
    pub email: String,
    pub git_username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssh_key: String,
}

impl UserCredentialRecord {
    pub fn new(project_id: u64, user: &str) -> Self {
        Self {
            project_id,
            user: user.to_string(),
            ..Self::default()
        }
    }

    /// Apply a partial update. Blank secrets leave the stored value untouched.
    pub fn apply_update(&mut self, update: &UserCredentials) {
        self.email = update.email.clone();
        self.git_username = update.git_username.clone();
        if !update.password.is_empty() {
            self.password = update.password.clone();
        }
        if !update.ssh_key.is_empty() {
            self.ssh_key = update.ssh_key.clone();
        }
    }
}

/// Credentials of one acting user for a specific named remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCredentialRecord {
    pub id: u64,
    pub project_id: u64,
    pub user: String,
    pub remote_name: String,
    pub git_username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssh_key: String,
}
