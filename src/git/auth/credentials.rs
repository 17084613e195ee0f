use std::fmt;

use git2::{CertificateCheckStatus, Cred, CredentialType, RemoteCallbacks};
use tracing::{debug, warn};

use super::AuthMode;
use crate::error::{GitError, Result};
use crate::store::{RecordStore, RepositoryRecord, UserCredentialRecord};

/// libgit2 keeps asking for credentials while the server rejects them.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Authentication material for one remote, ready to hand to the transport.
#[derive(Clone, PartialEq, Eq)]
pub enum TransportAuth {
    UserPass { username: String, password: String },
    SshKey { username: String, private_key: String },
    Anonymous,
}

impl TransportAuth {
    pub fn for_mode(mode: AuthMode, git_username: &str, password: &str, ssh_key: &str) -> Self {
        match mode {
            AuthMode::Https => TransportAuth::UserPass {
                username: git_username.to_string(),
                password: password.to_string(),
            },
            AuthMode::Ssh => TransportAuth::SshKey {
                username: git_username.to_string(),
                private_key: ssh_key.to_string(),
            },
            AuthMode::None => TransportAuth::Anonymous,
        }
    }

    pub fn mode(&self) -> AuthMode {
        match self {
            TransportAuth::UserPass { .. } => AuthMode::Https,
            TransportAuth::SshKey { .. } => AuthMode::Ssh,
            TransportAuth::Anonymous => AuthMode::None,
        }
    }

    /// Callbacks that answer credential requests and accept any server
    /// certificate or host key.
    ///
    /// Host-key and TLS verification are disabled on purpose: gateways talk
    /// to self-hosted servers with private CAs and unpinned keys. This is a
    /// known weakening of transport security, not a security boundary.
    pub fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0usize;

        callbacks.credentials(move |url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                warn!(url, "remote kept rejecting credentials");
                return Err(git2::Error::from_str(
                    "authentication failed: remote rejected the configured credentials",
                ));
            }
            debug!(url, ?allowed, attempt = attempts, "credential request");
            self.credential(username_from_url, allowed)
        });

        callbacks.certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));

        callbacks
    }

    fn credential(
        &self,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        match self {
            TransportAuth::UserPass { username, password }
                if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) =>
            {
                Cred::userpass_plaintext(username, password)
            }
            TransportAuth::SshKey {
                username,
                private_key,
            } if allowed.contains(CredentialType::SSH_KEY) => {
                let user = ssh_user(username_from_url, username);
                Cred::ssh_key_from_memory(user, None, private_key, None)
            }
            _ if allowed.contains(CredentialType::USERNAME) => {
                let fallback = match self {
                    TransportAuth::UserPass { username, .. }
                    | TransportAuth::SshKey { username, .. } => username.as_str(),
                    TransportAuth::Anonymous => "",
                };
                Cred::username(ssh_user(username_from_url, fallback))
            }
            _ => Cred::default(),
        }
    }
}

fn ssh_user<'a>(username_from_url: Option<&'a str>, configured: &'a str) -> &'a str {
    match username_from_url {
        Some(user) if !user.is_empty() => user,
        _ if !configured.is_empty() => configured,
        _ => "git",
    }
}

impl fmt::Debug for TransportAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportAuth::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            TransportAuth::SshKey { username, .. } => f
                .debug_struct("SshKey")
                .field("username", username)
                .field("private_key", &"<redacted>")
                .finish(),
            TransportAuth::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Resolves the stored credentials of one acting user on one project.
pub struct CredentialResolver<'a> {
    store: &'a dyn RecordStore,
    project: &'a str,
    user: &'a str,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(store: &'a dyn RecordStore, project: &'a str, user: &'a str) -> Self {
        Self {
            store,
            project,
            user,
        }
    }

    pub fn repository(&self) -> Result<RepositoryRecord> {
        self.store
            .find_repository(self.project)?
            .ok_or_else(|| GitError::RepositoryNotConfigured {
                project: self.project.to_string(),
            })
    }

    pub fn user_credential(&self) -> Result<(RepositoryRecord, UserCredentialRecord)> {
        let repository = self.repository()?;
        let user = self
            .store
            .find_user(repository.id, self.user)?
            .ok_or_else(|| GitError::UserNotConfigured {
                project: self.project.to_string(),
                user: self.user.to_string(),
            })?;
        Ok((repository, user))
    }

    /// Transport auth for a named remote.
    ///
    /// A credential stored for this exact remote wins; otherwise the user's
    /// project credential is used. The mode comes from `remote_url`, the URL
    /// actually contacted.
    pub fn resolve_for_remote(&self, remote_name: &str, remote_url: &str) -> Result<TransportAuth> {
        let (repository, user) = self.user_credential()?;
        let mode = AuthMode::from_url(remote_url);

        if let Some(remote) =
            self.store
                .find_remote_credential(repository.id, self.user, remote_name)?
        {
            debug!(remote = remote_name, "using remote-specific credentials");
            return Ok(TransportAuth::for_mode(
                mode,
                &remote.git_username,
                &remote.password,
                &remote.ssh_key,
            ));
        }

        Ok(TransportAuth::for_mode(
            mode,
            &user.git_username,
            &user.password,
            &user.ssh_key,
        ))
    }
}
