//! Persistence of registration and credential records.
//!
//! The core only needs a small record store reachable by project name and
//! acting user. [`RecordStore`] is that seam; [`JsonRecordStore`] is the
//! file-backed implementation used by the CLI.

pub mod json;
pub mod records;

use thiserror::Error;

pub use json::JsonRecordStore;
pub use records::{
    RemoteCredentialRecord, RepositoryRecord, UserCredentialRecord, UserCredentials,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access record store '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("record store '{path}' is corrupt: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("record {id} does not exist")]
    Missing { id: u64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait RecordStore: Send + Sync {
    fn find_repository(&self, project: &str) -> StoreResult<Option<RepositoryRecord>>;

    /// Insert a new repository record and return it with its generated id.
    fn insert_repository(&self, project: &str, uri: &str) -> StoreResult<RepositoryRecord>;

    fn update_repository(&self, record: &RepositoryRecord) -> StoreResult<()>;

    fn delete_repository(&self, id: u64) -> StoreResult<()>;

    fn find_user(&self, project_id: u64, user: &str) -> StoreResult<Option<UserCredentialRecord>>;

    /// Insert (id 0) or replace a user credential record.
    fn save_user(&self, record: UserCredentialRecord) -> StoreResult<UserCredentialRecord>;

    fn delete_user(&self, id: u64) -> StoreResult<()>;

    fn find_remote_credential(
        &self,
        project_id: u64,
        user: &str,
        remote: &str,
    ) -> StoreResult<Option<RemoteCredentialRecord>>;

    /// Insert (id 0) or replace a remote credential record.
    fn save_remote_credential(
        &self,
        record: RemoteCredentialRecord,
    ) -> StoreResult<RemoteCredentialRecord>;

    fn delete_remote_credential(&self, id: u64) -> StoreResult<()>;
}
