use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    RecordStore, RemoteCredentialRecord, RepositoryRecord, StoreError, StoreResult,
    UserCredentialRecord,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    next_id: u64,
    #[serde(default)]
    repositories: Vec<RepositoryRecord>,
    #[serde(default)]
    users: Vec<UserCredentialRecord>,
    #[serde(default)]
    remote_credentials: Vec<RemoteCredentialRecord>,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Record store kept in a single JSON document.
///
/// Every mutation rewrites the document through a temp file and a rename, so
/// a crash never leaves a half-written store behind.
pub struct JsonRecordStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn load(&self) -> StoreResult<Tables> {
        if !self.path.exists() {
            return Ok(Tables::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Tables::default());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn persist(&self, tables: &Tables) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(tables).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let tables = self.load()?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let mut tables = self.load()?;
        let value = f(&mut tables)?;
        self.persist(&tables)?;
        Ok(value)
    }
}

impl RecordStore for JsonRecordStore {
    fn find_repository(&self, project: &str) -> StoreResult<Option<RepositoryRecord>> {
        self.read(|tables| {
            tables
                .repositories
                .iter()
                .find(|r| r.project_name == project)
                .cloned()
        })
    }

    fn insert_repository(&self, project: &str, uri: &str) -> StoreResult<RepositoryRecord> {
        self.write(|tables| {
            let record = RepositoryRecord {
                id: tables.allocate_id(),
                project_name: project.to_string(),
                uri: uri.to_string(),
            };
            tables.repositories.push(record.clone());
            debug!(project, id = record.id, "inserted repository record");
            Ok(record)
        })
    }

    fn update_repository(&self, record: &RepositoryRecord) -> StoreResult<()> {
        self.write(|tables| {
            let slot = tables
                .repositories
                .iter_mut()
                .find(|r| r.id == record.id)
                .ok_or(StoreError::Missing { id: record.id })?;
            *slot = record.clone();
            Ok(())
        })
    }

    fn delete_repository(&self, id: u64) -> StoreResult<()> {
        self.write(|tables| {
            let before = tables.repositories.len();
            tables.repositories.retain(|r| r.id != id);
            if tables.repositories.len() == before {
                return Err(StoreError::Missing { id });
            }
            Ok(())
        })
    }

    fn find_user(&self, project_id: u64, user: &str) -> StoreResult<Option<UserCredentialRecord>> {
        self.read(|tables| {
            tables
                .users
                .iter()
                .find(|u| u.project_id == project_id && u.user == user)
                .cloned()
        })
    }

    fn save_user(&self, mut record: UserCredentialRecord) -> StoreResult<UserCredentialRecord> {
        self.write(|tables| {
            if record.id == 0 {
                record.id = tables.allocate_id();
                tables.users.push(record.clone());
            } else {
                let slot = tables
                    .users
                    .iter_mut()
                    .find(|u| u.id == record.id)
                    .ok_or(StoreError::Missing { id: record.id })?;
                *slot = record.clone();
            }
            Ok(record)
        })
    }

    fn delete_user(&self, id: u64) -> StoreResult<()> {
        self.write(|tables| {
            let before = tables.users.len();
            tables.users.retain(|u| u.id != id);
            if tables.users.len() == before {
                return Err(StoreError::Missing { id });
            }
            Ok(())
        })
    }

    fn find_remote_credential(
        &self,
        project_id: u64,
        user: &str,
        remote: &str,
    ) -> StoreResult<Option<RemoteCredentialRecord>> {
        self.read(|tables| {
            tables
                .remote_credentials
                .iter()
                .find(|c| c.project_id == project_id && c.user == user && c.remote_name == remote)
                .cloned()
        })
    }

    fn save_remote_credential(
        &self,
        mut record: RemoteCredentialRecord,
    ) -> StoreResult<RemoteCredentialRecord> {
        self.write(|tables| {
            if record.id == 0 {
                record.id = tables.allocate_id();
                tables.remote_credentials.push(record.clone());
            } else {
                let slot = tables
                    .remote_credentials
                    .iter_mut()
                    .find(|c| c.id == record.id)
                    .ok_or(StoreError::Missing { id: record.id })?;
                *slot = record.clone();
            }
            Ok(record)
        })
    }

    fn delete_remote_credential(&self, id: u64) -> StoreResult<()> {
        self.write(|tables| {
            tables.remote_credentials.retain(|c| c.id != id);
            Ok(())
        })
    }
}
