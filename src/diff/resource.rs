use std::fs;
use std::path::Path;

use chrono::DateTime;
use git2::ObjectType;
use serde::Deserialize;
use tracing::debug;

use crate::error::{GitError, Result, ResultExt};
use crate::git::GitRepo;

/// Metadata file present in every structured resource directory.
pub const RESOURCE_METADATA_FILE: &str = "resource.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether `path` belongs to the structured-resource layout, i.e. its first
/// segment starts with one of `prefixes`.
pub fn is_structured<S: AsRef<str>>(path: &str, prefixes: &[S]) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    prefixes
        .iter()
        .any(|prefix| !prefix.as_ref().is_empty() && first.starts_with(prefix.as_ref()))
}

/// Resource directory owning a file of a structured resource.
pub fn resource_dir_of(file_path: &str) -> &str {
    match file_path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => file_path,
    }
}

/// Last modification recorded in a resource's metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastModification {
    pub actor: String,
    pub timestamp: String,
}

#[derive(Deserialize)]
struct ResourceManifest {
    #[serde(default)]
    attributes: ManifestAttributes,
}

#[derive(Default, Deserialize)]
struct ManifestAttributes {
    #[serde(rename = "lastModification")]
    last_modification: Option<RawModification>,
}

#[derive(Deserialize)]
struct RawModification {
    actor: Option<String>,
    timestamp: Option<String>,
}

/// Read `attributes.lastModification` from `<resource_dir>/resource.json`.
///
/// Returns `None` when the file is absent, unreadable or carries no
/// modification record.
pub fn last_modification(workdir: &Path, resource_dir: &str) -> Option<LastModification> {
    let manifest_path = workdir.join(resource_dir).join(RESOURCE_METADATA_FILE);
    let content = fs::read_to_string(&manifest_path).ok()?;
    let manifest: ResourceManifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!(path = %manifest_path.display(), error = %e, "unreadable resource manifest");
            return None;
        }
    };
    let raw = manifest.attributes.last_modification?;

    Some(LastModification {
        actor: raw.actor.unwrap_or_else(|| "unknown".to_string()),
        timestamp: raw.timestamp.map(|t| format_timestamp(&t)).unwrap_or_default(),
    })
}

fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

impl GitRepo {
    /// File holding the content of `path`.
    ///
    /// Plain paths are returned as is. For a structured resource this is the
    /// first regular file in the resource directory other than the metadata
    /// file, looked up in the working tree and then in HEAD, falling back to
    /// the metadata file itself.
    pub fn resource_data_file<S: AsRef<str>>(&self, path: &str, prefixes: &[S]) -> Result<String> {
        let path = path.trim_end_matches('/');
        if !is_structured(path, prefixes) {
            return Ok(path.to_string());
        }

        let data_file = match self.worktree_data_file(path)? {
            Some(name) => Some(name),
            None => self.head_data_file(path)?,
        };

        Ok(match data_file {
            Some(name) => format!("{path}/{name}"),
            None => format!("{path}/{RESOURCE_METADATA_FILE}"),
        })
    }

    /// Content of `path` at HEAD and in the working tree.
    ///
    /// A side on which the file does not exist reads as an empty string.
    pub fn resource_diff<S: AsRef<str>>(&self, path: &str, prefixes: &[S]) -> Result<(String, String)> {
        let data_file = self.resource_data_file(path, prefixes)?;

        let old_content = match self.head_tree()? {
            Some(tree) => self.blob_text(&tree, &data_file)?.unwrap_or_default(),
            None => String::new(),
        };

        let worktree_path = self.workdir()?.join(&data_file);
        let new_content = if worktree_path.is_file() {
            let bytes = fs::read(&worktree_path)
                .map_err(|e| GitError::io_at("read", &worktree_path, e))?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            String::new()
        };

        debug!(path, data_file, "read resource diff");
        Ok((old_content, new_content))
    }

    fn worktree_data_file(&self, resource_dir: &str) -> Result<Option<String>> {
        let dir = self.workdir()?.join(resource_dir);
        if !dir.is_dir() {
            return Ok(None);
        }

        let entries = fs::read_dir(&dir).map_err(|e| GitError::io_at("list", &dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GitError::io_at("list", &dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| GitError::io_at("inspect", &entry.path(), e))?
                .is_file();
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && name != RESOURCE_METADATA_FILE {
                names.push(name);
            }
        }

        names.sort();
        Ok(names.into_iter().next())
    }

    fn head_data_file(&self, resource_dir: &str) -> Result<Option<String>> {
        let Some(head) = self.head_tree()? else {
            return Ok(None);
        };
        let Ok(entry) = head.get_path(Path::new(resource_dir)) else {
            return Ok(None);
        };
        if entry.kind() != Some(ObjectType::Tree) {
            return Ok(None);
        }

        let dir = self
            .repo()
            .find_tree(entry.id())
            .git_context(format!("Failed to read '{resource_dir}' at HEAD"))?;
        let name = dir
            .iter()
            .filter(|e| e.kind() == Some(ObjectType::Blob))
            .filter_map(|e| e.name().map(str::to_string))
            .find(|name| name != RESOURCE_METADATA_FILE);
        Ok(name)
    }
}
