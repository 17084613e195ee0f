use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::resource::{is_structured, last_modification, resource_dir_of};
use crate::git::repository::WorkingTreeStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Deleted,
    Uncommitted,
    Created,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Deleted => "Deleted",
            ChangeKind::Uncommitted => "Uncommitted",
            ChangeKind::Created => "Created",
            ChangeKind::Modified => "Modified",
        };
        f.write_str(name)
    }
}

/// One row of the uncommitted-changes table: `resource, type, actor, timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRow {
    pub resource: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub actor: String,
    pub timestamp: String,
}

/// Build change rows from a working tree status.
///
/// Kinds are emitted in the order deleted, uncommitted, created, modified and
/// each resource appears once, under the first kind that mentions it. Files
/// of a structured resource are reported as their resource directory, with
/// actor and timestamp taken from its metadata file.
pub fn change_rows<S: AsRef<str>>(
    status: &WorkingTreeStatus,
    workdir: &Path,
    prefixes: &[S],
) -> Vec<ChangeRow> {
    let groups: [(&BTreeSet<String>, ChangeKind); 4] = [
        (&status.missing, ChangeKind::Deleted),
        (&status.uncommitted, ChangeKind::Uncommitted),
        (&status.untracked, ChangeKind::Created),
        (&status.changed, ChangeKind::Modified),
    ];

    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (paths, kind) in groups {
        for path in paths {
            let row = if is_structured(path, prefixes) {
                let resource = resource_dir_of(path);
                let modification = last_modification(workdir, resource).unwrap_or_default();
                ChangeRow {
                    resource: resource.to_string(),
                    kind,
                    actor: if modification.actor.is_empty() {
                        "unknown".to_string()
                    } else {
                        modification.actor
                    },
                    timestamp: modification.timestamp,
                }
            } else {
                ChangeRow {
                    resource: path.clone(),
                    kind,
                    actor: "unknown".to_string(),
                    timestamp: String::new(),
                }
            };

            if seen.insert(row.resource.clone()) {
                rows.push(row);
            }
        }
    }

    debug!(rows = rows.len(), "built uncommitted change rows");
    rows
}
