use std::path::Path;

use anyhow::Context;

pub mod branch;
pub mod commit;
pub mod diff;
pub mod history;
pub mod init;
pub mod remote;
pub mod status;
pub mod sync;

/// Login name of the caller, used when no `--user` is given.
pub fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "admin".to_string())
}

/// Key material from an optional key file, "" when absent.
pub fn read_key(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ssh key {}", path.display())),
        None => Ok(String::new()),
    }
}
