pub mod history;
pub mod operations;

pub use history::{ChangeType, CommitInfo};
