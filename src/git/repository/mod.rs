pub mod core;
pub mod signature;
pub mod status;
pub mod worktree;

pub use status::WorkingTreeStatus;
