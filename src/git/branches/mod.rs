pub mod operations;
pub mod stash;
pub mod switcher;
pub mod tracking;

pub use stash::{StashApply, StashRecord, STASH_PREFIX};
pub use switcher::{BranchSwitcher, RestoreOutcome, SwitchOutcome};
