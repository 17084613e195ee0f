pub mod operations;

pub use operations::MergeOutcome;
