//! Line diffs and structured-resource content lookup.
//!
//! - `lines`: LCS line alignment of two texts
//! - `resource`: locating a resource's data file and reading it at HEAD and
//!   in the working tree
//! - `changes`: uncommitted-change rows built from working tree status

pub mod changes;
pub mod lines;
pub mod resource;

pub use changes::{change_rows, ChangeKind, ChangeRow};
pub use lines::{diff_lines, diff_text, DiffLine, LineOp};
pub use resource::{is_structured, LastModification, RESOURCE_METADATA_FILE};
