//! Commit graph lane layout.
//!
//! [`layout`] is a pure function from a newest-first commit sequence to one
//! [`LaneAssignment`] per commit, carrying enough state to draw continuation,
//! convergence and merge edges without walking the history again.

pub mod layout;
pub mod render;

pub use layout::{layout, GraphNode, LaneAssignment, PALETTE_SIZE};
pub use render::lane_glyphs;
