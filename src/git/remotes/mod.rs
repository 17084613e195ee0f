pub mod operations;
pub mod sync;

pub use operations::PushRequest;
