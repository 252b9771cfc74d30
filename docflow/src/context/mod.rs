//! Run identity and the context passed to each stage.

mod execution;
mod identity;

pub use execution::StageContext;
pub use identity::RunIdentity;
