//! Pipeline building and execution.
//!
//! This module provides:
//! - A validating pipeline builder
//! - The sequential, fail-fast runner
//! - Typed run results that map to a process exit status

mod builder;
mod result;
mod runner;

pub use builder::PipelineBuilder;
pub use result::{PipelineResult, StageRecord};
pub use runner::Pipeline;
