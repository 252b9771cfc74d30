//! Core domain model types for docflow.
//!
//! This module contains the value types shared by stages and the runner:
//! - Stage status and pipeline state enums
//! - Stage output type with factory methods
//! - Lifecycle events

mod event;
mod output;
mod status;

pub use event::StageEvent;
pub use output::StageOutput;
pub use status::{PipelineState, StageStatus};
