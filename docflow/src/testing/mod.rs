//! Testing utilities for docflow pipelines.
//!
//! Mock stages with call counting and scripted outcomes, so pipelines can be
//! exercised without invoking real external tools.

mod mocks;

pub use mocks::{MockOutcome, MockStage};
