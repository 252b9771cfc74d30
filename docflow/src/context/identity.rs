//! Run identity for tracking pipeline executions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one pipeline run.
///
/// A fresh identity is minted per process invocation; it shows up in every
/// log line and event emitted by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this pipeline run.
    pub pipeline_run_id: Uuid,
}

impl RunIdentity {
    /// Creates a new run identity with a time-ordered run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline_run_id: Uuid::now_v7(),
        }
    }

    /// Creates a run identity with a specific pipeline run ID.
    #[must_use]
    pub const fn with_pipeline_run_id(pipeline_run_id: Uuid) -> Self {
        Self { pipeline_run_id }
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pipeline_run_id)
    }
}
