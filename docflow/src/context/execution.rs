//! Per-stage execution context.

use super::RunIdentity;

/// The read-only context handed to a single stage execution.
///
/// Stages share no mutable state through the context; anything a later
/// stage needs must come from the filesystem or process side effects of an
/// earlier one.
#[derive(Debug, Clone)]
pub struct StageContext {
    run_id: RunIdentity,
    pipeline_name: String,
    stage_name: String,
    index: usize,
    total: usize,
}

impl StageContext {
    /// Creates a new stage context.
    #[must_use]
    pub fn new(
        run_id: RunIdentity,
        pipeline_name: impl Into<String>,
        stage_name: impl Into<String>,
        index: usize,
        total: usize,
    ) -> Self {
        Self {
            run_id,
            pipeline_name: pipeline_name.into(),
            stage_name: stage_name.into(),
            index,
            total,
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub const fn run_id(&self) -> &RunIdentity {
        &self.run_id
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    /// Returns the stage name.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Returns the zero-based position of the stage in its pipeline.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of stages in the pipeline.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}
