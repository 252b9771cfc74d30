//! Typed outcome of a pipeline run.

use crate::context::RunIdentity;
use crate::core::{PipelineState, StageOutput, StageStatus};
use serde::Serialize;
use std::collections::HashMap;

/// What happened to one stage during a run.
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    /// Stage name.
    pub name: String,
    /// Final status. `Pending` only if the run never reached the stage.
    pub status: StageStatus,
    /// Failure cause, for failed stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Data reported by the stage.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
    /// Wall-clock time spent in the stage.
    pub duration_ms: f64,
}

impl StageRecord {
    pub(crate) fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Pending,
            error: None,
            data: HashMap::new(),
            duration_ms: 0.0,
        }
    }

    pub(crate) fn start(&mut self) {
        self.status = StageStatus::Running;
    }

    pub(crate) fn finish(&mut self, output: StageOutput, duration_ms: f64) {
        self.status = output.status;
        self.error = output.error;
        self.data = output.data.unwrap_or_default();
        self.duration_ms = duration_ms;
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>, duration_ms: f64) {
        self.status = StageStatus::Fail;
        self.error = Some(error.into());
        self.duration_ms = duration_ms;
    }

    pub(crate) fn skip(&mut self) {
        self.status = StageStatus::Skipped;
    }

    /// Returns true if the stage was actually invoked.
    #[must_use]
    pub const fn was_invoked(&self) -> bool {
        matches!(
            self.status,
            StageStatus::Running | StageStatus::Ok | StageStatus::Fail
        )
    }
}

/// Result of running a [`Pipeline`](super::Pipeline).
///
/// The runner never exits the process; callers map this to an exit status
/// with [`PipelineResult::exit_code`].
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Pipeline name.
    pub pipeline: String,
    /// Run identity.
    pub run_id: RunIdentity,
    /// Terminal state of the run.
    pub state: PipelineState,
    /// One record per stage, in pipeline order.
    pub stages: Vec<StageRecord>,
    /// Failure message naming the stage and cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Total wall-clock time.
    pub duration_ms: f64,
}

impl PipelineResult {
    /// Returns true if every stage succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.state, PipelineState::Succeeded)
    }

    /// Returns the name of the stage that failed, if any.
    #[must_use]
    pub fn failed_stage(&self) -> Option<&str> {
        match &self.state {
            PipelineState::Failed { stage } => Some(stage.as_str()),
            _ => None,
        }
    }

    /// Returns the process exit status for this result: 0 on success, 1
    /// otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Returns the record for a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.name == name)
    }

    /// Returns the names of the stages that were invoked, in order.
    #[must_use]
    pub fn invoked_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|r| r.was_invoked())
            .map(|r| r.name.as_str())
            .collect()
    }
}
