//! Stage and pipeline status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage is waiting to run.
    Pending,
    /// Stage is currently running.
    Running,
    /// Stage completed successfully.
    Ok,
    /// Stage failed or raised a fault.
    Fail,
    /// Stage was never invoked because an earlier stage failed.
    Skipped,
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Ok => write!(f, "ok"),
            Self::Fail => write!(f, "fail"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Fail | Self::Skipped)
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

/// Lifecycle of a pipeline run.
///
/// `Pending -> Running(i) -> {Succeeded | Failed}`. Both `Succeeded` and
/// `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// No stage has started yet.
    Pending,
    /// The stage at `index` is executing.
    Running {
        /// Zero-based position of the running stage.
        index: usize,
        /// Name of the running stage.
        stage: String,
    },
    /// Every stage succeeded.
    Succeeded,
    /// A stage failed; later stages were skipped.
    Failed {
        /// Name of the stage that failed.
        stage: String,
    },
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Pending
    }
}

impl PipelineState {
    /// Returns true once the pipeline can no longer change state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running { index, stage } => write!(f, "running({index}: {stage})"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { stage } => write!(f, "failed({stage})"),
        }
    }
}
