//! Stage output type with factory methods.

use super::StageStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The output of a stage execution.
///
/// A stage reports success with [`StageOutput::ok`] / [`StageOutput::ok_empty`]
/// and a non-fatal failure with [`StageOutput::fail`]. Faults that should
/// abort the stage are returned as `Err` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// The status of the stage execution.
    pub status: StageStatus,

    /// Facts produced by the stage (exit codes, copy counts, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, serde_json::Value>>,

    /// Error message (for failed executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for StageOutput {
    fn default() -> Self {
        Self::ok_empty()
    }
}

impl StageOutput {
    /// Creates a successful output with data.
    #[must_use]
    pub fn ok(data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            status: StageStatus::Ok,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a successful output with no data.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            status: StageStatus::Ok,
            data: None,
            error: None,
        }
    }

    /// Creates a successful output with a single value.
    #[must_use]
    pub fn ok_value(key: impl Into<String>, value: serde_json::Value) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value);
        Self::ok(data)
    }

    /// Creates a failure output with an error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Fail,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Adds data to the output (merges with existing data).
    #[must_use]
    pub fn with_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        match &mut self.data {
            Some(existing) => existing.extend(data),
            None => self.data = Some(data),
        }
        self
    }

    /// Adds a single data entry.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Returns true if the output indicates success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the output indicates failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.status.is_success()
    }

    /// Gets a value from the data.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}
