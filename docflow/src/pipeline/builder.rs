//! Pipeline builder with validation.

use super::Pipeline;
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::events::{EventSink, LoggingEventSink};
use crate::stages::Stage;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Stages run in the order they are added.
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    names: HashSet<String>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            names: HashSet::new(),
            event_sink: Arc::new(LoggingEventSink::default()),
        }
    }

    /// Appends a stage to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage name is empty or already used.
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Result<Self, PipelineValidationError> {
        self.add_stage(stage)?;
        Ok(self)
    }

    /// Appends a stage in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage name is empty or already used.
    pub fn add_stage(&mut self, stage: Arc<dyn Stage>) -> Result<(), PipelineValidationError> {
        let name = stage.name().to_string();

        if name.trim().is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has a stage with an empty name",
                self.name
            ))
            .with_error_info(
                ContractErrorInfo::new("PIPELINE-STAGE-NAME", "Stage names must not be empty")
                    .with_fix_hint("Give every stage a short, descriptive name."),
            ));
        }

        if !self.names.insert(name.clone()) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{name}' appears more than once in pipeline '{}'",
                self.name
            ))
            .with_stages(vec![name])
            .with_error_info(
                ContractErrorInfo::new("PIPELINE-DUPLICATE", "Stage names must be unique")
                    .with_fix_hint("Rename one of the stages so failures can be attributed."),
            ));
        }

        self.stages.push(stage);
        Ok(())
    }

    /// Sets the sink that receives lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline name is empty or there are no stages.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "Pipeline name cannot be empty or whitespace-only",
            )
            .with_error_info(ContractErrorInfo::new(
                "PIPELINE-NAME",
                "Pipeline name is empty",
            )));
        }

        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has no stages",
                self.name
            ))
            .with_error_info(
                ContractErrorInfo::new("PIPELINE-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one stage to the pipeline before building."),
            ));
        }

        Ok(Pipeline::new(self.name, self.stages, self.event_sink))
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}
