//! Sequential, fail-fast pipeline execution.

use super::{PipelineResult, StageRecord};
use crate::context::{RunIdentity, StageContext};
use crate::core::{PipelineState, StageEvent};
use crate::errors::DocflowError;
use crate::events::EventSink;
use crate::stages::Stage;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// An ordered list of stages executed one after another.
///
/// A stage only runs if every stage before it succeeded. The first failure,
/// whether reported, returned as `Err`, or a panic, ends the run and every
/// remaining stage is recorded as skipped without being invoked.
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(crate) fn new(
        name: String,
        stages: Vec<Arc<dyn Stage>>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name,
            stages,
            event_sink,
        }
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

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Describes what each stage would do, without running anything.
    #[must_use]
    pub fn plan(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.describe()).collect()
    }

    /// Runs the pipeline under a fresh run identity.
    pub async fn run(&self) -> PipelineResult {
        self.run_with_identity(RunIdentity::new()).await
    }

    /// Runs the pipeline under the given run identity.
    pub async fn run_with_identity(&self, run_id: RunIdentity) -> PipelineResult {
        let started = Instant::now();
        let total = self.stages.len();
        let mut records: Vec<StageRecord> = self
            .stages
            .iter()
            .map(|s| StageRecord::pending(s.name()))
            .collect();

        info!(pipeline = %self.name, %run_id, stages = total, "Pipeline started");
        self.event_sink.emit(&StageEvent::pipeline_started(
            &self.name,
            &run_id.to_string(),
            total,
        ));

        for (index, stage) in self.stages.iter().enumerate() {
            let stage_name = stage.name();
            let state = PipelineState::Running {
                index,
                stage: stage_name.to_string(),
            };
            info!(pipeline = %self.name, %state, "Running stage {}/{total}: {stage_name}", index + 1);
            self.event_sink.emit(&StageEvent::started(stage_name, index));
            records[index].start();

            let ctx = StageContext::new(run_id, &self.name, stage_name, index, total);
            let span = info_span!("stage", stage = %stage_name, %run_id);
            let stage_started = Instant::now();
            let outcome = AssertUnwindSafe(stage.execute(&ctx).instrument(span))
                .catch_unwind()
                .await;
            let duration_ms = stage_started.elapsed().as_secs_f64() * 1000.0;

            let failure = match outcome {
                Ok(Ok(output)) if output.is_success() => {
                    records[index].finish(output, duration_ms);
                    None
                }
                Ok(Ok(output)) => {
                    let cause = output
                        .error
                        .clone()
                        .unwrap_or_else(|| "stage reported failure".to_string());
                    records[index].finish(output, duration_ms);
                    Some(cause)
                }
                Ok(Err(err)) => Some(err.to_string()),
                Err(payload) => Some(
                    DocflowError::StagePanicked {
                        stage: stage_name.to_string(),
                        message: panic_message(payload.as_ref()),
                    }
                    .to_string(),
                ),
            };

            let Some(cause) = failure else {
                info!(stage = %stage_name, duration_ms, "Stage completed");
                self.event_sink
                    .emit(&StageEvent::completed(stage_name, duration_ms));
                continue;
            };

            records[index].fail(cause.clone(), duration_ms);
            error!(pipeline = %self.name, stage = %stage_name, error = %cause, "Stage failed");
            self.event_sink
                .emit(&StageEvent::failed(stage_name, &cause, duration_ms));

            let reason = format!("stage '{stage_name}' failed");
            for record in &mut records[index + 1..] {
                record.skip();
                self.event_sink.emit(&StageEvent::skipped(&record.name, &reason));
            }

            let message = format!("Stage '{stage_name}' failed: {cause}");
            self.event_sink
                .emit(&StageEvent::pipeline_failed(&self.name, stage_name, &cause));

            return PipelineResult {
                pipeline: self.name.clone(),
                run_id,
                state: PipelineState::Failed {
                    stage: stage_name.to_string(),
                },
                stages: records,
                error: Some(message),
                duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            };
        }

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(pipeline = %self.name, %run_id, duration_ms, "Pipeline succeeded");
        self.event_sink
            .emit(&StageEvent::pipeline_completed(&self.name, duration_ms));

        PipelineResult {
            pipeline: self.name.clone(),
            run_id,
            state: PipelineState::Succeeded,
            stages: records,
            error: None,
            duration_ms,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
