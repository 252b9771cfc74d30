//! Stage trait and implementations.
//!
//! Stages are the units of work in a docflow pipeline. A stage either
//! reports an outcome through [`StageOutput`] or raises a fault by returning
//! `Err`; the runner treats both failure paths the same way.

mod command;
mod copy;

pub use command::CommandStage;
pub use copy::CopyStage;

use crate::context::StageContext;
use crate::core::StageOutput;
use crate::errors::DocflowError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns a one-line, human readable description of what the stage
    /// would do. Used for dry-run plans.
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Executes the stage.
    ///
    /// # Errors
    ///
    /// Returns an error for unrecoverable faults (spawn failures, IO errors).
    /// Expected failures such as a non-zero exit status are reported as
    /// [`StageOutput::fail`] instead.
    async fn execute(&self, ctx: &StageContext) -> Result<StageOutput, DocflowError>;
}

/// A simple function-based stage.
pub struct FnStage<F>
where
    F: Fn(&StageContext) -> Result<StageOutput, DocflowError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&StageContext) -> Result<StageOutput, DocflowError> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&StageContext) -> Result<StageOutput, DocflowError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&StageContext) -> Result<StageOutput, DocflowError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &StageContext) -> Result<StageOutput, DocflowError> {
        (self.func)(ctx)
    }
}
