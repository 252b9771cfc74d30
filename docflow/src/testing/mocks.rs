//! Mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::StageContext;
use crate::core::StageOutput;
use crate::errors::DocflowError;
use crate::stages::Stage;

/// A mock stage that records calls and returns a configurable outcome.
#[derive(Debug)]
pub struct MockStage {
    name: String,
    outcome: Mutex<MockOutcome>,
    call_count: AtomicUsize,
    calls: Arc<Mutex<Vec<String>>>,
}

/// What a [`MockStage`] does when executed.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return a successful output.
    Succeed,
    /// Return a failing output with this message.
    Fail(String),
    /// Return `Err` with a configuration error carrying this message.
    Raise(String),
    /// Panic with this message.
    Panic(String),
}

impl MockStage {
    /// Creates a new mock stage that succeeds.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_outcome(name, MockOutcome::Succeed)
    }

    /// Creates a mock stage with a specific outcome.
    #[must_use]
    pub fn with_outcome(name: impl Into<String>, outcome: MockOutcome) -> Self {
        Self {
            name: name.into(),
            outcome: Mutex::new(outcome),
            call_count: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock stage that reports failure.
    #[must_use]
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_outcome(name, MockOutcome::Fail(message.into()))
    }

    /// Creates a mock stage that raises an error.
    #[must_use]
    pub fn raising(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_outcome(name, MockOutcome::Raise(message.into()))
    }

    /// Creates a mock stage that panics.
    #[must_use]
    pub fn panicking(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_outcome(name, MockOutcome::Panic(message.into()))
    }

    /// Shares a call log with other mocks so their relative order can be
    /// asserted.
    #[must_use]
    pub fn with_call_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.calls = log;
        self
    }

    /// Changes the outcome of future executions.
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns the recorded stage names, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Stage for MockStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &StageContext) -> Result<StageOutput, DocflowError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(ctx.stage_name().to_string());

        let outcome = self.outcome.lock().clone();
        match outcome {
            MockOutcome::Succeed => Ok(StageOutput::ok_empty()),
            MockOutcome::Fail(message) => Ok(StageOutput::fail(message)),
            MockOutcome::Raise(message) => Err(DocflowError::Config(message)),
            MockOutcome::Panic(message) => panic!("{message}"),
        }
    }
}
