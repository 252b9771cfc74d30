//! Stage that runs an external program and inspects only its exit status.

use super::Stage;
use crate::context::StageContext;
use crate::core::StageOutput;
use crate::errors::DocflowError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `program args...` and succeeds when it exits with status 0.
///
/// Output streams are inherited from the parent process and never parsed.
/// A non-zero exit is a stage failure; failing to start the program at all
/// is a fault.
#[derive(Debug, Clone)]
pub struct CommandStage {
    name: String,
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandStage {
    /// Creates a new command stage.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Builds a stage from a full argv, first element being the program.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `argv` is empty.
    pub fn from_argv(name: impl Into<String>, argv: &[String]) -> Result<Self, DocflowError> {
        let name = name.into();
        let (program, args) = argv.split_first().ok_or_else(|| {
            DocflowError::Config(format!("stage '{name}' has an empty command line"))
        })?;
        Ok(Self::new(name, program.clone()).with_args(args.iter().cloned()))
    }

    /// Appends a single argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory the program runs in.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory, if set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Renders the command line with shell-style quoting for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| quote(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", part.replace('\'', r"'\''"))
    } else {
        part.to_string()
    }
}

#[async_trait]
impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        match &self.working_dir {
            Some(dir) => format!("{}: {} (in {})", self.name, self.command_line(), dir.display()),
            None => format!("{}: {}", self.name, self.command_line()),
        }
    }

    async fn execute(&self, ctx: &StageContext) -> Result<StageOutput, DocflowError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(
            run_id = %ctx.run_id(),
            stage = %self.name,
            command = %self.command_line(),
            "Spawning external command"
        );

        let started = Instant::now();
        let status = command.status().await.map_err(|source| DocflowError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        if status.success() {
            info!(stage = %self.name, program = %self.program, duration_ms, "Command succeeded");
            return Ok(StageOutput::ok_value("exit_code", serde_json::json!(0))
                .add_data("duration_ms", serde_json::json!(duration_ms)));
        }

        let failure = DocflowError::ProcessFailed {
            program: self.program.clone(),
            code: status.code(),
        };
        Ok(StageOutput::fail(failure.to_string())
            .add_data("exit_code", serde_json::json!(status.code()))
            .add_data("duration_ms", serde_json::json!(duration_ms)))
    }
}
