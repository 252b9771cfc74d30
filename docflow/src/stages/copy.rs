//! Stage that relocates a directory tree with [`copy_tree`].

use super::Stage;
use crate::context::StageContext;
use crate::core::StageOutput;
use crate::errors::DocflowError;
use crate::files::{copy_tree, CopyOptions};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Copies the contents of `source` into `destination`.
///
/// The copy runs on tokio's blocking pool; the stage does not return until
/// it has finished.
#[derive(Debug, Clone)]
pub struct CopyStage {
    name: String,
    source: PathBuf,
    destination: PathBuf,
    options: CopyOptions,
}

impl CopyStage {
    /// Creates a new copy stage that merges into the destination.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
            options: CopyOptions::default(),
        }
    }

    /// Empties the destination before copying when `clear` is true.
    #[must_use]
    pub const fn clear_destination(mut self, clear: bool) -> Self {
        self.options.clear_destination = clear;
        self
    }

    /// Returns the source directory.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Returns the copy options.
    #[must_use]
    pub const fn options(&self) -> CopyOptions {
        self.options
    }
}

#[async_trait]
impl Stage for CopyStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        let mode = if self.options.clear_destination {
            "clear, then copy"
        } else {
            "merge"
        };
        format!(
            "{}: {} -> {} ({mode})",
            self.name,
            self.source.display(),
            self.destination.display()
        )
    }

    async fn execute(&self, ctx: &StageContext) -> Result<StageOutput, DocflowError> {
        let source = self.source.clone();
        let destination = self.destination.clone();
        let options = self.options;

        let report = tokio::task::spawn_blocking(move || copy_tree(&source, &destination, options))
            .await
            .map_err(|e| DocflowError::Internal(format!("copy task failed: {e}")))??;

        info!(
            run_id = %ctx.run_id(),
            stage = %self.name,
            files = report.files_copied,
            bytes = report.bytes_copied,
            destination = %self.destination.display(),
            "Docs copied"
        );

        Ok(StageOutput::ok(report.to_data()))
    }
}
