//! # Docflow
//!
//! A fail-fast stage runner for building and relocating generated
//! documentation.
//!
//! Docflow runs an ordered list of stages:
//!
//! - **Sequential execution**: each stage starts only after the previous one
//!   succeeded
//! - **Fail-fast**: the first failure ends the run and later stages are
//!   never invoked
//! - **Typed outcomes**: a run yields a [`pipeline::PipelineResult`] that the
//!   binary maps to its exit status
//! - **Event-driven observability**: lifecycle events go to an
//!   [`events::EventSink`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docflow::prelude::*;
//!
//! let config = DocsConfig::preset(Variant::Local).resolve_working_dir()?;
//! let pipeline = build_pipeline(&config, Variant::Local, Arc::new(LoggingEventSink::default()))?;
//!
//! let result = pipeline.run().await;
//! std::process::exit(i32::from(result.exit_code()));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod docs;
pub mod errors;
pub mod events;
pub mod files;
pub mod pipeline;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigOverrides, DocsConfig, Variant};
    pub use crate::context::{RunIdentity, StageContext};
    pub use crate::core::{PipelineState, StageEvent, StageOutput, StageStatus};
    pub use crate::docs::build_pipeline;
    pub use crate::errors::{ContractErrorInfo, DocflowError, PipelineValidationError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::files::{copy_tree, CopyOptions, CopyReport};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineResult, StageRecord};
    pub use crate::stages::{CommandStage, CopyStage, FnStage, Stage};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
