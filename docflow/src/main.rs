//! # Docflow
//!
//! Builds the PHP library documentation and copies it into place.
//!
//! ## Usage
//!
//! ```bash
//! # Generate docs and merge them into docs_ex/php
//! docflow local
//!
//! # Regenerate the schema, generate docs, replace the site's copy
//! docflow publish
//!
//! # Show what would run
//! docflow publish --dry-run
//! ```

mod cli;

use clap::Parser;
use cli::{Cli, LogFormat};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.log_format);

    match cli::execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docflow=info".into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
