//! Command-line interface for the docflow binary.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use docflow::config::{ConfigOverrides, DocsConfig, Variant};
use docflow::docs::build_pipeline;
use docflow::events::LoggingEventSink;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Docflow - build and relocate generated documentation
///
/// Runs the documentation generator in a container and copies its output to
/// the destination. Stops at the first failing stage.
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipeline to run
    #[arg(value_enum, default_value_t = Variant::Local)]
    pub variant: Variant,

    /// JSON file whose fields override the preset
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository root to build from
    #[arg(short = 'C', long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Where the generated docs are copied to
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Title of the generated documentation
    #[arg(long)]
    pub title: Option<String>,

    /// Documentation generator image
    #[arg(long)]
    pub image: Option<String>,

    /// Schema generator command line, split on whitespace
    #[arg(long = "schema-cmd", value_name = "COMMAND")]
    pub schema_cmd: Option<String>,

    /// Empty the destination before copying
    #[arg(long, overrides_with = "no_clear")]
    pub clear: bool,

    /// Merge into the destination without emptying it
    #[arg(long = "no-clear", overrides_with = "clear")]
    pub no_clear: bool,

    /// Print the stages that would run and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, env = "DOCFLOW_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl Cli {
    /// Returns the configuration overrides given as flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            working_dir: self.workdir.clone(),
            destination: self.destination.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            schema_command: self
                .schema_cmd
                .as_deref()
                .map(|cmd| cmd.split_whitespace().map(str::to_string).collect()),
            clear_destination: self.clear_flag(),
            ..ConfigOverrides::default()
        }
    }

    const fn clear_flag(&self) -> Option<bool> {
        if self.clear {
            Some(true)
        } else if self.no_clear {
            Some(false)
        } else {
            None
        }
    }

    /// Resolves the final configuration: preset, then config file, then flags.
    pub fn resolve_config(&self) -> anyhow::Result<DocsConfig> {
        let mut config = DocsConfig::preset(self.variant);
        if let Some(path) = &self.config {
            config
                .merge_json(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
        }
        Ok(config.with_overrides(self.overrides()).resolve_working_dir()?)
    }
}

/// Runs the selected pipeline and returns the process exit status.
pub async fn execute(cli: Cli) -> anyhow::Result<u8> {
    let config = cli.resolve_config()?;
    let pipeline = build_pipeline(&config, cli.variant, Arc::new(LoggingEventSink::debug()))
        .with_context(|| format!("Invalid configuration for the {} pipeline", cli.variant))?;

    if cli.dry_run {
        for (i, line) in pipeline.plan().iter().enumerate() {
            println!("{}. {line}", i + 1);
        }
        return Ok(0);
    }

    // The runner has already logged any failure.
    let result = pipeline.run().await;
    if result.is_success() {
        info!(
            pipeline = %result.pipeline,
            duration_ms = result.duration_ms,
            "Docs built and copied to {}",
            config.destination_path().display()
        );
    }
    Ok(result.exit_code())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("docflow").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_to_local() {
        let cli = parse(&[]);
        assert_eq!(cli.variant, Variant::Local);
        assert!(!cli.dry_run);
        assert_eq!(cli.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = parse(&[
            "publish",
            "--destination",
            "site/php",
            "--title",
            "My Library",
            "--schema-cmd",
            "python3 tools/schema.py",
            "--no-clear",
        ]);

        assert_eq!(cli.variant, Variant::Publish);
        let overrides = cli.overrides();
        assert_eq!(overrides.destination, Some(PathBuf::from("site/php")));
        assert_eq!(overrides.title.as_deref(), Some("My Library"));
        assert_eq!(
            overrides.schema_command,
            Some(vec!["python3".to_string(), "tools/schema.py".to_string()])
        );
        assert_eq!(overrides.clear_destination, Some(false));
    }

    #[test]
    fn test_last_clear_flag_wins() {
        assert_eq!(parse(&["--no-clear", "--clear"]).overrides().clear_destination, Some(true));
        assert_eq!(parse(&["--clear", "--no-clear"]).overrides().clear_destination, Some(false));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["docflow", "deploy"]).is_err());
    }

    #[test]
    fn test_resolve_config_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docflow.json");
        std::fs::write(&path, r#"{"title": "From File", "image": "from/file:1"}"#).unwrap();
        let workdir = dir.path().to_str().unwrap();
        let config_path = path.to_str().unwrap();

        let cli = parse(&["--config", config_path, "--workdir", workdir, "--title", "From Flag"]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.title, "From Flag");
        assert_eq!(config.image, "from/file:1");
        assert_eq!(config.working_dir, dir.path());
    }

    #[test]
    fn test_resolve_config_reports_bad_file() {
        let cli = parse(&["--config", "/nonexistent/docflow.json"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(err.to_string().contains("Failed to load config file"));
    }

    #[tokio::test]
    async fn test_dry_run_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().to_str().unwrap();
        let cli = parse(&["publish", "--dry-run", "--workdir", workdir]);

        assert_eq!(execute(cli).await.unwrap(), 0);
        assert!(!dir.path().join("docs").exists());
    }

    /// Writes `json` to a config file in `dir` and returns its path.
    fn write_config(dir: &std::path::Path, json: &str) -> String {
        let path = dir.join("docflow.json");
        std::fs::write(&path, json).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_returns_zero_on_success() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.md"), "# Index\n").unwrap();
        let config = write_config(dir.path(), r#"{"runtime": "true"}"#);
        let workdir = dir.path().to_str().unwrap();

        let cli = parse(&["local", "--config", config.as_str(), "--workdir", workdir]);

        assert_eq!(execute(cli).await.unwrap(), 0);
        assert!(dir.path().join("docs_ex/php/index.md").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_returns_one_on_stage_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        let config = write_config(dir.path(), r#"{"runtime": "false"}"#);
        let workdir = dir.path().to_str().unwrap();

        let cli = parse(&["local", "--config", config.as_str(), "--workdir", workdir]);

        assert_eq!(execute(cli).await.unwrap(), 1);
        assert!(!dir.path().join("docs_ex").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_returns_one_when_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().to_str().unwrap();

        let cli = parse(&["publish", "--workdir", workdir, "--schema-cmd", "false"]);

        assert_eq!(execute(cli).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), r#"{"schema_command": []}"#);
        let workdir = dir.path().to_str().unwrap();

        let cli = parse(&["publish", "--config", config.as_str(), "--workdir", workdir]);
        let err = execute(cli).await.unwrap_err();

        assert!(err.to_string().contains("Invalid configuration for the publish pipeline"));
    }

    #[tokio::test]
    async fn test_execute_rejects_malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), r#"{"runtime": "#);

        let cli = parse(&["local", "--config", config.as_str()]);

        assert!(execute(cli).await.is_err());
    }
}
