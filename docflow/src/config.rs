//! Configuration for the documentation pipelines.
//!
//! Every value the build needs lives in [`DocsConfig`]. The two pipeline
//! variants are two presets of the same struct; a JSON file and command-line
//! flags can override individual fields through [`ConfigOverrides`].

use crate::errors::DocflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Regenerate the schema, generate docs, and replace the docs in the
    /// documentation site.
    Publish,
    /// Generate docs and merge them into a local directory.
    Local,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publish => write!(f, "publish"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Everything needed to build and relocate the documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Repository root; mounted into the container and used to resolve
    /// relative paths.
    pub working_dir: PathBuf,
    /// Container runtime program.
    pub runtime: String,
    /// Documentation generator image.
    pub image: String,
    /// Where `working_dir` is mounted inside the container.
    pub mount_point: String,
    /// Source directory, relative to `working_dir`.
    pub source_dir: PathBuf,
    /// Generator output directory, relative to `working_dir`.
    pub output_dir: PathBuf,
    /// Template passed to the generator.
    pub template: String,
    /// Title of the generated documentation.
    pub title: String,
    /// Generator configuration file, relative to `working_dir`.
    pub config_file: PathBuf,
    /// Where the generated docs end up. Relative paths resolve against
    /// `working_dir`.
    pub destination: PathBuf,
    /// Empty the destination before copying.
    pub clear_destination: bool,
    /// Schema generator command line, run before the docs are generated.
    pub schema_command: Option<Vec<String>>,
}

const DEFAULT_RUNTIME: &str = "docker";
const DEFAULT_IMAGE: &str = "phpdoc/phpdoc:3";
const DEFAULT_MOUNT_POINT: &str = "/data";
const DEFAULT_TEMPLATE: &str = "phpdocumentor-markdown-customised/themes/markdown";
const DEFAULT_TITLE: &str = "Respectify PHP Library";
const LOCAL_DESTINATION: &str = "docs_ex/php";
const PUBLISH_DESTINATION: &str = "../respectify-docs/docs/php";
const PUBLISH_SCHEMA_COMMAND: &str = "./generate_schema";

impl DocsConfig {
    /// Returns the built-in configuration for a variant.
    #[must_use]
    pub fn preset(variant: Variant) -> Self {
        let base = Self {
            working_dir: PathBuf::from("."),
            runtime: DEFAULT_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("docs"),
            template: DEFAULT_TEMPLATE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            config_file: PathBuf::from("phpdoc.xml"),
            destination: PathBuf::from(LOCAL_DESTINATION),
            clear_destination: false,
            schema_command: None,
        };

        match variant {
            Variant::Local => base,
            Variant::Publish => Self {
                destination: PathBuf::from(PUBLISH_DESTINATION),
                clear_destination: true,
                schema_command: Some(vec![PUBLISH_SCHEMA_COMMAND.to_string()]),
                ..base
            },
        }
    }

    /// Applies overrides on top of this configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.apply(overrides);
        self
    }

    /// Applies overrides in place; unset fields are left alone.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            working_dir,
            runtime,
            image,
            mount_point,
            source_dir,
            output_dir,
            template,
            title,
            config_file,
            destination,
            clear_destination,
            schema_command,
        } = overrides;

        set(&mut self.working_dir, working_dir);
        set(&mut self.runtime, runtime);
        set(&mut self.image, image);
        set(&mut self.mount_point, mount_point);
        set(&mut self.source_dir, source_dir);
        set(&mut self.output_dir, output_dir);
        set(&mut self.template, template);
        set(&mut self.title, title);
        set(&mut self.config_file, config_file);
        set(&mut self.destination, destination);
        set(&mut self.clear_destination, clear_destination);
        if schema_command.is_some() {
            self.schema_command = schema_command;
        }
    }

    /// Overlays the fields set in a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a parse error for
    /// malformed JSON or unknown fields.
    pub fn merge_json(&mut self, path: &Path) -> Result<(), DocflowError> {
        let overrides = ConfigOverrides::from_json_file(path)?;
        debug!(path = %path.display(), ?overrides, "Merging config file");
        self.apply(overrides);
        Ok(())
    }

    /// Checks that the configuration can drive the given variant.
    ///
    /// # Errors
    ///
    /// Returns [`DocflowError::Config`] naming the first invalid field.
    pub fn validate(&self, variant: Variant) -> Result<(), DocflowError> {
        require("runtime", &self.runtime)?;
        require("image", &self.image)?;
        require("mount_point", &self.mount_point)?;
        require("template", &self.template)?;
        require("title", &self.title)?;

        for (field, path) in [
            ("source_dir", &self.source_dir),
            ("output_dir", &self.output_dir),
            ("config_file", &self.config_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(DocflowError::Config(format!("{field} must not be empty")));
            }
            if path.is_absolute() {
                return Err(DocflowError::Config(format!(
                    "{field} must be relative to working_dir, got {}",
                    path.display()
                )));
            }
        }

        if self.destination.as_os_str().is_empty() {
            return Err(DocflowError::Config("destination must not be empty".to_string()));
        }

        match (&self.schema_command, variant) {
            (Some(argv), _) if argv.first().map_or(true, |p| p.trim().is_empty()) => Err(
                DocflowError::Config("schema_command must name a program".to_string()),
            ),
            (None, Variant::Publish) => Err(DocflowError::Config(
                "the publish pipeline needs a schema_command".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Returns the directory the generator writes to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_dir)
    }

    /// Returns the destination, resolved against `working_dir`.
    #[must_use]
    pub fn destination_path(&self) -> PathBuf {
        self.working_dir.join(&self.destination)
    }

    /// Returns the container runtime arguments that run the generator.
    #[must_use]
    pub fn generator_args(&self) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{}", self.working_dir.display(), self.mount_point),
            self.image.clone(),
            format!("--directory={}", self.source_dir.display()),
            format!("--target={}", self.output_dir.display()),
            format!("--template={}", self.template),
            format!("--title={}", self.title),
            "-c".to_string(),
            self.config_file.display().to_string(),
        ]
    }

    /// Makes `working_dir` absolute so it can be used as a bind mount.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the current directory cannot be determined.
    pub fn resolve_working_dir(mut self) -> Result<Self, DocflowError> {
        if self.working_dir.is_relative() {
            let cwd = std::env::current_dir().map_err(|e| DocflowError::io(".", e))?;
            self.working_dir = normalize(&cwd.join(&self.working_dir));
        }
        Ok(self)
    }
}

/// Drops `.` components so mounts read `/repo` instead of `/repo/.`.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn require(field: &str, value: &str) -> Result<(), DocflowError> {
    if value.trim().is_empty() {
        return Err(DocflowError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Partial configuration; every set field replaces the preset's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// See [`DocsConfig::working_dir`].
    pub working_dir: Option<PathBuf>,
    /// See [`DocsConfig::runtime`].
    pub runtime: Option<String>,
    /// See [`DocsConfig::image`].
    pub image: Option<String>,
    /// See [`DocsConfig::mount_point`].
    pub mount_point: Option<String>,
    /// See [`DocsConfig::source_dir`].
    pub source_dir: Option<PathBuf>,
    /// See [`DocsConfig::output_dir`].
    pub output_dir: Option<PathBuf>,
    /// See [`DocsConfig::template`].
    pub template: Option<String>,
    /// See [`DocsConfig::title`].
    pub title: Option<String>,
    /// See [`DocsConfig::config_file`].
    pub config_file: Option<PathBuf>,
    /// See [`DocsConfig::destination`].
    pub destination: Option<PathBuf>,
    /// See [`DocsConfig::clear_destination`].
    pub clear_destination: Option<bool>,
    /// See [`DocsConfig::schema_command`].
    pub schema_command: Option<Vec<String>>,
}

impl ConfigOverrides {
    /// Parses overrides from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DocflowError::ConfigParse`] for malformed JSON or unknown
    /// fields.
    pub fn from_json_str(json: &str) -> Result<Self, DocflowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads overrides from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a parse error.
    pub fn from_json_file(path: &Path) -> Result<Self, DocflowError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocflowError::io(path, e))?;
        Self::from_json_str(&text)
    }
}
