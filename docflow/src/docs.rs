//! Assembly of the documentation pipelines.
//!
//! Both variants share one code path: the configuration decides whether a
//! schema stage runs first and whether the destination is cleared.

use crate::config::{DocsConfig, Variant};
use crate::errors::DocflowError;
use crate::events::EventSink;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{CommandStage, CopyStage};
use std::sync::Arc;
use tracing::debug;

/// Name of the stage that regenerates the schema.
pub const SCHEMA_STAGE: &str = "generate-schema";
/// Name of the stage that runs the documentation generator.
pub const GENERATE_STAGE: &str = "generate-docs";
/// Name of the stage that copies the generated docs to their destination.
pub const COPY_STAGE: &str = "copy-docs";

/// Builds the pipeline for `variant` from a configuration.
///
/// The configuration is validated first. Stages, in order:
/// 1. `generate-schema`, only when a schema command is configured
/// 2. `generate-docs`, the containerized generator
/// 3. `copy-docs`, output directory to destination
///
/// # Errors
///
/// Returns a configuration error for an invalid configuration, or a
/// validation error if the pipeline cannot be built.
pub fn build_pipeline(
    config: &DocsConfig,
    variant: Variant,
    sink: Arc<dyn EventSink>,
) -> Result<Pipeline, DocflowError> {
    config.validate(variant)?;

    let mut builder = PipelineBuilder::new(variant.to_string()).with_event_sink(sink);

    if let Some(argv) = &config.schema_command {
        let schema = CommandStage::from_argv(SCHEMA_STAGE, argv)?
            .with_working_dir(&config.working_dir);
        builder.add_stage(Arc::new(schema))?;
    }

    let generate = CommandStage::new(GENERATE_STAGE, config.runtime.clone())
        .with_args(config.generator_args())
        .with_working_dir(&config.working_dir);
    builder.add_stage(Arc::new(generate))?;

    let copy = CopyStage::new(COPY_STAGE, config.output_path(), config.destination_path())
        .clear_destination(config.clear_destination);
    builder.add_stage(Arc::new(copy))?;

    let pipeline = builder.build()?;
    debug!(pipeline = %pipeline.name(), stages = ?pipeline.stage_names(), "Pipeline assembled");
    Ok(pipeline)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::StageStatus;
    use crate::events::CollectingEventSink;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn sink() -> Arc<dyn EventSink> {
        Arc::new(CollectingEventSink::new())
    }

    fn config_in(dir: &Path, variant: Variant) -> DocsConfig {
        DocsConfig {
            working_dir: dir.to_path_buf(),
            ..DocsConfig::preset(variant)
        }
    }

    #[test]
    fn test_publish_pipeline_stages() {
        let config = config_in(Path::new("/repo"), Variant::Publish);
        let pipeline = build_pipeline(&config, Variant::Publish, sink()).unwrap();

        assert_eq!(pipeline.name(), "publish");
        assert_eq!(
            pipeline.stage_names(),
            vec![SCHEMA_STAGE, GENERATE_STAGE, COPY_STAGE]
        );
        assert_eq!(
            pipeline.plan(),
            vec![
                "generate-schema: ./generate_schema (in /repo)".to_string(),
                "generate-docs: docker run --rm -v /repo:/data phpdoc/phpdoc:3 \
                 --directory=src --target=docs \
                 --template=phpdocumentor-markdown-customised/themes/markdown \
                 '--title=Respectify PHP Library' -c phpdoc.xml (in /repo)"
                    .to_string(),
                "copy-docs: /repo/docs -> /repo/../respectify-docs/docs/php (clear, then copy)"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_local_pipeline_stages() {
        let config = config_in(Path::new("/repo"), Variant::Local);
        let pipeline = build_pipeline(&config, Variant::Local, sink()).unwrap();

        assert_eq!(pipeline.name(), "local");
        assert_eq!(pipeline.stage_names(), vec![GENERATE_STAGE, COPY_STAGE]);
        assert_eq!(
            pipeline.plan()[1],
            "copy-docs: /repo/docs -> /repo/docs_ex/php (merge)"
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DocsConfig {
            schema_command: None,
            ..config_in(Path::new("/repo"), Variant::Publish)
        };
        let err = build_pipeline(&config, Variant::Publish, sink()).unwrap_err();
        assert!(matches!(err, DocflowError::Config(_)));
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Uses `true`/`false` as the container runtime so nothing is launched.
    #[cfg(unix)]
    fn fake_runtime(config: DocsConfig, runtime: &str) -> DocsConfig {
        DocsConfig {
            runtime: runtime.to_string(),
            ..config
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_run_merges_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("docs/index.md"), "# Index\n");
        write(&root.join("docs_ex/php/keep.md"), "keep\n");

        let config = fake_runtime(config_in(root, Variant::Local), "true");
        let pipeline = build_pipeline(&config, Variant::Local, sink()).unwrap();
        let result = pipeline.run().await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(
            fs::read_to_string(root.join("docs_ex/php/index.md")).unwrap(),
            "# Index\n"
        );
        assert!(root.join("docs_ex/php/keep.md").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_publish_run_clears_destination() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root.join("docs/index.md"), "# Index\n");
        write(&dir.path().join("site/php/stale.md"), "stale\n");

        let config = DocsConfig {
            schema_command: Some(vec!["true".to_string()]),
            destination: PathBuf::from("../site/php"),
            ..fake_runtime(config_in(&root, Variant::Publish), "true")
        };
        let result = build_pipeline(&config, Variant::Publish, sink())
            .unwrap()
            .run()
            .await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(
            result.invoked_stages(),
            vec![SCHEMA_STAGE, GENERATE_STAGE, COPY_STAGE]
        );
        assert!(dir.path().join("site/php/index.md").exists());
        assert!(!dir.path().join("site/php/stale.md").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generator_failure_skips_copy() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("docs/index.md"), "# Index\n");

        let config = fake_runtime(config_in(root, Variant::Local), "false");
        let result = build_pipeline(&config, Variant::Local, sink())
            .unwrap()
            .run()
            .await;

        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.failed_stage(), Some(GENERATE_STAGE));
        assert_eq!(
            result.stage(COPY_STAGE).unwrap().status,
            StageStatus::Skipped
        );
        assert!(!root.join("docs_ex").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_schema_failure_skips_generation() {
        let dir = tempfile::tempdir().unwrap();
        let config = DocsConfig {
            schema_command: Some(vec!["false".to_string()]),
            ..fake_runtime(config_in(dir.path(), Variant::Publish), "true")
        };

        let result = build_pipeline(&config, Variant::Publish, sink())
            .unwrap()
            .run()
            .await;

        assert_eq!(result.failed_stage(), Some(SCHEMA_STAGE));
        assert_eq!(result.invoked_stages(), vec![SCHEMA_STAGE]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_output_fails_copy() {
        let dir = tempfile::tempdir().unwrap();
        let config = fake_runtime(config_in(dir.path(), Variant::Local), "true");

        let result = build_pipeline(&config, Variant::Local, sink())
            .unwrap()
            .run()
            .await;

        assert_eq!(result.failed_stage(), Some(COPY_STAGE));
        assert!(result.error.unwrap().contains("docs"));
    }
}
