//! End-to-end pipeline tests over in-memory archives

use guide_archive::ArchiveError;
use guide_core::{ConfigError, GuideConfig, PipelineError, TutorialPipeline};
use guide_test_utils::{
    cat_project, DelayedModel, FailingModel, FixedModel, Sb3Builder, TargetFixture, CAT_TUTORIAL,
};
use guide_tutorial::{TargetType, TutorialError};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn pipeline_with(model: Arc<dyn guide_tutorial::GenerativeModel>) -> TutorialPipeline {
    TutorialPipeline::new(GuideConfig::default(), model).unwrap()
}

#[tokio::test]
async fn test_run_produces_project_and_tutorial() {
    let model = FixedModel::shared(CAT_TUTORIAL);
    let pipeline = pipeline_with(model.clone());

    let outcome = pipeline.run(cat_project().build()).await.unwrap();

    let project = &outcome.project.project;
    assert_eq!(project.sprites[0].name, "Cat");
    assert_eq!(project.sprites[0].scripts, vec!["when flag clicked\nmove (10) steps"]);
    assert!(project.stage.scripts.is_empty());
    assert_eq!(outcome.project.catalog.len(), 2);

    let tutorial = outcome.tutorial.unwrap();
    assert_eq!(tutorial.steps[0].target.target_type, TargetType::Sprite);
    assert_eq!(tutorial.steps[0].target.target_name, "Cat");
    assert_eq!(model.calls(), 1);

    let request = model.last_request().unwrap();
    assert!(request.user_prompt.contains("\"Cat\""));
    assert!(request.json_mode);
}

#[tokio::test]
async fn test_identical_bytes_are_ingested_once() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let bytes = cat_project().build();

    let first = pipeline.ingest(bytes.clone()).await.unwrap();
    let second = pipeline.ingest(bytes).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    pipeline.cache().sync().await;
    assert_eq!(pipeline.cache().entry_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_uploads_share_one_parse() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let bytes = cat_project().build();

    let (a, b, c, d) = tokio::join!(
        pipeline.ingest(bytes.clone()),
        pipeline.ingest(bytes.clone()),
        pipeline.ingest(bytes.clone()),
        pipeline.ingest(bytes),
    );
    let first = a.unwrap();
    for other in [b.unwrap(), c.unwrap(), d.unwrap()] {
        assert!(Arc::ptr_eq(&first, &other));
    }
    pipeline.cache().sync().await;
    assert_eq!(pipeline.cache().entry_count(), 1);
}

#[tokio::test]
async fn test_pipelines_do_not_share_cache() {
    let bytes = cat_project().build();
    let a = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let b = pipeline_with(FixedModel::shared(CAT_TUTORIAL));

    let from_a = a.ingest(bytes.clone()).await.unwrap();
    assert!(!b.cache().contains(&from_a.digest));

    let from_b = b.ingest(bytes).await.unwrap();
    assert!(!Arc::ptr_eq(&from_a, &from_b));
    assert_eq!(from_a.digest, from_b.digest);
}

#[tokio::test]
async fn test_corrupt_archive_fails_fast() {
    let model = FixedModel::shared(CAT_TUTORIAL);
    let pipeline = pipeline_with(model.clone());

    let err = pipeline.run(b"definitely not a zip".to_vec()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Archive(ArchiveError::Corrupt(_))));
    assert!(!err.keeps_project());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_missing_manifest_is_an_archive_error() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let bytes = cat_project().without_manifest().build();

    let err = pipeline.ingest(bytes).await.unwrap_err();
    assert!(matches!(err, PipelineError::Archive(ArchiveError::ManifestMissing(_))));
}

#[tokio::test]
async fn test_manifest_with_wrong_shape_is_a_project_error() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let bytes = Sb3Builder::new().raw_manifest(b"[1, 2, 3]").build();

    let err = pipeline.ingest(bytes).await.unwrap_err();
    assert!(matches!(err, PipelineError::Project(_)));
}

#[tokio::test]
async fn test_oversized_archive_is_rejected() {
    let config = GuideConfig::default().with_max_archive_bytes(16);
    let pipeline = TutorialPipeline::new(config, FixedModel::shared(CAT_TUTORIAL)).unwrap();

    let err = pipeline.ingest(cat_project().build()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Archive(ArchiveError::TooLarge { limit: 16, .. })));
}

#[tokio::test]
async fn test_model_failure_keeps_structural_data() {
    let model = Arc::new(FailingModel::new(503));
    let pipeline = pipeline_with(model.clone());

    let outcome = pipeline.run(cat_project().build()).await.unwrap();

    assert!(!outcome.has_tutorial());
    assert!(matches!(outcome.tutorial, Err(TutorialError::SynthesisUnavailable(_))));
    assert_eq!(outcome.project.catalog.len(), 2);
    assert_eq!(model.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_model_times_out() {
    let config = GuideConfig::default().with_timeout_secs(1);
    let model = Arc::new(DelayedModel::new(Duration::from_secs(120), CAT_TUTORIAL));
    let pipeline = TutorialPipeline::new(config, model).unwrap();

    let ingested = pipeline.ingest(cat_project().build()).await.unwrap();
    let err = pipeline.synthesize(&ingested).await.unwrap_err();

    assert!(matches!(err, PipelineError::Tutorial(TutorialError::SynthesisUnavailable(_))));
    assert!(err.is_retryable());
    assert!(err.keeps_project());
}

#[tokio::test]
async fn test_prose_reply_is_a_schema_violation() {
    let pipeline = pipeline_with(FixedModel::shared("Here is a great tutorial about cats!"));

    let ingested = pipeline.ingest(cat_project().build()).await.unwrap();
    let err = pipeline.synthesize(&ingested).await.unwrap_err();

    assert!(matches!(err, PipelineError::Tutorial(TutorialError::SchemaViolation { .. })));
    assert!(!err.is_retryable());
    assert!(err.keeps_project());
}

#[tokio::test]
async fn test_extracts_catalogued_asset() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let ingested = pipeline.ingest(cat_project().build()).await.unwrap();

    let bytes = pipeline.extract_asset(&ingested, "meow01.wav").await.unwrap();
    assert_eq!(bytes, b"RIFF....WAVEfmt ");
}

#[tokio::test]
async fn test_unknown_asset_is_rejected() {
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let ingested = pipeline.ingest(cat_project().build()).await.unwrap();

    let err = pipeline.extract_asset(&ingested, "nope.png").await.unwrap_err();
    assert!(matches!(err, PipelineError::UnknownAsset(key) if key == "nope.png"));
}

#[tokio::test]
async fn test_catalogued_but_absent_asset_is_strict_failure() {
    let bytes = Sb3Builder::new()
        .target(TargetFixture::stage())
        .target(TargetFixture::sprite("Cat").costume("costume1", "lost00.png"))
        .build();
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let ingested = pipeline.ingest(bytes).await.unwrap();

    let err = pipeline.extract_asset(&ingested, "lost00.png").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Archive(ArchiveError::AssetMissing { ref md5ext }) if md5ext == "lost00.png"
    ));
}

#[tokio::test]
async fn test_bulk_extraction_skips_absent_assets() {
    let bytes = Sb3Builder::new()
        .target(TargetFixture::stage().costume("backdrop1", "abc123.svg"))
        .target(TargetFixture::sprite("Cat").sound("Meow", "meow01.wav"))
        .asset("abc123.svg", b"<svg/>")
        .build();
    let pipeline = pipeline_with(FixedModel::shared(CAT_TUTORIAL));
    let ingested = pipeline.ingest(bytes).await.unwrap();

    let package = pipeline.extract_all_assets(&ingested).await.unwrap();

    assert_eq!(package.included, vec!["backdrop1.svg"]);
    assert_eq!(package.omitted, vec!["meow01.wav"]);
}

#[test]
fn test_invalid_config_is_rejected_at_construction() {
    let config = GuideConfig::default().with_timeout_secs(0);
    let err = TutorialPipeline::new(config, FixedModel::shared(CAT_TUTORIAL)).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::Invalid(_))));
}

#[test]
fn test_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.toml");
    std::fs::write(&path, "cache_capacity = 2\n\n[render]\nindent = \"\\t\"\n").unwrap();

    let config = GuideConfig::load(Some(&path)).unwrap();
    assert_eq!(config.cache_capacity, 2);
    assert_eq!(config.render.indent, "\t");
}

#[test]
fn test_missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GuideConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[tokio::test]
async fn test_offline_pipeline_ingests_but_cannot_synthesize() {
    let pipeline = TutorialPipeline::offline(GuideConfig::default()).unwrap();

    let outcome = pipeline.run(cat_project().build()).await.unwrap();

    assert_eq!(outcome.project.project.sprites.len(), 1);
    assert!(matches!(outcome.tutorial, Err(TutorialError::SynthesisUnavailable(_))));
}
