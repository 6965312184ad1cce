//! Per-invocation tutorial pipeline
//!
//! archive bytes → [`IngestedProject`] (archive, model, catalog) → tutorial
//!
//! Ingestion fails fast. Synthesis failures never discard the ingested
//! project: [`TutorialPipeline::run`] returns both halves separately.

use crate::cache::ProjectCache;
use crate::config::GuideConfig;
use crate::error::{PipelineError, PipelineResult};
use guide_archive::{extract_all, extract_one, Archive, ArchiveDigest, AssetPackage};
use guide_project::{AssetCatalog, ProjectBuilder, ProjectModel};
use guide_tutorial::{
    GenerationRequest, GenerativeModel, ModelError, Tutorial, TutorialError, TutorialSynthesizer,
    TutorialValidator,
};
use std::sync::Arc;

/// Stand-in for pipelines that only ingest and deliver assets
#[derive(Debug, Clone, Copy)]
struct NoModel;

#[async_trait::async_trait]
impl GenerativeModel for NoModel {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, ModelError> {
        Err(ModelError::Config("no generative model configured".to_string()))
    }
}

/// Structural result of ingesting one archive
#[derive(Debug)]
pub struct IngestedProject {
    pub digest: ArchiveDigest,
    pub archive: Archive,
    pub project: ProjectModel,
    pub catalog: AssetCatalog,
}

impl IngestedProject {
    /// Open, parse, and catalog an archive synchronously
    ///
    /// # Errors
    /// Returns error if the archive is unreadable or the manifest is invalid
    pub fn load(bytes: Vec<u8>, limit: usize, builder: &ProjectBuilder) -> PipelineResult<Self> {
        let archive = Archive::open_with_limit(bytes, limit)?;
        let project = builder.from_archive(&archive)?;
        let catalog = AssetCatalog::from_project(&project);

        tracing::info!(
            digest = %archive.digest().short(),
            sprites = project.sprites.len(),
            scripts = project.script_count(),
            assets = catalog.len(),
            "ingested project"
        );

        Ok(Self {
            digest: archive.digest(),
            archive,
            project,
            catalog,
        })
    }
}

/// Outcome of a full run
///
/// The project is always present; the tutorial may have failed.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub project: Arc<IngestedProject>,
    pub tutorial: Result<Tutorial, TutorialError>,
}

impl PipelineOutcome {
    /// Check if a tutorial was produced
    #[inline]
    #[must_use]
    pub fn has_tutorial(&self) -> bool {
        self.tutorial.is_ok()
    }
}

/// Ingestion and synthesis for uploaded projects
///
/// Each instance owns its cache; separate pipelines share nothing.
pub struct TutorialPipeline {
    config: GuideConfig,
    builder: ProjectBuilder,
    synthesizer: TutorialSynthesizer,
    cache: ProjectCache,
}

impl std::fmt::Debug for TutorialPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialPipeline")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TutorialPipeline {
    /// Create pipeline over a generative model
    ///
    /// # Errors
    /// - `PipelineError::Config` if the configuration is out of range
    /// - `PipelineError::Tutorial` if the tutorial schema fails to compile
    pub fn new(config: GuideConfig, model: Arc<dyn GenerativeModel>) -> PipelineResult<Self> {
        config.validate()?;

        let builder = config.project_builder();
        let synthesizer = TutorialSynthesizer::new(model, config.synthesis_options())?;
        let cache = ProjectCache::new(config.cache_capacity);

        Ok(Self {
            config,
            builder,
            synthesizer,
            cache,
        })
    }

    /// Create pipeline without a generative model
    ///
    /// Ingestion and asset delivery work as usual; synthesis always reports
    /// `TutorialError::SynthesisUnavailable`.
    ///
    /// # Errors
    /// Same as [`TutorialPipeline::new`]
    pub fn offline(config: GuideConfig) -> PipelineResult<Self> {
        Self::new(config, Arc::new(NoModel))
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    /// Project cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    /// Validator sharing the synthesizer's schema
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &TutorialValidator {
        self.synthesizer.validator()
    }

    /// Ingest archive bytes
    ///
    /// Parsing runs on the blocking pool. Identical bytes are parsed once
    /// per pipeline.
    ///
    /// # Errors
    /// - `PipelineError::Archive` if the archive or manifest is unreadable
    /// - `PipelineError::Project` if the manifest has the wrong shape
    /// - `PipelineError::TaskFailed` if the blocking task panicked
    /// - `PipelineError::Shared` wrapping one of the above for callers that
    ///   waited on a concurrent ingestion of the same bytes
    pub async fn ingest(&self, bytes: Vec<u8>) -> PipelineResult<Arc<IngestedProject>> {
        let digest = ArchiveDigest::compute(&bytes);
        let limit = self.config.archive.max_archive_bytes;
        let builder = self.builder.clone();

        self.cache
            .try_get_or_insert_with(digest, || async move {
                tokio::task::spawn_blocking(move || IngestedProject::load(bytes, limit, &builder))
                    .await
                    .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
            })
            .await
            .map_err(PipelineError::from_shared)
    }

    /// Synthesize a tutorial for an ingested project
    ///
    /// # Errors
    /// `PipelineError::Tutorial` on synthesis or validation failure
    pub async fn synthesize(&self, ingested: &IngestedProject) -> PipelineResult<Tutorial> {
        Ok(self.synthesizer.synthesize(&ingested.project).await?)
    }

    /// Ingest then synthesize
    ///
    /// # Errors
    /// Only ingestion failures; synthesis failures land in
    /// [`PipelineOutcome::tutorial`]
    pub async fn run(&self, bytes: Vec<u8>) -> PipelineResult<PipelineOutcome> {
        let project = self.ingest(bytes).await?;
        let tutorial = self.synthesizer.synthesize(&project.project).await;

        if let Err(e) = &tutorial {
            tracing::warn!(
                digest = %project.digest.short(),
                error = %e,
                "tutorial unavailable, structural data kept"
            );
        }

        Ok(PipelineOutcome { project, tutorial })
    }

    /// Extract one catalogued asset
    ///
    /// # Errors
    /// - `PipelineError::UnknownAsset` if `md5ext` is not in the catalog
    /// - `PipelineError::Archive` if the archive has no matching entry
    pub async fn extract_asset(
        &self,
        ingested: &Arc<IngestedProject>,
        md5ext: &str,
    ) -> PipelineResult<Vec<u8>> {
        if ingested.catalog.get(md5ext).is_none() {
            return Err(PipelineError::UnknownAsset(md5ext.to_string()));
        }

        let ingested = Arc::clone(ingested);
        let key = md5ext.to_string();
        tokio::task::spawn_blocking(move || -> PipelineResult<Vec<u8>> {
            let entry = ingested
                .catalog
                .get(&key)
                .ok_or_else(|| PipelineError::UnknownAsset(key.clone()))?;
            Ok(extract_one(&ingested.archive, entry)?)
        })
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
    }

    /// Package every catalogued asset, skipping unresolvable ones
    ///
    /// # Errors
    /// `PipelineError::Archive` only if the package itself cannot be written
    pub async fn extract_all_assets(
        &self,
        ingested: &Arc<IngestedProject>,
    ) -> PipelineResult<AssetPackage> {
        let ingested = Arc::clone(ingested);
        tokio::task::spawn_blocking(move || -> PipelineResult<AssetPackage> {
            Ok(extract_all(&ingested.archive, ingested.catalog.iter())?)
        })
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
    }
}
