//! Subcommand implementations
//!
//! Each command writes its primary output to the given writer and status
//! lines to stderr.

use anyhow::{bail, Context};
use guide_core::{GuideConfig, IngestedProject, TutorialPipeline};
use guide_project::{AssetCatalog, ProjectModel};
use guide_tutorial::{
    format_for_export, DocumentExporter, GenerativeModel, PlaceholderExporter, TutorialError,
    TutorialValidator,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Required input extension
pub const SB3_EXTENSION: &str = "sb3";

/// Reject inputs that are not `.sb3` files
///
/// # Errors
/// Returns error if the extension is missing or different
pub fn ensure_sb3(path: &Path) -> anyhow::Result<()> {
    let ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SB3_EXTENSION));
    if !ok {
        bail!("{} is not a .sb3 file", path.display());
    }
    Ok(())
}

/// Load configuration and apply the command-line timeout
///
/// # Errors
/// Returns error if the config file is unreadable or invalid
pub fn load_config(path: Option<&Path>, timeout: Option<u64>) -> anyhow::Result<GuideConfig> {
    let mut config = GuideConfig::load(path)?;
    if let Some(secs) = timeout {
        config = config.with_timeout_secs(secs);
        config.validate()?;
    }
    Ok(config)
}

async fn read_sb3(path: &Path) -> anyhow::Result<Vec<u8>> {
    ensure_sb3(path)?;
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn ingest(pipeline: &TutorialPipeline, path: &Path) -> anyhow::Result<Arc<IngestedProject>> {
    let bytes = read_sb3(path).await?;
    pipeline
        .ingest(bytes)
        .await
        .with_context(|| format!("failed to open {}", path.display()))
}

fn project_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "project".to_string(), |s| s.to_string_lossy().into_owned())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport<'a> {
    name: String,
    digest: String,
    project: &'a ProjectModel,
    catalog: &'a AssetCatalog,
}

/// `inspect`: print targets, scripts, and assets
///
/// # Errors
/// Returns error if the archive cannot be ingested
pub async fn inspect(
    file: &Path,
    json: bool,
    config: Option<&Path>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let pipeline = TutorialPipeline::offline(load_config(config, None)?)?;
    let ingested = ingest(&pipeline, file).await?;

    if json {
        let report = InspectReport {
            name: project_name(file),
            digest: ingested.digest.to_string(),
            project: &ingested.project,
            catalog: &ingested.catalog,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    write_inspect_text(&project_name(file), &ingested, out)?;
    Ok(())
}

fn write_inspect_text(
    name: &str,
    ingested: &IngestedProject,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let project = &ingested.project;
    writeln!(out, "Project: {name}")?;
    writeln!(out, "Digest: {}", ingested.digest.short())?;
    writeln!(
        out,
        "Sprites: {}, scripts: {}, blocks: {}, assets: {}",
        project.sprites.len(),
        project.script_count(),
        project.block_count(),
        ingested.catalog.len()
    )?;
    if !project.extensions.is_empty() {
        writeln!(out, "Extensions: {}", project.extensions.join(", "))?;
    }

    for target in project.targets() {
        let kind = if target.is_stage { "stage" } else { "sprite" };
        writeln!(out, "\n== {} ({kind}) ==", target.name)?;
        writeln!(
            out,
            "costumes: {}, sounds: {}, variables: {}, lists: {}",
            target.costumes.len(),
            target.sounds.len(),
            target.variable_count,
            target.list_count
        )?;
        if target.scripts.is_empty() {
            writeln!(out, "(no scripts)")?;
        }
        for (index, script) in target.scripts.iter().enumerate() {
            writeln!(out, "\n-- script {} --", index + 1)?;
            writeln!(out, "{script}")?;
        }
    }

    if !ingested.catalog.is_empty() {
        writeln!(out, "\nAssets:")?;
        for entry in &ingested.catalog {
            writeln!(out, "  {:<5}  {}  {}", entry.asset_type, entry.md5ext, entry.name)?;
        }
    }
    Ok(())
}

/// `tutorial`: synthesize, validate, and emit a tutorial
///
/// # Errors
/// Returns error if ingestion fails or no valid tutorial is produced
pub async fn tutorial(
    file: &Path,
    config: GuideConfig,
    model: Arc<dyn GenerativeModel>,
    out_path: Option<&Path>,
    export: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let pipeline = TutorialPipeline::new(config, model)?;
    let bytes = read_sb3(file).await?;
    let outcome = pipeline
        .run(bytes)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;

    let tutorial = match outcome.tutorial {
        Ok(tutorial) => tutorial,
        Err(e) => {
            eprintln!(
                "project parsed ({} sprites, {} assets) but no tutorial was produced",
                outcome.project.project.sprites.len(),
                outcome.project.catalog.len()
            );
            report_violations(&e);
            return Err(e).context("tutorial synthesis failed");
        }
    };

    let json = serde_json::to_string_pretty(&tutorial)?;
    match out_path {
        Some(path) => {
            tokio::fs::write(path, format!("{json}\n"))
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote tutorial with {} steps to {}", tutorial.step_count(), path.display());
        }
        None => writeln!(out, "{json}")?,
    }

    if export {
        let text = format_for_export(&project_name(file), &tutorial, &outcome.project.catalog)?;
        let document = PlaceholderExporter.export(&text).await?;
        eprintln!("exported document {}", document.document_id);
    }
    Ok(())
}

fn report_violations(err: &TutorialError) {
    for violation in err.violations() {
        eprintln!("  {violation}");
    }
}

/// `extract`: write one asset to a file
///
/// # Errors
/// Returns error if the asset is unknown or missing from the archive
pub async fn extract(file: &Path, md5ext: &str, out_path: &Path) -> anyhow::Result<()> {
    let pipeline = TutorialPipeline::offline(load_config(None, None)?)?;
    let ingested = ingest(&pipeline, file).await?;

    let bytes = pipeline.extract_asset(&ingested, md5ext).await?;
    tokio::fs::write(out_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    eprintln!("wrote {} bytes to {}", bytes.len(), out_path.display());
    Ok(())
}

/// `extract-all`: package every resolvable asset
///
/// # Errors
/// Returns error if the archive cannot be ingested or the package written
pub async fn extract_all(file: &Path, out_path: &Path) -> anyhow::Result<()> {
    let pipeline = TutorialPipeline::offline(load_config(None, None)?)?;
    let ingested = ingest(&pipeline, file).await?;

    let package = pipeline.extract_all_assets(&ingested).await?;
    tokio::fs::write(out_path, &package.bytes)
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    eprintln!(
        "packaged {} assets into {}",
        package.included.len(),
        out_path.display()
    );
    for key in &package.omitted {
        eprintln!("  omitted {key}");
    }
    Ok(())
}

/// `validate`: check a saved raw model response
///
/// # Errors
/// Returns error if the file is unreadable or the response is rejected
pub async fn validate(response: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(response)
        .await
        .with_context(|| format!("failed to read {}", response.display()))?;
    let validator = TutorialValidator::new()?;

    match validator.validate_text(&raw) {
        Ok(tutorial) => {
            writeln!(out, "valid tutorial with {} steps", tutorial.step_count())?;
            Ok(())
        }
        Err(e) => {
            for violation in e.violations() {
                writeln!(out, "{violation}")?;
            }
            Err(e).context(format!("{} does not match the tutorial schema", response.display()))
        }
    }
}
