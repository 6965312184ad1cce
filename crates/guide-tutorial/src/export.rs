//! Document export boundary
//!
//! The exporter accepts one flat text blob and returns a document id. The
//! only implementation here is a placeholder.

use crate::error::ExportError;
use crate::schema::Tutorial;
use guide_project::AssetCatalog;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Identifier returned by [`PlaceholderExporter`]
pub const PLACEHOLDER_DOCUMENT_ID: &str = "test-document-id";

/// Result of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDocument {
    pub document_id: String,
}

/// External document sink
#[async_trait::async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Export a text blob
    ///
    /// # Errors
    /// `ExportError::Rejected` if the sink refuses the content
    async fn export(&self, content: &str) -> Result<ExportedDocument, ExportError>;
}

/// Exporter that stores nothing and returns a fixed id
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExporter;

#[async_trait::async_trait]
impl DocumentExporter for PlaceholderExporter {
    async fn export(&self, content: &str) -> Result<ExportedDocument, ExportError> {
        tracing::info!(chars = content.len(), "placeholder export");
        Ok(ExportedDocument {
            document_id: PLACEHOLDER_DOCUMENT_ID.to_string(),
        })
    }
}

/// Flatten a tutorial into exportable text
///
/// # Errors
/// `ExportError::Format` if the text cannot be assembled
pub fn format_for_export(
    project_name: &str,
    tutorial: &Tutorial,
    catalog: &AssetCatalog,
) -> Result<String, ExportError> {
    let mut out = String::new();
    write_export(&mut out, project_name, tutorial, catalog)?;
    Ok(out)
}

fn write_export(
    out: &mut impl Write,
    project_name: &str,
    tutorial: &Tutorial,
    catalog: &AssetCatalog,
) -> fmt::Result {
    writeln!(out, "Project Name: {project_name}\n")?;
    writeln!(out, "Description: {}\n", tutorial.description)?;

    if let Some(sprites) = tutorial.sprites.as_deref().filter(|s| !s.is_empty()) {
        writeln!(out, "Sprites:")?;
        for sprite in sprites {
            writeln!(out, "- {}: {}", sprite.name, sprite.description)?;
        }
        writeln!(out)?;
    }

    if !catalog.is_empty() {
        writeln!(out, "Resources:")?;
        for entry in catalog {
            writeln!(out, "- {} ({}, {})", entry.name, entry.asset_type, entry.md5ext)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Tutorial Steps:\n")?;
    for (index, step) in tutorial.steps.iter().enumerate() {
        writeln!(out, "Step {}: {}", index + 1, step.title)?;
        writeln!(
            out,
            "  Target: {} {}",
            step.target.target_type, step.target.target_name
        )?;
        for line in step.code.lines() {
            writeln!(out, "    {line}")?;
        }
        writeln!(out, "  {}\n", step.explanation)?;
    }

    let ideas = tutorial.extension_ideas();
    if !ideas.is_empty() {
        writeln!(out, "Extension Ideas:")?;
        for idea in ideas {
            writeln!(out, "- {idea}")?;
        }
    }
    Ok(())
}
