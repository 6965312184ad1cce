//! Condensed project summary
//!
//! The summary is lossy: counts and bounded samples instead of
//! full block dumps, so the prompt stays bounded regardless of project size.

use guide_project::{ProjectMeta, ProjectModel, Target};
use serde::{Deserialize, Serialize};

/// Bounds applied when summarizing a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Maximum targets described individually
    pub max_targets: usize,
    /// Opcodes sampled per target
    pub opcode_sample_size: usize,
    /// Rendered script characters shared by all targets
    pub script_excerpt_chars: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_targets: 64,
            opcode_sample_size: 10,
            script_excerpt_chars: 4000,
        }
    }
}

/// Sampled block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSample {
    /// Opcode token
    pub opcode: String,
}

/// Summary of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummary {
    pub name: String,
    pub is_stage: bool,
    pub block_count: usize,
    pub script_count: usize,
    pub block_sample: Vec<BlockSample>,
    pub variable_count: usize,
    pub list_count: usize,
    pub costume_count: usize,
    pub sound_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_excerpt: Option<String>,
}

/// Summary of a whole project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProjectMeta>,
    pub targets: Vec<TargetSummary>,
    /// Targets left out because of `max_targets`
    pub omitted_targets: usize,
    pub extensions: Vec<String>,
}

impl ProjectSummary {
    /// Summarize a project within the given bounds
    #[must_use]
    pub fn build(project: &ProjectModel, options: &SummaryOptions) -> Self {
        let total = project.sprites.len() + 1;
        let mut budget = options.script_excerpt_chars;

        let targets = project
            .targets()
            .take(options.max_targets)
            .map(|target| summarize_target(target, options, &mut budget))
            .collect::<Vec<_>>();
        let omitted_targets = total - targets.len();

        if omitted_targets > 0 {
            tracing::debug!(omitted = omitted_targets, "summary truncated targets");
        }

        Self {
            meta: project.meta.clone(),
            targets,
            omitted_targets,
            extensions: project.extensions.clone(),
        }
    }
}

fn summarize_target(target: &Target, options: &SummaryOptions, budget: &mut usize) -> TargetSummary {
    let block_sample = target
        .opcode_sample
        .iter()
        .take(options.opcode_sample_size)
        .map(|opcode| BlockSample {
            opcode: opcode.clone(),
        })
        .collect();

    TargetSummary {
        name: target.name.clone(),
        is_stage: target.is_stage,
        block_count: target.block_count,
        script_count: target.script_count(),
        block_sample,
        variable_count: target.variable_count,
        list_count: target.list_count,
        costume_count: target.costumes.len(),
        sound_count: target.sounds.len(),
        script_excerpt: excerpt(&target.scripts, budget),
    }
}

/// Take whole characters from the joined scripts until the budget runs out
fn excerpt(scripts: &[String], budget: &mut usize) -> Option<String> {
    if scripts.is_empty() || *budget == 0 {
        return None;
    }

    let joined = scripts.join("\n\n");
    let text: String = joined.chars().take(*budget).collect();
    *budget -= text.chars().count();
    Some(text)
}
