//! Project model builder
//!
//! Turns a decoded manifest into a [`ProjectModel`]:
//! - The manifest root must be an object; `targets` must be an array when present
//! - Costume/sound entries without `md5ext` are skipped
//! - The first stage wins; later stages are ignored
//! - No stage at all yields a synthetic empty one
//!
//! Block arenas live only for the duration of rendering.

use crate::blocks::BlockArena;
use crate::error::{ProjectError, ProjectResult};
use crate::model::{AssetRef, ProjectMeta, ProjectModel, Target, STAGE_NAME};
use crate::render::{RenderOptions, ScriptRenderer};
use guide_archive::Archive;
use serde_json::{Map, Value};

/// Default number of opcodes kept per target
pub const DEFAULT_OPCODE_SAMPLE: usize = 10;

/// Builds project models from manifests
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    render: RenderOptions,
    opcode_sample: usize,
}

impl ProjectBuilder {
    /// Create builder with default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            render: RenderOptions::default(),
            opcode_sample: DEFAULT_OPCODE_SAMPLE,
        }
    }

    /// Set render options
    #[inline]
    #[must_use]
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Set how many opcodes each target keeps as a sample
    #[inline]
    #[must_use]
    pub fn with_opcode_sample(mut self, size: usize) -> Self {
        self.opcode_sample = size;
        self
    }

    /// Read `project.json` from an archive and build the model
    ///
    /// # Errors
    /// - `ProjectError::Archive` if the manifest is missing or not JSON
    /// - `ProjectError::InvalidManifest` if the manifest has the wrong shape
    pub fn from_archive(&self, archive: &Archive) -> ProjectResult<ProjectModel> {
        let manifest = archive.manifest()?;
        self.build(&manifest)
    }

    /// Build the model from a decoded manifest
    ///
    /// # Errors
    /// `ProjectError::InvalidManifest` if the root is not an object or
    /// `targets` is not an array
    pub fn build(&self, manifest: &Value) -> ProjectResult<ProjectModel> {
        let root = manifest
            .as_object()
            .ok_or_else(|| ProjectError::invalid("manifest root is not an object"))?;

        let targets = match root.get("targets") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(ProjectError::invalid("`targets` is not an array")),
        };

        let mut stage: Option<Target> = None;
        let mut sprites = Vec::new();

        for (index, raw) in targets.iter().enumerate() {
            let Some(obj) = raw.as_object() else {
                tracing::warn!(index, "skipping target that is not an object");
                continue;
            };
            let target = self.build_target(obj, index);

            if !target.is_stage {
                sprites.push(target);
            } else if stage.is_none() {
                stage = Some(target);
            } else {
                tracing::warn!(name = %target.name, "ignoring additional stage");
            }
        }

        let project = ProjectModel {
            stage: stage.unwrap_or_else(Target::empty_stage),
            sprites,
            extensions: string_array(root.get("extensions")),
            meta: root
                .get("meta")
                .filter(|m| m.is_object())
                .and_then(|m| serde_json::from_value::<ProjectMeta>(m.clone()).ok()),
        };

        tracing::info!(
            sprites = project.sprites.len(),
            scripts = project.script_count(),
            blocks = project.block_count(),
            "built project model"
        );
        Ok(project)
    }

    fn build_target(&self, obj: &Map<String, Value>, index: usize) -> Target {
        let is_stage = obj.get("isStage").and_then(Value::as_bool).unwrap_or(false);
        let name = match obj.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None if is_stage => STAGE_NAME.to_string(),
            None => format!("Sprite{}", index + 1),
        };

        let arena = BlockArena::from_value(obj.get("blocks"));
        let scripts = ScriptRenderer::new(&arena, &self.render).render_all();

        let mut target = Target::new(name, is_stage);
        target.costumes = asset_refs(obj.get("costumes"), &target.name, "costume");
        target.sounds = asset_refs(obj.get("sounds"), &target.name, "sound");
        target.scripts = scripts;
        target.variable_count = object_len(obj.get("variables"));
        target.list_count = object_len(obj.get("lists"));
        target.block_count = arena.raw_count();
        target.opcode_sample = arena.opcode_sample(self.opcode_sample);

        tracing::debug!(
            name = %target.name,
            scripts = target.scripts.len(),
            blocks = target.block_count,
            "built target"
        );
        target
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn asset_refs(raw: Option<&Value>, target: &str, kind: &str) -> Vec<AssetRef> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let Some(md5ext) = obj.get("md5ext").and_then(Value::as_str) else {
                tracing::warn!(owner = target, kind, "skipping asset without md5ext");
                return None;
            };

            let mut asset = AssetRef::from_md5ext(md5ext);
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                asset.name = name.to_string();
            }
            if let Some(format) = obj.get("dataFormat").and_then(Value::as_str) {
                asset.data_format = format.to_string();
            }
            if let Some(id) = obj.get("assetId").and_then(Value::as_str) {
                asset.asset_id = id.to_string();
            }
            Some(asset)
        })
        .collect()
}

fn object_len(raw: Option<&Value>) -> usize {
    raw.and_then(Value::as_object).map_or(0, Map::len)
}

fn string_array(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
