//! Project model types
//!
//! Immutable values produced by one parse pass over a manifest:
//! - [`AssetRef`] for costume and sound metadata
//! - [`Target`] for the stage and each sprite
//! - [`ProjectModel`] holding the stage as a named field apart from sprites

use serde::{Deserialize, Serialize};

/// Conventional stage name
pub const STAGE_NAME: &str = "Stage";

/// Costume or sound reference
///
/// `md5ext` is the archive entry key. It is not unique: identical media
/// shared by several targets repeat the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Display label
    pub name: String,
    /// File extension
    pub data_format: String,
    /// Content hash
    pub asset_id: String,
    /// `<assetId>.<dataFormat>`
    pub md5ext: String,
}

impl AssetRef {
    /// Create reference from an entry key, deriving the other fields
    #[must_use]
    pub fn from_md5ext(md5ext: impl Into<String>) -> Self {
        let md5ext = md5ext.into();
        let (stem, ext) = md5ext
            .rsplit_once('.')
            .map_or((md5ext.as_str(), ""), |(stem, ext)| (stem, ext));
        Self {
            name: md5ext.clone(),
            data_format: ext.to_string(),
            asset_id: stem.to_string(),
            md5ext: md5ext.clone(),
        }
    }

    /// Set display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Costume metadata
pub type Costume = AssetRef;

/// Sound metadata
pub type Sound = AssetRef;

/// Stage or sprite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Target name
    pub name: String,
    /// Whether this is the stage
    pub is_stage: bool,
    /// Costumes in manifest order
    pub costumes: Vec<Costume>,
    /// Sounds in manifest order
    pub sounds: Vec<Sound>,
    /// One rendered script per hat block
    #[serde(rename = "blocks")]
    pub scripts: Vec<String>,
    /// Number of variables declared on the target
    #[serde(default)]
    pub variable_count: usize,
    /// Number of lists declared on the target
    #[serde(default)]
    pub list_count: usize,
    /// Number of raw block entries, rendered or not
    #[serde(default)]
    pub block_count: usize,
    /// First opcodes in manifest order
    #[serde(default)]
    pub opcode_sample: Vec<String>,
}

impl Target {
    /// Create an empty target
    #[must_use]
    pub fn new(name: impl Into<String>, is_stage: bool) -> Self {
        Self {
            name: name.into(),
            is_stage,
            costumes: Vec::new(),
            sounds: Vec::new(),
            scripts: Vec::new(),
            variable_count: 0,
            list_count: 0,
            block_count: 0,
            opcode_sample: Vec::new(),
        }
    }

    /// Synthetic stage used when the manifest has none
    #[inline]
    #[must_use]
    pub fn empty_stage() -> Self {
        Self::new(STAGE_NAME, true)
    }

    /// Number of rendered scripts
    #[inline]
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Number of costume and sound references
    #[inline]
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.costumes.len() + self.sounds.len()
    }
}

/// Manifest `meta` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    /// VM version that saved the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<String>,
    /// User agent that saved the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Structural model of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    /// The stage
    pub stage: Target,
    /// Sprites in manifest order
    pub sprites: Vec<Target>,
    /// Extension identifiers
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Manifest metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProjectMeta>,
}

impl ProjectModel {
    /// Project with only a synthetic empty stage
    #[must_use]
    pub fn empty() -> Self {
        Self {
            stage: Target::empty_stage(),
            sprites: Vec::new(),
            extensions: Vec::new(),
            meta: None,
        }
    }

    /// All targets, stage first then sprites in manifest order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        std::iter::once(&self.stage).chain(self.sprites.iter())
    }

    /// Look up a target by name
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets().find(|t| t.name == name)
    }

    /// Total rendered scripts across all targets
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.targets().map(Target::script_count).sum()
    }

    /// Total raw blocks across all targets
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.targets().map(|t| t.block_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_ref_from_md5ext() {
        let asset = AssetRef::from_md5ext("abc123.svg");
        assert_eq!(asset.name, "abc123.svg");
        assert_eq!(asset.data_format, "svg");
        assert_eq!(asset.asset_id, "abc123");
    }

    #[test]
    fn asset_ref_without_extension() {
        let asset = AssetRef::from_md5ext("abc123");
        assert_eq!(asset.data_format, "");
        assert_eq!(asset.asset_id, "abc123");
    }

    #[test]
    fn targets_iterate_stage_first() {
        let mut project = ProjectModel::empty();
        project.sprites.push(Target::new("Cat", false));
        project.sprites.push(Target::new("Dog", false));

        let names: Vec<_> = project.targets().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Stage", "Cat", "Dog"]);
        assert!(project.target("Dog").is_some());
        assert!(project.target("Bird").is_none());
    }

    #[test]
    fn target_serializes_scripts_as_blocks() {
        let mut target = Target::new("Cat", false);
        target.scripts.push("when flag clicked".to_string());

        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["isStage"], false);
        assert_eq!(json["blocks"][0], "when flag clicked");
    }
}
