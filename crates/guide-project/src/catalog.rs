//! Asset catalog
//!
//! Flattens costume and sound references across targets into one list keyed
//! by `md5ext`. Iteration is stage first, then sprites in manifest order;
//! within a target costumes come before sounds. The first occurrence of a
//! key wins.

use crate::model::{AssetRef, ProjectModel, Target};
use guide_archive::DeliverableAsset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Media classification of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Costume or backdrop
    Image,
    /// Sound
    Sound,
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Sound => write!(f, "sound"),
        }
    }
}

/// One deduplicated asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Display label of the first occurrence
    pub name: String,
    /// Archive entry key
    pub md5ext: String,
    /// File extension
    pub data_format: String,
    /// Media classification
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

impl CatalogEntry {
    fn from_ref(asset: &AssetRef, asset_type: AssetType) -> Self {
        Self {
            name: asset.name.clone(),
            md5ext: asset.md5ext.clone(),
            data_format: asset.data_format.clone(),
            asset_type,
        }
    }
}

impl DeliverableAsset for CatalogEntry {
    fn md5ext(&self) -> &str {
        &self.md5ext
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn data_format(&self) -> &str {
        &self.data_format
    }
}

/// Deduplicated asset list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl AssetCatalog {
    /// Build catalog from targets in the given order
    #[must_use]
    pub fn build<'a>(targets: impl IntoIterator<Item = &'a Target>) -> Self {
        let mut catalog = Self::default();
        for target in targets {
            for costume in &target.costumes {
                catalog.insert(CatalogEntry::from_ref(costume, AssetType::Image));
            }
            for sound in &target.sounds {
                catalog.insert(CatalogEntry::from_ref(sound, AssetType::Sound));
            }
        }

        tracing::debug!(entries = catalog.len(), "built asset catalog");
        catalog
    }

    /// Build catalog from a project, stage first
    #[inline]
    #[must_use]
    pub fn from_project(project: &ProjectModel) -> Self {
        Self::build(project.targets())
    }

    fn insert(&mut self, entry: CatalogEntry) {
        if self.index.contains_key(&entry.md5ext) {
            return;
        }
        self.index.insert(entry.md5ext.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Look up an entry by archive key
    #[must_use]
    pub fn get(&self, md5ext: &str) -> Option<&CatalogEntry> {
        self.index.get(md5ext).map(|&i| &self.entries[i])
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in catalog order
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    /// Entries as a slice
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Image entries in catalog order
    pub fn images(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.iter().filter(|e| e.asset_type == AssetType::Image)
    }

    /// Sound entries in catalog order
    pub fn sounds(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.iter().filter(|e| e.asset_type == AssetType::Sound)
    }
}

impl<'a> IntoIterator for &'a AssetCatalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for AssetCatalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.entries)
    }
}

impl<'de> Deserialize<'de> for AssetCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<CatalogEntry>::deserialize(deserializer)?;
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, is_stage: bool, costumes: &[&str], sounds: &[&str]) -> Target {
        let mut t = Target::new(name, is_stage);
        t.costumes = costumes.iter().map(|k| AssetRef::from_md5ext(*k)).collect();
        t.sounds = sounds.iter().map(|k| AssetRef::from_md5ext(*k)).collect();
        t
    }

    #[test]
    fn shared_costume_appears_once() {
        let stage = target("Stage", true, &["bg.png"], &[]);
        let cat = target("Cat", false, &["abc123.svg"], &["meow.wav"]);
        let dog = target("Dog", false, &["abc123.svg"], &[]);

        let catalog = AssetCatalog::build([&stage, &cat, &dog]);
        assert_eq!(catalog.len(), 3);

        let entry = catalog.get("abc123.svg").unwrap();
        assert_eq!(entry.asset_type, AssetType::Image);
        let keys: Vec<_> = catalog.iter().map(|e| e.md5ext.as_str()).collect();
        assert_eq!(keys, vec!["bg.png", "abc123.svg", "meow.wav"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let mut stage = target("Stage", true, &[], &[]);
        stage.sounds.push(AssetRef::from_md5ext("pop.wav").with_name("pop"));
        let mut cat = target("Cat", false, &[], &[]);
        cat.sounds.push(AssetRef::from_md5ext("pop.wav").with_name("another pop"));

        let catalog = AssetCatalog::build([&stage, &cat]);
        assert_eq!(catalog.get("pop.wav").unwrap().name, "pop");
    }

    #[test]
    fn images_and_sounds_split() {
        let cat = target("Cat", false, &["a.svg", "b.png"], &["c.wav"]);
        let catalog = AssetCatalog::build([&cat]);
        assert_eq!(catalog.images().count(), 2);
        assert_eq!(catalog.sounds().count(), 1);
    }

    #[test]
    fn serializes_as_camel_case_list() {
        let cat = target("Cat", false, &["abc123.svg"], &[]);
        let catalog = AssetCatalog::build([&cat]);

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json[0]["dataFormat"], "svg");
        assert_eq!(json[0]["type"], "image");

        let decoded: AssetCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, catalog);
    }

    #[test]
    fn catalog_entry_is_deliverable() {
        let cat = target("Cat", false, &["abc123.svg"], &[]);
        let catalog = AssetCatalog::build([&cat]);
        let entry = catalog.get("abc123.svg").unwrap();
        assert_eq!(entry.asset_id(), "abc123");
    }
}
