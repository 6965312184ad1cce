//! Tutorial wire types
//!
//! These types are the single source of the tutorial schema: the JSON Schema
//! embedded in the prompt and the one the validator enforces are both
//! generated from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Synthesized tutorial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Tutorial {
    /// What the project does
    pub description: String,
    /// Key sprites and their roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Vec<SpriteSummary>")]
    pub sprites: Option<Vec<SpriteSummary>>,
    /// Ordered building steps
    #[schemars(length(min = 1))]
    pub steps: Vec<Step>,
    /// Ideas for extending the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Vec<String>")]
    pub extensions: Option<Vec<String>>,
}

impl Tutorial {
    /// Number of steps
    #[inline]
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Extension ideas, empty if none were given
    #[must_use]
    pub fn extension_ideas(&self) -> &[String] {
        self.extensions.as_deref().unwrap_or_default()
    }
}

/// One tutorial step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Step {
    /// Short heading
    pub title: String,
    /// Where the code goes
    pub target: StepTarget,
    /// Blocks to add, in block notation
    pub code: String,
    /// Why the blocks do what they do
    pub explanation: String,
}

/// Target a step applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepTarget {
    /// Sprite or backdrop
    pub target_type: TargetType,
    /// Name of the sprite or backdrop
    pub target_name: String,
}

impl StepTarget {
    /// Target a sprite by name
    #[inline]
    #[must_use]
    pub fn sprite(name: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Sprite,
            target_name: name.into(),
        }
    }

    /// Target a backdrop by name
    #[inline]
    #[must_use]
    pub fn backdrop(name: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Backdrop,
            target_name: name.into(),
        }
    }
}

/// Kind of step target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// A sprite
    Sprite,
    /// The stage backdrop
    Backdrop,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sprite => write!(f, "sprite"),
            Self::Backdrop => write!(f, "backdrop"),
        }
    }
}

/// Sprite overview entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpriteSummary {
    /// Sprite name
    pub name: String,
    /// Role in the project
    pub description: String,
}

/// JSON Schema for [`Tutorial`] (Draft 7)
#[must_use]
pub fn tutorial_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(Tutorial);
    serde_json::to_value(schema).unwrap_or_default()
}
