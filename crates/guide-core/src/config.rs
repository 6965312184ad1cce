//! Pipeline configuration
//!
//! Resolution order:
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. Environment overrides (`OPENAI_API_KEY`, `SB3_GUIDE_MODEL`,
//!    `SB3_GUIDE_BASE_URL`, `SB3_GUIDE_TIMEOUT_SECS`)

use crate::error::ConfigError;
use guide_archive::DEFAULT_MAX_ARCHIVE_BYTES;
use guide_project::{ProjectBuilder, RenderOptions, DEFAULT_OPCODE_SAMPLE};
use guide_tutorial::{ModelSettings, SummaryOptions, SynthesisOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the bearer token
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model name
pub const ENV_MODEL: &str = "SB3_GUIDE_MODEL";
/// Environment variable overriding the endpoint root
pub const ENV_BASE_URL: &str = "SB3_GUIDE_BASE_URL";
/// Environment variable overriding the synthesis timeout
pub const ENV_TIMEOUT_SECS: &str = "SB3_GUIDE_TIMEOUT_SECS";

/// Default number of ingested projects kept in memory
pub const DEFAULT_CACHE_CAPACITY: u64 = 32;

/// Archive limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    pub max_archive_bytes: usize,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            max_archive_bytes: DEFAULT_MAX_ARCHIVE_BYTES,
        }
    }
}

/// Script rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub indent: String,
    pub max_depth: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            indent: options.indent,
            max_depth: options.max_depth,
        }
    }
}

/// Synthesis bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub timeout_secs: u64,
    pub opcode_sample_size: usize,
    pub max_targets: usize,
    pub script_excerpt_chars: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        let summary = SummaryOptions::default();
        Self {
            timeout_secs: guide_tutorial::DEFAULT_TIMEOUT.as_secs(),
            opcode_sample_size: DEFAULT_OPCODE_SAMPLE,
            max_targets: summary.max_targets,
            script_excerpt_chars: summary.script_excerpt_chars,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Ingested projects kept by archive digest
    pub cache_capacity: u64,
    pub archive: ArchiveSettings,
    pub render: RenderSettings,
    pub synthesis: SynthesisSettings,
    pub model: ModelSettings,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            archive: ArchiveSettings::default(),
            render: RenderSettings::default(),
            synthesis: SynthesisSettings::default(),
            model: ModelSettings::default(),
        }
    }
}

impl GuideConfig {
    /// Parse a TOML document on top of the defaults
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, `ConfigError::Invalid` on
    /// out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, an optional file, then environment overrides
    ///
    /// # Errors
    /// Returns error if the file cannot be read or any value is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::read_error(path, e))?;
                tracing::debug!(path = %path.display(), "loaded config file");
                toml::from_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_from(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    ///
    /// # Errors
    /// `ConfigError::Env` if a numeric override does not parse
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.is_empty()) {
            self.model.api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|m| !m.is_empty()) {
            self.model.model = model;
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.is_empty()) {
            self.model.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.synthesis.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
                name: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive.max_archive_bytes == 0 {
            return Err(ConfigError::Invalid(
                "archive.max_archive_bytes must be positive".into(),
            ));
        }
        if self.render.max_depth == 0 {
            return Err(ConfigError::Invalid("render.max_depth must be positive".into()));
        }
        if self.synthesis.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "synthesis.timeout_secs must be positive".into(),
            ));
        }
        if self.synthesis.max_targets == 0 {
            return Err(ConfigError::Invalid(
                "synthesis.max_targets must be positive".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be within 0..=2, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::Invalid("model.max_tokens must be positive".into()));
        }
        Ok(())
    }

    /// Set synthesis timeout in seconds
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.synthesis.timeout_secs = secs;
        self
    }

    /// Set archive size limit
    #[inline]
    #[must_use]
    pub fn with_max_archive_bytes(mut self, limit: usize) -> Self {
        self.archive.max_archive_bytes = limit;
        self
    }

    /// Set render indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.render.indent = indent.into();
        self
    }

    /// Set model settings
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: ModelSettings) -> Self {
        self.model = model;
        self
    }

    /// Set project cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Synthesis timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis.timeout_secs)
    }

    /// Renderer options
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_indent(self.render.indent.clone())
            .with_max_depth(self.render.max_depth)
    }

    /// Project builder using these render and sample settings
    #[must_use]
    pub fn project_builder(&self) -> ProjectBuilder {
        ProjectBuilder::new()
            .with_render_options(self.render_options())
            .with_opcode_sample(self.synthesis.opcode_sample_size)
    }

    /// Summary bounds
    #[must_use]
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            max_targets: self.synthesis.max_targets,
            opcode_sample_size: self.synthesis.opcode_sample_size,
            script_excerpt_chars: self.synthesis.script_excerpt_chars,
        }
    }

    /// Synthesizer options
    #[must_use]
    pub fn synthesis_options(&self) -> SynthesisOptions {
        let mut options = SynthesisOptions::default()
            .with_timeout(self.timeout())
            .with_summary(self.summary_options());
        options.json_mode = self.model.json_mode;
        options
    }
}
