//! Tutorial synthesizer
//!
//! One project in, one generative call out, one validated tutorial back.
//! There is no retry here: a failed or timed-out call surfaces as
//! `TutorialError::SynthesisUnavailable` and the caller decides.

use crate::error::{TutorialError, TutorialResult};
use crate::model::GenerativeModel;
use crate::prompt::PromptScaffold;
use crate::schema::Tutorial;
use crate::summary::{ProjectSummary, SummaryOptions};
use crate::validator::TutorialValidator;
use guide_project::ProjectModel;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for the generative call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Synthesis settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Upper bound on the generative call
    pub timeout: Duration,
    /// Summary bounds
    pub summary: SummaryOptions,
    /// Request JSON-only output
    pub json_mode: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            summary: SummaryOptions::default(),
            json_mode: true,
        }
    }
}

impl SynthesisOptions {
    /// Set call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set summary bounds
    #[inline]
    #[must_use]
    pub fn with_summary(mut self, summary: SummaryOptions) -> Self {
        self.summary = summary;
        self
    }
}

/// Produces validated tutorials from project models
pub struct TutorialSynthesizer {
    model: Arc<dyn GenerativeModel>,
    validator: TutorialValidator,
    scaffold: PromptScaffold,
    options: SynthesisOptions,
}

impl std::fmt::Debug for TutorialSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialSynthesizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TutorialSynthesizer {
    /// Create synthesizer over a generative model
    ///
    /// # Errors
    /// `TutorialError::Schema` if the tutorial schema fails to compile
    pub fn new(model: Arc<dyn GenerativeModel>, options: SynthesisOptions) -> TutorialResult<Self> {
        let validator = TutorialValidator::new()?;
        let scaffold = PromptScaffold::new(validator.schema())?;
        Ok(Self {
            model,
            validator,
            scaffold,
            options,
        })
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Validator sharing this synthesizer's schema
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &TutorialValidator {
        &self.validator
    }

    /// Generate and validate a tutorial for a project
    ///
    /// # Errors
    /// - `TutorialError::SynthesisUnavailable` if the model fails or the call
    ///   exceeds the timeout
    /// - `TutorialError::SchemaViolation` if the response cannot be reconciled
    pub async fn synthesize(&self, project: &ProjectModel) -> TutorialResult<Tutorial> {
        let summary = ProjectSummary::build(project, &self.options.summary);
        let request = self.scaffold.request(&summary, self.options.json_mode)?;

        tracing::info!(
            targets = summary.targets.len(),
            prompt_chars = request.user_prompt.len(),
            "requesting tutorial"
        );

        let raw = match tokio::time::timeout(self.options.timeout, self.model.generate(request)).await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "generative model failed");
                return Err(TutorialError::unavailable(e));
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.options.timeout, "generative model timed out");
                return Err(TutorialError::unavailable(format!(
                    "no response within {}s",
                    self.options.timeout.as_secs_f64()
                )));
            }
        };

        let tutorial = self.validator.validate_text(&raw)?;
        tracing::info!(steps = tutorial.step_count(), "tutorial synthesized");
        Ok(tutorial)
    }
}
