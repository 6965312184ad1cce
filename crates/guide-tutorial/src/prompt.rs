//! Instructional scaffold
//!
//! Wraps a [`ProjectSummary`] in the fixed prompt sent to the generative
//! capability: system role, learner instructions, output schema, block
//! notation reference, and the summary itself.

use crate::error::TutorialResult;
use crate::model::GenerationRequest;
use crate::summary::ProjectSummary;
use serde_json::Value;

/// System role
pub const SYSTEM_PROMPT: &str = "You are an expert Scratch educator who specializes in analyzing \
Scratch projects and creating educational content.";

const INSTRUCTIONS: &str = "\
This is a summary of a project.json file from a Scratch project (.sb3). Create a step by step \
tutorial for young learners. First give a general description of what the project does, then \
describe its key sprites. Then break the project down into bite-sized steps that explain how to \
build it, and finish with ideas for extending the project.

Keep your explanations clear and appropriate for young learners.";

const NOTATION: &str = "\
Write every step's `code` in scratchblocks notation, one block per line:
- stack blocks as plain text, e.g. `move (10) steps`
- number inputs in round brackets `(10)`, text inputs in square brackets `[Hello!]`
- dropdowns as `[value v]`, booleans in angle brackets `<touching [edge v]?>`
- variables as `(score)`, lists as `(items :: list)`
- C blocks (`repeat`, `forever`, `if`, `if else`) indent their contents by two spaces and close with `end`; `if else` puts `else` between its branches
- custom blocks start with `define`";

/// Prompt builder bound to one output schema
#[derive(Debug, Clone)]
pub struct PromptScaffold {
    schema: String,
}

impl PromptScaffold {
    /// Create scaffold embedding the given JSON Schema
    ///
    /// # Errors
    /// `TutorialError::Encode` if the schema cannot be serialized
    pub fn new(schema: &Value) -> TutorialResult<Self> {
        Ok(Self {
            schema: serde_json::to_string_pretty(schema)?,
        })
    }

    /// Build the user prompt for a summary
    ///
    /// # Errors
    /// `TutorialError::Encode` if the summary cannot be serialized
    pub fn user_prompt(&self, summary: &ProjectSummary) -> TutorialResult<String> {
        let summary = serde_json::to_string_pretty(summary)?;
        Ok(format!(
            "{INSTRUCTIONS}\n\n\
             Respond with a single JSON object that matches this JSON Schema. \
             Do not add any fields the schema does not define.\n\n\
             {schema}\n\n\
             {NOTATION}\n\n\
             Here is the simplified representation of the project:\n\n\
             {summary}\n",
            schema = self.schema,
        ))
    }

    /// Build the complete request for a summary
    ///
    /// # Errors
    /// `TutorialError::Encode` if the summary cannot be serialized
    pub fn request(&self, summary: &ProjectSummary, json_mode: bool) -> TutorialResult<GenerationRequest> {
        Ok(GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: self.user_prompt(summary)?,
            json_mode,
        })
    }
}
