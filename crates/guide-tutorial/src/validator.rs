//! Tutorial validator and normalizer
//!
//! Reconciles a raw generative-model response with the tutorial schema:
//! 1. A bare-string `step.target` is reshaped into `{targetType: "sprite", targetName}`
//! 2. The result is validated against the compiled schema (all violations reported)
//! 3. The validated value is decoded into [`Tutorial`]
//!
//! No other coercion is applied. Text content is never rewritten.

use crate::error::{TutorialError, TutorialResult, Violation};
use crate::schema::{tutorial_schema, Tutorial};
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

/// Compiled tutorial schema
pub struct TutorialValidator {
    schema: Value,
    compiled: JSONSchema,
}

impl std::fmt::Debug for TutorialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialValidator").finish_non_exhaustive()
    }
}

impl TutorialValidator {
    /// Compile the tutorial schema (Draft 7)
    ///
    /// # Errors
    /// `TutorialError::Schema` if the generated schema does not compile
    pub fn new() -> TutorialResult<Self> {
        let schema = tutorial_schema();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| TutorialError::Schema(e.to_string()))?;

        Ok(Self { schema, compiled })
    }

    /// Schema document as JSON
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate a raw text response
    ///
    /// # Errors
    /// `TutorialError::SchemaViolation` if the text is not JSON or does not
    /// match the schema
    pub fn validate_text(&self, raw: &str) -> TutorialResult<Tutorial> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| TutorialError::violation("", format!("response is not valid JSON: {e}")))?;
        self.validate(value)
    }

    /// Validate a decoded response
    ///
    /// # Errors
    /// `TutorialError::SchemaViolation` carrying every field-level violation
    pub fn validate(&self, raw: Value) -> TutorialResult<Tutorial> {
        let value = normalize(raw);

        if let Err(errors) = self.compiled.validate(&value) {
            let violations: Vec<Violation> = errors
                .map(|e| Violation::new(e.instance_path.to_string(), e.to_string()))
                .collect();
            tracing::warn!(count = violations.len(), "tutorial response rejected");
            return Err(TutorialError::SchemaViolation { violations });
        }

        let tutorial: Tutorial = serde_json::from_value(value)
            .map_err(|e| TutorialError::violation("", e.to_string()))?;

        tracing::debug!(steps = tutorial.step_count(), "tutorial response accepted");
        Ok(tutorial)
    }
}

/// Apply the documented reshaping to a raw response
///
/// Only `steps[*].target` given as a string is touched; everything else is
/// returned as is.
#[must_use]
pub fn normalize(mut raw: Value) -> Value {
    let Some(steps) = raw.get_mut("steps").and_then(Value::as_array_mut) else {
        return raw;
    };

    for step in steps {
        let Some(obj) = step.as_object_mut() else {
            continue;
        };
        let name = match obj.get("target") {
            Some(Value::String(name)) => name.clone(),
            _ => continue,
        };
        obj.insert(
            "target".to_string(),
            json!({ "targetType": "sprite", "targetName": name }),
        );
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StepTarget, TargetType};

    fn valid() -> Value {
        json!({
            "description": "A cat walks across the stage.",
            "sprites": [{ "name": "Cat", "description": "The hero" }],
            "steps": [{
                "title": "Make the cat move",
                "target": { "targetType": "sprite", "targetName": "Cat" },
                "code": "when flag clicked\nmove (10) steps",
                "explanation": "The cat moves 10 steps when the flag is clicked."
            }],
            "extensions": ["Add a second sprite"]
        })
    }

    #[test]
    fn accepts_valid_response() {
        let validator = TutorialValidator::new().unwrap();
        let tutorial = validator.validate(valid()).unwrap();
        assert_eq!(tutorial.steps[0].target, StepTarget::sprite("Cat"));
        assert_eq!(tutorial.sprites.unwrap()[0].name, "Cat");
    }

    #[test]
    fn string_target_is_normalized() {
        let mut raw = valid();
        raw["steps"][0]["target"] = json!("Cat");

        let validator = TutorialValidator::new().unwrap();
        let tutorial = validator.validate(raw).unwrap();
        assert_eq!(tutorial.steps[0].target.target_type, TargetType::Sprite);
        assert_eq!(tutorial.steps[0].target.target_name, "Cat");
    }

    #[test]
    fn missing_steps_is_rejected() {
        let mut raw = valid();
        raw.as_object_mut().unwrap().remove("steps");

        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate(raw).unwrap_err();
        assert!(matches!(err, TutorialError::SchemaViolation { .. }));
        assert!(err.violations().iter().any(|v| v.message.contains("steps")));
    }

    #[test]
    fn empty_steps_is_rejected() {
        let mut raw = valid();
        raw["steps"] = json!([]);

        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "/steps");
    }

    #[test]
    fn missing_code_is_rejected() {
        let mut raw = valid();
        raw["steps"][0].as_object_mut().unwrap().remove("code");

        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "/steps/0");
    }

    #[test]
    fn null_optional_arrays_are_rejected() {
        let validator = TutorialValidator::new().unwrap();
        for field in ["sprites", "extensions"] {
            let mut raw = valid();
            raw[field] = Value::Null;

            let err = validator.validate(raw).unwrap_err();
            assert!(matches!(err, TutorialError::SchemaViolation { .. }));
            assert_eq!(err.violations()[0].path, format!("/{field}"));
        }
    }

    #[test]
    fn omitted_optional_arrays_are_accepted() {
        let mut raw = valid();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("sprites");
        obj.remove("extensions");

        let validator = TutorialValidator::new().unwrap();
        let tutorial = validator.validate(raw).unwrap();
        assert!(tutorial.sprites.is_none());
        assert!(tutorial.extension_ideas().is_empty());
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        let mut raw = valid();
        raw["difficulty"] = json!("easy");

        let validator = TutorialValidator::new().unwrap();
        assert!(validator.validate(raw).is_err());
    }

    #[test]
    fn unknown_target_type_is_rejected() {
        let mut raw = valid();
        raw["steps"][0]["target"]["targetType"] = json!("stage");

        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "/steps/0/target/targetType");
    }

    #[test]
    fn multiple_violations_are_collected() {
        let raw = json!({
            "steps": [{ "title": 3, "target": "Cat", "code": "", "explanation": "" }]
        });

        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate(raw).unwrap_err();
        assert!(err.violations().len() >= 2);
    }

    #[test]
    fn non_json_text_fails_at_root() {
        let validator = TutorialValidator::new().unwrap();
        let err = validator.validate_text("Sure! Here is your tutorial").unwrap_err();
        assert_eq!(err.violations()[0].path, "");
    }

    #[test]
    fn normalize_leaves_other_shapes_alone() {
        let raw = json!({ "steps": [{ "target": 5 }, "loose"] });
        assert_eq!(normalize(raw.clone()), raw);
    }
}
