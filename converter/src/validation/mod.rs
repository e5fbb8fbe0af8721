//! Dataset validation and reporting.
//!
//! A [`Validator`] turns a persisted `metadata.json` into a [`Verdict`]:
//!
//! - [`CldfCommand`] runs the external `cldf` tool (`cldf validate`, then
//!   `cldf markdown` for valid datasets)
//! - [`BuiltinValidator`] checks the descriptor against an embedded JSON
//!   Schema (draft 7) and cross-checks the tables it declares, offline
//!
//! The [`Reporter`] acts on the verdict: a valid dataset gets a `readme.md`
//! (badge + rendered metadata), an invalid one gets nothing but an entry in
//! the shared diagnostic log.

pub mod builtin;
pub mod cldf;
pub mod report;

use serde_json::Value;
use std::path::Path;

use crate::error::ValidatorResult;

pub use builtin::BuiltinValidator;
pub use cldf::CldfCommand;
pub use report::{Badge, ReportOutcome, Reporter};

/// Outcome of validating one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Dataset is valid; `rendered` is a human-readable description of it.
    Valid { rendered: String },
    /// Dataset is invalid; `diagnostic` is the validator's full output.
    Invalid { diagnostic: String },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }
}

/// Something that can judge a dataset from its metadata descriptor.
pub trait Validator {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Validate the dataset described by `metadata`.
    ///
    /// `Err` means the validator could not run at all, not that the
    /// dataset is invalid.
    fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict>;
}

impl<V: Validator + ?Sized> Validator for &V {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict> {
        (**self).validate(metadata)
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict> {
        (**self).validate(metadata)
    }
}

/// Validate a JSON document against a JSON Schema (draft 7).
///
/// # Returns
/// * `Ok(())` when the document conforms
/// * `Err(Vec<String>)` with one message per violation
pub fn validate_schema(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_schema() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });

        assert!(validate_schema(&schema, &json!({ "name": "forms" })).is_ok());

        let errors = validate_schema(&schema, &json!({ "name": 3 })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("string"));
    }

    #[test]
    fn test_verdict_is_valid() {
        assert!(Verdict::Valid { rendered: String::new() }.is_valid());
        assert!(!Verdict::Invalid { diagnostic: "bad".into() }.is_valid());
    }
}
