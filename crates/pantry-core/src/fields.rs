//! Field-rule engine: validates a property bag against declared rules.
//!
//! Validation reports at most one violation per call, in a fixed order:
//! required → too-short → too-long → pattern-mismatch. Callers surface the
//! message directly to end users, so the order is part of the contract.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::error::ValidationError;

/// A full-string pattern rule with a human-readable description of what
/// the pattern allows (used to build the violation message).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: &'static Regex,
    pub allows: &'static str,
}

/// Rules for a single field.
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    /// Enforced only when validating with `require_all` (create semantics).
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

/// A recognized field and its rules.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: FieldRule,
}

/// Validate a property bag against the declared field specs.
///
/// Returns the sanitized subset: exactly the recognized fields that were
/// supplied with a non-empty value. Unrecognized keys are dropped silently.
/// Absent or empty values skip the length/pattern checks entirely; when
/// `require_all` is set, an absent-or-empty required field is a violation.
pub fn validate(
    specs: &[FieldSpec],
    props: &HashMap<String, String>,
    require_all: bool,
) -> Result<BTreeMap<&'static str, String>, ValidationError> {
    let mut sanitized = BTreeMap::new();

    for spec in specs {
        let value = props.get(spec.name).map(String::as_str).unwrap_or("");

        if value.is_empty() {
            if require_all && spec.rule.required {
                return Err(ValidationError::new(format!(
                    "The {} field is required.",
                    spec.name
                )));
            }
            continue;
        }

        let length = value.chars().count();

        if let Some(min) = spec.rule.min_length {
            if length < min {
                return Err(ValidationError::new(format!(
                    "The {} field must be at least {min} characters long.",
                    spec.name
                )));
            }
        }

        if let Some(max) = spec.rule.max_length {
            if length > max {
                return Err(ValidationError::new(format!(
                    "The {} field must be at most {max} characters long.",
                    spec.name
                )));
            }
        }

        if let Some(pattern) = &spec.rule.pattern {
            if !pattern.regex.is_match(value) {
                return Err(ValidationError::new(format!(
                    "The {} field may only contain {}.",
                    spec.name, pattern.allows
                )));
            }
        }

        sanitized.insert(spec.name, value.to_string());
    }

    Ok(sanitized)
}
