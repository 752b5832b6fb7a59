//! The declared field schema for the Ingredient entity.

use std::sync::LazyLock;

use regex::Regex;

use crate::fields::{FieldRule, FieldSpec, Pattern};

/// Neo4j node label for ingredients.
pub const LABEL: &str = "Ingredient";

/// Relationship type for the follow edge between two ingredients.
pub const FOLLOWS: &str = "FOLLOWS";

/// The unique key field.
pub const NAME: &str = "name";

/// Creation timestamp stamped by the repository; never a validated input.
pub const CREATED: &str = "created";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_]+$").expect("name pattern is valid"));

static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![FieldSpec {
        name: NAME,
        rule: FieldRule {
            required: true,
            min_length: Some(2),
            max_length: Some(16),
            pattern: Some(Pattern {
                regex: &*NAME_RE,
                allows: "letters, numbers, and underscores",
            }),
        },
    }]
});

/// The recognized fields of an ingredient, with their validation rules.
pub fn fields() -> &'static [FieldSpec] {
    &FIELDS
}
