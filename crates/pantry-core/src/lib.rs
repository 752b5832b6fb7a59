//! pantry-core: Field rules, validation, and shared error types for Pantry.
//!
//! This crate is pure: no I/O, no driver types. It provides:
//! - The field-rule engine used to validate property bags before persistence
//! - The declared field schema for the Ingredient entity
//! - The user-facing `ValidationError`

pub mod error;
pub mod fields;
pub mod ingredient;

pub use error::ValidationError;
pub use fields::{validate, FieldRule, FieldSpec, Pattern};
