//! # Validation
//!
//! - `field_data`: checks submitted field values against the fields of a
//!   document type. Pure, no storage access.
//! - `payload`: shape checks on request bodies before any store operation runs.

pub mod field_data;
pub mod payload;

use crate::error::AppError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Collects per-input messages and turns them into a single `Validation` error.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Length is counted in characters, not bytes.
    pub fn check_len(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            if min == 1 {
                self.add(field, "must not be empty");
            } else {
                self.add(field, format!("must be at least {} characters", min));
            }
        } else if len > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            return Ok(());
        }
        let details: Map<String, Value> = self
            .0
            .into_iter()
            .map(|(field, messages)| (field, Value::from(messages)))
            .collect();
        Err(AppError::validation("Invalid request payload", details))
    }
}
