//! Validation of submitted field values against a document type's fields.
//!
//! Only membership and presence are checked. `fieldType` and the `validation`
//! expression of a field are client metadata and are not enforced here.

use crate::error::AppError;
use common::model::document_type::DocumentField;
use common::requests::FieldValueInput;
use serde::Serialize;
use serde_json::{json, Map};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
    pub id: String,
    pub field_name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDataViolation {
    /// Submitted ids that are not fields of the document type.
    InvalidFieldIds(Vec<String>),
    /// Required fields without a non-empty value.
    MissingRequired(Vec<MissingField>),
    /// Ids submitted more than once.
    DuplicateFieldIds(Vec<String>),
}

impl From<FieldDataViolation> for AppError {
    fn from(violation: FieldDataViolation) -> Self {
        let mut details = Map::new();
        let message = match violation {
            FieldDataViolation::InvalidFieldIds(ids) => {
                details.insert("invalidFields".into(), json!(ids));
                "Invalid field IDs provided"
            }
            FieldDataViolation::MissingRequired(fields) => {
                details.insert("missingFields".into(), json!(fields));
                "Required fields are missing"
            }
            FieldDataViolation::DuplicateFieldIds(ids) => {
                details.insert("duplicateFields".into(), json!(ids));
                "Field IDs must not repeat"
            }
        };
        AppError::validation(message, details)
    }
}

fn has_value(input: &FieldValueInput) -> bool {
    input.value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Every submitted `fieldId` must name one of `fields`.
pub fn check_field_ids(fields: &[DocumentField], submitted: &[FieldValueInput]) -> Result<(), FieldDataViolation> {
    let known: HashSet<&str> = fields.iter().map(|f| f.id.as_str()).collect();
    let mut invalid: Vec<String> = Vec::new();
    for input in submitted {
        if !known.contains(input.field_id.as_str()) && !invalid.contains(&input.field_id) {
            invalid.push(input.field_id.clone());
        }
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(FieldDataViolation::InvalidFieldIds(invalid))
    }
}

pub fn check_duplicates(submitted: &[FieldValueInput]) -> Result<(), FieldDataViolation> {
    let mut seen = HashSet::new();
    let mut repeated: Vec<String> = Vec::new();
    for input in submitted {
        if !seen.insert(input.field_id.as_str()) && !repeated.contains(&input.field_id) {
            repeated.push(input.field_id.clone());
        }
    }
    if repeated.is_empty() {
        Ok(())
    } else {
        Err(FieldDataViolation::DuplicateFieldIds(repeated))
    }
}

/// Every required field needs a submitted entry with a non-empty value.
/// Missing fields are reported in the order of `fields`.
pub fn check_required(fields: &[DocumentField], submitted: &[FieldValueInput]) -> Result<(), FieldDataViolation> {
    let present: HashSet<&str> = submitted
        .iter()
        .filter(|input| has_value(input))
        .map(|input| input.field_id.as_str())
        .collect();
    let missing: Vec<MissingField> = fields
        .iter()
        .filter(|field| field.is_required && !present.contains(field.id.as_str()))
        .map(|field| MissingField {
            id: field.id.clone(),
            field_name: field.field_name.clone(),
            label: field.label.clone(),
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FieldDataViolation::MissingRequired(missing))
    }
}

/// Full check of an initial submission: unknown ids first, then repeats, then
/// required fields.
pub fn validate_submission(fields: &[DocumentField], submitted: &[FieldValueInput]) -> Result<(), FieldDataViolation> {
    check_field_ids(fields, submitted)?;
    check_duplicates(submitted)?;
    check_required(fields, submitted)
}
