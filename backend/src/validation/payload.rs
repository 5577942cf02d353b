//! Shape checks on request bodies. Enumerated values (field types,
//! categories, statuses) are already enforced by deserialization.

use crate::error::AppError;
use crate::validation::FieldErrors;
use common::requests::{
    CreateDocumentTypeRequest, CreateUserDocumentRequest, DocumentFieldInput, FieldValueInput,
    UpdateDocumentTypeRequest, UpdateUserDocumentRequest,
};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

const NAME_MAX: usize = 100;
const TITLE_MAX: usize = 255;
const PASSWORD_MIN: usize = 8;

fn check_fields(errors: &mut FieldErrors, fields: &[DocumentFieldInput]) {
    let mut names = HashSet::new();
    for (idx, field) in fields.iter().enumerate() {
        let key = |attr: &str| format!("fields[{}].{}", idx, attr);
        errors.check_len(&key("fieldName"), field.field_name.trim(), 1, NAME_MAX);
        errors.check_len(&key("label"), field.label.trim(), 1, NAME_MAX);
        if field.sort_order < 0 {
            errors.add(key("sortOrder"), "must not be negative");
        }
        if let Some(options) = &field.options {
            if !matches!(options, Value::Object(_) | Value::Null) {
                errors.add(key("options"), "must be an object");
            }
        }
        if field.min_length.is_some_and(|n| n < 0) {
            errors.add(key("minLength"), "must not be negative");
        }
        if field.max_length.is_some_and(|n| n < 0) {
            errors.add(key("maxLength"), "must not be negative");
        }
        if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
            if min > max {
                errors.add(key("minLength"), "must not exceed maxLength");
            }
        }
        let name = field.field_name.trim();
        if !names.insert(name) {
            errors.add(key("fieldName"), format!("'{}' is used by more than one field", name));
        }
    }
}

fn check_field_values(errors: &mut FieldErrors, values: &[FieldValueInput]) {
    for (idx, input) in values.iter().enumerate() {
        if Uuid::parse_str(&input.field_id).is_err() {
            errors.add(format!("fieldData[{}].fieldId", idx), "must be a UUID");
        }
    }
}

pub fn check_document_type_create(req: &CreateDocumentTypeRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check_len("name", req.name.trim(), 1, NAME_MAX);
    check_fields(&mut errors, &req.fields);
    errors.into_result()
}

pub fn check_document_type_update(req: &UpdateDocumentTypeRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &req.name {
        errors.check_len("name", name.trim(), 1, NAME_MAX);
    }
    if let Some(fields) = &req.fields {
        check_fields(&mut errors, fields);
    }
    errors.into_result()
}

pub fn check_user_document_create(req: &CreateUserDocumentRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if Uuid::parse_str(&req.document_type_id).is_err() {
        errors.add("documentTypeId", "must be a UUID");
    }
    errors.check_len("title", req.title.trim(), 1, TITLE_MAX);
    if let Some(values) = &req.field_data {
        check_field_values(&mut errors, values);
    }
    errors.into_result()
}

pub fn check_user_document_update(req: &UpdateUserDocumentRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if let Some(title) = &req.title {
        errors.check_len("title", title.trim(), 1, TITLE_MAX);
    }
    if let Some(values) = &req.field_data {
        check_field_values(&mut errors, values);
    }
    errors.into_result()
}

pub fn check_registration(first_name: &str, last_name: &str, email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check_len("firstName", first_name.trim(), 1, NAME_MAX);
    errors.check_len("lastName", last_name.trim(), 1, NAME_MAX);
    if !looks_like_email(email) {
        errors.add("email", "must be a valid email address");
    }
    if password.chars().count() < PASSWORD_MIN {
        errors.add("password", format!("must be at least {} characters", PASSWORD_MIN));
    }
    errors.into_result()
}

pub fn check_login(email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if !looks_like_email(email) {
        errors.add("email", "must be a valid email address");
    }
    if password.is_empty() {
        errors.add("password", "must not be empty");
    }
    errors.into_result()
}

/// One `@`, something before it, and a dotted domain after it.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
