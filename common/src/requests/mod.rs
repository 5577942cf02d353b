//! Request payloads accepted by the HTTP surface.
//!
//! Optional members of the update payloads mean "leave unchanged"; there is no
//! way to clear a stored attribute through them.

use crate::model::document_type::{DocumentCategory, FieldType};
use crate::model::user_document::DocumentStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

/// Definition of one field inside a create or update of a document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFieldInput {
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub validation: Option<String>,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub min_length: Option<i64>,
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub depends_on: Option<String>,
    #[serde(default)]
    pub depends_value: Option<String>,
}

impl DocumentFieldInput {
    /// A required field with every optional attribute left empty.
    pub fn new(field_name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            field_type,
            is_required: true,
            sort_order: 0,
            placeholder: None,
            default_value: None,
            validation: None,
            options: None,
            help_text: None,
            section: None,
            min_length: None,
            max_length: None,
            depends_on: None,
            depends_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentTypeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_path: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub category: Option<DocumentCategory>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub fields: Vec<DocumentFieldInput>,
}

impl CreateDocumentTypeRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            template_path: None,
            is_active: true,
            category: None,
            icon: None,
            slug: None,
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentTypeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_path: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub category: Option<DocumentCategory>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// When present, replaces the whole field list (matched by `fieldName`).
    #[serde(default)]
    pub fields: Option<Vec<DocumentFieldInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentTypesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// A submitted value for one field of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValueInput {
    pub field_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl FieldValueInput {
    pub fn new(field_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDocumentRequest {
    pub document_type_id: String,
    pub title: String,
    #[serde(default)]
    pub field_data: Option<Vec<FieldValueInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub field_data: Option<Vec<FieldValueInput>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserDocumentsQuery {
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub document_type_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a render call. Values may be any JSON scalar; they are turned into
/// text before substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub form_data: HashMap<String, Value>,
    pub theme: String,
}
