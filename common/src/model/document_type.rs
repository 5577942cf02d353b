use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, EnumString};

/// Input widget a client renders for a `DocumentField`.
///
/// The server stores the type as metadata only; values are never checked
/// against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Email,
    Phone,
    Select,
    Checkbox,
    Radio,
    File,
    RichText,
    Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentCategory {
    Professional,
    Legal,
    Personal,
    Education,
    Business,
    Creative,
    Technical,
    Medical,
}

/// One typed input slot of a `DocumentType`.
///
/// `field_name` is the identity of a field across schema edits: updates to a
/// document type match old and new fields by name, never by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    pub id: String,
    pub document_type_id: String,
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub sort_order: i64,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub validation: Option<String>,
    /// Free-form structured settings, e.g. the choices of a `select`.
    pub options: Option<Value>,
    pub help_text: Option<String>,
    pub section: Option<String>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    /// Name of the field whose value controls whether this one is shown.
    pub depends_on: Option<String>,
    pub depends_value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An authored document schema together with its fields, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub template_path: Option<String>,
    pub is_active: bool,
    pub category: Option<DocumentCategory>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Vec<DocumentField>,
}

/// Projection returned by the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedDocumentType {
    pub id: String,
    pub name: String,
    pub fields_deleted: usize,
}
