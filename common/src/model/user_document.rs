use crate::model::document_type::{DocumentCategory, FieldType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
pub enum DocumentStatus {
    Draft,
    Pending,
    Completed,
    Rejected,
    Archived,
}

/// The stored value of one field within one document, flattened with the
/// metadata of the field it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDataEntry {
    pub id: String,
    pub field_id: String,
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    pub value: Option<String>,
    /// Starts at 1 and grows by one on every overwrite of `value`.
    pub version_number: i64,
    pub updated_at: DateTime<Utc>,
}

/// Reduced field definition embedded in a fetched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub id: String,
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub sort_order: i64,
    pub options: Option<Value>,
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeOverview {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: Option<DocumentCategory>,
    pub icon: Option<String>,
    /// Only present when the document is fetched on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSummary>>,
}

/// A user's instance of a document type with all of its stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: String,
    pub user_id: String,
    pub document_type_id: String,
    pub title: String,
    pub status: DocumentStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub generated_pdf_path: Option<String>,
    pub generated_docx_path: Option<String>,
    pub document_type: DocumentTypeOverview,
    pub field_data: Vec<FieldDataEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeBadge {
    pub id: String,
    pub name: String,
    pub category: Option<DocumentCategory>,
    pub icon: Option<String>,
}

/// One row of a user's document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocumentListItem {
    pub id: String,
    pub title: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub document_type: DocumentTypeBadge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: String,
    pub title: String,
    pub status: DocumentStatus,
    /// Name of the document type.
    pub document_type: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserDocument {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifacts {
    pub id: String,
    pub title: String,
    pub pdf_path: String,
    pub docx_path: String,
    pub generated_at: DateTime<Utc>,
}
