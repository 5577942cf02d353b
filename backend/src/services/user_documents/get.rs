//! # User Document Retrieval
//!
//! `GET /api/user-documents/{id}` returns the caller's document with its type
//! (including a reduced view of the type's fields) and every stored value,
//! each value carrying the name, label and type of its field.

use crate::auth::{require_identity, Identity};
use crate::db::{enum_column, json_column, opt_enum_column, opt_ts_column, ts_column};
use crate::error::AppError;
use crate::services::user_documents::{not_found, owned_document};
use crate::state::AppState;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use common::model::user_document::{DocumentTypeOverview, FieldDataEntry, FieldSummary, UserDocument};
use common::responses::ApiResponse;
use rusqlite::{params, Connection, OptionalExtension};

const OP: &str = "GET_USER_DOCUMENT";

pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let id = id.into_inner();
    let document = state
        .db
        .run(move |conn| get_user_document(conn, &identity.user_id, &id))
        .await
        .map_err(|e| e.log(OP))?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(document)))
}

pub fn get_user_document(conn: &Connection, user_id: &str, id: &str) -> Result<UserDocument, AppError> {
    owned_document(conn, user_id, id)?;
    fetch_detail(conn, id, true)
}

fn field_summaries(conn: &Connection, document_type_id: &str) -> Result<Vec<FieldSummary>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, field_name, label, field_type, is_required, sort_order, options, help_text
         FROM document_fields WHERE document_type_id = ?1
         ORDER BY sort_order ASC, rowid ASC",
    )?;
    let fields = stmt
        .query_map(params![document_type_id], |row| {
            Ok(FieldSummary {
                id: row.get(0)?,
                field_name: row.get(1)?,
                label: row.get(2)?,
                field_type: enum_column(row, 3)?,
                is_required: row.get(4)?,
                sort_order: row.get(5)?,
                options: json_column(row, 6)?,
                help_text: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fields)
}

fn field_data(conn: &Connection, user_document_id: &str) -> Result<Vec<FieldDataEntry>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT v.id, v.field_id, f.field_name, f.label, f.field_type, v.value, v.version_number, v.updated_at
         FROM document_field_data v
         JOIN document_fields f ON f.id = v.field_id
         WHERE v.user_document_id = ?1
         ORDER BY f.sort_order ASC, f.rowid ASC",
    )?;
    let entries = stmt
        .query_map(params![user_document_id], |row| {
            Ok(FieldDataEntry {
                id: row.get(0)?,
                field_id: row.get(1)?,
                field_name: row.get(2)?,
                label: row.get(3)?,
                field_type: enum_column(row, 4)?,
                value: row.get(5)?,
                version_number: row.get(6)?,
                updated_at: ts_column(row, 7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Reads a document with its type overview and values. Ownership must have
/// been checked by the caller. `include_fields` adds the type's field list.
pub(crate) fn fetch_detail(conn: &Connection, id: &str, include_fields: bool) -> Result<UserDocument, AppError> {
    let mut document = conn
        .query_row(
            "SELECT d.id, d.user_id, d.document_type_id, d.title, d.status, d.version, d.created_at,
                    d.updated_at, d.last_generated_at, d.generated_pdf_path, d.generated_docx_path,
                    t.id, t.name, t.slug, t.description, t.category, t.icon
             FROM user_documents d
             JOIN document_types t ON t.id = d.document_type_id
             WHERE d.id = ?1",
            params![id],
            |row| {
                Ok(UserDocument {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    document_type_id: row.get(2)?,
                    title: row.get(3)?,
                    status: enum_column(row, 4)?,
                    version: row.get(5)?,
                    created_at: ts_column(row, 6)?,
                    updated_at: ts_column(row, 7)?,
                    last_generated_at: opt_ts_column(row, 8)?,
                    generated_pdf_path: row.get(9)?,
                    generated_docx_path: row.get(10)?,
                    document_type: DocumentTypeOverview {
                        id: row.get(11)?,
                        name: row.get(12)?,
                        slug: row.get(13)?,
                        description: row.get(14)?,
                        category: opt_enum_column(row, 15)?,
                        icon: row.get(16)?,
                        fields: None,
                    },
                    field_data: Vec::new(),
                })
            },
        )
        .optional()?
        .ok_or_else(not_found)?;

    if include_fields {
        document.document_type.fields = Some(field_summaries(conn, &document.document_type_id)?);
    }
    document.field_data = field_data(conn, id)?;
    Ok(document)
}
