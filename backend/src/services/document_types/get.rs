//! # Document Type Retrieval
//!
//! `GET /api/document-types/{id}` returns one document type with all of its
//! fields, ordered by `sortOrder` (insertion order breaks ties).
//!
//! The loaders here are shared with the other document type operations, which
//! re-read the stored state inside their transaction before answering.

use crate::db::{enum_column, json_column, opt_enum_column, ts_column};
use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::document_type::{DocumentField, DocumentType};
use common::responses::ApiResponse;
use rusqlite::{params, Connection, OptionalExtension, Row};

const OP: &str = "GET_DOCUMENT_TYPE";

const FIELD_COLUMNS: &str = "id, document_type_id, field_name, label, field_type, is_required, sort_order, \
     placeholder, default_value, validation, options, help_text, section, min_length, max_length, \
     depends_on, depends_value, created_at, updated_at";

pub async fn process(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let document_type = state
        .db
        .run(move |conn| get_document_type(conn, &id))
        .await
        .map_err(|e| e.log(OP))?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(document_type)))
}

pub fn get_document_type(conn: &Connection, id: &str) -> Result<DocumentType, AppError> {
    load(conn, id)?.ok_or_else(not_found)
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Document type not found".to_string())
}

pub(crate) fn map_field(row: &Row<'_>) -> rusqlite::Result<DocumentField> {
    Ok(DocumentField {
        id: row.get(0)?,
        document_type_id: row.get(1)?,
        field_name: row.get(2)?,
        label: row.get(3)?,
        field_type: enum_column(row, 4)?,
        is_required: row.get(5)?,
        sort_order: row.get(6)?,
        placeholder: row.get(7)?,
        default_value: row.get(8)?,
        validation: row.get(9)?,
        options: json_column(row, 10)?,
        help_text: row.get(11)?,
        section: row.get(12)?,
        min_length: row.get(13)?,
        max_length: row.get(14)?,
        depends_on: row.get(15)?,
        depends_value: row.get(16)?,
        created_at: ts_column(row, 17)?,
        updated_at: ts_column(row, 18)?,
    })
}

/// Fields of a document type ordered for display and validation.
pub(crate) fn load_fields(conn: &Connection, document_type_id: &str) -> Result<Vec<DocumentField>, AppError> {
    let sql = format!(
        "SELECT {} FROM document_fields WHERE document_type_id = ?1 ORDER BY sort_order ASC, rowid ASC",
        FIELD_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let fields = stmt
        .query_map(params![document_type_id], map_field)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fields)
}

pub(crate) fn load(conn: &Connection, id: &str) -> Result<Option<DocumentType>, AppError> {
    let found = conn
        .query_row(
            "SELECT id, name, slug, description, template_path, is_active, category, icon, created_at, updated_at
             FROM document_types WHERE id = ?1",
            params![id],
            |row| {
                Ok(DocumentType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    description: row.get(3)?,
                    template_path: row.get(4)?,
                    is_active: row.get(5)?,
                    category: opt_enum_column(row, 6)?,
                    icon: row.get(7)?,
                    created_at: ts_column(row, 8)?,
                    updated_at: ts_column(row, 9)?,
                    fields: Vec::new(),
                })
            },
        )
        .optional()?;

    match found {
        Some(mut document_type) => {
            document_type.fields = load_fields(conn, id)?;
            Ok(Some(document_type))
        }
        None => Ok(None),
    }
}
