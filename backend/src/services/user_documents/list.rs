//! # User Document Listing
//!
//! `GET /api/user-documents` lists the caller's documents, newest change
//! first. Two optional equality filters narrow the result:
//!
//! - `status`: one of the document statuses, e.g. `Archived`.
//! - `documentTypeId`: only instances of that document type.
//!
//! Each row carries a small badge of its document type instead of the full
//! field list; use the single-document endpoint for that.

use crate::auth::{require_identity, Identity};
use crate::db::{enum_column, enum_text, opt_enum_column, opt_ts_column, ts_column};
use crate::error::AppError;
use crate::state::AppState;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use common::model::user_document::{DocumentTypeBadge, UserDocumentListItem};
use common::requests::ListUserDocumentsQuery;
use common::responses::ApiResponse;
use rusqlite::{params, Connection};

const OP: &str = "LIST_USER_DOCUMENTS";

/// Actix web handler for `GET /api/user-documents[?status=..][&documentTypeId=..]`.
///
/// # Arguments
/// * `identity` - The caller, resolved by the authentication guard.
/// * `query` - The optional filters.
///
/// # Returns
/// - `200 OK` with the matching rows and their `count`.
/// - `400 Bad Request` if a filter cannot be parsed.
pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    query: web::Query<ListUserDocumentsQuery>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let query = query.into_inner();
    let documents = state
        .db
        .run(move |conn| list_user_documents(conn, &identity.user_id, &query))
        .await
        .map_err(|e| e.log(OP))?;
    let count = documents.len();
    Ok(HttpResponse::Ok().json(ApiResponse::data(documents).with_count(count)))
}

/// The caller's documents, most recently changed first. Documents changed at
/// the same instant are ordered by most recent creation.
pub fn list_user_documents(
    conn: &Connection,
    user_id: &str,
    filter: &ListUserDocumentsQuery,
) -> Result<Vec<UserDocumentListItem>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.title, d.status, d.created_at, d.updated_at, d.last_generated_at, d.version,
                t.id, t.name, t.category, t.icon
         FROM user_documents d
         JOIN document_types t ON t.id = d.document_type_id
         WHERE d.user_id = ?1
           AND (?2 IS NULL OR d.status = ?2)
           AND (?3 IS NULL OR d.document_type_id = ?3)
         ORDER BY d.updated_at DESC, d.rowid DESC",
    )?;
    let documents = stmt
        .query_map(
            params![
                user_id,
                filter.status.as_ref().map(enum_text),
                filter.document_type_id
            ],
            |row| {
                Ok(UserDocumentListItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    status: enum_column(row, 2)?,
                    created_at: ts_column(row, 3)?,
                    updated_at: ts_column(row, 4)?,
                    last_generated_at: opt_ts_column(row, 5)?,
                    version: row.get(6)?,
                    document_type: DocumentTypeBadge {
                        id: row.get(7)?,
                        name: row.get(8)?,
                        category: opt_enum_column(row, 9)?,
                        icon: row.get(10)?,
                    },
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(documents)
}
