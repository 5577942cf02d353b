//! # Document Type Listing
//!
//! `GET /api/document-types` answers the `(id, name)` projection of the
//! catalog, ordered by name, together with a `count`. Inactive types are
//! hidden unless `includeInactive=true` is passed.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::document_type::DocumentTypeSummary;
use common::requests::ListDocumentTypesQuery;
use common::responses::ApiResponse;
use rusqlite::{params, Connection};

const OP: &str = "LIST_DOCUMENT_TYPES";

/// Actix web handler for `GET /api/document-types[?includeInactive=true]`.
///
/// # Returns
/// - `200 OK` with the `(id, name)` rows and their `count`.
pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<ListDocumentTypesQuery>,
) -> Result<HttpResponse, AppError> {
    let active_only = !query.include_inactive;
    let types = state
        .db
        .run(move |conn| list_document_types(conn, active_only))
        .await
        .map_err(|e| e.log(OP))?;
    let count = types.len();
    Ok(HttpResponse::Ok().json(ApiResponse::data(types).with_count(count)))
}

/// `(id, name)` of every type, ordered by name.
pub fn list_document_types(conn: &Connection, active_only: bool) -> Result<Vec<DocumentTypeSummary>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM document_types
         WHERE ?1 = 0 OR is_active = 1
         ORDER BY name ASC",
    )?;
    let types = stmt
        .query_map(params![active_only], |row| {
            Ok(DocumentTypeSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(types)
}
