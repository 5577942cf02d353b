//! # Document Type Deletion
//!
//! `DELETE /api/document-types/{id}` removes the type and its fields in one
//! transaction. A type still used by any user document cannot be deleted: the
//! foreign keys of the stored documents make the delete fail, the transaction
//! rolls back, and the caller gets `409` with a `ReferentialError`.

use crate::error::AppError;
use crate::services::document_types::get::{load, not_found};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::document_type::DeletedDocumentType;
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};

const OP: &str = "DELETE_DOCUMENT_TYPE";

pub async fn process(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let deleted = state
        .db
        .run(move |conn| delete_document_type(conn, &id))
        .await
        .map_err(|e| e.log(OP))?;

    info!(
        "[{}] document type {} deleted with {} fields",
        OP, deleted.id, deleted.fields_deleted
    );
    Ok(HttpResponse::Ok().json(ApiResponse::data(deleted).with_message("Document type deleted successfully")))
}

/// Returns the number of fields removed.
fn remove_rows(conn: &Connection, id: &str) -> Result<usize, AppError> {
    let fields_deleted = conn.execute("DELETE FROM document_fields WHERE document_type_id = ?1", params![id])?;
    conn.execute("DELETE FROM document_types WHERE id = ?1", params![id])?;
    Ok(fields_deleted)
}

pub fn delete_document_type(conn: &mut Connection, id: &str) -> Result<DeletedDocumentType, AppError> {
    let tx = conn.transaction()?;
    let existing = load(&tx, id)?.ok_or_else(not_found)?;

    let fields_deleted = match remove_rows(&tx, id) {
        Ok(count) => count,
        Err(AppError::Referential(detail)) => {
            return Err(AppError::Referential(format!(
                "Cannot delete document type due to existing references ({})",
                detail
            )))
        }
        Err(other) => return Err(other),
    };
    tx.commit()?;

    Ok(DeletedDocumentType {
        id: existing.id,
        name: existing.name,
        fields_deleted,
    })
}
