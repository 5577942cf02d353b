//! # User Document Deletion
//!
//! `DELETE /api/user-documents/{id}` removes one of the caller's documents
//! together with every stored field value.

use crate::auth::{require_identity, Identity};
use crate::error::AppError;
use crate::services::user_documents::owned_document;
use crate::state::AppState;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use common::model::user_document::DeletedUserDocument;
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};

const OP: &str = "DELETE_USER_DOCUMENT";

/// Actix web handler for `DELETE /api/user-documents/{id}`.
///
/// # Returns
/// - `200 OK` with the `id` and `title` of the removed document.
/// - `404 Not Found` if the caller owns no document with this id.
pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let id = id.into_inner();
    let deleted = state
        .db
        .run(move |conn| delete_user_document(conn, &identity.user_id, &id))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] document {} deleted", OP, deleted.id);
    Ok(HttpResponse::Ok().json(ApiResponse::data(deleted).with_message("Document deleted successfully")))
}

/// Removes the stored values, then the document, in one transaction.
pub fn delete_user_document(conn: &mut Connection, user_id: &str, id: &str) -> Result<DeletedUserDocument, AppError> {
    let tx = conn.transaction()?;
    let owned = owned_document(&tx, user_id, id)?;
    tx.execute(
        "DELETE FROM document_field_data WHERE user_document_id = ?1",
        params![owned.id],
    )?;
    tx.execute("DELETE FROM user_documents WHERE id = ?1", params![owned.id])?;
    tx.commit()?;

    Ok(DeletedUserDocument {
        id: owned.id,
        title: owned.title,
    })
}
