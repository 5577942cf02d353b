//! # Document Status Change
//!
//! `PATCH /api/user-documents/{id}/status` moves one of the caller's documents
//! to another status. Only the status and `updatedAt` change; the document
//! `version` counts content edits and stays as it is.

use crate::auth::{require_identity, Identity};
use crate::db::{encode_ts, enum_text, now};
use crate::error::AppError;
use crate::services::user_documents::owned_document;
use crate::state::AppState;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use common::model::user_document::{DocumentStatus, StatusChange};
use common::requests::UpdateStatusRequest;
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};

const OP: &str = "UPDATE_DOCUMENT_STATUS";

/// Actix web handler for `PATCH /api/user-documents/{id}/status`.
///
/// # Arguments
/// * `identity` - The caller, resolved by the authentication guard.
/// * `id` - The document id, from the URL path.
/// * `payload` - `{ "status": ... }`.
///
/// # Returns
/// - `200 OK` with `{id, title, status, documentType, updatedAt}`.
/// - `404 Not Found` if the caller owns no document with this id.
pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    id: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let id = id.into_inner();
    let status = payload.into_inner().status;

    let change = state
        .db
        .run(move |conn| update_status(conn, &identity.user_id, &id, status))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] document {} is now {:?}", OP, change.id, change.status);
    Ok(HttpResponse::Ok().json(ApiResponse::data(change).with_message("Document status updated successfully")))
}

/// Sets the status alone. The document `version` is left as it is.
pub fn update_status(
    conn: &Connection,
    user_id: &str,
    id: &str,
    status: DocumentStatus,
) -> Result<StatusChange, AppError> {
    let owned = owned_document(conn, user_id, id)?;
    let ts = now();
    conn.execute(
        "UPDATE user_documents SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![enum_text(&status), encode_ts(&ts), owned.id],
    )?;
    Ok(StatusChange {
        id: owned.id,
        title: owned.title,
        status,
        document_type: owned.document_type_name,
        updated_at: ts,
    })
}
