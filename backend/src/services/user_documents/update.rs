//! # User Document Update
//!
//! `PUT /api/user-documents/{id}` applies the title and status of the payload
//! and upserts every submitted value by `(document, fieldId)`: an existing
//! value is overwritten and its `versionNumber` goes up by one, a new one is
//! inserted at version 1. The document's own `version` grows by one per call.
//! All of it happens in one transaction.

use crate::auth::{require_identity, Identity};
use crate::db::{encode_ts, enum_text, now};
use crate::error::AppError;
use crate::services::document_types::get::load_fields;
use crate::services::user_documents::get::fetch_detail;
use crate::services::user_documents::{owned_document, stored_value};
use crate::state::AppState;
use crate::validation::field_data::{check_duplicates, check_field_ids};
use crate::validation::payload::check_user_document_update;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::user_document::UserDocument;
use common::requests::{FieldValueInput, UpdateUserDocumentRequest};
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};
use uuid::Uuid;

const OP: &str = "UPDATE_USER_DOCUMENT";

pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    id: web::Path<String>,
    payload: web::Json<UpdateUserDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let id = id.into_inner();
    let req = payload.into_inner();
    check_user_document_update(&req).map_err(|e| e.log(OP))?;

    let updated = state
        .db
        .run(move |conn| update_user_document(conn, &identity.user_id, &id, &req))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] document {} now at version {}", OP, updated.id, updated.version);
    Ok(HttpResponse::Ok().json(ApiResponse::data(updated).with_message("Document updated successfully")))
}

fn upsert_value(
    conn: &Connection,
    user_document_id: &str,
    input: &FieldValueInput,
    ts: &DateTime<Utc>,
) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO document_field_data (id, user_document_id, field_id, value, version_number, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
         ON CONFLICT (user_document_id, field_id) DO UPDATE SET
            value = excluded.value,
            version_number = version_number + 1,
            updated_at = excluded.updated_at",
        params![
            Uuid::new_v4().to_string(),
            user_document_id,
            input.field_id,
            stored_value(input.value.as_deref()),
            encode_ts(ts),
        ],
    )?;
    Ok(())
}

pub fn update_user_document(
    conn: &mut Connection,
    user_id: &str,
    id: &str,
    req: &UpdateUserDocumentRequest,
) -> Result<UserDocument, AppError> {
    let tx = conn.transaction()?;
    let owned = owned_document(&tx, user_id, id)?;

    if let Some(values) = &req.field_data {
        let fields = load_fields(&tx, &owned.document_type_id)?;
        check_field_ids(&fields, values)?;
        check_duplicates(values)?;
    }

    let ts = now();
    tx.execute(
        "UPDATE user_documents SET
            title = COALESCE(?1, title),
            status = COALESCE(?2, status),
            version = version + 1,
            updated_at = ?3
         WHERE id = ?4",
        params![
            req.title.as_deref().map(str::trim),
            req.status.as_ref().map(enum_text),
            encode_ts(&ts),
            owned.id,
        ],
    )?;
    for input in req.field_data.iter().flatten() {
        upsert_value(&tx, &owned.id, input, &ts)?;
    }

    let updated = fetch_detail(&tx, &owned.id, false)?;
    tx.commit()?;
    Ok(updated)
}
