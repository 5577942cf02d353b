//! # User Document Creation
//!
//! `POST /api/user-documents` instantiates a document type for the caller.
//! When initial values are supplied they are validated against the type's
//! fields first (unknown ids, repeated ids, then required fields), and nothing
//! is written unless all of them pass. The document and its values are stored
//! in one transaction; new documents start as `Completed` at version 1.

use crate::auth::{require_identity, Identity};
use crate::db::{encode_ts, enum_text, now};
use crate::error::AppError;
use crate::services::document_types::get::load_fields;
use crate::services::user_documents::get::fetch_detail;
use crate::services::user_documents::stored_value;
use crate::state::AppState;
use crate::validation::field_data::validate_submission;
use crate::validation::payload::check_user_document_create;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::user_document::{DocumentStatus, UserDocument};
use common::requests::{CreateUserDocumentRequest, FieldValueInput};
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};
use uuid::Uuid;

const OP: &str = "CREATE_USER_DOCUMENT";

pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    payload: web::Json<CreateUserDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let req = payload.into_inner();
    check_user_document_create(&req).map_err(|e| e.log(OP))?;

    let user_id = identity.user_id.clone();
    let created = state
        .db
        .run(move |conn| create_user_document(conn, &user_id, &req))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] user {} created document {}", OP, identity.user_id, created.id);
    Ok(HttpResponse::Created().json(ApiResponse::data(created).with_message("Document created successfully")))
}

pub(crate) fn insert_value(
    conn: &Connection,
    user_document_id: &str,
    input: &FieldValueInput,
    ts: &DateTime<Utc>,
) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO document_field_data (id, user_document_id, field_id, value, version_number, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
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

pub fn create_user_document(
    conn: &mut Connection,
    user_id: &str,
    req: &CreateUserDocumentRequest,
) -> Result<UserDocument, AppError> {
    let tx = conn.transaction()?;

    let type_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM document_types WHERE id = ?1)",
        params![req.document_type_id],
        |row| row.get(0),
    )?;
    if !type_exists {
        return Err(AppError::NotFound("Document type not found".to_string()));
    }

    let values = req.field_data.as_deref().unwrap_or_default();
    if req.field_data.is_some() {
        let fields = load_fields(&tx, &req.document_type_id)?;
        validate_submission(&fields, values)?;
    }

    let id = Uuid::new_v4().to_string();
    let ts = now();
    tx.execute(
        "INSERT INTO user_documents (id, user_id, document_type_id, title, status, version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
        params![
            id,
            user_id,
            req.document_type_id,
            req.title.trim(),
            enum_text(&DocumentStatus::Completed),
            encode_ts(&ts),
        ],
    )?;
    for input in values {
        insert_value(&tx, &id, input, &ts)?;
    }

    let created = fetch_detail(&tx, &id, false)?;
    tx.commit()?;
    Ok(created)
}
