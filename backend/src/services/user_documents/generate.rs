//! # Artifact Generation
//!
//! `POST /api/user-documents/{id}/generate` reserves the output locations of a
//! generation run: it records a PDF and a DOCX path, unique per user, document
//! and millisecond, together with the generation time. No bytes are produced
//! here; themed PDFs come from `POST /api/document-templates/{slug}/render`.

use crate::auth::{require_identity, Identity};
use crate::db::{encode_ts, now};
use crate::error::AppError;
use crate::services::user_documents::owned_document;
use crate::state::AppState;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::user_document::GeneratedArtifacts;
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection};

const OP: &str = "GENERATE_DOCUMENT";

pub async fn process(
    state: web::Data<AppState>,
    identity: Option<ReqData<Identity>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = require_identity(identity).map_err(|e| e.log(OP))?;
    let id = id.into_inner();
    let artifacts = state
        .db
        .run(move |conn| generate_artifacts(conn, &identity.user_id, &id))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] document {} reserved {}", OP, artifacts.id, artifacts.pdf_path);
    Ok(HttpResponse::Ok().json(ApiResponse::data(artifacts).with_message("Document generated successfully")))
}

/// `(pdf, docx)` output paths for one run.
pub fn artifact_paths(user_id: &str, document_id: &str, at: &DateTime<Utc>) -> (String, String) {
    let stem = format!("/documents/{}/{}_{}", user_id, document_id, at.timestamp_millis());
    (format!("{}.pdf", stem), format!("{}.docx", stem))
}

pub fn generate_artifacts(conn: &Connection, user_id: &str, id: &str) -> Result<GeneratedArtifacts, AppError> {
    let owned = owned_document(conn, user_id, id)?;
    if owned.template_path.as_deref().map_or(true, |p| p.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "No template available for this document type".to_string(),
        ));
    }

    let generated_at = now();
    let (pdf_path, docx_path) = artifact_paths(user_id, &owned.id, &generated_at);
    conn.execute(
        "UPDATE user_documents
         SET generated_pdf_path = ?1, generated_docx_path = ?2, last_generated_at = ?3
         WHERE id = ?4",
        params![pdf_path, docx_path, encode_ts(&generated_at), owned.id],
    )?;

    Ok(GeneratedArtifacts {
        id: owned.id,
        title: owned.title,
        pdf_path,
        docx_path,
        generated_at,
    })
}
