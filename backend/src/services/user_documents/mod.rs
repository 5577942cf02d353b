//! # User Document Service Module
//!
//! Endpoints for a user's own documents under `/api/user-documents`. The whole
//! scope sits behind the bearer-token guard; every operation is scoped to the
//! authenticated caller, and documents of other users answer `404` exactly as
//! missing ones do.
//!
//! ## Sub-modules:
//! - `create`: new document with optional initial values.
//! - `list`: the caller's documents, newest change first.
//! - `get`: one document with its type, fields and stored values.
//! - `update`: title, status and value upserts.
//! - `update_status`: status only.
//! - `delete`: removes a document and its values.
//! - `generate`: records the output paths of a generation run.

pub mod create;
pub mod delete;
pub mod generate;
pub mod get;
pub mod list;
pub mod update;
pub mod update_status;

use crate::auth::middleware::authenticate;
use crate::error::AppError;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{delete as delete_route, get as get_route, patch, post, put, scope};
use rusqlite::{params, Connection, OptionalExtension};

const API_PATH: &str = "/api/user-documents";

/// # Registered Routes:
///
/// *   **`POST /`**: `create::process`, `201`.
/// *   **`GET /`**: `list::process`, filters `?status=` and `?documentTypeId=`.
/// *   **`GET /{id}`**: `get::process`.
/// *   **`PUT /{id}`**: `update::process`.
/// *   **`DELETE /{id}`**: `delete::process`.
/// *   **`PATCH /{id}/status`**: `update_status::process`.
/// *   **`POST /{id}/generate`**: `generate::process`.
pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(authenticate))
        .route("", post().to(create::process))
        .route("", get_route().to(list::process))
        .route("/{id}", get_route().to(get::process))
        .route("/{id}", put().to(update::process))
        .route("/{id}", delete_route().to(delete::process))
        .route("/{id}/status", patch().to(update_status::process))
        .route("/{id}/generate", post().to(generate::process))
}

/// The parts of an owned document that operations need before touching it.
#[derive(Debug, Clone)]
pub(crate) struct OwnedDocument {
    pub id: String,
    pub title: String,
    pub document_type_id: String,
    pub document_type_name: String,
    pub template_path: Option<String>,
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Document not found or you don't have permission to access it".to_string())
}

/// Loads document `id` if it belongs to `user_id`.
pub(crate) fn owned_document(conn: &Connection, user_id: &str, id: &str) -> Result<OwnedDocument, AppError> {
    conn.query_row(
        "SELECT d.id, d.title, d.document_type_id, t.name, t.template_path
         FROM user_documents d
         JOIN document_types t ON t.id = d.document_type_id
         WHERE d.id = ?1 AND d.user_id = ?2",
        params![id, user_id],
        |row| {
            Ok(OwnedDocument {
                id: row.get(0)?,
                title: row.get(1)?,
                document_type_id: row.get(2)?,
                document_type_name: row.get(3)?,
                template_path: row.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or_else(not_found)
}

/// Submitted values are stored as given, except that an empty string is
/// stored as no value.
pub(crate) fn stored_value(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
