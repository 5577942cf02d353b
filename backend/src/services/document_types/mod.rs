//! # Document Type Service Module
//!
//! Authoring endpoints for document types (schemas of typed fields), under
//! `/api/document-types`.
//!
//! ## Sub-modules:
//! - `create`: stores a new type and its fields.
//! - `list`: `(id, name)` of the active types, or of all of them.
//! - `get`: one type with its ordered fields.
//! - `update`: partial update plus field synchronisation by `fieldName`.
//! - `delete`: removes a type that no user document uses.
//! - `slug`: slug normalisation shared by create and update.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod slug;
pub mod update;

use actix_web::web::{delete as delete_route, get as get_route, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/document-types";

/// # Registered Routes:
///
/// *   **`GET /`**: `list::process`. `?includeInactive=true` also lists
///     inactive types.
/// *   **`POST /`**: `create::process`. `201` with the stored type.
/// *   **`GET /{id}`**: `get::process`.
/// *   **`PUT /{id}`**: `update::process`.
/// *   **`DELETE /{id}`**: `delete::process`. Answers `{id, name, fieldsDeleted}`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get_route().to(list::process))
        .route("", post().to(create::process))
        .route("/{id}", get_route().to(get::process))
        .route("/{id}", put().to(update::process))
        .route("/{id}", delete_route().to(delete::process))
}
