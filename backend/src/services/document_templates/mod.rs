//! # Document Template Service Module
//!
//! Read access to the template registry and themed PDF rendering, under
//! `/api/document-templates`.
//!
//! ## Sub-modules:
//! - `list`: every registered template module with its fields and themes.
//! - `raw`: the unpopulated HTML of each theme of one module.
//! - `render`: populates one theme and returns it as a PDF.

mod list;
mod raw;
mod render;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/document-templates";

/// # Registered Routes:
///
/// *   **`GET /`**: `list::process`.
/// *   **`GET /{slug}`**: `raw::process`, `404` for an unknown slug.
/// *   **`POST /{slug}/render`**: `render::process`. Body `{formData, theme}`;
///     answers `application/pdf`, or `404`/`400`/`504`/`500`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/{slug}", get().to(raw::process))
        .route("/{slug}/render", post().to(render::process))
}
