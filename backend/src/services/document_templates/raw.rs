//! # Raw Theme Templates
//!
//! `GET /api/document-templates/{slug}` returns the unpopulated HTML of every
//! theme of one template module, placeholders intact, plus its field list.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::responses::ApiResponse;

const OP: &str = "GET_RAW_TEMPLATES";

/// Actix web handler for `GET /api/document-templates/{slug}`.
///
/// # Returns
/// - `200 OK` with `{slug, fields, templates: {theme: html}}`.
/// - `404 Not Found` if no module is registered under `slug`.
pub async fn process(state: web::Data<AppState>, slug: web::Path<String>) -> Result<HttpResponse, AppError> {
    let module = state
        .registry
        .get(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Document type '{}' not found.", slug)).log(OP))?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(module.raw_templates())))
}
