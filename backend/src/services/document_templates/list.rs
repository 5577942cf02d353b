//! # Template Catalog
//!
//! `GET /api/document-templates` lists every registered template module with
//! its placeholder fields and theme names.

use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::responses::ApiResponse;

/// `GET /api/document-templates`
pub async fn process(state: web::Data<AppState>) -> HttpResponse {
    let descriptors = state.registry.descriptors();
    let count = descriptors.len();
    HttpResponse::Ok().json(ApiResponse::data(descriptors).with_count(count))
}
