//! HTTP surface: one sub-module per API area, each registering its own scope.

pub mod auth;
pub mod document_templates;
pub mod document_types;
pub mod user_documents;

use crate::error::AppError;
use actix_web::web::{self, ServiceConfig};
use serde_json::{Map, Value};

fn extractor_error(source: &str, err: impl std::fmt::Display) -> actix_web::Error {
    let mut details = Map::new();
    details.insert(source.to_string(), Value::from(vec![err.to_string()]));
    AppError::validation("Invalid request payload", details)
        .log("EXTRACT")
        .into()
}

/// Registers extractor settings and every API scope on an `App`.
pub fn configure(json_limit: usize) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(json_limit)
                .error_handler(|err, _req| extractor_error("body", err)),
        )
        .app_data(web::QueryConfig::default().error_handler(|err, _req| extractor_error("query", err)))
        .app_data(web::PathConfig::default().error_handler(|err, _req| extractor_error("path", err)))
        .service(auth::configure_routes())
        .service(document_types::configure_routes())
        .service(user_documents::configure_routes())
        .service(document_templates::configure_routes());
    }
}
