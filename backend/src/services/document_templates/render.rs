//! # Themed PDF Rendering
//!
//! `POST /api/document-templates/{slug}/render` fills one theme of a template
//! module with the submitted `formData` and streams the printed PDF back for
//! inline display.
//!
//! `formData` values may be any JSON value: strings are used as they are,
//! `null` becomes an empty string, and anything else is inserted in its JSON
//! text form.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::requests::RenderRequest;
use log::info;
use serde_json::Value;
use std::collections::HashMap;

const OP: &str = "RENDER_DOCUMENT";

pub fn text_values(form_data: HashMap<String, Value>) -> HashMap<String, String> {
    form_data
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, text)
        })
        .collect()
}

pub async fn process(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    payload: web::Json<RenderRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = slug.into_inner();
    let RenderRequest { form_data, theme } = payload.into_inner();
    let values = text_values(form_data);

    let pdf = state
        .renderer
        .render(&state.registry, &slug, &theme, &values)
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] rendered {} ({}), {} bytes", OP, slug, theme, pdf.len());
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(format!("{}-{}.pdf", slug, theme))],
        })
        .body(pdf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_become_text() {
        let values = text_values(HashMap::from([
            ("name".to_string(), json!("Ada")),
            ("age".to_string(), json!(36)),
            ("remote".to_string(), json!(true)),
            ("note".to_string(), Value::Null),
        ]));
        assert_eq!(values["name"], "Ada");
        assert_eq!(values["age"], "36");
        assert_eq!(values["remote"], "true");
        assert_eq!(values["note"], "");
    }
}
