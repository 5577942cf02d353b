//! # Document Type Creation
//!
//! `POST /api/document-types` stores a new document type together with its
//! field list in one transaction and answers `201 Created` with the stored
//! type.
//!
//! The slug is taken from the payload when given and derived from `name`
//! otherwise; both pass through the same normalisation. Name and slug must not
//! collide with any existing type.

use crate::db::{encode_json, encode_ts, enum_text, now};
use crate::error::AppError;
use crate::services::document_types::get::load;
use crate::services::document_types::slug::slugify;
use crate::state::AppState;
use crate::validation::payload::check_document_type_create;
use crate::validation::FieldErrors;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::document_type::DocumentType;
use common::requests::{CreateDocumentTypeRequest, DocumentFieldInput};
use common::responses::ApiResponse;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

const OP: &str = "CREATE_DOCUMENT_TYPE";

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<CreateDocumentTypeRequest>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    check_document_type_create(&req).map_err(|e| e.log(OP))?;

    let created = state
        .db
        .run(move |conn| create_document_type(conn, &req))
        .await
        .map_err(|e| e.log(OP))?;

    info!(
        "[{}] document type '{}' created with {} fields ({})",
        OP,
        created.slug,
        created.fields.len(),
        created.id
    );
    Ok(HttpResponse::Created().json(ApiResponse::data(created).with_message("Document type created successfully")))
}

/// Normalises a caller-provided or derived slug, rejecting ones that end up empty.
pub(crate) fn normalized_slug(source: &str) -> Result<String, AppError> {
    let slug = slugify(source);
    if slug.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("slug", "must contain at least one letter or digit");
        errors.into_result()?;
    }
    Ok(slug)
}

/// Fails with `Conflict` when another type (other than `exclude`) already uses
/// `name` or `slug`. `None` skips that check.
pub(crate) fn find_conflict(
    conn: &Connection,
    name: Option<&str>,
    slug: Option<&str>,
    exclude: Option<&str>,
) -> Result<(), AppError> {
    let clash: Option<(String, String)> = conn
        .query_row(
            "SELECT name, slug FROM document_types
             WHERE (name = ?1 OR slug = ?2) AND id IS NOT ?3
             LIMIT 1",
            params![name, slug, exclude],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match clash {
        Some((existing, _)) if Some(existing.as_str()) == name => Err(AppError::Conflict(
            "Document type with this name already exists".to_string(),
        )),
        Some(_) => Err(AppError::Conflict(
            "Document type with this slug already exists".to_string(),
        )),
        None => Ok(()),
    }
}

/// Submitted fields with `fieldName` and `label` trimmed, so that names
/// differing only in surrounding whitespace are the same field.
pub(crate) fn trimmed_fields(fields: &[DocumentFieldInput]) -> Vec<DocumentFieldInput> {
    fields
        .iter()
        .map(|field| DocumentFieldInput {
            field_name: field.field_name.trim().to_string(),
            label: field.label.trim().to_string(),
            ..field.clone()
        })
        .collect()
}

pub(crate) fn insert_field(
    conn: &Connection,
    document_type_id: &str,
    field: &DocumentFieldInput,
    ts: &DateTime<Utc>,
) -> Result<String, AppError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO document_fields (
            id, document_type_id, field_name, label, field_type, is_required, sort_order,
            placeholder, default_value, validation, options, help_text, section,
            min_length, max_length, depends_on, depends_value, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)",
        params![
            id,
            document_type_id,
            field.field_name,
            field.label,
            enum_text(&field.field_type),
            field.is_required,
            field.sort_order,
            field.placeholder,
            field.default_value,
            field.validation,
            encode_json(field.options.as_ref()),
            field.help_text,
            field.section,
            field.min_length,
            field.max_length,
            field.depends_on,
            field.depends_value,
            encode_ts(ts),
        ],
    )?;
    Ok(id)
}

pub fn create_document_type(conn: &mut Connection, req: &CreateDocumentTypeRequest) -> Result<DocumentType, AppError> {
    let name = req.name.trim();
    let slug = normalized_slug(req.slug.as_deref().unwrap_or(name))?;

    let tx = conn.transaction()?;
    find_conflict(&tx, Some(name), Some(&slug), None)?;

    let id = Uuid::new_v4().to_string();
    let ts = now();
    tx.execute(
        "INSERT INTO document_types (
            id, name, slug, description, template_path, is_active, category, icon, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id,
            name,
            slug,
            req.description,
            req.template_path,
            req.is_active,
            req.category.as_ref().map(enum_text),
            req.icon,
            encode_ts(&ts),
        ],
    )?;
    for field in &trimmed_fields(&req.fields) {
        insert_field(&tx, &id, field, &ts)?;
    }

    let created = load(&tx, &id)?
        .ok_or_else(|| AppError::Internal("document type vanished after insert".to_string()))?;
    tx.commit()?;
    Ok(created)
}
