//! # Document Type Update
//!
//! `PUT /api/document-types/{id}` changes the attributes present in the payload
//! and, when a `fields` list is supplied, synchronises the stored fields with
//! it. Fields are matched by `fieldName`:
//!
//! - names only in the new list are created;
//! - names in both lists are overwritten in place, keeping their id;
//! - names only in the stored list are deleted together with every stored
//!   value that references them.
//!
//! Everything runs in one transaction. Renaming a type keeps its slug; the
//! slug only changes when the payload carries one.

use crate::db::{encode_json, encode_ts, enum_text, now};
use crate::error::AppError;
use crate::services::document_types::create::{find_conflict, insert_field, normalized_slug, trimmed_fields};
use crate::services::document_types::get::{load, not_found};
use crate::state::AppState;
use crate::validation::payload::check_document_type_update;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::document_type::{DocumentField, DocumentType};
use common::requests::{DocumentFieldInput, UpdateDocumentTypeRequest};
use common::responses::ApiResponse;
use log::{debug, info};
use rusqlite::{params, Connection};
use std::collections::HashSet;

const OP: &str = "UPDATE_DOCUMENT_TYPE";

pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<UpdateDocumentTypeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let req = payload.into_inner();
    check_document_type_update(&req).map_err(|e| e.log(OP))?;

    let updated = state
        .db
        .run(move |conn| update_document_type(conn, &id, &req))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] document type {} updated", OP, updated.id);
    Ok(HttpResponse::Ok().json(ApiResponse::data(updated).with_message("Document type updated successfully")))
}

/// Outcome of matching stored fields against a submitted list by `field_name`.
#[derive(Debug, Default, PartialEq)]
pub struct FieldDiff<'a> {
    pub to_create: Vec<&'a DocumentFieldInput>,
    pub to_update: Vec<&'a DocumentFieldInput>,
    pub to_delete: Vec<&'a DocumentField>,
}

pub fn diff_fields<'a>(existing: &'a [DocumentField], incoming: &'a [DocumentFieldInput]) -> FieldDiff<'a> {
    let stored: HashSet<&str> = existing.iter().map(|f| f.field_name.as_str()).collect();
    let submitted: HashSet<&str> = incoming.iter().map(|f| f.field_name.as_str()).collect();

    let (to_update, to_create): (Vec<_>, Vec<_>) = incoming
        .iter()
        .partition(|field| stored.contains(field.field_name.as_str()));
    let to_delete = existing
        .iter()
        .filter(|field| !submitted.contains(field.field_name.as_str()))
        .collect();

    FieldDiff {
        to_create,
        to_update,
        to_delete,
    }
}

fn overwrite_field(
    conn: &Connection,
    document_type_id: &str,
    field: &DocumentFieldInput,
    ts: &DateTime<Utc>,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE document_fields SET
            label = ?1, field_type = ?2, is_required = ?3, sort_order = ?4, placeholder = ?5,
            default_value = ?6, validation = ?7, options = ?8, help_text = ?9, section = ?10,
            min_length = ?11, max_length = ?12, depends_on = ?13, depends_value = ?14, updated_at = ?15
         WHERE document_type_id = ?16 AND field_name = ?17",
        params![
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
            document_type_id,
            field.field_name,
        ],
    )?;
    Ok(())
}

fn sync_fields(
    conn: &Connection,
    document_type_id: &str,
    existing: &[DocumentField],
    incoming: &[DocumentFieldInput],
    ts: &DateTime<Utc>,
) -> Result<(), AppError> {
    let diff = diff_fields(existing, incoming);

    let mut values_dropped = 0;
    for field in &diff.to_delete {
        values_dropped += conn.execute("DELETE FROM document_field_data WHERE field_id = ?1", params![field.id])?;
        conn.execute("DELETE FROM document_fields WHERE id = ?1", params![field.id])?;
    }
    for field in &diff.to_update {
        overwrite_field(conn, document_type_id, field, ts)?;
    }
    for field in &diff.to_create {
        insert_field(conn, document_type_id, field, ts)?;
    }

    debug!(
        "[{}] fields of {}: {} created, {} updated, {} deleted ({} stored values dropped)",
        OP,
        document_type_id,
        diff.to_create.len(),
        diff.to_update.len(),
        diff.to_delete.len(),
        values_dropped
    );
    Ok(())
}

pub fn update_document_type(
    conn: &mut Connection,
    id: &str,
    req: &UpdateDocumentTypeRequest,
) -> Result<DocumentType, AppError> {
    let tx = conn.transaction()?;
    let existing = load(&tx, id)?.ok_or_else(not_found)?;

    let name = req.name.as_deref().map(str::trim);
    let slug = req.slug.as_deref().map(normalized_slug).transpose()?;
    let name_changed = name.filter(|n| *n != existing.name);
    let slug_changed = slug.as_deref().filter(|s| *s != existing.slug);
    if name_changed.is_some() || slug_changed.is_some() {
        find_conflict(&tx, name_changed, slug_changed, Some(id))?;
    }

    let ts = now();
    tx.execute(
        "UPDATE document_types SET
            name = COALESCE(?1, name),
            slug = COALESCE(?2, slug),
            description = COALESCE(?3, description),
            template_path = COALESCE(?4, template_path),
            is_active = COALESCE(?5, is_active),
            category = COALESCE(?6, category),
            icon = COALESCE(?7, icon),
            updated_at = ?8
         WHERE id = ?9",
        params![
            name,
            slug,
            req.description,
            req.template_path,
            req.is_active,
            req.category.as_ref().map(enum_text),
            req.icon,
            encode_ts(&ts),
            id,
        ],
    )?;

    if let Some(fields) = &req.fields {
        sync_fields(&tx, id, &existing.fields, &trimmed_fields(fields), &ts)?;
    }

    let updated = load(&tx, id)?.ok_or_else(not_found)?;
    tx.commit()?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::document_type::FieldType;

    fn stored(id: &str, name: &str) -> DocumentField {
        DocumentField {
            id: id.into(),
            document_type_id: "t1".into(),
            field_name: name.into(),
            label: name.into(),
            field_type: FieldType::Text,
            is_required: true,
            sort_order: 0,
            placeholder: None,
            default_value: None,
            validation: None,
            options: None,
            help_text: None,
            section: None,
            min_length: None,
            max_length: None,
            depends_on: None,
            depends_value: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn diff_splits_by_field_name() {
        let existing = vec![stored("id-a", "a"), stored("id-c", "c")];
        let incoming = vec![
            DocumentFieldInput::new("a", "A renamed", FieldType::Textarea),
            DocumentFieldInput::new("b", "B", FieldType::Date),
        ];
        let diff = diff_fields(&existing, &incoming);
        assert_eq!(diff.to_create.len(), 1);
        assert_eq!(diff.to_create[0].field_name, "b");
        assert_eq!(diff.to_update.len(), 1);
        assert_eq!(diff.to_update[0].label, "A renamed");
        assert_eq!(diff.to_delete.len(), 1);
        assert_eq!(diff.to_delete[0].id, "id-c");
    }

    #[test]
    fn empty_list_deletes_everything() {
        let existing = vec![stored("1", "a"), stored("2", "b")];
        let diff = diff_fields(&existing, &[]);
        assert!(diff.to_create.is_empty() && diff.to_update.is_empty());
        assert_eq!(diff.to_delete.len(), 2);
    }

    #[test]
    fn identical_lists_only_update() {
        let existing = vec![stored("1", "a")];
        let incoming = vec![DocumentFieldInput::new("a", "A", FieldType::Text)];
        let diff = diff_fields(&existing, &incoming);
        assert_eq!(diff.to_update.len(), 1);
        assert!(diff.to_create.is_empty() && diff.to_delete.is_empty());
    }
}
