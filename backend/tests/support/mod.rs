#![allow(dead_code)]

use async_trait::async_trait;
use common::model::document_type::{DocumentType, FieldType};
use common::model::user::User;
use common::requests::{CreateDocumentTypeRequest, DocumentFieldInput};
use docuform::auth::account::{self, NewAccount};
use docuform::auth::token::TokenService;
use docuform::db::{migrate, Database};
use docuform::registry::TemplateRegistry;
use docuform::render::{PdfEngine, PrintOptions, RenderError, RenderPipeline};
use docuform::services::document_types::create::create_document_type;
use docuform::state::AppState;
use docuform::uploads::UploadStore;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn memory_conn() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory database");
    migrate(&conn).expect("schema");
    conn
}

pub fn add_user(conn: &mut Connection, email: &str) -> User {
    account::create(
        conn,
        NewAccount {
            first_name: "Test".into(),
            last_name: "User".into(),
            email: email.into(),
            phone: None,
            password_hash: "$argon2id$unused".into(),
            profile_image: None,
        },
    )
    .expect("user inserted")
}

pub fn field(name: &str, sort_order: i64, required: bool) -> DocumentFieldInput {
    let mut input = DocumentFieldInput::new(name, format!("Label of {}", name), FieldType::Text);
    input.sort_order = sort_order;
    input.is_required = required;
    input
}

/// A type with a required `fullName` and an optional `nickname`.
pub fn letter_type(conn: &mut Connection, name: &str) -> DocumentType {
    let mut req = CreateDocumentTypeRequest::named(name);
    req.template_path = Some("templates/letter.html".into());
    req.fields = vec![field("nickname", 2, false), field("fullName", 1, true)];
    create_document_type(conn, &req).expect("document type created")
}

pub fn field_id(document_type: &DocumentType, name: &str) -> String {
    document_type
        .fields
        .iter()
        .find(|f| f.field_name == name)
        .map(|f| f.id.clone())
        .expect("field exists")
}

/// Returns a fixed PDF for every document.
pub struct FakePdfEngine;

#[async_trait]
impl PdfEngine for FakePdfEngine {
    async fn print_pdf(&self, _html: &str, _options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
        Ok(b"%PDF-1.7\n%fake\n%%EOF".to_vec())
    }
}

/// Never finishes; tracks how many instances are alive.
pub struct HangingPdfEngine {
    pub live: Arc<AtomicUsize>,
}

struct LiveInstance(Arc<AtomicUsize>);

impl Drop for LiveInstance {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PdfEngine for HangingPdfEngine {
    async fn print_pdf(&self, _html: &str, _options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        let _instance = LiveInstance(Arc::clone(&self.live));
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

/// Application state on an in-memory database with a scratch upload directory.
pub fn test_state(engine: Arc<dyn PdfEngine>, render_timeout: Duration) -> (AppState, TempDir) {
    let uploads = tempfile::tempdir().expect("scratch dir");
    let state = AppState::new(
        Database::open_in_memory().expect("database"),
        TokenService::new(TEST_SECRET, Duration::from_secs(3600)),
        TemplateRegistry::builtin(),
        RenderPipeline::new(engine, render_timeout),
        UploadStore::new(uploads.path().join("profile-pictures")),
    );
    (state, uploads)
}
