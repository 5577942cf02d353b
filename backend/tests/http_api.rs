mod support;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use docuform::render::PdfEngine;
use docuform::services;
use docuform::state::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use support::{test_state, FakePdfEngine, HangingPdfEngine};

const BOUNDARY: &str = "docuform-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

async fn app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(services::configure(1 << 20)),
    )
    .await
}

fn multipart_body(text: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in text {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"profileImage\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn register_request(email: &str, image: Option<(&str, &[u8])>) -> Request {
    test::TestRequest::post()
        .uri("/api/auth/register")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("email", email),
                ("phone", ""),
                ("password", "analytical-engine"),
            ],
            image,
        ))
        .to_request()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Registers an account and returns its bearer token.
async fn sign_up<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, register_request(email, None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": email, "password": "analytical-engine"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, login).await;
    body["token"].as_str().expect("token issued").to_string()
}

fn fake_state() -> (AppState, tempfile::TempDir) {
    test_state(Arc::new(FakePdfEngine), Duration::from_secs(5))
}

#[actix_web::test]
async fn register_hides_the_password_and_rejects_duplicates() {
    let (state, _dir) = fake_state();
    let app = app(state).await;

    let resp = test::call_service(&app, register_request("Ada@Example.com", None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["phone"], Value::Null);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());

    let resp = test::call_service(&app, register_request("ada@example.com", None)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Email already in use");
}

#[actix_web::test]
async fn register_stores_the_profile_image_by_digest() {
    let (state, dir) = fake_state();
    let app = app(state).await;

    let resp = test::call_service(&app, register_request("pic@example.com", Some(("me.png", PNG_BYTES)))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let stored = body["data"]["profileImage"].as_str().expect("image stored");
    let mut digest = md5::Context::new();
    digest.consume(PNG_BYTES);
    assert_eq!(stored, format!("{:x}.png", digest.finalize()));
    assert!(dir.path().join("profile-pictures").join(stored).is_file());

    let resp = test::call_service(&app, register_request("txt@example.com", Some(("notes.txt", &b"hello"[..])))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_and_profile() {
    let (state, _dir) = fake_state();
    let app = app(state).await;
    let token = sign_up(&app, "ada@example.com").await;

    let wrong = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "difference-engine"}))
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");

    let anonymous = test::TestRequest::get().uri("/api/auth/profile").to_request();
    assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::UNAUTHORIZED);

    let profile = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, profile).await;
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["firstName"], "Ada");
}

#[actix_web::test]
async fn user_documents_require_a_valid_bearer_token() {
    let (state, _dir) = fake_state();
    let app = app(state).await;

    for authorization in [None, Some("Token abc"), Some("Bearer not-a-jwt")] {
        let mut req = test::TestRequest::get().uri("/api/user-documents");
        if let Some(value) = authorization {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[actix_web::test]
async fn document_lifecycle_over_http() {
    let (state, _dir) = fake_state();
    let app = app(state).await;
    let token = sign_up(&app, "ada@example.com").await;

    let create_type = test::TestRequest::post()
        .uri("/api/document-types")
        .set_json(json!({
            "name": "Resignation Letter",
            "templatePath": "templates/resignation.html",
            "fields": [
                {"fieldName": "employeeName", "label": "Employee name", "fieldType": "text", "sortOrder": 0},
                {"fieldName": "lastDay", "label": "Last day", "fieldType": "date", "sortOrder": 1, "isRequired": false}
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, create_type).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let type_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["slug"], "resignation-letter");
    let name_field = body["data"]["fields"][0]["id"].as_str().unwrap().to_string();

    let duplicate = test::TestRequest::post()
        .uri("/api/document-types")
        .set_json(json!({"name": "Resignation Letter"}))
        .to_request();
    let resp = test::call_service(&app, duplicate).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Conflict");

    let create_doc = test::TestRequest::post()
        .uri("/api/user-documents")
        .insert_header(bearer(&token))
        .set_json(json!({
            "documentTypeId": type_id,
            "title": "Leaving",
            "fieldData": [{"fieldId": name_field, "value": "Ada Lovelace"}]
        }))
        .to_request();
    let resp = test::call_service(&app, create_doc).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let doc_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "Completed");
    assert_eq!(body["data"]["fieldData"][0]["fieldName"], "employeeName");

    let missing_required = test::TestRequest::post()
        .uri("/api/user-documents")
        .insert_header(bearer(&token))
        .set_json(json!({"documentTypeId": type_id, "title": "Empty", "fieldData": []}))
        .to_request();
    let resp = test::call_service(&app, missing_required).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"]["missingFields"][0]["fieldName"], "employeeName");

    let status = test::TestRequest::patch()
        .uri(&format!("/api/user-documents/{}/status", doc_id))
        .insert_header(bearer(&token))
        .set_json(json!({"status": "Archived"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, status).await;
    assert_eq!(body["data"]["status"], "Archived");
    assert_eq!(body["data"]["documentType"], "Resignation Letter");

    let fetch = test::TestRequest::get()
        .uri(&format!("/api/user-documents/{}", doc_id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, fetch).await;
    assert_eq!(body["data"]["version"], 1);
    assert_eq!(body["data"]["documentType"]["fields"].as_array().unwrap().len(), 2);

    let list = test::TestRequest::get()
        .uri("/api/user-documents?status=Archived")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, list).await;
    assert_eq!(body["count"], 1);

    let delete_type = test::TestRequest::delete()
        .uri(&format!("/api/document-types/{}", type_id))
        .to_request();
    let resp = test::call_service(&app, delete_type).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ReferentialError");

    let other_token = sign_up(&app, "other@example.com").await;
    let foreign = test::TestRequest::get()
        .uri(&format!("/api/user-documents/{}", doc_id))
        .insert_header(bearer(&other_token))
        .to_request();
    assert_eq!(test::call_service(&app, foreign).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_json_is_a_validation_error() {
    let (state, _dir) = fake_state();
    let app = app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/document-types")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");
    assert!(body["details"]["body"].is_array());

    let empty_name = test::TestRequest::post()
        .uri("/api/document-types")
        .set_json(json!({"name": "   "}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, empty_name).await).await;
    assert_eq!(body["error"], "ValidationError");
    assert!(body["details"]["name"].is_array());
}

#[actix_web::test]
async fn template_catalog_and_raw_themes() {
    let (state, _dir) = fake_state();
    let app = app(state).await;

    let list = test::TestRequest::get().uri("/api/document-templates").to_request();
    let body: Value = test::call_and_read_body_json(&app, list).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["slug"], "resignation-letter");
    assert_eq!(body["data"][0]["themes"].as_array().unwrap().len(), 4);

    let raw = test::TestRequest::get()
        .uri("/api/document-templates/resignation-letter")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, raw).await;
    assert!(body["data"]["templates"]["classic"].as_str().unwrap().contains("{{authorName}}"));

    let unknown = test::TestRequest::get().uri("/api/document-templates/nope").to_request();
    let resp = test::call_service(&app, unknown).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Document type 'nope' not found.");
}

fn render_request(slug: &str, theme: &str) -> Request {
    test::TestRequest::post()
        .uri(&format!("/api/document-templates/{}/render", slug))
        .set_json(json!({"theme": theme, "formData": {"authorName": "Ada", "lastWorkingDay": "2026-11-30", "signature": null}}))
        .to_request()
}

#[actix_web::test]
async fn render_returns_an_inline_pdf() {
    let (state, _dir) = fake_state();
    let app = app(state).await;

    let resp = test::call_service(&app, render_request("resignation-letter", "modern")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("inline"));
    assert!(disposition.contains("resignation-letter-modern.pdf"));
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));

    let resp = test::call_service(&app, render_request("nope", "modern")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, render_request("resignation-letter", "gothic")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid theme 'gothic'.");
}

#[actix_web::test]
async fn stalled_render_times_out_and_releases_the_engine() {
    let live = Arc::new(AtomicUsize::new(0));
    let engine: Arc<dyn PdfEngine> = Arc::new(HangingPdfEngine { live: Arc::clone(&live) });
    let (state, _dir) = test_state(engine, Duration::from_millis(100));
    let app = app(state).await;

    let resp = test::call_service(&app, render_request("resignation-letter", "classic")).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "RenderTimeout");
    assert_eq!(live.load(Ordering::SeqCst), 0);
}
