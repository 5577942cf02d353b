//! # Registration
//!
//! `POST /api/auth/register` takes a multipart form with the text parts
//! `firstName`, `lastName`, `email`, `phone` (optional) and `password`, plus an
//! optional file part `profileImage`.
//!
//! The image is read in chunks while its MD5 digest is computed, then checked
//! and stored content-addressed before the account row is written. The
//! password is hashed with Argon2id on the blocking pool.

use crate::auth::account::{self, NewAccount};
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::state::AppState;
use crate::uploads::{UploadedImage, MAX_IMAGE_BYTES};
use crate::validation::payload::check_registration;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::responses::ApiResponse;
use futures_util::StreamExt;
use log::info;
use md5::Context;
use std::collections::HashMap;

const OP: &str = "REGISTER";

/// Upper bound for a single text part.
const MAX_TEXT_PART: usize = 4 * 1024;

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {}", e))
}

/// Text parts by name and the image part, if one was sent with content.
struct RegistrationForm {
    text: HashMap<String, String>,
    image: Option<UploadedImage>,
}

impl RegistrationForm {
    fn text(&self, name: &str) -> &str {
        self.text.get(name).map(|v| v.trim()).unwrap_or_default()
    }
}

async fn read_form(mut payload: Multipart) -> Result<RegistrationForm, AppError> {
    let mut form = RegistrationForm {
        text: HashMap::new(),
        image: None,
    };

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .unwrap_or_default();

        match name.as_str() {
            "profileImage" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let mut hasher = Context::new();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(multipart_error)?;
                    if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                        return Err(AppError::BadRequest("Profile image must not exceed 2 MB".to_string()));
                    }
                    hasher.consume(&chunk);
                    bytes.extend_from_slice(&chunk);
                }
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage {
                        file_name,
                        bytes,
                        md5: format!("{:x}", hasher.finalize()),
                    });
                }
            }
            "firstName" | "lastName" | "email" | "phone" | "password" => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk.map_err(multipart_error)?);
                    if bytes.len() > MAX_TEXT_PART {
                        return Err(AppError::BadRequest(format!("Form part '{}' is too large", name)));
                    }
                }
                let value = String::from_utf8(bytes)
                    .map_err(|_| AppError::BadRequest(format!("Form part '{}' is not valid UTF-8", name)))?;
                form.text.insert(name, value);
            }
            _ => {
                // Unknown parts are drained and ignored.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(multipart_error)?;
                }
            }
        }
    }
    Ok(form)
}

pub async fn process(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, AppError> {
    let form = read_form(payload).await.map_err(|e| e.log(OP))?;

    let first_name = form.text("firstName").to_string();
    let last_name = form.text("lastName").to_string();
    let email = form.text("email").to_lowercase();
    let phone = Some(form.text("phone").to_string()).filter(|p| !p.is_empty());
    let password = form.text.get("password").cloned().unwrap_or_default();
    check_registration(&first_name, &last_name, &email, &password).map_err(|e| e.log(OP))?;

    let profile_image = match &form.image {
        Some(image) => Some(state.uploads.save(image).await.map_err(|e| e.log(OP))?),
        None => None,
    };

    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)).log(OP))?
        .map_err(|e| e.log(OP))?;

    let account = NewAccount {
        first_name,
        last_name,
        email,
        phone,
        password_hash,
        profile_image,
    };
    let user = state
        .db
        .run(move |conn| account::create(conn, account))
        .await
        .map_err(|e| e.log(OP))?;

    info!("[{}] account {} registered", OP, user.id);
    Ok(HttpResponse::Created().json(ApiResponse::data(user).with_message("User registered successfully")))
}
