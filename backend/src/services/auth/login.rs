//! # Login
//!
//! `POST /api/auth/login` exchanges an email and password for a signed bearer
//! token. The password check runs on the blocking pool.

use crate::auth::account;
use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::payload::check_login;
use actix_web::{web, HttpResponse};
use common::requests::LoginRequest;
use common::responses::ApiResponse;
use log::info;

const OP: &str = "LOGIN";

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Actix web handler for `POST /api/auth/login`.
///
/// # Arguments
/// * `payload` - `{ "email": ..., "password": ... }`. The email is matched
///   case-insensitively.
///
/// # Returns
/// - `200 OK` with the account and a `token`.
/// - `401 Unauthorized` with the same message for an unknown email, an
///   inactive account and a wrong password.
pub async fn process(state: web::Data<AppState>, payload: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = payload.into_inner();
    let email = email.trim().to_lowercase();
    check_login(&email, &password).map_err(|e| e.log(OP))?;

    let lookup = email.clone();
    let stored = state
        .db
        .run(move |conn| account::find_by_email(conn, &lookup))
        .await
        .map_err(|e| e.log(OP))?
        .filter(|stored| stored.user.is_active)
        .ok_or_else(|| invalid_credentials().log(OP))?;

    let hash = stored.password_hash.clone();
    let matches = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)).log(OP))?;
    if !matches {
        return Err(invalid_credentials().log(OP));
    }

    let token = state.tokens.issue(&stored.user.id).map_err(|e| e.log(OP))?;
    info!("[{}] user {} signed in", OP, stored.user.id);
    Ok(HttpResponse::Ok().json(
        ApiResponse::data(stored.user)
            .with_message("Login successful")
            .with_token(token),
    ))
}
