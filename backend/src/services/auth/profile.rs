//! # Profile
//!
//! `GET /api/auth/profile` returns the account behind the bearer token. The
//! route sits behind the authentication guard.

use crate::auth::Identity;
use crate::error::AppError;
use actix_web::web::ReqData;
use actix_web::HttpResponse;
use common::responses::ApiResponse;

const OP: &str = "PROFILE";

/// Actix web handler for `GET /api/auth/profile`.
///
/// # Returns
/// - `200 OK` with the account, password hash excluded.
/// - `403 Forbidden` if no identity reached the handler.
///
/// The identity was loaded by the guard in this same request, so it is
/// returned without another lookup.
pub async fn process(identity: Option<ReqData<Identity>>) -> Result<HttpResponse, AppError> {
    let identity = identity
        .map(ReqData::into_inner)
        .ok_or_else(|| AppError::Forbidden("Unauthorized access".to_string()).log(OP))?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(identity.user)))
}
