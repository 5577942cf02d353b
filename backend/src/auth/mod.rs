//! # Authentication
//!
//! Credential handling for the HTTP surface:
//! - `password`: Argon2id hashing and verification of account passwords.
//! - `token`: issuing and verifying the signed bearer tokens.
//! - `account`: reading stored accounts by id or email.
//! - `middleware`: the request guard that resolves a bearer token into an
//!   `Identity` placed in the request extensions.

pub mod account;
pub mod middleware;
pub mod password;
pub mod token;

use crate::error::AppError;
use actix_web::web::ReqData;
use common::model::user::User;

/// The caller resolved by `middleware::authenticate`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub user: User,
}

/// Unwraps the identity of an authenticated route, answering 401 when the
/// guard did not run for this request.
pub fn require_identity(identity: Option<ReqData<Identity>>) -> Result<Identity, AppError> {
    identity
        .map(ReqData::into_inner)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}
