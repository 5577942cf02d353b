//! # Auth Service Module
//!
//! Account endpoints under `/api/auth`.
//!
//! ## Sub-modules:
//! - `register`: multipart sign-up with an optional profile picture.
//! - `login`: exchanges email and password for a bearer token.
//! - `profile`: the authenticated caller's own account.

mod login;
mod profile;
mod register;

use crate::auth::middleware::authenticate;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{get, post, resource, scope};

const API_PATH: &str = "/api/auth";

/// # Registered Routes:
///
/// *   **`POST /register`**: `register::process`, `201` with the new account.
/// *   **`POST /login`**: `login::process`, token plus account.
/// *   **`GET /profile`**: `profile::process`, behind the bearer-token guard.
pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .route("/register", post().to(register::process))
        .route("/login", post().to(login::process))
        .service(
            resource("/profile")
                .wrap(from_fn(authenticate))
                .route(get().to(profile::process)),
        )
}
