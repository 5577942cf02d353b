use crate::auth::{account, Identity};
use crate::error::AppError;
use crate::state::AppState;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};

const OP: &str = "AUTHENTICATE";

/// Extracts the token of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn resolve_identity(req: &ServiceRequest) -> Result<Identity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state not registered".to_string()))?;

    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("Authorization header missing or malformed".to_string()))?;
    let claims = state.tokens.verify(&token)?;

    let user_id = claims.user_id.clone();
    let stored = state
        .db
        .run(move |conn| account::find_by_id(conn, &user_id))
        .await?;

    match stored {
        Some(stored) if stored.user.is_active => Ok(Identity {
            user_id: claims.user_id,
            user: stored.user,
        }),
        _ => Err(AppError::Unauthorized("User not found or inactive".to_string())),
    }
}

/// Request guard for authenticated scopes, installed with
/// `actix_web::middleware::from_fn`.
///
/// Resolves the bearer token to an active account and stores it as an
/// `Identity` in the request extensions. Any failure is answered right here
/// with the error response; the handler never runs.
pub async fn authenticate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    match resolve_identity(&req).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(err) => Ok(req.error_response(err.log(OP)).map_into_right_body()),
    }
}
