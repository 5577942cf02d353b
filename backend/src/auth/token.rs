//! Signed bearer tokens (HS256 JWT) identifying a user.

use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| AppError::Internal(format!("token lifetime {:?} is out of range", self.ttl)))?;
        let claims = Claims {
            user_id: user_id.to_string(),
            iat,
            exp,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    /// Checks signature and expiry. Every failure reads the same to the client.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_carries_the_user_id() {
        let tokens = service();
        let claims = tokens.verify(&tokens.issue("user-1").unwrap()).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let stale = tokens
            .sign(&Claims {
                user_id: "user-1".into(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(tokens.verify(&stale), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let foreign = TokenService::new("other-secret", Duration::from_secs(60))
            .issue("user-1")
            .unwrap();
        assert!(service().verify(&foreign).is_err());
        assert!(service().verify("not.a.token").is_err());
    }

    #[test]
    fn lifetime_beyond_the_timestamp_range_is_refused() {
        let tokens = TokenService::new("unit-test-secret", Duration::from_secs(u64::MAX));
        assert!(matches!(tokens.issue("user-1"), Err(AppError::Internal(_))));

        let tokens = TokenService::new("unit-test-secret", Duration::from_secs(i64::MAX as u64));
        assert!(matches!(tokens.issue("user-1"), Err(AppError::Internal(_))));
    }
}
