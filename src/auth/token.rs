use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::error::AppError;

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => {
                tracing::error!(error = ?e, "Token signing failed");
                AppError::InternalServerError("Failed to sign in".to_string())
            }
            TokenError::Expired => AppError::AuthError("Token has expired".to_string()),
            TokenError::Invalid(_) => AppError::AuthError("Invalid token".to_string()),
        }
    }
}

/// Issues and verifies bearer tokens. Handlers only see this trait.
pub trait TokenService: Send + Sync {
    fn issue(&self, email: &str) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JSON Web Tokens with a fixed validity window.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtTokenService {
        JwtTokenService::new("test-secret", Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    #[test]
    fn issued_token_round_trips_email() {
        let tokens = service();
        let token = tokens.issue("op@example.com").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "op@example.com");
        assert_eq!(claims.email, "op@example.com");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the decoder's default 60s leeway.
        let tokens = JwtTokenService::new("test-secret", Duration::seconds(-600));
        let token = tokens.issue("op@example.com").unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let foreign = JwtTokenService::new("other-secret", Duration::hours(1));
        let token = foreign.issue("op@example.com").unwrap();

        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().verify("not-a-jwt").is_err());
    }
}
