use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::models::{AdminRole, AuthenticatedAdmin};
use crate::error::AppError;

/// Claims embedded in an administrator access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator id (ObjectId hex).
    pub sub: String,
    pub email: String,
    pub role: AdminRole,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds).
    pub exp: i64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token has expired. Please login again")]
    Expired,
    #[error("Invalid token. Authentication failed")]
    InvalidSignature,
    #[error("Invalid token. Authentication failed")]
    Malformed,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Auth(err.to_string())
    }
}

/// Issues and verifies HS256 access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for an administrator, valid from now for the configured TTL.
    pub fn issue(&self, id: ObjectId, email: &str, role: AdminRole) -> Result<String, AppError> {
        self.issue_at(id, email, role, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        id: ObjectId,
        email: &str,
        role: AdminRole,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Token expiry is out of range".into()))?;
        let claims = Claims {
            sub: id.to_hex(),
            email: email.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return the identity it carries.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedAdmin, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let id = ObjectId::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)?;

        Ok(AuthenticatedAdmin {
            id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}
