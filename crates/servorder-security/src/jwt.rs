//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use servorder_shared::constants::{TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Unexpected token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: String, actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => TOKEN_TYPE_ACCESS,
            TokenType::Refresh => TOKEN_TYPE_REFRESH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

/// Identity embedded in issued tokens.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtService {
    /// Expiries are in seconds.
    pub fn new(secret: &str, access_expiry: i64, refresh_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
        }
    }

    pub fn generate_pair(&self, subject: &TokenSubject) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.generate_token(subject, TokenType::Access, self.access_token_expiry)?,
            refresh_token: self.generate_token(subject, TokenType::Refresh, self.refresh_token_expiry)?,
            expires_in: self.access_token_expiry,
        })
    }

    fn generate_token(&self, subject: &TokenSubject, token_type: TokenType, expiry: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id,
            role: subject.role.clone(),
            company_id: subject.company_id,
            store_id: subject.store_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type: token_type.as_str().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }

    /// Validates the token and checks its `token_type` claim.
    pub fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected.as_str() {
            return Err(JwtError::WrongTokenType {
                expected: expected.as_str().to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            role: "MANAGER".to_string(),
            company_id: Some(Uuid::new_v4()),
            store_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_pair_carries_subject() {
        let service = JwtService::new(SECRET, 900, 3600);
        let subject = subject();
        let pair = service.generate_pair(&subject).unwrap();

        let claims = service.validate_typed(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, subject.user_id);
        assert_eq!(claims.role, "MANAGER");
        assert_eq!(claims.store_id, subject.store_id);
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_token_type_enforced() {
        let service = JwtService::new(SECRET, 900, 3600);
        let pair = service.generate_pair(&subject()).unwrap();

        assert!(matches!(
            service.validate_typed(&pair.refresh_token, TokenType::Access),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(service.validate_typed(&pair.refresh_token, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60 second leeway.
        let service = JwtService::new(SECRET, -600, -600);
        let pair = service.generate_pair(&subject()).unwrap();
        assert!(matches!(
            service.validate_token(&pair.access_token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new(SECRET, 900, 3600);
        let other = JwtService::new("ffffffffffffffffffffffffffffffff", 900, 3600);
        let pair = issuer.generate_pair(&subject()).unwrap();
        assert!(matches!(
            other.validate_token(&pair.access_token),
            Err(JwtError::ValidationError(_))
        ));
    }
}
