//! Session management with JWT token generation and validation.
//!
//! Sessions are self-contained tokens; the server keeps no session table.
//! All correlation state lives in the client-held cookie, which keeps the
//! auth flow stateless across restarts.

use blog_identity_core::BlogAccount;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("invalid session")]
    InvalidSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Local account identifier.
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub algorithm: Algorithm,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_ttl: Duration::hours(24),
            algorithm: Algorithm::HS256,
        }
    }
}

pub struct SessionService {
    config: SessionConfig,
}

impl SessionService {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn ttl(&self) -> Duration {
        self.config.jwt_ttl
    }

    /// Issue a session token bound to the resolved account.
    pub fn establish(&self, account: &BlogAccount) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: account.id,
            username: account.username.clone(),
            exp: (now + self.config.jwt_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(self.config.algorithm),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Validate a session token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(self.config.algorithm),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> BlogAccount {
        BlogAccount {
            id: Uuid::new_v4(),
            username: "googg-42".to_string(),
            google_id: "g-42".to_string(),
        }
    }

    #[test]
    fn test_session_round_trip() {
        let service = SessionService::new(SessionConfig::default());
        let account = account();

        let token = service.establish(&account).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.username, "googg-42");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = SessionService::new(SessionConfig::default());
        let token = service.establish(&account()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.verify(&tampered).is_err());

        // A token signed with a different secret fails too.
        let other = SessionService::new(SessionConfig {
            jwt_secret: "other-secret".to_string(),
            ..SessionConfig::default()
        });
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = SessionService::new(SessionConfig {
            jwt_ttl: Duration::seconds(-120),
            ..SessionConfig::default()
        });

        let token = service.establish(&account()).unwrap();
        assert!(service.verify(&token).is_err());
    }
}
