//! HS512 token issuing and parsing.

use crate::error::DomainError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "ACCESS",
            TokenType::Refresh => "REFRESH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Member public id.
    pub sub: String,
    pub role: String,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_refresh(&self) -> bool {
        self.typ == TokenType::Refresh.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

pub struct TokenProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(
        &self,
        public_id: &str,
        role: &str,
        token_type: TokenType,
        ttl_seconds: i64,
    ) -> Result<String, DomainError> {
        let issued_at = Utc::now();
        let claims = TokenClaims {
            sub: public_id.to_string(),
            role: role.to_string(),
            typ: token_type.as_str().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ttl_seconds)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("token encoding failed: {e}")))
    }

    /// Verify signature and expiry. Failures collapse into `InvalidToken`;
    /// the cause is logged with the token masked.
    pub fn parse(&self, token: &str) -> Result<TokenClaims, DomainError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Validation::new(Algorithm::HS512))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: token={}, cause={}", mask(token), e);
                DomainError::InvalidToken
            })
    }
}

/// First 10 + last 6 characters; tokens never appear whole in logs.
pub fn mask(token: &str) -> String {
    let len = token.chars().count();
    if len <= 20 {
        return "***".to_string();
    }
    let head: String = token.chars().take(10).collect();
    let tail: String = token.chars().skip(len - 6).collect();
    format!("{head}...{tail}")
}

/// SHA-256 hex digest used wherever a token is stored or looked up.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_parse_round_trip() {
        let provider = TokenProvider::new("test-secret-test-secret-test-secret");
        let token = provider
            .issue("pub-123", "SELLER", TokenType::Access, 3600)
            .unwrap();
        let claims = provider.parse(&token).unwrap();
        assert_eq!(claims.sub, "pub-123");
        assert_eq!(claims.role, "SELLER");
        assert!(!claims.is_refresh());
    }

    #[test]
    fn refresh_tokens_carry_their_type() {
        let provider = TokenProvider::new("another-secret-another-secret");
        let token = provider
            .issue("pub-123", "USER", TokenType::Refresh, 3600)
            .unwrap();
        assert!(provider.parse(&token).unwrap().is_refresh());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let provider = TokenProvider::new("secret-a-secret-a-secret-a");
        let other = TokenProvider::new("secret-b-secret-b-secret-b");
        let token = provider.issue("pub-1", "USER", TokenType::Access, 3600).unwrap();
        assert_eq!(other.parse(&token), Err(DomainError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let provider = TokenProvider::new("secret-c-secret-c-secret-c");
        // Issued already past expiry (beyond default leeway)
        let token = provider.issue("pub-1", "USER", TokenType::Access, -3600).unwrap();
        assert_eq!(provider.parse(&token), Err(DomainError::InvalidToken));
    }

    #[test]
    fn masking_hides_the_middle() {
        let masked = mask("abcdefghijKLMNOPQRSTuvwxyz012345");
        assert_eq!(masked, "abcdefghij...012345");
        assert_eq!(mask("short"), "***");
    }

    #[test]
    fn token_hashing_is_stable() {
        assert_eq!(hash_token("x"), hash_token("x"));
        assert_ne!(hash_token("x"), hash_token("y"));
    }
}
