use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OAuth identity providers accepted at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthProvider {
    Kakao,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Kakao => "KAKAO",
            AuthProvider::Google => "GOOGLE",
        }
    }
}

/// Links an external `(provider, provider_id)` identity to a member.
/// The pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<Uuid>,
    pub member_public_id: String,
    pub provider: AuthProvider,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(member_public_id: impl Into<String>, provider: AuthProvider, provider_id: impl Into<String>) -> Self {
        Self {
            id: None,
            member_public_id: member_public_id.into(),
            provider,
            provider_id: provider_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Stored refresh token. Only the SHA-256 of the raw token is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Option<Uuid>,
    pub member_public_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(member_public_id: impl Into<String>, token_hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            member_public_id: member_public_id.into(),
            token_hash: token_hash.into(),
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        }
    }

    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Access tokens revoked before their natural expiry (logout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistedToken {
    pub id: Option<Uuid>,
    pub token_hash: String,
    /// Rows become purgeable once the token would have expired anyway.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistedToken {
    pub fn new(token_hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            token_hash: token_hash.into(),
            expires_at,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn refresh_token_expiry_and_revocation() {
        let now = Utc::now();
        let mut token = RefreshToken::new("pub-1", "hash", now + Duration::days(14));
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::days(15)));
        assert!(!token.revoked);
        token.revoke();
        assert!(token.revoked);
    }
}
