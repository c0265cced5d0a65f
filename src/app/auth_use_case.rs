use crate::domain::{Account, AuthProvider, BlacklistedToken, Member, MemberRole, RefreshToken, Wallet};
use crate::error::{DomainError, Result};
use crate::infra::jwt::{hash_token, TokenProvider, TokenType};
use crate::storage::Storage;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login, token rotation and logout. Members are created on first login
/// together with their wallet; identities are `(provider, provider_id)`.
pub struct AuthUseCase {
    storage: Arc<dyn Storage>,
    tokens: Arc<TokenProvider>,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl AuthUseCase {
    pub fn new(
        storage: Arc<dyn Storage>,
        tokens: Arc<TokenProvider>,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            storage,
            tokens,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Find the account for the identity or create member + wallet + account
    /// on first login, then issue a token pair.
    pub async fn login(
        &self,
        provider: AuthProvider,
        provider_id: &str,
        username: &str,
    ) -> Result<TokenPair> {
        let member = match self
            .storage
            .get_account_by_identity(provider, provider_id)
            .await?
        {
            Some(account) => self
                .storage
                .get_member_by_public_id(&account.member_public_id)
                .await?
                .ok_or(DomainError::MemberNotFound)?,
            None => self.join(provider, provider_id, username).await?,
        };

        if member.withdrawn {
            return Err(DomainError::MemberWithdrawn.into());
        }

        let pair = self.issue_pair(&member).await?;
        crate::observability::metrics::auth::login_succeeded();
        Ok(pair)
    }

    async fn join(
        &self,
        provider: AuthProvider,
        provider_id: &str,
        username: &str,
    ) -> Result<Member> {
        let mut member = Member::new(username);
        self.storage.create_member(&mut member).await?;

        let mut wallet = Wallet::new(member.id.expect("assigned on create"));
        self.storage.create_wallet(&mut wallet).await?;

        let mut account = Account::new(member.public_id.clone(), provider, provider_id);
        self.storage.create_account(&mut account).await?;

        info!(
            "joined member {} via {}",
            member.public_id,
            provider.as_str()
        );
        Ok(member)
    }

    async fn issue_pair(&self, member: &Member) -> Result<TokenPair> {
        let role = role_name(member.role);
        let access = self
            .tokens
            .issue(&member.public_id, role, TokenType::Access, self.access_ttl_seconds)?;
        let refresh = self
            .tokens
            .issue(&member.public_id, role, TokenType::Refresh, self.refresh_ttl_seconds)?;

        let mut row = RefreshToken::new(
            member.public_id.clone(),
            hash_token(&refresh),
            Utc::now() + Duration::seconds(self.refresh_ttl_seconds),
        );
        self.storage.create_refresh_token(&mut row).await?;

        Ok(TokenPair {
            access_token: access,
            refresh_token: refresh,
        })
    }

    /// Rotate a refresh token: the presented token is revoked and a fresh
    /// pair is issued. A revoked or unknown token is rejected outright.
    pub async fn refresh(&self, raw_refresh: &str) -> Result<TokenPair> {
        let claims = self.tokens.parse(raw_refresh).map_err(|_| {
            crate::observability::metrics::auth::token_refresh_rejected();
            DomainError::RefreshTokenInvalid
        })?;
        if !claims.is_refresh() {
            crate::observability::metrics::auth::token_refresh_rejected();
            return Err(DomainError::RefreshTokenInvalid.into());
        }

        let mut row = self
            .storage
            .get_refresh_token_by_hash(&hash_token(raw_refresh))
            .await?
            .ok_or(DomainError::RefreshTokenInvalid)?;
        if row.revoked {
            return Err(DomainError::RefreshTokenRevoked.into());
        }
        if row.is_expired(Utc::now()) {
            return Err(DomainError::RefreshTokenExpired.into());
        }

        let member = self
            .storage
            .get_member_by_public_id(&claims.sub)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        if member.withdrawn {
            return Err(DomainError::MemberWithdrawn.into());
        }

        row.revoke();
        self.storage.update_refresh_token(&row).await?;

        let pair = self.issue_pair(&member).await?;
        crate::observability::metrics::auth::token_refreshed();
        Ok(pair)
    }

    /// Blacklist the access token for its remaining lifetime and revoke the
    /// refresh token.
    pub async fn logout(&self, raw_access: &str, raw_refresh: &str) -> Result<()> {
        let claims = self.tokens.parse(raw_access)?;

        let mut blacklisted = BlacklistedToken::new(hash_token(raw_access), claims.expires_at());
        self.storage.create_blacklisted_token(&mut blacklisted).await?;

        if let Some(mut row) = self
            .storage
            .get_refresh_token_by_hash(&hash_token(raw_refresh))
            .await?
        {
            row.revoke();
            self.storage.update_refresh_token(&row).await?;
        }

        crate::observability::metrics::auth::logged_out();
        Ok(())
    }

    /// Resolve a bearer access token to its member. Rejects refresh tokens,
    /// blacklisted tokens and withdrawn members.
    pub async fn authenticate(&self, raw_access: &str) -> Result<Member> {
        let claims = self.tokens.parse(raw_access)?;
        if claims.is_refresh() {
            return Err(DomainError::InvalidToken.into());
        }
        if self
            .storage
            .is_token_blacklisted(&hash_token(raw_access))
            .await?
        {
            return Err(DomainError::InvalidToken.into());
        }

        let member = self
            .storage
            .get_member_by_public_id(&claims.sub)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        if member.withdrawn {
            return Err(DomainError::MemberWithdrawn.into());
        }
        Ok(member)
    }

    pub async fn promote_seller(&self, public_id: &str) -> Result<Member> {
        let mut member = self
            .storage
            .get_member_by_public_id(public_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        member.promote_to_seller();
        self.storage.update_member(&member).await?;
        Ok(member)
    }

    /// Drop expired blacklist rows and dead refresh tokens.
    pub async fn purge_expired(&self) -> Result<(usize, usize)> {
        let now = Utc::now();
        let blacklist = self.storage.purge_blacklisted_tokens(now).await?;
        let refresh = self.storage.purge_refresh_tokens(now).await?;
        Ok((blacklist, refresh))
    }
}

pub fn role_name(role: MemberRole) -> &'static str {
    match role {
        MemberRole::User => "USER",
        MemberRole::Seller => "SELLER",
        MemberRole::Admin => "ADMIN",
    }
}
