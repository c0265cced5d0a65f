use crate::domain::Member;
use crate::error::{DomainError, Result};
use crate::storage::Storage;
use std::sync::Arc;

/// Fields a member may change about themselves. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub real_name: Option<String>,
    pub contact_phone: Option<String>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub address_detail: Option<String>,
    pub intro: Option<String>,
}

pub struct MemberUseCase {
    storage: Arc<dyn Storage>,
}

impl MemberUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn me(&self, public_id: &str) -> Result<Member> {
        self.find(public_id).await
    }

    pub async fn update_profile(&self, public_id: &str, update: ProfileUpdate) -> Result<Member> {
        let mut member = self.find(public_id).await?;

        if let Some(username) = update.username {
            if username.trim().is_empty() {
                return Err(DomainError::InvalidInput("username must not be blank".into()).into());
            }
            member.username = username;
        }
        if update.real_name.is_some() {
            member.real_name = update.real_name;
        }
        if update.contact_phone.is_some() {
            member.contact_phone = update.contact_phone;
        }
        if update.zip_code.is_some() {
            member.zip_code = update.zip_code;
        }
        if update.address.is_some() {
            member.address = update.address;
        }
        if update.address_detail.is_some() {
            member.address_detail = update.address_detail;
        }
        if update.intro.is_some() {
            member.intro = update.intro;
        }

        self.storage.update_member(&member).await?;
        Ok(member)
    }

    /// Soft delete; the row stays for order and settlement history.
    pub async fn withdraw(&self, public_id: &str) -> Result<()> {
        let mut member = self.find(public_id).await?;
        member.withdraw();
        self.storage.update_member(&member).await?;
        Ok(())
    }

    /// Check the member filled in everything required to bid or finalize.
    pub async fn verify_participation(&self, public_id: &str) -> Result<()> {
        let member = self.find(public_id).await?;
        member.verify_participation()?;
        Ok(())
    }

    async fn find(&self, public_id: &str) -> Result<Member> {
        self.storage
            .get_member_by_public_id(public_id)
            .await?
            .ok_or_else(|| DomainError::MemberNotFound.into())
    }
}
