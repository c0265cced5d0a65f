use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    User,
    Seller,
    Admin,
}

/// A registered member. Profile fields start empty and are filled in before
/// the member may participate in auctions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<Uuid>,
    /// Opaque identifier carried in tokens and exposed to clients.
    pub public_id: String,
    pub username: String,
    pub role: MemberRole,
    pub real_name: Option<String>,
    pub contact_phone: Option<String>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub address_detail: Option<String>,
    pub intro: Option<String>,
    pub withdrawn: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            public_id: Uuid::new_v4().to_string(),
            username: username.into(),
            role: MemberRole::User,
            real_name: None,
            contact_phone: None,
            zip_code: None,
            address: None,
            address_detail: None,
            intro: None,
            withdrawn: false,
            created_at: Utc::now(),
        }
    }

    pub fn promote_to_seller(&mut self) {
        self.role = MemberRole::Seller;
    }

    pub fn withdraw(&mut self) {
        self.withdrawn = true;
    }

    /// Shipping and identity fields must all be present before bidding or
    /// finalizing an order. `intro` is optional.
    pub fn verify_participation(&self) -> Result<(), DomainError> {
        fn require(value: &Option<String>, err: DomainError) -> Result<(), DomainError> {
            match value.as_deref() {
                Some(v) if !v.trim().is_empty() => Ok(()),
                _ => Err(err),
            }
        }

        require(&self.zip_code, DomainError::MemberZipCodeRequired)?;
        require(&self.address, DomainError::MemberAddressRequired)?;
        require(&self.address_detail, DomainError::MemberAddressDetailRequired)?;
        require(&self.contact_phone, DomainError::MemberPhoneRequired)?;
        require(&self.real_name, DomainError::MemberRealNameRequired)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_member() -> Member {
        let mut m = Member::new("collector");
        m.real_name = Some("Kim Jiwoo".into());
        m.contact_phone = Some("010-1234-5678".into());
        m.zip_code = Some("04524".into());
        m.address = Some("Seoul".into());
        m.address_detail = Some("Apt 301".into());
        m
    }

    #[test]
    fn complete_profile_may_participate() {
        assert!(complete_member().verify_participation().is_ok());
    }

    #[test]
    fn each_missing_field_gets_its_own_error() {
        let mut m = complete_member();
        m.real_name = None;
        assert_eq!(
            m.verify_participation(),
            Err(DomainError::MemberRealNameRequired)
        );

        let mut m = complete_member();
        m.zip_code = Some("   ".into());
        assert_eq!(
            m.verify_participation(),
            Err(DomainError::MemberZipCodeRequired)
        );
    }

    #[test]
    fn intro_is_not_required() {
        let mut m = complete_member();
        m.intro = None;
        assert!(m.verify_participation().is_ok());
    }
}
