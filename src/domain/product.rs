use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Figure,
    ModelKit,
    TradingCard,
    Plush,
    Game,
    Etc,
}

/// Collector grading for sealed/used goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCondition {
    /// Mint in sealed box.
    Misb,
    /// New in scuffed box.
    Nisb,
    /// Mint in sealed polybag.
    Misp,
    /// Opened, displayed or stored.
    Used,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A good registered by a seller. Products must pass inspection before they
/// can be auctioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<Uuid>,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub condition: ProductCondition,
    pub inspection_status: InspectionStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        seller_id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        category: ProductCategory,
        condition: ProductCondition,
    ) -> Self {
        Self {
            id: None,
            seller_id,
            name: name.into(),
            description: description.into(),
            category,
            condition,
            inspection_status: InspectionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn apply_verdict(&mut self, approved: bool) -> Result<(), DomainError> {
        if self.inspection_status != InspectionStatus::Pending {
            return Err(DomainError::InspectionAlreadyDecided);
        }
        self.inspection_status = if approved {
            InspectionStatus::Approved
        } else {
            InspectionStatus::Rejected
        };
        Ok(())
    }

    pub fn is_approved(&self) -> bool {
        self.inspection_status == InspectionStatus::Approved
    }
}

/// Image attached to a product, addressed by its object-store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Option<Uuid>,
    pub product_id: Uuid,
    pub object_key: String,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
}

impl ProductImage {
    pub fn new(product_id: Uuid, object_key: impl Into<String>, sort_order: u32) -> Self {
        Self {
            id: None,
            product_id,
            object_key: object_key.into(),
            sort_order,
            created_at: Utc::now(),
        }
    }
}

/// Record of an inspector's verdict on a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub id: Option<Uuid>,
    pub product_id: Uuid,
    pub approved: bool,
    pub comment: Option<String>,
    pub inspected_at: DateTime<Utc>,
}

impl Inspection {
    pub fn new(product_id: Uuid, approved: bool, comment: Option<String>) -> Self {
        Self {
            id: None,
            product_id,
            approved,
            comment,
            inspected_at: Utc::now(),
        }
    }
}
