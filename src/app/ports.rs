//! Ports the use cases depend on. Adapters live in `crate::infra`.

use crate::domain::DomainEvent;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Upload target handed to clients so they can PUT image bytes without
/// routing them through the API.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    pub upload_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Object storage for product images. S3-compatible semantics; the
/// filesystem adapter backs local runs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<PresignedUpload>;
    /// Resolve a stored key to the URL clients fetch it from.
    fn public_url(&self, key: &str) -> String;
}

/// Successful confirmation returned by the external payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfirmation {
    pub payment_key: String,
    pub approved_amount: i64,
}

/// External payment gateway (wallet top-ups and refunds).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn confirm(&self, payment_key: &str, order_id: &str, amount: i64) -> Result<GatewayConfirmation>;
    async fn cancel(&self, payment_key: &str, amount: i64, reason: &str) -> Result<()>;
}

/// The slice of the payment context the auction context calls into.
#[async_trait]
pub trait DepositPort: Send + Sync {
    /// Freeze `amount` for the member on the auction. Idempotent: a second
    /// hold for the same (member, auction) returns the existing deposit.
    async fn hold(&self, member_id: Uuid, auction_id: Uuid, amount: i64) -> Result<Uuid>;

    /// Release every held deposit for the auction except the winner's.
    /// Returns how many deposits were released.
    async fn release_all(&self, auction_id: Uuid, winner_id: Option<Uuid>) -> Result<usize>;
}

/// Fan-out for domain events. Publishing never blocks and never fails the
/// publishing use case.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}
