use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events published on the in-process bus when state changes that other
/// contexts care about. Consumers subscribe through the event bus and must
/// tolerate missed events (the bus is lossy under lag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    AuctionStarted {
        auction_id: Uuid,
    },
    BidPlaced {
        auction_id: Uuid,
        bidder_id: Uuid,
        amount: i64,
        bid_time: DateTime<Utc>,
    },
    AuctionEnded {
        auction_id: Uuid,
        product_id: Uuid,
        winner_id: Uuid,
        final_price: i64,
    },
    AuctionFailed {
        auction_id: Uuid,
        product_id: Uuid,
    },
    PaymentConfirmed {
        member_id: Uuid,
        order_id: String,
        amount: i64,
    },
    OrderTimedOut {
        auction_id: Uuid,
        bidder_id: Uuid,
        forfeited_amount: i64,
    },
}

impl DomainEvent {
    /// Short tag for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::AuctionStarted { .. } => "auction_started",
            DomainEvent::BidPlaced { .. } => "bid_placed",
            DomainEvent::AuctionEnded { .. } => "auction_ended",
            DomainEvent::AuctionFailed { .. } => "auction_failed",
            DomainEvent::PaymentConfirmed { .. } => "payment_confirmed",
            DomainEvent::OrderTimedOut { .. } => "order_timed_out",
        }
    }
}
