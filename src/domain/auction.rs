use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Scheduled,
    InProgress,
    Ended,
}

/// A timed auction over an approved product.
///
/// `current_price` stays `None` until the first bid; afterwards every bid
/// must clear `current_price + tick_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: Option<Uuid>,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    pub start_price: i64,
    pub current_price: Option<i64>,
    pub tick_size: i64,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    pub fn new(
        product_id: Uuid,
        seller_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        start_price: i64,
        tick_size: i64,
    ) -> Result<Self, DomainError> {
        if end_time <= start_time {
            return Err(DomainError::AuctionTimeRangeInvalid);
        }
        Ok(Self {
            id: None,
            product_id,
            seller_id,
            start_time,
            end_time,
            status: AuctionStatus::Scheduled,
            start_price,
            current_price: None,
            tick_size,
            created_at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        if self.status != AuctionStatus::Scheduled {
            return Err(DomainError::AuctionNotScheduled);
        }
        self.status = AuctionStatus::InProgress;
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), DomainError> {
        if self.status != AuctionStatus::InProgress {
            return Err(DomainError::AuctionNotInProgress);
        }
        self.status = AuctionStatus::Ended;
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    /// First bid clears the start price; later bids clear one tick above the
    /// current price.
    pub fn next_min_bid(&self) -> i64 {
        match self.current_price {
            Some(current) => current + self.tick_size,
            None => self.start_price,
        }
    }

    pub fn update_current_price(&mut self, price: i64) {
        self.current_price = Some(price);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: Option<Uuid>,
    pub auction_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: i64,
    pub bid_time: DateTime<Utc>,
}

impl Bid {
    pub fn new(auction_id: Uuid, bidder_id: Uuid, amount: i64) -> Self {
        Self {
            id: None,
            auction_id,
            bidder_id,
            amount,
            bid_time: Utc::now(),
        }
    }
}

/// A member's saved auction. One row per (member, auction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionBookmark {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub auction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl AuctionBookmark {
    pub fn new(member_id: Uuid, auction_id: Uuid) -> Self {
        Self {
            id: None,
            member_id,
            auction_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Awaiting the winner's payment.
    Processing,
    Completed,
    Failed,
}

/// Created for the winning bid when an auction ends with bids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionOrder {
    pub id: Option<Uuid>,
    pub auction_id: Uuid,
    pub seller_id: Uuid,
    pub bidder_id: Uuid,
    pub final_price: i64,
    pub status: OrderStatus,
    pub payment_due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuctionOrder {
    pub fn new(
        auction_id: Uuid,
        seller_id: Uuid,
        bidder_id: Uuid,
        final_price: i64,
        payment_due_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            auction_id,
            seller_id,
            bidder_id,
            final_price,
            status: OrderStatus::Processing,
            payment_due_at,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Processing {
            return Err(DomainError::InvalidOrderStatus);
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Processing {
            return Err(DomainError::InvalidOrderStatus);
        }
        self.status = OrderStatus::Failed;
        Ok(())
    }

    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Processing && now > self.payment_due_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn auction() -> Auction {
        let now = Utc::now();
        Auction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now,
            now + Duration::hours(1),
            10_000,
            500,
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_time_range() {
        let now = Utc::now();
        let result = Auction::new(Uuid::new_v4(), Uuid::new_v4(), now, now, 1_000, 100);
        assert_eq!(result.unwrap_err(), DomainError::AuctionTimeRangeInvalid);
    }

    #[test]
    fn lifecycle_transitions_are_guarded() {
        let mut a = auction();
        assert_eq!(a.end(), Err(DomainError::AuctionNotInProgress));
        a.start().unwrap();
        assert_eq!(a.start(), Err(DomainError::AuctionNotScheduled));
        a.end().unwrap();
        assert_eq!(a.status, AuctionStatus::Ended);
    }

    #[test]
    fn min_bid_moves_from_start_price_to_tick_above_current() {
        let mut a = auction();
        assert_eq!(a.next_min_bid(), 10_000);
        a.update_current_price(12_000);
        assert_eq!(a.next_min_bid(), 12_500);
    }

    #[test]
    fn order_completion_requires_processing() {
        let now = Utc::now();
        let mut order = AuctionOrder::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            50_000,
            now + Duration::hours(24),
        );
        assert!(!order.is_past_due(now));
        assert!(order.is_past_due(now + Duration::hours(25)));
        order.fail().unwrap();
        assert_eq!(order.complete(), Err(DomainError::InvalidOrderStatus));
        assert!(!order.is_past_due(now + Duration::hours(25)));
    }
}
