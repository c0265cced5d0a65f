use crate::domain::{Auction as DomainAuction, AuctionStatus, Bid as DomainBid};
use async_graphql::{Object, ID};

/// GraphQL representation of an Auction
#[derive(Clone)]
pub struct Auction {
    pub inner: DomainAuction,
}

impl From<DomainAuction> for Auction {
    fn from(auction: DomainAuction) -> Self {
        Self { inner: auction }
    }
}

pub fn status_name(status: AuctionStatus) -> &'static str {
    match status {
        AuctionStatus::Scheduled => "SCHEDULED",
        AuctionStatus::InProgress => "IN_PROGRESS",
        AuctionStatus::Ended => "ENDED",
    }
}

#[Object]
impl Auction {
    /// The unique identifier for the auction
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The product being auctioned
    async fn product_id(&self) -> ID {
        ID(self.inner.product_id.to_string())
    }

    /// Lifecycle status: SCHEDULED, IN_PROGRESS or ENDED
    async fn status(&self) -> &str {
        status_name(self.inner.status)
    }

    /// When bidding opens
    async fn start_time(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.start_time
    }

    /// When bidding closes
    async fn end_time(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.end_time
    }

    /// Price the first bid must clear
    async fn start_price(&self) -> i64 {
        self.inner.start_price
    }

    /// Leading bid, if any
    async fn current_price(&self) -> Option<i64> {
        self.inner.current_price
    }

    /// Minimum increment between bids
    async fn tick_size(&self) -> i64 {
        self.inner.tick_size
    }

    /// The lowest amount the next bid may carry
    async fn next_min_bid(&self) -> i64 {
        self.inner.next_min_bid()
    }
}

/// GraphQL representation of a Bid
#[derive(Clone)]
pub struct Bid {
    pub inner: DomainBid,
}

impl From<DomainBid> for Bid {
    fn from(bid: DomainBid) -> Self {
        Self { inner: bid }
    }
}

#[Object]
impl Bid {
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    async fn auction_id(&self) -> ID {
        ID(self.inner.auction_id.to_string())
    }

    /// The bidding member
    async fn bidder_id(&self) -> ID {
        ID(self.inner.bidder_id.to_string())
    }

    async fn amount(&self) -> i64 {
        self.inner.amount
    }

    async fn bid_time(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.bid_time
    }
}
