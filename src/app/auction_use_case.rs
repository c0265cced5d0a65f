use crate::app::ports::{DepositPort, EventPublisher};
use crate::domain::{
    Auction, AuctionBookmark, AuctionOrder, Bid, DomainEvent, Member,
};
use crate::error::{DomainError, Result};
use crate::storage::Storage;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Outcome of one settle sweep over expired auctions.
#[derive(Debug, Default)]
pub struct SettleSweepSummary {
    /// Auctions that ended with a winner.
    pub settled: usize,
    /// Auctions that ended without any bid.
    pub failed_lots: usize,
    pub errors: Vec<String>,
}

/// Auction lifecycle: creation, bidding with deposit holds, bookmarks and
/// the start/settle sweeps the scheduler drives.
pub struct AuctionUseCase {
    storage: Arc<dyn Storage>,
    deposits: Arc<dyn DepositPort>,
    events: Arc<dyn EventPublisher>,
    deposit_rate: f64,
    payment_window: Duration,
}

impl AuctionUseCase {
    pub fn new(
        storage: Arc<dyn Storage>,
        deposits: Arc<dyn DepositPort>,
        events: Arc<dyn EventPublisher>,
        deposit_rate: f64,
        payment_window_hours: i64,
    ) -> Self {
        Self {
            storage,
            deposits,
            events,
            deposit_rate,
            payment_window: Duration::hours(payment_window_hours),
        }
    }

    /// Open an auction over one of the seller's approved products.
    pub async fn create_auction(
        &self,
        seller: &Member,
        product_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        start_price: i64,
        tick_size: i64,
    ) -> Result<Auction> {
        let seller_id = seller.id.ok_or(DomainError::MemberNotFound)?;
        let product = self
            .storage
            .get_product(product_id)
            .await?
            .ok_or(DomainError::ProductNotFound)?;
        if product.seller_id != seller_id {
            return Err(DomainError::NotProductOwner.into());
        }
        if !product.is_approved() {
            return Err(DomainError::ProductNotApproved.into());
        }
        if start_price <= 0 || tick_size <= 0 {
            return Err(DomainError::InvalidInput(
                "start price and tick size must be positive".into(),
            )
            .into());
        }

        let mut auction = Auction::new(
            product_id, seller_id, start_time, end_time, start_price, tick_size,
        )?;
        self.storage.create_auction(&mut auction).await?;
        Ok(auction)
    }

    pub async fn get(&self, auction_id: Uuid) -> Result<Auction> {
        self.storage
            .get_auction(auction_id)
            .await?
            .ok_or_else(|| DomainError::AuctionNotFound.into())
    }

    /// Place a bid. On the member's first bid in this auction a deposit of
    /// `start_price * deposit_rate` is frozen through the payment context;
    /// hold failures (insufficient balance) fail the bid.
    pub async fn place_bid(&self, bidder: &Member, auction_id: Uuid, amount: i64) -> Result<Bid> {
        let bidder_id = bidder.id.ok_or(DomainError::MemberNotFound)?;
        bidder.verify_participation()?;

        let mut auction = self.get(auction_id).await?;

        if let Err(e) = self.validate_bid(&auction, bidder_id, amount).await {
            crate::observability::metrics::auction::bid_rejected(rejection_label(&e));
            return Err(e.into());
        }

        let deposit_amount = (auction.start_price as f64 * self.deposit_rate) as i64;
        self.deposits.hold(bidder_id, auction_id, deposit_amount).await?;

        auction.update_current_price(amount);
        self.storage.update_auction(&auction).await?;

        let mut bid = Bid::new(auction_id, bidder_id, amount);
        self.storage.create_bid(&mut bid).await?;

        self.events.publish(DomainEvent::BidPlaced {
            auction_id,
            bidder_id,
            amount,
            bid_time: bid.bid_time,
        });
        crate::observability::metrics::auction::bid_placed();
        info!("bid {} on auction {} by {}", amount, auction_id, bidder_id);
        Ok(bid)
    }

    async fn validate_bid(
        &self,
        auction: &Auction,
        bidder_id: Uuid,
        amount: i64,
    ) -> std::result::Result<(), DomainError> {
        use crate::domain::AuctionStatus;

        if auction.status != AuctionStatus::InProgress {
            return Err(DomainError::AuctionNotInProgress);
        }

        // No outbidding yourself while you already lead
        let latest = self
            .storage
            .latest_bid(auction.id.expect("persisted auction"))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if latest.map(|b| b.bidder_id) == Some(bidder_id) {
            return Err(DomainError::AlreadyHighestBidder);
        }

        if auction.seller_id == bidder_id {
            return Err(DomainError::SellerCannotBid);
        }

        let now = Utc::now();
        if now < auction.start_time || now > auction.end_time {
            return Err(DomainError::BidTimeInvalid);
        }

        let minimum = auction.next_min_bid();
        if amount < minimum {
            return Err(DomainError::BidAmountTooLow { minimum });
        }
        Ok(())
    }

    /// Idempotent: bookmarking twice keeps the original row.
    pub async fn add_bookmark(&self, member: &Member, auction_id: Uuid) -> Result<AuctionBookmark> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.get(auction_id).await?;

        if let Some(existing) = self.storage.get_bookmark(member_id, auction_id).await? {
            return Ok(existing);
        }
        let mut bookmark = AuctionBookmark::new(member_id, auction_id);
        self.storage.create_bookmark(&mut bookmark).await?;
        Ok(bookmark)
    }

    pub async fn remove_bookmark(&self, member: &Member, auction_id: Uuid) -> Result<bool> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.storage.delete_bookmark(member_id, auction_id).await
    }

    pub async fn list_bookmarks(&self, member: &Member) -> Result<Vec<AuctionBookmark>> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.storage.list_bookmarks(member_id).await
    }

    /// Move Scheduled auctions whose start time has passed into progress.
    pub async fn start_due_auctions(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.storage.find_auctions_to_start(now).await?;
        let mut started = 0;
        for mut auction in due {
            let auction_id = auction.id.expect("persisted auction");
            if let Err(e) = auction.start() {
                warn!("auction {} could not start: {}", auction_id, e);
                continue;
            }
            self.storage.update_auction(&auction).await?;
            self.events.publish(DomainEvent::AuctionStarted { auction_id });
            crate::observability::metrics::auction::started();
            started += 1;
        }
        if started > 0 {
            info!("started {} auctions", started);
        }
        Ok(started)
    }

    /// Settle every InProgress auction past its end time. One lot failing
    /// does not stop the sweep.
    pub async fn settle_expired(&self, now: DateTime<Utc>) -> Result<SettleSweepSummary> {
        let expired = self.storage.find_expired_auctions(now).await?;
        let mut summary = SettleSweepSummary::default();

        for auction in expired {
            let auction_id = auction.id.expect("persisted auction");
            match self.settle_one(auction, now).await {
                Ok(true) => summary.settled += 1,
                Ok(false) => summary.failed_lots += 1,
                Err(e) => {
                    error!("settling auction {} failed: {}", auction_id, e);
                    summary.errors.push(format!("{auction_id}: {e}"));
                }
            }
        }
        Ok(summary)
    }

    /// Returns true when the auction ended with a winner.
    async fn settle_one(&self, mut auction: Auction, now: DateTime<Utc>) -> Result<bool> {
        let auction_id = auction.id.expect("persisted auction");

        match self.storage.latest_bid(auction_id).await? {
            Some(winning_bid) => {
                auction.end()?;
                self.storage.update_auction(&auction).await?;

                let mut order = AuctionOrder::new(
                    auction_id,
                    auction.seller_id,
                    winning_bid.bidder_id,
                    winning_bid.amount,
                    now + self.payment_window,
                );
                self.storage.create_order(&mut order).await?;

                // Losers get their deposits back right away; the winner's
                // stays held until payment or timeout.
                self.deposits
                    .release_all(auction_id, Some(winning_bid.bidder_id))
                    .await?;

                self.events.publish(DomainEvent::AuctionEnded {
                    auction_id,
                    product_id: auction.product_id,
                    winner_id: winning_bid.bidder_id,
                    final_price: winning_bid.amount,
                });
                crate::observability::metrics::auction::settled_won();
                info!(
                    "auction {} won by {} at {}",
                    auction_id, winning_bid.bidder_id, winning_bid.amount
                );
                Ok(true)
            }
            None => {
                auction.end()?;
                self.storage.update_auction(&auction).await?;
                self.deposits.release_all(auction_id, None).await?;

                self.events.publish(DomainEvent::AuctionFailed {
                    auction_id,
                    product_id: auction.product_id,
                });
                crate::observability::metrics::auction::settled_failed();
                info!("auction {} closed without bids", auction_id);
                Ok(false)
            }
        }
    }
}

fn rejection_label(error: &DomainError) -> &'static str {
    match error {
        DomainError::AuctionNotInProgress => "not_in_progress",
        DomainError::AlreadyHighestBidder => "consecutive_bidder",
        DomainError::SellerCannotBid => "seller_bid",
        DomainError::BidTimeInvalid => "time_window",
        DomainError::BidAmountTooLow { .. } => "amount_too_low",
        _ => "other",
    }
}
