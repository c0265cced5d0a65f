use crate::domain::*;
use crate::error::{DomainError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Storage trait for all persistent entities. Implementations assign ids on
/// create (the `&mut` parameter is written back).
#[async_trait]
pub trait Storage: Send + Sync {
    // Member operations
    async fn create_member(&self, member: &mut Member) -> Result<()>;
    async fn get_member(&self, id: Uuid) -> Result<Option<Member>>;
    async fn get_member_by_public_id(&self, public_id: &str) -> Result<Option<Member>>;
    async fn update_member(&self, member: &Member) -> Result<()>;

    // Account operations
    async fn create_account(&self, account: &mut Account) -> Result<()>;
    async fn get_account_by_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> Result<Option<Account>>;

    // Refresh token operations
    async fn create_refresh_token(&self, token: &mut RefreshToken) -> Result<()>;
    async fn get_refresh_token_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;
    async fn update_refresh_token(&self, token: &RefreshToken) -> Result<()>;
    async fn purge_refresh_tokens(&self, now: DateTime<Utc>) -> Result<usize>;

    // Access token blacklist operations
    async fn create_blacklisted_token(&self, token: &mut BlacklistedToken) -> Result<()>;
    async fn is_token_blacklisted(&self, token_hash: &str) -> Result<bool>;
    async fn purge_blacklisted_tokens(&self, now: DateTime<Utc>) -> Result<usize>;

    // Product operations
    async fn create_product(&self, product: &mut Product) -> Result<()>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn update_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<()>;
    async fn list_products(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Product>>;
    async fn list_products_by_inspection(&self, status: InspectionStatus) -> Result<Vec<Product>>;

    // Product image operations
    async fn create_product_image(&self, image: &mut ProductImage) -> Result<()>;
    async fn list_product_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>>;

    // Inspection operations
    async fn create_inspection(&self, inspection: &mut Inspection) -> Result<()>;

    // Auction operations
    async fn create_auction(&self, auction: &mut Auction) -> Result<()>;
    async fn get_auction(&self, id: Uuid) -> Result<Option<Auction>>;
    async fn update_auction(&self, auction: &Auction) -> Result<()>;
    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Auction>>;
    async fn find_auctions_to_start(&self, now: DateTime<Utc>) -> Result<Vec<Auction>>;
    async fn find_expired_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>>;

    // Bid operations
    async fn create_bid(&self, bid: &mut Bid) -> Result<()>;
    async fn latest_bid(&self, auction_id: Uuid) -> Result<Option<Bid>>;
    async fn list_bids(&self, auction_id: Uuid) -> Result<Vec<Bid>>;

    // Bookmark operations
    async fn create_bookmark(&self, bookmark: &mut AuctionBookmark) -> Result<()>;
    async fn get_bookmark(&self, member_id: Uuid, auction_id: Uuid) -> Result<Option<AuctionBookmark>>;
    async fn delete_bookmark(&self, member_id: Uuid, auction_id: Uuid) -> Result<bool>;
    async fn list_bookmarks(&self, member_id: Uuid) -> Result<Vec<AuctionBookmark>>;

    // Auction order operations
    async fn create_order(&self, order: &mut AuctionOrder) -> Result<()>;
    async fn get_order_by_auction(&self, auction_id: Uuid) -> Result<Option<AuctionOrder>>;
    async fn update_order(&self, order: &AuctionOrder) -> Result<()>;
    async fn find_orders_past_due(&self, now: DateTime<Utc>) -> Result<Vec<AuctionOrder>>;

    // Wallet operations
    async fn create_wallet(&self, wallet: &mut Wallet) -> Result<()>;
    async fn get_wallet_by_member(&self, member_id: Uuid) -> Result<Option<Wallet>>;
    async fn update_wallet(&self, wallet: &Wallet) -> Result<()>;

    // Deposit operations
    async fn create_deposit(&self, deposit: &mut Deposit) -> Result<()>;
    async fn get_deposit(&self, member_id: Uuid, auction_id: Uuid) -> Result<Option<Deposit>>;
    async fn update_deposit(&self, deposit: &Deposit) -> Result<()>;
    async fn list_deposits_by_auction(
        &self,
        auction_id: Uuid,
        status: Option<DepositStatus>,
    ) -> Result<Vec<Deposit>>;

    // Payment operations
    async fn create_payment(&self, payment: &mut Payment) -> Result<()>;
    async fn get_payment_by_order_id(&self, order_id: &str) -> Result<Option<Payment>>;
    async fn update_payment(&self, payment: &Payment) -> Result<()>;

    // Settlement operations
    async fn create_settlement(&self, settlement: &mut Settlement) -> Result<()>;
    async fn get_settlement(&self, id: Uuid) -> Result<Option<Settlement>>;
    async fn update_settlement(&self, settlement: &Settlement) -> Result<()>;
    async fn find_ready_settlements(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Settlement>>;
    async fn list_settlements_by_seller(&self, seller_id: Uuid) -> Result<Vec<Settlement>>;

    // Wallet transaction operations
    async fn create_wallet_transaction(&self, tx: &mut WalletTransaction) -> Result<()>;
    async fn list_wallet_transactions(&self, member_id: Uuid) -> Result<Vec<WalletTransaction>>;
}

/// In-memory storage implementation for development/testing.
pub struct InMemoryStorage {
    members: Arc<Mutex<HashMap<Uuid, Member>>>,
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
    refresh_tokens: Arc<Mutex<HashMap<Uuid, RefreshToken>>>,
    blacklist: Arc<Mutex<HashMap<String, BlacklistedToken>>>,
    products: Arc<Mutex<HashMap<Uuid, Product>>>,
    product_images: Arc<Mutex<HashMap<Uuid, ProductImage>>>,
    inspections: Arc<Mutex<HashMap<Uuid, Inspection>>>,
    auctions: Arc<Mutex<HashMap<Uuid, Auction>>>,
    bids: Arc<Mutex<HashMap<Uuid, Bid>>>,
    bookmarks: Arc<Mutex<HashMap<Uuid, AuctionBookmark>>>,
    orders: Arc<Mutex<HashMap<Uuid, AuctionOrder>>>,
    wallets: Arc<Mutex<HashMap<Uuid, Wallet>>>,
    deposits: Arc<Mutex<HashMap<Uuid, Deposit>>>,
    payments: Arc<Mutex<HashMap<Uuid, Payment>>>,
    settlements: Arc<Mutex<HashMap<Uuid, Settlement>>>,
    wallet_txs: Arc<Mutex<HashMap<Uuid, WalletTransaction>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            members: Arc::new(Mutex::new(HashMap::new())),
            accounts: Arc::new(Mutex::new(HashMap::new())),
            refresh_tokens: Arc::new(Mutex::new(HashMap::new())),
            blacklist: Arc::new(Mutex::new(HashMap::new())),
            products: Arc::new(Mutex::new(HashMap::new())),
            product_images: Arc::new(Mutex::new(HashMap::new())),
            inspections: Arc::new(Mutex::new(HashMap::new())),
            auctions: Arc::new(Mutex::new(HashMap::new())),
            bids: Arc::new(Mutex::new(HashMap::new())),
            bookmarks: Arc::new(Mutex::new(HashMap::new())),
            orders: Arc::new(Mutex::new(HashMap::new())),
            wallets: Arc::new(Mutex::new(HashMap::new())),
            deposits: Arc::new(Mutex::new(HashMap::new())),
            payments: Arc::new(Mutex::new(HashMap::new())),
            settlements: Arc::new(Mutex::new(HashMap::new())),
            wallet_txs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_member(&self, member: &mut Member) -> Result<()> {
        let id = Uuid::new_v4();
        member.id = Some(id);
        self.members.lock().unwrap().insert(id, member.clone());
        debug!("Created member {} ({})", member.username, id);
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        Ok(self.members.lock().unwrap().get(&id).cloned())
    }

    async fn get_member_by_public_id(&self, public_id: &str) -> Result<Option<Member>> {
        let members = self.members.lock().unwrap();
        Ok(members.values().find(|m| m.public_id == public_id).cloned())
    }

    async fn update_member(&self, member: &Member) -> Result<()> {
        let id = member.id.ok_or(DomainError::MemberNotFound)?;
        let mut members = self.members.lock().unwrap();
        if !members.contains_key(&id) {
            return Err(DomainError::MemberNotFound.into());
        }
        members.insert(id, member.clone());
        Ok(())
    }

    async fn create_account(&self, account: &mut Account) -> Result<()> {
        let id = Uuid::new_v4();
        account.id = Some(id);
        self.accounts.lock().unwrap().insert(id, account.clone());
        Ok(())
    }

    async fn get_account_by_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|a| a.provider == provider && a.provider_id == provider_id)
            .cloned())
    }

    async fn create_refresh_token(&self, token: &mut RefreshToken) -> Result<()> {
        let id = Uuid::new_v4();
        token.id = Some(id);
        self.refresh_tokens.lock().unwrap().insert(id, token.clone());
        Ok(())
    }

    async fn get_refresh_token_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let tokens = self.refresh_tokens.lock().unwrap();
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn update_refresh_token(&self, token: &RefreshToken) -> Result<()> {
        let id = token.id.ok_or(DomainError::RefreshTokenInvalid)?;
        let mut tokens = self.refresh_tokens.lock().unwrap();
        if !tokens.contains_key(&id) {
            return Err(DomainError::RefreshTokenInvalid.into());
        }
        tokens.insert(id, token.clone());
        Ok(())
    }

    async fn purge_refresh_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !t.revoked && !t.is_expired(now));
        Ok(before - tokens.len())
    }

    async fn create_blacklisted_token(&self, token: &mut BlacklistedToken) -> Result<()> {
        token.id = Some(Uuid::new_v4());
        self.blacklist
            .lock()
            .unwrap()
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_hash: &str) -> Result<bool> {
        Ok(self.blacklist.lock().unwrap().contains_key(token_hash))
    }

    async fn purge_blacklisted_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut blacklist = self.blacklist.lock().unwrap();
        let before = blacklist.len();
        blacklist.retain(|_, t| t.expires_at >= now);
        Ok(before - blacklist.len())
    }

    async fn create_product(&self, product: &mut Product) -> Result<()> {
        let id = Uuid::new_v4();
        product.id = Some(id);
        self.products.lock().unwrap().insert(id, product.clone());
        debug!("Created product {} ({})", product.name, id);
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let id = product.id.ok_or(DomainError::ProductNotFound)?;
        let mut products = self.products.lock().unwrap();
        if !products.contains_key(&id) {
            return Err(DomainError::ProductNotFound.into());
        }
        products.insert(id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        self.products.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn list_products(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Product>> {
        let products = self.products.lock().unwrap();
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by_key(|p| p.created_at);
        Ok(paginate(all, limit, offset))
    }

    async fn list_products_by_inspection(&self, status: InspectionStatus) -> Result<Vec<Product>> {
        let products = self.products.lock().unwrap();
        let mut found: Vec<Product> = products
            .values()
            .filter(|p| p.inspection_status == status)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }

    async fn create_product_image(&self, image: &mut ProductImage) -> Result<()> {
        let id = Uuid::new_v4();
        image.id = Some(id);
        self.product_images.lock().unwrap().insert(id, image.clone());
        Ok(())
    }

    async fn list_product_images(&self, product_id: Uuid) -> Result<Vec<ProductImage>> {
        let images = self.product_images.lock().unwrap();
        let mut found: Vec<ProductImage> = images
            .values()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.sort_order);
        Ok(found)
    }

    async fn create_inspection(&self, inspection: &mut Inspection) -> Result<()> {
        let id = Uuid::new_v4();
        inspection.id = Some(id);
        self.inspections.lock().unwrap().insert(id, inspection.clone());
        Ok(())
    }

    async fn create_auction(&self, auction: &mut Auction) -> Result<()> {
        let id = Uuid::new_v4();
        auction.id = Some(id);
        self.auctions.lock().unwrap().insert(id, auction.clone());
        debug!("Created auction {} for product {}", id, auction.product_id);
        Ok(())
    }

    async fn get_auction(&self, id: Uuid) -> Result<Option<Auction>> {
        Ok(self.auctions.lock().unwrap().get(&id).cloned())
    }

    async fn update_auction(&self, auction: &Auction) -> Result<()> {
        let id = auction.id.ok_or(DomainError::AuctionNotFound)?;
        let mut auctions = self.auctions.lock().unwrap();
        if !auctions.contains_key(&id) {
            return Err(DomainError::AuctionNotFound.into());
        }
        auctions.insert(id, auction.clone());
        Ok(())
    }

    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Auction>> {
        let auctions = self.auctions.lock().unwrap();
        let mut found: Vec<Auction> = auctions
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.end_time);
        Ok(paginate(found, limit, offset))
    }

    async fn find_auctions_to_start(&self, now: DateTime<Utc>) -> Result<Vec<Auction>> {
        let auctions = self.auctions.lock().unwrap();
        Ok(auctions
            .values()
            .filter(|a| a.status == AuctionStatus::Scheduled && a.start_time <= now)
            .cloned()
            .collect())
    }

    async fn find_expired_auctions(&self, now: DateTime<Utc>) -> Result<Vec<Auction>> {
        let auctions = self.auctions.lock().unwrap();
        Ok(auctions
            .values()
            .filter(|a| a.status == AuctionStatus::InProgress && a.end_time <= now)
            .cloned()
            .collect())
    }

    async fn create_bid(&self, bid: &mut Bid) -> Result<()> {
        let id = Uuid::new_v4();
        bid.id = Some(id);
        self.bids.lock().unwrap().insert(id, bid.clone());
        Ok(())
    }

    async fn latest_bid(&self, auction_id: Uuid) -> Result<Option<Bid>> {
        let bids = self.bids.lock().unwrap();
        Ok(bids
            .values()
            .filter(|b| b.auction_id == auction_id)
            .max_by_key(|b| b.bid_time)
            .cloned())
    }

    async fn list_bids(&self, auction_id: Uuid) -> Result<Vec<Bid>> {
        let bids = self.bids.lock().unwrap();
        let mut found: Vec<Bid> = bids
            .values()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.bid_time);
        Ok(found)
    }

    async fn create_bookmark(&self, bookmark: &mut AuctionBookmark) -> Result<()> {
        let id = Uuid::new_v4();
        bookmark.id = Some(id);
        self.bookmarks.lock().unwrap().insert(id, bookmark.clone());
        Ok(())
    }

    async fn get_bookmark(&self, member_id: Uuid, auction_id: Uuid) -> Result<Option<AuctionBookmark>> {
        let bookmarks = self.bookmarks.lock().unwrap();
        Ok(bookmarks
            .values()
            .find(|b| b.member_id == member_id && b.auction_id == auction_id)
            .cloned())
    }

    async fn delete_bookmark(&self, member_id: Uuid, auction_id: Uuid) -> Result<bool> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let found: Option<Uuid> = bookmarks
            .values()
            .find(|b| b.member_id == member_id && b.auction_id == auction_id)
            .and_then(|b| b.id);
        match found {
            Some(id) => {
                bookmarks.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_bookmarks(&self, member_id: Uuid) -> Result<Vec<AuctionBookmark>> {
        let bookmarks = self.bookmarks.lock().unwrap();
        let mut found: Vec<AuctionBookmark> = bookmarks
            .values()
            .filter(|b| b.member_id == member_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }

    async fn create_order(&self, order: &mut AuctionOrder) -> Result<()> {
        let id = Uuid::new_v4();
        order.id = Some(id);
        self.orders.lock().unwrap().insert(id, order.clone());
        Ok(())
    }

    async fn get_order_by_auction(&self, auction_id: Uuid) -> Result<Option<AuctionOrder>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.values().find(|o| o.auction_id == auction_id).cloned())
    }

    async fn update_order(&self, order: &AuctionOrder) -> Result<()> {
        let id = order.id.ok_or(DomainError::OrderNotFound)?;
        let mut orders = self.orders.lock().unwrap();
        if !orders.contains_key(&id) {
            return Err(DomainError::OrderNotFound.into());
        }
        orders.insert(id, order.clone());
        Ok(())
    }

    async fn find_orders_past_due(&self, now: DateTime<Utc>) -> Result<Vec<AuctionOrder>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.values().filter(|o| o.is_past_due(now)).cloned().collect())
    }

    async fn create_wallet(&self, wallet: &mut Wallet) -> Result<()> {
        let id = Uuid::new_v4();
        wallet.id = Some(id);
        self.wallets.lock().unwrap().insert(id, wallet.clone());
        Ok(())
    }

    async fn get_wallet_by_member(&self, member_id: Uuid) -> Result<Option<Wallet>> {
        let wallets = self.wallets.lock().unwrap();
        Ok(wallets.values().find(|w| w.member_id == member_id).cloned())
    }

    async fn update_wallet(&self, wallet: &Wallet) -> Result<()> {
        let id = wallet.id.ok_or(DomainError::WalletNotFound)?;
        let mut wallets = self.wallets.lock().unwrap();
        let stored = wallets.get(&id).ok_or(DomainError::WalletNotFound)?;
        // Optimistic check: a concurrent writer bumped the version first.
        if stored.version != wallet.version {
            return Err(DomainError::Internal("wallet version conflict".into()).into());
        }
        let mut next = wallet.clone();
        next.version += 1;
        wallets.insert(id, next);
        Ok(())
    }

    async fn create_deposit(&self, deposit: &mut Deposit) -> Result<()> {
        let id = Uuid::new_v4();
        deposit.id = Some(id);
        self.deposits.lock().unwrap().insert(id, deposit.clone());
        Ok(())
    }

    async fn get_deposit(&self, member_id: Uuid, auction_id: Uuid) -> Result<Option<Deposit>> {
        let deposits = self.deposits.lock().unwrap();
        Ok(deposits
            .values()
            .find(|d| d.member_id == member_id && d.auction_id == auction_id)
            .cloned())
    }

    async fn update_deposit(&self, deposit: &Deposit) -> Result<()> {
        let id = deposit.id.ok_or(DomainError::DepositNotFound)?;
        let mut deposits = self.deposits.lock().unwrap();
        if !deposits.contains_key(&id) {
            return Err(DomainError::DepositNotFound.into());
        }
        deposits.insert(id, deposit.clone());
        Ok(())
    }

    async fn list_deposits_by_auction(
        &self,
        auction_id: Uuid,
        status: Option<DepositStatus>,
    ) -> Result<Vec<Deposit>> {
        let deposits = self.deposits.lock().unwrap();
        Ok(deposits
            .values()
            .filter(|d| d.auction_id == auction_id && status.map_or(true, |s| d.status == s))
            .cloned()
            .collect())
    }

    async fn create_payment(&self, payment: &mut Payment) -> Result<()> {
        let id = Uuid::new_v4();
        payment.id = Some(id);
        self.payments.lock().unwrap().insert(id, payment.clone());
        Ok(())
    }

    async fn get_payment_by_order_id(&self, order_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.lock().unwrap();
        Ok(payments.values().find(|p| p.order_id == order_id).cloned())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let id = payment.id.ok_or(DomainError::PaymentNotFound)?;
        let mut payments = self.payments.lock().unwrap();
        if !payments.contains_key(&id) {
            return Err(DomainError::PaymentNotFound.into());
        }
        payments.insert(id, payment.clone());
        Ok(())
    }

    async fn create_settlement(&self, settlement: &mut Settlement) -> Result<()> {
        let id = Uuid::new_v4();
        settlement.id = Some(id);
        self.settlements.lock().unwrap().insert(id, settlement.clone());
        Ok(())
    }

    async fn get_settlement(&self, id: Uuid) -> Result<Option<Settlement>> {
        Ok(self.settlements.lock().unwrap().get(&id).cloned())
    }

    async fn update_settlement(&self, settlement: &Settlement) -> Result<()> {
        let id = settlement.id.ok_or(DomainError::SettlementNotFound)?;
        let mut settlements = self.settlements.lock().unwrap();
        if !settlements.contains_key(&id) {
            return Err(DomainError::SettlementNotFound.into());
        }
        settlements.insert(id, settlement.clone());
        Ok(())
    }

    async fn find_ready_settlements(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Settlement>> {
        let settlements = self.settlements.lock().unwrap();
        let mut found: Vec<Settlement> = settlements
            .values()
            .filter(|s| s.status == SettlementStatus::Ready && s.created_at <= cutoff)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        found.truncate(limit);
        Ok(found)
    }

    async fn list_settlements_by_seller(&self, seller_id: Uuid) -> Result<Vec<Settlement>> {
        let settlements = self.settlements.lock().unwrap();
        let mut found: Vec<Settlement> = settlements
            .values()
            .filter(|s| s.seller_id == seller_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn create_wallet_transaction(&self, tx: &mut WalletTransaction) -> Result<()> {
        let id = Uuid::new_v4();
        tx.id = Some(id);
        self.wallet_txs.lock().unwrap().insert(id, tx.clone());
        Ok(())
    }

    async fn list_wallet_transactions(&self, member_id: Uuid) -> Result<Vec<WalletTransaction>> {
        let txs = self.wallet_txs.lock().unwrap();
        let mut found: Vec<WalletTransaction> = txs
            .values()
            .filter(|t| t.member_id == member_id)
            .cloned()
            .collect();
        found.sort_by_key(|t| t.created_at);
        Ok(found)
    }
}

fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
