//! End-to-end auction lifecycle over the in-memory storage: join, top up,
//! inspect, auction, bid, settle, pay and batch the seller's payout.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use rarebid::app::ports::{DepositPort, EventPublisher, GatewayConfirmation, PaymentGateway};
use rarebid::app::{AuctionUseCase, AuthUseCase, MemberUseCase, PaymentUseCase, ProductUseCase, ProfileUpdate};
use rarebid::domain::{
    AuthProvider, DepositStatus, Member, MemberRole, OrderStatus, ProductCategory,
    ProductCondition, SettlementStatus,
};
use rarebid::error::Result;
use rarebid::infra::event_bus::EventBus;
use rarebid::infra::jwt::TokenProvider;
use rarebid::infra::object_store_fs::FsObjectStore;
use rarebid::storage::{InMemoryStorage, Storage};

/// Gateway stub that approves everything.
struct ApprovingGateway;

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn confirm(&self, payment_key: &str, _order_id: &str, amount: i64) -> Result<GatewayConfirmation> {
        Ok(GatewayConfirmation {
            payment_key: payment_key.to_string(),
            approved_amount: amount,
        })
    }

    async fn cancel(&self, _payment_key: &str, _amount: i64, _reason: &str) -> Result<()> {
        Ok(())
    }
}

struct World {
    storage: Arc<InMemoryStorage>,
    auth: AuthUseCase,
    members: MemberUseCase,
    products: ProductUseCase,
    auctions: AuctionUseCase,
    payments: Arc<PaymentUseCase>,
    _objects_dir: tempfile::TempDir,
}

fn world() -> World {
    let storage = Arc::new(InMemoryStorage::new());
    let bus = Arc::new(EventBus::new(64));
    let events: Arc<dyn EventPublisher> = bus;
    let tokens = Arc::new(TokenProvider::new("integration-test-secret-integration"));
    let objects_dir = tempfile::tempdir().unwrap();
    let objects = Arc::new(FsObjectStore::new(
        objects_dir.path(),
        "http://localhost:8080/objects",
    ));

    let auth = AuthUseCase::new(storage.clone(), tokens, 1800, 3600);
    let members = MemberUseCase::new(storage.clone());
    let products = ProductUseCase::new(storage.clone(), objects);
    let payments = Arc::new(PaymentUseCase::new(
        storage.clone(),
        Arc::new(ApprovingGateway),
        events.clone(),
        0.10,
        7,
        100,
    ));
    let deposits: Arc<dyn DepositPort> = payments.clone();
    let auctions = AuctionUseCase::new(storage.clone(), deposits, events, 0.10, 24);

    World {
        storage,
        auth,
        members,
        products,
        auctions,
        payments,
        _objects_dir: objects_dir,
    }
}

/// Login, complete the participation profile and top the wallet up.
async fn participant(w: &World, provider_id: &str, name: &str, funds: i64) -> Member {
    let pair = w
        .auth
        .login(AuthProvider::Kakao, provider_id, name)
        .await
        .unwrap();
    let member = w.auth.authenticate(&pair.access_token).await.unwrap();
    w.members
        .update_profile(
            &member.public_id,
            ProfileUpdate {
                real_name: Some(name.to_string()),
                contact_phone: Some("010-0000-0000".into()),
                zip_code: Some("04524".into()),
                address: Some("Seoul".into()),
                address_detail: Some("3F".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let member = w
        .storage
        .get_member_by_public_id(&member.public_id)
        .await
        .unwrap()
        .unwrap();

    if funds > 0 {
        let payment = w.payments.request_top_up(&member, funds).await.unwrap();
        w.payments
            .confirm_top_up(&member, &payment.order_id, "pg-key", funds)
            .await
            .unwrap();
    }
    member
}

async fn admin(w: &World) -> Member {
    let mut inspector = Member::new("inspector");
    inspector.role = MemberRole::Admin;
    w.storage.create_member(&mut inspector).await.unwrap();
    inspector
}

#[tokio::test]
async fn full_auction_lifecycle_settles_the_seller() {
    let w = world();

    let seller = participant(&w, "kakao-seller", "seller", 0).await;
    let seller = {
        w.auth.promote_seller(&seller.public_id).await.unwrap()
    };
    let buyer_a = participant(&w, "kakao-a", "buyer-a", 300_000).await;
    let buyer_b = participant(&w, "kakao-b", "buyer-b", 300_000).await;
    let inspector = admin(&w).await;

    // Register and approve a product
    let product = w
        .products
        .create(
            &seller,
            "PG Unicorn",
            "mint in sealed box",
            ProductCategory::ModelKit,
            ProductCondition::Misb,
        )
        .await
        .unwrap();
    let product_id = product.id.unwrap();
    w.products
        .record_inspection(&inspector, product_id, true, Some("seal intact".into()))
        .await
        .unwrap();

    // Schedule and start the auction
    let now = Utc::now();
    let auction = w
        .auctions
        .create_auction(
            &seller,
            product_id,
            now - Duration::minutes(1),
            now + Duration::hours(1),
            200_000,
            5_000,
        )
        .await
        .unwrap();
    let auction_id = auction.id.unwrap();
    assert_eq!(w.auctions.start_due_auctions(now).await.unwrap(), 1);

    // Two buyers trade bids; each first bid freezes a 10% deposit
    w.auctions.place_bid(&buyer_a, auction_id, 200_000).await.unwrap();
    w.auctions.place_bid(&buyer_b, auction_id, 205_000).await.unwrap();
    w.auctions.place_bid(&buyer_a, auction_id, 210_000).await.unwrap();
    w.auctions.place_bid(&buyer_b, auction_id, 215_000).await.unwrap();

    let wallet_a = w.payments.my_wallet(&buyer_a).await.unwrap();
    assert_eq!(wallet_a.holding, 20_000);

    // Hammer falls
    let settle_time = now + Duration::hours(2);
    let summary = w.auctions.settle_expired(settle_time).await.unwrap();
    assert_eq!(summary.settled, 1);

    // Loser released, winner still held
    let wallet_a = w.payments.my_wallet(&buyer_a).await.unwrap();
    assert_eq!(wallet_a.holding, 0);
    let wallet_b = w.payments.my_wallet(&buyer_b).await.unwrap();
    assert_eq!(wallet_b.holding, 20_000);

    // Winner pays the remainder
    let order = w.payments.pay_order(&buyer_b, auction_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    let wallet_b = w.payments.my_wallet(&buyer_b).await.unwrap();
    assert_eq!(wallet_b.balance, 300_000 - 215_000);
    assert_eq!(wallet_b.holding, 0);

    let deposit = w
        .storage
        .get_deposit(buyer_b.id.unwrap(), auction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deposit.status, DepositStatus::Used);

    // Payout rests for the hold period, then the batch pays the seller
    assert_eq!(w.payments.process_settlements(Utc::now()).await.unwrap(), 0);

    let paid = w
        .payments
        .process_settlements(Utc::now() + Duration::days(8))
        .await
        .unwrap();
    assert_eq!(paid, 1);

    let seller_wallet = w.payments.my_wallet(&seller).await.unwrap();
    // 215_000 minus the 10% fee
    assert_eq!(seller_wallet.balance, 193_500);

    let settlements = w.payments.my_settlements(&seller).await.unwrap();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].status, SettlementStatus::Done);
    assert_eq!(settlements[0].fee_amount, 21_500);
}

#[tokio::test]
async fn unpaid_winner_forfeits_the_deposit() {
    let w = world();

    let seller = participant(&w, "kakao-seller", "seller", 0).await;
    let seller = w.auth.promote_seller(&seller.public_id).await.unwrap();
    let buyer = participant(&w, "kakao-a", "buyer", 100_000).await;
    let inspector = admin(&w).await;

    let product = w
        .products
        .create(
            &seller,
            "Chogokin GX-70",
            "displayed once",
            ProductCategory::Figure,
            ProductCondition::Used,
        )
        .await
        .unwrap();
    let product_id = product.id.unwrap();
    w.products
        .record_inspection(&inspector, product_id, true, None)
        .await
        .unwrap();

    let now = Utc::now();
    let auction = w
        .auctions
        .create_auction(
            &seller,
            product_id,
            now - Duration::minutes(1),
            now + Duration::hours(1),
            50_000,
            1_000,
        )
        .await
        .unwrap();
    let auction_id = auction.id.unwrap();
    w.auctions.start_due_auctions(now).await.unwrap();
    w.auctions.place_bid(&buyer, auction_id, 50_000).await.unwrap();

    let settle_time = now + Duration::hours(2);
    w.auctions.settle_expired(settle_time).await.unwrap();

    // The payment window passes without payment
    let past_due = settle_time + Duration::hours(25);
    assert_eq!(
        w.payments.process_payment_timeouts(past_due).await.unwrap(),
        1
    );

    let wallet = w.payments.my_wallet(&buyer).await.unwrap();
    assert_eq!(wallet.balance, 95_000);
    assert_eq!(wallet.holding, 0);

    let order = w
        .storage
        .get_order_by_auction(auction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Failed);

    // The seller is compensated from the forfeited deposit, fee-free
    let settlements = w.payments.my_settlements(&seller).await.unwrap();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].settlement_amount, 5_000);
    assert_eq!(settlements[0].fee_amount, 0);
}

#[tokio::test]
async fn no_bid_auction_fails_and_releases_nothing() {
    let w = world();

    let seller = participant(&w, "kakao-seller", "seller", 0).await;
    let seller = w.auth.promote_seller(&seller.public_id).await.unwrap();
    let inspector = admin(&w).await;

    let product = w
        .products
        .create(
            &seller,
            "Lonely lot",
            "no takers",
            ProductCategory::Etc,
            ProductCondition::Used,
        )
        .await
        .unwrap();
    let product_id = product.id.unwrap();
    w.products
        .record_inspection(&inspector, product_id, true, None)
        .await
        .unwrap();

    let now = Utc::now();
    let auction = w
        .auctions
        .create_auction(
            &seller,
            product_id,
            now - Duration::minutes(1),
            now + Duration::hours(1),
            10_000,
            500,
        )
        .await
        .unwrap();
    w.auctions.start_due_auctions(now).await.unwrap();

    let summary = w
        .auctions
        .settle_expired(now + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(summary.settled, 0);
    assert_eq!(summary.failed_lots, 1);

    assert!(w
        .storage
        .get_order_by_auction(auction.id.unwrap())
        .await
        .unwrap()
        .is_none());
}
