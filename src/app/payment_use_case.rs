use crate::app::ports::{DepositPort, EventPublisher, PaymentGateway};
use crate::domain::{
    AuctionOrder, Deposit, DepositStatus, DomainEvent, Member, OrderStatus, Payment, PaymentStatus,
    ReferenceKind, Settlement, Wallet, WalletTransaction, WalletTransactionType,
};
use crate::error::{DomainError, Result};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Ledger owner for collected settlement fees.
pub const PLATFORM_ACCOUNT_ID: Uuid = Uuid::nil();

/// Wallet top-ups against the external gateway, auction deposits, winner
/// payments, timeout forfeits and the delayed settlement batch.
pub struct PaymentUseCase {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn PaymentGateway>,
    events: Arc<dyn EventPublisher>,
    fee_rate: f64,
    hold_days: i64,
    batch_size: usize,
}

impl PaymentUseCase {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn PaymentGateway>,
        events: Arc<dyn EventPublisher>,
        fee_rate: f64,
        hold_days: i64,
        batch_size: usize,
    ) -> Self {
        Self {
            storage,
            gateway,
            events,
            fee_rate,
            hold_days,
            batch_size,
        }
    }

    // ---- wallet top-up -------------------------------------------------

    /// Open a pending top-up order; the client completes it against the
    /// gateway and calls `confirm_top_up` with the gateway's key.
    pub async fn request_top_up(&self, member: &Member, amount: i64) -> Result<Payment> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        if amount <= 0 {
            return Err(DomainError::InvalidInput("top-up amount must be positive".into()).into());
        }

        let order_id = format!("topup-{}", Uuid::new_v4().simple());
        let mut payment = Payment::new(member_id, order_id, amount);
        self.storage.create_payment(&mut payment).await?;
        Ok(payment)
    }

    /// Verify the order (owner, amount, single-shot), confirm it with the
    /// gateway, then credit the wallet.
    pub async fn confirm_top_up(
        &self,
        member: &Member,
        order_id: &str,
        payment_key: &str,
        amount: i64,
    ) -> Result<Payment> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        let mut payment = self
            .storage
            .get_payment_by_order_id(order_id)
            .await?
            .ok_or(DomainError::PaymentNotFound)?;

        if payment.member_id != member_id {
            return Err(DomainError::PaymentOwnerMismatch.into());
        }
        if payment.amount != amount {
            return Err(DomainError::InvalidPaymentAmount.into());
        }
        if payment.status != PaymentStatus::Pending {
            return Err(DomainError::AlreadyProcessedPayment.into());
        }

        let confirmation = self.gateway.confirm(payment_key, order_id, amount).await?;
        if confirmation.approved_amount != amount {
            return Err(DomainError::InvalidPaymentAmount.into());
        }

        payment.payment_key = Some(confirmation.payment_key);
        payment.status = PaymentStatus::Done;
        self.storage.update_payment(&payment).await?;

        let mut wallet = self.wallet_for(member_id).await?;
        wallet.credit(amount);
        self.storage.update_wallet(&wallet).await?;
        self.record_tx(
            member_id,
            WalletTransactionType::TopUpDone,
            amount,
            0,
            wallet.balance,
            payment.id.map(|id| (ReferenceKind::Payment, id)),
        )
        .await?;

        self.events.publish(DomainEvent::PaymentConfirmed {
            member_id,
            order_id: order_id.to_string(),
            amount,
        });
        crate::observability::metrics::payment::topup_confirmed();
        info!("top-up {} confirmed for {}", order_id, member_id);
        Ok(payment)
    }

    /// Cancel a completed top-up at the gateway and claw the amount back
    /// from the free balance.
    pub async fn refund_top_up(&self, member: &Member, order_id: &str, reason: &str) -> Result<Payment> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        let mut payment = self
            .storage
            .get_payment_by_order_id(order_id)
            .await?
            .ok_or(DomainError::PaymentNotFound)?;

        if payment.member_id != member_id {
            return Err(DomainError::PaymentOwnerMismatch.into());
        }
        if payment.status != PaymentStatus::Done {
            return Err(DomainError::InvalidInput(
                "only completed top-ups can be refunded".into(),
            )
            .into());
        }
        let payment_key = payment
            .payment_key
            .clone()
            .ok_or_else(|| DomainError::Internal("confirmed payment without key".into()))?;

        // Fail on an over-held wallet before touching the gateway
        let mut wallet = self.wallet_for(member_id).await?;
        wallet.debit(payment.amount)?;

        self.gateway.cancel(&payment_key, payment.amount, reason).await?;

        payment.status = PaymentStatus::Canceled;
        self.storage.update_payment(&payment).await?;
        self.storage.update_wallet(&wallet).await?;
        self.record_tx(
            member_id,
            WalletTransactionType::RefundDone,
            -payment.amount,
            0,
            wallet.balance,
            payment.id.map(|id| (ReferenceKind::Payment, id)),
        )
        .await?;

        crate::observability::metrics::payment::refunded();
        Ok(payment)
    }

    // ---- queries -------------------------------------------------------

    pub async fn my_wallet(&self, member: &Member) -> Result<Wallet> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.wallet_for(member_id).await
    }

    pub async fn my_transactions(&self, member: &Member) -> Result<Vec<WalletTransaction>> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.storage.list_wallet_transactions(member_id).await
    }

    pub async fn my_settlements(&self, member: &Member) -> Result<Vec<Settlement>> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        self.storage.list_settlements_by_seller(member_id).await
    }

    // ---- winner payment ------------------------------------------------

    /// The winner pays `final_price - deposit` out of free balance; the
    /// deposit is consumed and a settlement is queued for the seller.
    pub async fn pay_order(&self, member: &Member, auction_id: Uuid) -> Result<AuctionOrder> {
        let member_id = member.id.ok_or(DomainError::MemberNotFound)?;
        let mut order = self
            .storage
            .get_order_by_auction(auction_id)
            .await?
            .ok_or(DomainError::OrderNotFound)?;

        if order.bidder_id != member_id {
            return Err(DomainError::PaymentOwnerMismatch.into());
        }
        if order.status != OrderStatus::Processing {
            return Err(DomainError::InvalidOrderStatus.into());
        }

        let mut deposit = self
            .storage
            .get_deposit(member_id, auction_id)
            .await?
            .filter(|d| d.status == DepositStatus::Hold)
            .ok_or(DomainError::DepositNotFound)?;

        let remaining = (order.final_price - deposit.amount).max(0);

        // Mutate working copies first so a failed check persists nothing
        let mut wallet = self.wallet_for(member_id).await?;
        deposit.use_for_payment()?;
        wallet.consume_held(deposit.amount)?;
        wallet.debit(remaining)?;
        order.complete()?;

        self.storage.update_deposit(&deposit).await?;
        self.storage.update_wallet(&wallet).await?;
        self.storage.update_order(&order).await?;

        self.record_tx(
            member_id,
            WalletTransactionType::DepositUsed,
            -deposit.amount,
            -deposit.amount,
            wallet.balance,
            deposit.id.map(|id| (ReferenceKind::Deposit, id)),
        )
        .await?;
        self.record_tx(
            member_id,
            WalletTransactionType::AuctionPayment,
            -remaining,
            0,
            wallet.balance,
            order.id.map(|id| (ReferenceKind::Order, id)),
        )
        .await?;

        let mut settlement =
            Settlement::from_sale(auction_id, order.seller_id, order.final_price, self.fee_rate);
        self.storage.create_settlement(&mut settlement).await?;

        crate::observability::metrics::payment::order_completed();
        info!(
            "order for auction {} paid by {} ({} via deposit, {} from balance)",
            auction_id, member_id, deposit.amount, remaining
        );
        Ok(order)
    }

    // ---- timeout sweep -------------------------------------------------

    /// Forfeit deposits of winners who missed their payment window and
    /// compensate the seller from the forfeited amount.
    pub async fn process_payment_timeouts(&self, now: DateTime<Utc>) -> Result<usize> {
        let overdue = self.storage.find_orders_past_due(now).await?;
        let mut processed = 0;

        for order in overdue {
            let auction_id = order.auction_id;
            match self.timeout_one(order).await {
                Ok(()) => processed += 1,
                Err(e) => error!("timeout handling for auction {} failed: {}", auction_id, e),
            }
        }
        Ok(processed)
    }

    async fn timeout_one(&self, mut order: AuctionOrder) -> Result<()> {
        let mut deposit = self
            .storage
            .get_deposit(order.bidder_id, order.auction_id)
            .await?
            .filter(|d| d.status == DepositStatus::Hold)
            .ok_or(DomainError::DepositNotFound)?;

        let mut wallet = self.wallet_for(order.bidder_id).await?;
        deposit.forfeit()?;
        wallet.consume_held(deposit.amount)?;
        order.fail()?;

        self.storage.update_deposit(&deposit).await?;
        self.storage.update_wallet(&wallet).await?;
        self.storage.update_order(&order).await?;

        self.record_tx(
            order.bidder_id,
            WalletTransactionType::DepositForfeited,
            -deposit.amount,
            -deposit.amount,
            wallet.balance,
            deposit.id.map(|id| (ReferenceKind::Deposit, id)),
        )
        .await?;

        let mut settlement =
            Settlement::from_forfeit(order.auction_id, order.seller_id, deposit.amount);
        self.storage.create_settlement(&mut settlement).await?;

        self.events.publish(DomainEvent::OrderTimedOut {
            auction_id: order.auction_id,
            bidder_id: order.bidder_id,
            forfeited_amount: deposit.amount,
        });
        crate::observability::metrics::payment::deposit_forfeited();
        crate::observability::metrics::payment::order_timed_out();
        info!(
            "order for auction {} timed out, forfeited {}",
            order.auction_id, deposit.amount
        );
        Ok(())
    }

    // ---- settlement batch ----------------------------------------------

    /// Pay out settlements that have rested past the hold period. One bad
    /// row is marked Failed and the batch continues.
    pub async fn process_settlements(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - Duration::days(self.hold_days);
        let batch = self
            .storage
            .find_ready_settlements(cutoff, self.batch_size)
            .await?;
        let mut paid = 0;

        for mut settlement in batch {
            let settlement_id = settlement.id.expect("persisted settlement");
            match self.pay_out(&settlement).await {
                Ok(()) => {
                    settlement.complete();
                    self.storage.update_settlement(&settlement).await?;
                    crate::observability::metrics::payment::settlement_processed();
                    paid += 1;
                }
                Err(e) => {
                    error!("settlement {} failed: {}", settlement_id, e);
                    settlement.fail();
                    self.storage.update_settlement(&settlement).await?;
                    crate::observability::metrics::payment::settlement_failed();
                }
            }
        }
        if paid > 0 {
            info!("settlement batch paid out {} settlements", paid);
        }
        Ok(paid)
    }

    async fn pay_out(&self, settlement: &Settlement) -> Result<()> {
        let settlement_ref = settlement.id.map(|id| (ReferenceKind::Settlement, id));

        let mut seller_wallet = self.wallet_for(settlement.seller_id).await?;
        seller_wallet.credit(settlement.settlement_amount);
        self.storage.update_wallet(&seller_wallet).await?;
        self.record_tx(
            settlement.seller_id,
            WalletTransactionType::SettlementPaid,
            settlement.settlement_amount,
            0,
            seller_wallet.balance,
            settlement_ref,
        )
        .await?;

        if settlement.fee_amount > 0 {
            let mut platform = self.platform_wallet().await?;
            platform.credit(settlement.fee_amount);
            self.storage.update_wallet(&platform).await?;
            self.record_tx(
                PLATFORM_ACCOUNT_ID,
                WalletTransactionType::SettlementFee,
                settlement.fee_amount,
                0,
                platform.balance,
                settlement_ref,
            )
            .await?;
        }
        Ok(())
    }

    async fn platform_wallet(&self) -> Result<Wallet> {
        if let Some(wallet) = self.storage.get_wallet_by_member(PLATFORM_ACCOUNT_ID).await? {
            return Ok(wallet);
        }
        let mut wallet = Wallet::new(PLATFORM_ACCOUNT_ID);
        self.storage.create_wallet(&mut wallet).await?;
        Ok(wallet)
    }

    async fn wallet_for(&self, member_id: Uuid) -> Result<Wallet> {
        self.storage
            .get_wallet_by_member(member_id)
            .await?
            .ok_or_else(|| DomainError::WalletNotFound.into())
    }

    async fn record_tx(
        &self,
        member_id: Uuid,
        tx_type: WalletTransactionType,
        balance_delta: i64,
        holding_delta: i64,
        balance_after: i64,
        reference: Option<(ReferenceKind, Uuid)>,
    ) -> Result<()> {
        let mut tx = WalletTransaction::record(
            member_id,
            tx_type,
            balance_delta,
            holding_delta,
            balance_after,
            reference,
        );
        self.storage.create_wallet_transaction(&mut tx).await
    }
}

#[async_trait]
impl DepositPort for PaymentUseCase {
    async fn hold(&self, member_id: Uuid, auction_id: Uuid, amount: i64) -> Result<Uuid> {
        // Idempotent per (member, auction): a repeat bid reuses the deposit
        if let Some(existing) = self.storage.get_deposit(member_id, auction_id).await? {
            return Ok(existing.id.expect("persisted deposit"));
        }

        let mut wallet = self.wallet_for(member_id).await?;
        wallet.hold(amount)?;
        self.storage.update_wallet(&wallet).await?;

        let mut deposit = Deposit::new(member_id, auction_id, amount);
        self.storage.create_deposit(&mut deposit).await?;
        self.record_tx(
            member_id,
            WalletTransactionType::DepositHold,
            0,
            amount,
            wallet.balance,
            deposit.id.map(|id| (ReferenceKind::Deposit, id)),
        )
        .await?;

        crate::observability::metrics::payment::deposit_held();
        Ok(deposit.id.expect("assigned on create"))
    }

    async fn release_all(&self, auction_id: Uuid, winner_id: Option<Uuid>) -> Result<usize> {
        let held = self
            .storage
            .list_deposits_by_auction(auction_id, Some(DepositStatus::Hold))
            .await?;
        let mut released = 0;

        for mut deposit in held {
            if Some(deposit.member_id) == winner_id {
                continue;
            }
            deposit.release()?;
            let mut wallet = self.wallet_for(deposit.member_id).await?;
            wallet.release(deposit.amount)?;
            self.storage.update_wallet(&wallet).await?;
            self.storage.update_deposit(&deposit).await?;
            self.record_tx(
                deposit.member_id,
                WalletTransactionType::DepositRelease,
                0,
                -deposit.amount,
                wallet.balance,
                deposit.id.map(|id| (ReferenceKind::Deposit, id)),
            )
            .await?;
            released += 1;
        }

        crate::observability::metrics::payment::deposits_released(released as u64);
        info!("released {} deposits for auction {}", released, auction_id);
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::GatewayConfirmation;
    use crate::domain::SettlementStatus;
    use crate::error::PlatformError;
    use crate::storage::InMemoryStorage;
    use std::sync::Mutex;

    struct MockGateway {
        confirms: Mutex<Vec<(String, String, i64)>>,
        cancels: Mutex<Vec<(String, i64)>>,
        fail_confirm: bool,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                confirms: Mutex::new(Vec::new()),
                cancels: Mutex::new(Vec::new()),
                fail_confirm: false,
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn confirm(
            &self,
            payment_key: &str,
            order_id: &str,
            amount: i64,
        ) -> Result<GatewayConfirmation> {
            if self.fail_confirm {
                return Err(PlatformError::Gateway {
                    message: "declined".into(),
                });
            }
            self.confirms
                .lock()
                .unwrap()
                .push((payment_key.to_string(), order_id.to_string(), amount));
            Ok(GatewayConfirmation {
                payment_key: payment_key.to_string(),
                approved_amount: amount,
            })
        }

        async fn cancel(&self, payment_key: &str, amount: i64, _reason: &str) -> Result<()> {
            self.cancels
                .lock()
                .unwrap()
                .push((payment_key.to_string(), amount));
            Ok(())
        }
    }

    struct NullEvents;

    impl EventPublisher for NullEvents {
        fn publish(&self, _event: DomainEvent) {}
    }

    struct Fixture {
        payments: PaymentUseCase,
        storage: Arc<InMemoryStorage>,
        gateway: Arc<MockGateway>,
        buyer: Member,
        seller: Member,
    }

    async fn member_with_wallet(storage: &InMemoryStorage, name: &str) -> Member {
        let mut member = Member::new(name);
        storage.create_member(&mut member).await.unwrap();
        let mut wallet = Wallet::new(member.id.unwrap());
        storage.create_wallet(&mut wallet).await.unwrap();
        member
    }

    async fn fixture() -> Fixture {
        let storage = Arc::new(InMemoryStorage::new());
        let gateway = Arc::new(MockGateway::new());
        let buyer = member_with_wallet(&storage, "buyer").await;
        let seller = member_with_wallet(&storage, "seller").await;

        let payments = PaymentUseCase::new(
            storage.clone(),
            gateway.clone(),
            Arc::new(NullEvents),
            0.10,
            7,
            100,
        );

        Fixture {
            payments,
            storage,
            gateway,
            buyer,
            seller,
        }
    }

    async fn top_up(f: &Fixture, member: &Member, amount: i64) {
        let payment = f.payments.request_top_up(member, amount).await.unwrap();
        f.payments
            .confirm_top_up(member, &payment.order_id, "pg-key", amount)
            .await
            .unwrap();
    }

    fn domain_err(e: PlatformError) -> DomainError {
        match e {
            PlatformError::Domain(d) => d,
            other => panic!("expected domain error, got {other}"),
        }
    }

    #[tokio::test]
    async fn confirmed_top_up_credits_the_wallet_and_ledger() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 50_000).await;

        let wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        assert_eq!(wallet.balance, 50_000);
        assert_eq!(wallet.holding, 0);

        let txs = f.payments.my_transactions(&f.buyer).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tx_type, WalletTransactionType::TopUpDone);
        assert_eq!(txs[0].balance_after, 50_000);

        assert_eq!(f.gateway.confirms.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tampered_amount_is_rejected_before_the_gateway() {
        let f = fixture().await;
        let payment = f.payments.request_top_up(&f.buyer, 50_000).await.unwrap();

        let err = f
            .payments
            .confirm_top_up(&f.buyer, &payment.order_id, "pg-key", 1)
            .await
            .unwrap_err();
        assert_eq!(domain_err(err), DomainError::InvalidPaymentAmount);
        assert!(f.gateway.confirms.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_top_up_confirms_only_once() {
        let f = fixture().await;
        let payment = f.payments.request_top_up(&f.buyer, 50_000).await.unwrap();
        f.payments
            .confirm_top_up(&f.buyer, &payment.order_id, "pg-key", 50_000)
            .await
            .unwrap();

        let err = f
            .payments
            .confirm_top_up(&f.buyer, &payment.order_id, "pg-key", 50_000)
            .await
            .unwrap_err();
        assert_eq!(domain_err(err), DomainError::AlreadyProcessedPayment);
    }

    #[tokio::test]
    async fn refund_debits_the_wallet_and_cancels_at_the_gateway() {
        let f = fixture().await;
        let payment = f.payments.request_top_up(&f.buyer, 50_000).await.unwrap();
        f.payments
            .confirm_top_up(&f.buyer, &payment.order_id, "pg-key", 50_000)
            .await
            .unwrap();

        let refunded = f
            .payments
            .refund_top_up(&f.buyer, &payment.order_id, "changed my mind")
            .await
            .unwrap();
        assert_eq!(refunded.status, PaymentStatus::Canceled);

        let wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        assert_eq!(wallet.balance, 0);
        assert_eq!(f.gateway.cancels.lock().unwrap().clone(), vec![("pg-key".to_string(), 50_000)]);
    }

    #[tokio::test]
    async fn refund_needs_free_balance_and_skips_the_gateway() {
        let f = fixture().await;
        let payment = f.payments.request_top_up(&f.buyer, 50_000).await.unwrap();
        f.payments
            .confirm_top_up(&f.buyer, &payment.order_id, "pg-key", 50_000)
            .await
            .unwrap();

        // Most of the balance is frozen as a deposit
        f.payments
            .hold(f.buyer.id.unwrap(), Uuid::new_v4(), 45_000)
            .await
            .unwrap();

        let err = f
            .payments
            .refund_top_up(&f.buyer, &payment.order_id, "too slow")
            .await
            .unwrap_err();
        assert_eq!(domain_err(err), DomainError::InsufficientBalance);
        assert!(f.gateway.cancels.lock().unwrap().is_empty());

        // The top-up stays confirmed
        let row = f
            .storage
            .get_payment_by_order_id(&payment.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, PaymentStatus::Done);
    }

    #[tokio::test]
    async fn gateway_decline_leaves_the_top_up_pending() {
        let storage = Arc::new(InMemoryStorage::new());
        let buyer = member_with_wallet(&storage, "buyer").await;
        let gateway = Arc::new(MockGateway {
            confirms: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
            fail_confirm: true,
        });
        let payments = PaymentUseCase::new(
            storage.clone(),
            gateway,
            Arc::new(NullEvents),
            0.10,
            7,
            100,
        );

        let payment = payments.request_top_up(&buyer, 10_000).await.unwrap();
        let err = payments
            .confirm_top_up(&buyer, &payment.order_id, "pg-key", 10_000)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Gateway { .. }));

        let row = storage
            .get_payment_by_order_id(&payment.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, PaymentStatus::Pending);
        let wallet = storage
            .get_wallet_by_member(buyer.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(wallet.balance, 0);
    }

    #[tokio::test]
    async fn deposit_hold_is_idempotent_per_member_and_auction() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 50_000).await;
        let auction_id = Uuid::new_v4();
        let member_id = f.buyer.id.unwrap();

        let first = f.payments.hold(member_id, auction_id, 5_000).await.unwrap();
        let second = f.payments.hold(member_id, auction_id, 5_000).await.unwrap();
        assert_eq!(first, second);

        let wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        assert_eq!(wallet.holding, 5_000);
        assert_eq!(wallet.balance, 50_000);
    }

    #[tokio::test]
    async fn deposit_hold_requires_free_balance() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 4_000).await;

        let err = f
            .payments
            .hold(f.buyer.id.unwrap(), Uuid::new_v4(), 5_000)
            .await
            .unwrap_err();
        assert_eq!(domain_err(err), DomainError::InsufficientBalance);
    }

    #[tokio::test]
    async fn release_all_skips_the_winner() {
        let f = fixture().await;
        let loser = member_with_wallet(&f.storage, "loser").await;
        top_up(&f, &f.buyer, 50_000).await;
        top_up(&f, &loser, 50_000).await;

        let auction_id = Uuid::new_v4();
        f.payments
            .hold(f.buyer.id.unwrap(), auction_id, 5_000)
            .await
            .unwrap();
        f.payments
            .hold(loser.id.unwrap(), auction_id, 5_000)
            .await
            .unwrap();

        let released = f
            .payments
            .release_all(auction_id, Some(f.buyer.id.unwrap()))
            .await
            .unwrap();
        assert_eq!(released, 1);

        let winner_wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        assert_eq!(winner_wallet.holding, 5_000);
        let loser_wallet = f.payments.my_wallet(&loser).await.unwrap();
        assert_eq!(loser_wallet.holding, 0);
        assert_eq!(loser_wallet.balance, 50_000);
    }

    #[tokio::test]
    async fn paying_an_order_consumes_deposit_and_queues_settlement() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 200_000).await;
        let auction_id = Uuid::new_v4();
        let buyer_id = f.buyer.id.unwrap();
        let seller_id = f.seller.id.unwrap();

        f.payments.hold(buyer_id, auction_id, 10_000).await.unwrap();
        let mut order = AuctionOrder::new(
            auction_id,
            seller_id,
            buyer_id,
            100_000,
            Utc::now() + Duration::hours(24),
        );
        f.storage.create_order(&mut order).await.unwrap();

        let paid = f.payments.pay_order(&f.buyer, auction_id).await.unwrap();
        assert_eq!(paid.status, OrderStatus::Completed);

        let wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        // 200k - 10k deposit - 90k remainder
        assert_eq!(wallet.balance, 100_000);
        assert_eq!(wallet.holding, 0);

        let deposit = f
            .storage
            .get_deposit(buyer_id, auction_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deposit.status, DepositStatus::Used);

        let settlements = f.payments.my_settlements(&f.seller).await.unwrap();
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].sales_amount, 100_000);
        assert_eq!(settlements[0].fee_amount, 10_000);
        assert_eq!(settlements[0].settlement_amount, 90_000);
        assert_eq!(settlements[0].status, SettlementStatus::Ready);
    }

    #[tokio::test]
    async fn only_the_winner_pays_their_order() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 200_000).await;
        let auction_id = Uuid::new_v4();

        let mut order = AuctionOrder::new(
            auction_id,
            f.seller.id.unwrap(),
            f.buyer.id.unwrap(),
            100_000,
            Utc::now() + Duration::hours(24),
        );
        f.storage.create_order(&mut order).await.unwrap();

        let err = f.payments.pay_order(&f.seller, auction_id).await.unwrap_err();
        assert_eq!(domain_err(err), DomainError::PaymentOwnerMismatch);
    }

    #[tokio::test]
    async fn timeout_forfeits_the_deposit_and_compensates_the_seller() {
        let f = fixture().await;
        top_up(&f, &f.buyer, 50_000).await;
        let auction_id = Uuid::new_v4();
        let buyer_id = f.buyer.id.unwrap();

        f.payments.hold(buyer_id, auction_id, 10_000).await.unwrap();
        let mut order = AuctionOrder::new(
            auction_id,
            f.seller.id.unwrap(),
            buyer_id,
            100_000,
            Utc::now() - Duration::hours(1),
        );
        f.storage.create_order(&mut order).await.unwrap();

        let processed = f.payments.process_payment_timeouts(Utc::now()).await.unwrap();
        assert_eq!(processed, 1);

        let wallet = f.payments.my_wallet(&f.buyer).await.unwrap();
        assert_eq!(wallet.balance, 40_000);
        assert_eq!(wallet.holding, 0);

        let order = f
            .storage
            .get_order_by_auction(auction_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Failed);

        let settlements = f.payments.my_settlements(&f.seller).await.unwrap();
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].settlement_amount, 10_000);
        assert_eq!(settlements[0].fee_amount, 0);

        // A second sweep finds nothing left to do
        assert_eq!(
            f.payments.process_payment_timeouts(Utc::now()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn settlement_batch_pays_after_the_hold_period() {
        let f = fixture().await;
        let seller_id = f.seller.id.unwrap();

        let mut rested = Settlement::from_sale(Uuid::new_v4(), seller_id, 100_000, 0.10);
        rested.created_at = Utc::now() - Duration::days(8);
        f.storage.create_settlement(&mut rested).await.unwrap();

        let mut fresh = Settlement::from_sale(Uuid::new_v4(), seller_id, 30_000, 0.10);
        f.storage.create_settlement(&mut fresh).await.unwrap();

        let paid = f.payments.process_settlements(Utc::now()).await.unwrap();
        assert_eq!(paid, 1);

        let wallet = f.payments.my_wallet(&f.seller).await.unwrap();
        assert_eq!(wallet.balance, 90_000);

        let platform = f
            .storage
            .get_wallet_by_member(PLATFORM_ACCOUNT_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(platform.balance, 10_000);

        let done = f.storage.get_settlement(rested.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(done.status, SettlementStatus::Done);
        let waiting = f.storage.get_settlement(fresh.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(waiting.status, SettlementStatus::Ready);
    }

    #[tokio::test]
    async fn settlement_without_seller_wallet_is_marked_failed() {
        let f = fixture().await;
        let ghost = Uuid::new_v4();

        let mut s = Settlement::from_sale(Uuid::new_v4(), ghost, 10_000, 0.10);
        s.created_at = Utc::now() - Duration::days(8);
        f.storage.create_settlement(&mut s).await.unwrap();

        let paid = f.payments.process_settlements(Utc::now()).await.unwrap();
        assert_eq!(paid, 0);

        let row = f.storage.get_settlement(s.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(row.status, SettlementStatus::Failed);
    }
}
