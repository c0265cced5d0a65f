use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-member balance. `holding` is the slice of `balance` frozen as auction
/// deposits; the spendable amount is `balance - holding`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub balance: i64,
    pub holding: i64,
    /// Bumped on every mutation; storage rejects stale writes.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(member_id: Uuid) -> Self {
        Self {
            id: None,
            member_id,
            balance: 0,
            holding: 0,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn available(&self) -> i64 {
        self.balance - self.holding
    }

    pub fn credit(&mut self, amount: i64) {
        self.balance += amount;
    }

    /// Spend free balance (top-up refunds, order payments).
    pub fn debit(&mut self, amount: i64) -> Result<(), DomainError> {
        if self.available() < amount {
            return Err(DomainError::InsufficientBalance);
        }
        self.balance -= amount;
        Ok(())
    }

    /// Freeze part of the balance as a deposit.
    pub fn hold(&mut self, amount: i64) -> Result<(), DomainError> {
        if self.available() < amount {
            return Err(DomainError::InsufficientBalance);
        }
        self.holding += amount;
        Ok(())
    }

    /// Unfreeze a released deposit.
    pub fn release(&mut self, amount: i64) -> Result<(), DomainError> {
        if self.holding < amount {
            return Err(DomainError::InsufficientHolding);
        }
        self.holding -= amount;
        Ok(())
    }

    /// A used or forfeited deposit leaves the wallet entirely.
    pub fn consume_held(&mut self, amount: i64) -> Result<(), DomainError> {
        if self.holding < amount {
            return Err(DomainError::InsufficientHolding);
        }
        self.holding -= amount;
        self.balance -= amount;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositStatus {
    Hold,
    Released,
    Used,
    Forfeited,
}

/// Bid deposit frozen per (member, auction); at most one row per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub auction_id: Uuid,
    pub amount: i64,
    pub status: DepositStatus,
    pub created_at: DateTime<Utc>,
}

impl Deposit {
    pub fn new(member_id: Uuid, auction_id: Uuid, amount: i64) -> Self {
        Self {
            id: None,
            member_id,
            auction_id,
            amount,
            status: DepositStatus::Hold,
            created_at: Utc::now(),
        }
    }

    pub fn release(&mut self) -> Result<(), DomainError> {
        self.require_hold()?;
        self.status = DepositStatus::Released;
        Ok(())
    }

    /// Counts the deposit toward the winner's payment.
    pub fn use_for_payment(&mut self) -> Result<(), DomainError> {
        self.require_hold()?;
        self.status = DepositStatus::Used;
        Ok(())
    }

    pub fn forfeit(&mut self) -> Result<(), DomainError> {
        self.require_hold()?;
        self.status = DepositStatus::Forfeited;
        Ok(())
    }

    fn require_hold(&self) -> Result<(), DomainError> {
        if self.status != DepositStatus::Hold {
            return Err(DomainError::DepositNotHeld);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Done,
    Canceled,
}

/// A wallet top-up order against the external payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    /// Unique order id handed to the gateway and back.
    pub order_id: String,
    pub amount: i64,
    /// Gateway-side key, present once confirmed.
    pub payment_key: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(member_id: Uuid, order_id: impl Into<String>, amount: i64) -> Self {
        Self {
            id: None,
            member_id,
            order_id: order_id.into(),
            amount,
            payment_key: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Ready,
    Done,
    Failed,
}

/// Seller payout for one auction, held for a configured number of days
/// before the batch pays it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Option<Uuid>,
    pub auction_id: Uuid,
    pub seller_id: Uuid,
    pub sales_amount: i64,
    pub fee_amount: i64,
    pub settlement_amount: i64,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn from_sale(auction_id: Uuid, seller_id: Uuid, sales_amount: i64, fee_rate: f64) -> Self {
        let fee_amount = (sales_amount as f64 * fee_rate) as i64;
        Self {
            id: None,
            auction_id,
            seller_id,
            sales_amount,
            fee_amount,
            settlement_amount: sales_amount - fee_amount,
            status: SettlementStatus::Ready,
            created_at: Utc::now(),
        }
    }

    /// Compensation paid to the seller out of a buyer's forfeited deposit.
    /// No fee is taken.
    pub fn from_forfeit(auction_id: Uuid, seller_id: Uuid, forfeited_amount: i64) -> Self {
        Self {
            id: None,
            auction_id,
            seller_id,
            sales_amount: forfeited_amount,
            fee_amount: 0,
            settlement_amount: forfeited_amount,
            status: SettlementStatus::Ready,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self) {
        self.status = SettlementStatus::Done;
    }

    pub fn fail(&mut self) {
        self.status = SettlementStatus::Failed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletTransactionType {
    TopUpDone,
    DepositHold,
    DepositRelease,
    DepositUsed,
    DepositForfeited,
    AuctionPayment,
    RefundDone,
    SettlementPaid,
    SettlementFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    Deposit,
    Payment,
    Settlement,
    Order,
}

/// Append-only ledger row recording how a wallet changed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Option<Uuid>,
    pub member_id: Uuid,
    pub tx_type: WalletTransactionType,
    pub balance_delta: i64,
    pub holding_delta: i64,
    pub balance_after: i64,
    pub reference: Option<(ReferenceKind, Uuid)>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn record(
        member_id: Uuid,
        tx_type: WalletTransactionType,
        balance_delta: i64,
        holding_delta: i64,
        balance_after: i64,
        reference: Option<(ReferenceKind, Uuid)>,
    ) -> Self {
        Self {
            id: None,
            member_id,
            tx_type,
            balance_delta,
            holding_delta,
            balance_after,
            reference,
            created_at: Utc::now(),
        }
    }
}
