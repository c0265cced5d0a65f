//! Entities and state machines shared across layers.

pub mod auction;
pub mod auth;
pub mod events;
pub mod member;
pub mod payment;
pub mod product;

pub use auction::{Auction, AuctionBookmark, AuctionOrder, AuctionStatus, Bid, OrderStatus};
pub use auth::{Account, AuthProvider, BlacklistedToken, RefreshToken};
pub use events::DomainEvent;
pub use member::{Member, MemberRole};
pub use payment::{
    Deposit, DepositStatus, Payment, PaymentStatus, ReferenceKind, Settlement, SettlementStatus,
    Wallet, WalletTransaction, WalletTransactionType,
};
pub use product::{Inspection, InspectionStatus, Product, ProductCategory, ProductCondition, ProductImage};
