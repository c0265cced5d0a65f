//! Application layer: one use-case struct per context, wired to storage and
//! ports. HTTP/GraphQL layers call into these; they never touch adapters
//! directly.

pub mod auction_use_case;
pub mod auth_use_case;
pub mod member_use_case;
pub mod payment_use_case;
pub mod ports;
pub mod product_use_case;

pub use auction_use_case::AuctionUseCase;
pub use auth_use_case::{AuthUseCase, TokenPair};
pub use member_use_case::{MemberUseCase, ProfileUpdate};
pub use payment_use_case::PaymentUseCase;
pub use product_use_case::ProductUseCase;
