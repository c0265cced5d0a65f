use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Payment gateway error: {message}")]
    Gateway { message: String },

    #[error("{0}")]
    Domain(#[from] DomainError),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Business rule violations with a stable numeric code per failure.
///
/// Code ranges: member 1xxx, auction 2xxx, product 3xxx, payment 4xxx,
/// auth 5xxx, global 9xxx.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    // Member
    #[error("member not found")]
    MemberNotFound,
    #[error("zip code is required before participating")]
    MemberZipCodeRequired,
    #[error("address is required before participating")]
    MemberAddressRequired,
    #[error("address detail is required before participating")]
    MemberAddressDetailRequired,
    #[error("contact phone is required before participating")]
    MemberPhoneRequired,
    #[error("real name is required before participating")]
    MemberRealNameRequired,
    #[error("member has withdrawn")]
    MemberWithdrawn,

    // Auction
    #[error("auction not found")]
    AuctionNotFound,
    #[error("auction is not in progress")]
    AuctionNotInProgress,
    #[error("auction is not scheduled")]
    AuctionNotScheduled,
    #[error("already the highest bidder on this auction")]
    AlreadyHighestBidder,
    #[error("sellers cannot bid on their own auction")]
    SellerCannotBid,
    #[error("outside the bidding window")]
    BidTimeInvalid,
    #[error("bid amount below the minimum of {minimum}")]
    BidAmountTooLow { minimum: i64 },
    #[error("auction end time must be after its start time")]
    AuctionTimeRangeInvalid,
    #[error("auction order not found")]
    OrderNotFound,
    #[error("auction order is not in a processable state")]
    InvalidOrderStatus,

    // Product
    #[error("product not found")]
    ProductNotFound,
    #[error("product has not passed inspection")]
    ProductNotApproved,
    #[error("only the product owner may do this")]
    NotProductOwner,
    #[error("only sellers may register products")]
    SellerRoleRequired,
    #[error("inspection verdict already recorded")]
    InspectionAlreadyDecided,

    // Payment
    #[error("wallet not found for member")]
    WalletNotFound,
    #[error("insufficient free balance")]
    InsufficientBalance,
    #[error("insufficient held amount to release")]
    InsufficientHolding,
    #[error("deposit not found")]
    DepositNotFound,
    #[error("deposit already used or forfeited")]
    DepositNotHeld,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("payment belongs to another member")]
    PaymentOwnerMismatch,
    #[error("payment amount mismatch")]
    InvalidPaymentAmount,
    #[error("payment already processed")]
    AlreadyProcessedPayment,
    #[error("settlement not found")]
    SettlementNotFound,

    // Auth
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("refresh token is not recognized")]
    RefreshTokenInvalid,
    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,
    #[error("refresh token has expired")]
    RefreshTokenExpired,
    #[error("authentication required")]
    Unauthorized,
    #[error("not allowed for this role")]
    Forbidden,

    // Global
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// HTTP status the error maps to at the API boundary.
    pub fn http_status(&self) -> u16 {
        use DomainError::*;
        match self {
            MemberNotFound | AuctionNotFound | ProductNotFound | WalletNotFound
            | DepositNotFound | PaymentNotFound | SettlementNotFound | OrderNotFound => 404,
            AlreadyHighestBidder | AlreadyProcessedPayment | InspectionAlreadyDecided => 409,
            SellerCannotBid | NotProductOwner | SellerRoleRequired | Forbidden
            | PaymentOwnerMismatch => 403,
            InvalidToken | RefreshTokenInvalid | RefreshTokenRevoked | RefreshTokenExpired
            | Unauthorized => 401,
            Internal(_) => 500,
            _ => 400,
        }
    }

    /// Stable numeric code for clients; grouped by context.
    pub fn code(&self) -> u32 {
        use DomainError::*;
        match self {
            MemberNotFound => 1001,
            MemberZipCodeRequired => 1002,
            MemberAddressRequired => 1003,
            MemberAddressDetailRequired => 1004,
            MemberPhoneRequired => 1005,
            MemberRealNameRequired => 1006,
            MemberWithdrawn => 1007,

            AuctionNotFound => 2001,
            AuctionNotInProgress => 2002,
            AlreadyHighestBidder => 2003,
            SellerCannotBid => 2004,
            BidTimeInvalid => 2005,
            BidAmountTooLow { .. } => 2006,
            AuctionNotScheduled => 2007,
            AuctionTimeRangeInvalid => 2008,
            OrderNotFound => 2009,
            InvalidOrderStatus => 2010,

            ProductNotFound => 3001,
            ProductNotApproved => 3002,
            NotProductOwner => 3003,
            SellerRoleRequired => 3004,
            InspectionAlreadyDecided => 3005,

            WalletNotFound => 4001,
            InsufficientBalance => 4002,
            InsufficientHolding => 4003,
            DepositNotFound => 4004,
            DepositNotHeld => 4005,
            PaymentNotFound => 4006,
            PaymentOwnerMismatch => 4007,
            InvalidPaymentAmount => 4008,
            AlreadyProcessedPayment => 4009,
            SettlementNotFound => 4010,

            InvalidToken => 5001,
            RefreshTokenInvalid => 5002,
            RefreshTokenRevoked => 5003,
            RefreshTokenExpired => 5004,
            Unauthorized => 5005,
            Forbidden => 5006,

            InvalidInput(_) => 9001,
            Internal(_) => 9000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_stay_in_their_context_range() {
        assert_eq!(DomainError::MemberNotFound.code(), 1001);
        assert_eq!(DomainError::AuctionNotInProgress.code(), 2002);
        assert_eq!(DomainError::BidAmountTooLow { minimum: 100 }.code(), 2006);
        assert_eq!(DomainError::InsufficientBalance.code(), 4002);
        assert_eq!(DomainError::Internal("x".into()).code(), 9000);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(DomainError::MemberNotFound.http_status(), 404);
        assert_eq!(DomainError::AlreadyHighestBidder.http_status(), 409);
        assert_eq!(DomainError::SellerCannotBid.http_status(), 403);
        assert_eq!(DomainError::InvalidToken.http_status(), 401);
        assert_eq!(DomainError::InsufficientBalance.http_status(), 400);
    }
}
