//! Metrics for the auction service, following Prometheus naming
//! conventions. Names live in one catalog enum so nothing records to a
//! misspelled metric.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

/// Enum representing all metric names used in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Auth
    AuthLogins,
    AuthTokenRefreshes,
    AuthTokenRefreshRejected,
    AuthLogouts,

    // Auction
    AuctionBidsPlaced,
    AuctionBidsRejected,
    AuctionsStarted,
    AuctionsSettledWon,
    AuctionsSettledFailed,

    // Payment
    PaymentDepositsHeld,
    PaymentDepositsReleased,
    PaymentDepositsForfeited,
    PaymentTopUpsConfirmed,
    PaymentRefunds,
    PaymentOrdersCompleted,
    PaymentOrdersTimedOut,
    SettlementsProcessed,
    SettlementsFailed,

    // Events
    EventsPublished,

    // Commit lint
    LintMessagesChecked,
    LintMessagesRejected,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::AuthLogins => "rarebid_auth_logins_total",
            MetricName::AuthTokenRefreshes => "rarebid_auth_token_refreshes_total",
            MetricName::AuthTokenRefreshRejected => "rarebid_auth_token_refresh_rejected_total",
            MetricName::AuthLogouts => "rarebid_auth_logouts_total",

            MetricName::AuctionBidsPlaced => "rarebid_auction_bids_placed_total",
            MetricName::AuctionBidsRejected => "rarebid_auction_bids_rejected_total",
            MetricName::AuctionsStarted => "rarebid_auctions_started_total",
            MetricName::AuctionsSettledWon => "rarebid_auctions_settled_won_total",
            MetricName::AuctionsSettledFailed => "rarebid_auctions_settled_failed_total",

            MetricName::PaymentDepositsHeld => "rarebid_payment_deposits_held_total",
            MetricName::PaymentDepositsReleased => "rarebid_payment_deposits_released_total",
            MetricName::PaymentDepositsForfeited => "rarebid_payment_deposits_forfeited_total",
            MetricName::PaymentTopUpsConfirmed => "rarebid_payment_topups_confirmed_total",
            MetricName::PaymentRefunds => "rarebid_payment_refunds_total",
            MetricName::PaymentOrdersCompleted => "rarebid_payment_orders_completed_total",
            MetricName::PaymentOrdersTimedOut => "rarebid_payment_orders_timed_out_total",
            MetricName::SettlementsProcessed => "rarebid_settlements_processed_total",
            MetricName::SettlementsFailed => "rarebid_settlements_failed_total",

            MetricName::EventsPublished => "rarebid_events_published_total",

            MetricName::LintMessagesChecked => "rarebid_lint_messages_checked_total",
            MetricName::LintMessagesRejected => "rarebid_lint_messages_rejected_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent; later calls keep the first
/// recorder.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))?;
    let _ = PROMETHEUS_HANDLE.set(handle);
    info!("Metrics system initialized");
    Ok(())
}

/// Render the current metric values in Prometheus text exposition format.
pub fn render() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_default()
}

pub mod auth {
    use super::MetricName;

    pub fn login_succeeded() {
        ::metrics::counter!(MetricName::AuthLogins.as_str()).increment(1);
    }

    pub fn token_refreshed() {
        ::metrics::counter!(MetricName::AuthTokenRefreshes.as_str()).increment(1);
    }

    pub fn token_refresh_rejected() {
        ::metrics::counter!(MetricName::AuthTokenRefreshRejected.as_str()).increment(1);
    }

    pub fn logged_out() {
        ::metrics::counter!(MetricName::AuthLogouts.as_str()).increment(1);
    }
}

pub mod auction {
    use super::MetricName;

    pub fn bid_placed() {
        ::metrics::counter!(MetricName::AuctionBidsPlaced.as_str()).increment(1);
    }

    pub fn bid_rejected(reason: &str) {
        ::metrics::counter!(
            MetricName::AuctionBidsRejected.as_str(),
            "reason" => reason.to_string()
        )
        .increment(1);
    }

    pub fn started() {
        ::metrics::counter!(MetricName::AuctionsStarted.as_str()).increment(1);
    }

    pub fn settled_won() {
        ::metrics::counter!(MetricName::AuctionsSettledWon.as_str()).increment(1);
    }

    pub fn settled_failed() {
        ::metrics::counter!(MetricName::AuctionsSettledFailed.as_str()).increment(1);
    }
}

pub mod payment {
    use super::MetricName;

    pub fn deposit_held() {
        ::metrics::counter!(MetricName::PaymentDepositsHeld.as_str()).increment(1);
    }

    pub fn deposits_released(count: u64) {
        ::metrics::counter!(MetricName::PaymentDepositsReleased.as_str()).increment(count);
    }

    pub fn deposit_forfeited() {
        ::metrics::counter!(MetricName::PaymentDepositsForfeited.as_str()).increment(1);
    }

    pub fn topup_confirmed() {
        ::metrics::counter!(MetricName::PaymentTopUpsConfirmed.as_str()).increment(1);
    }

    pub fn refunded() {
        ::metrics::counter!(MetricName::PaymentRefunds.as_str()).increment(1);
    }

    pub fn order_completed() {
        ::metrics::counter!(MetricName::PaymentOrdersCompleted.as_str()).increment(1);
    }

    pub fn order_timed_out() {
        ::metrics::counter!(MetricName::PaymentOrdersTimedOut.as_str()).increment(1);
    }

    pub fn settlement_processed() {
        ::metrics::counter!(MetricName::SettlementsProcessed.as_str()).increment(1);
    }

    pub fn settlement_failed() {
        ::metrics::counter!(MetricName::SettlementsFailed.as_str()).increment(1);
    }
}

pub mod events {
    use super::MetricName;

    pub fn published(kind: &str) {
        ::metrics::counter!(
            MetricName::EventsPublished.as_str(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }
}

pub mod lint {
    use super::MetricName;

    pub fn checked() {
        ::metrics::counter!(MetricName::LintMessagesChecked.as_str()).increment(1);
    }

    pub fn rejected() {
        ::metrics::counter!(MetricName::LintMessagesRejected.as_str()).increment(1);
    }
}
