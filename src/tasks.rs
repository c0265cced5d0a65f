//! Background sweeps driven by interval timers. Every loop logs failures
//! and keeps running; operational `/admin` endpoints trigger the same
//! operations on demand.

use crate::config::AppConfig;
use crate::server::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

const AUTH_PURGE_INTERVAL_SECONDS: u64 = 3600;

/// Spawn the auction, payment-timeout, settlement and auth-purge loops.
pub fn spawn_background_tasks(state: Arc<AppState>, config: &AppConfig) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    {
        let state = state.clone();
        let period = Duration::from_secs(config.auction.sweep_interval_seconds);
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let now = Utc::now();
                if let Err(e) = state.auctions.start_due_auctions(now).await {
                    error!("auction start sweep failed: {}", e);
                }
                match state.auctions.settle_expired(now).await {
                    Ok(summary) if summary.settled + summary.failed_lots > 0 => {
                        info!(
                            "auction sweep: {} won, {} without bids, {} errors",
                            summary.settled,
                            summary.failed_lots,
                            summary.errors.len()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!("auction settle sweep failed: {}", e),
                }
            }
        }));
    }

    {
        let state = state.clone();
        let period = Duration::from_secs(config.auction.sweep_interval_seconds);
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match state.payments.process_payment_timeouts(Utc::now()).await {
                    Ok(0) => {}
                    Ok(n) => info!("payment timeout sweep forfeited {} orders", n),
                    Err(e) => error!("payment timeout sweep failed: {}", e),
                }
            }
        }));
    }

    {
        let state = state.clone();
        let period = Duration::from_secs(config.settlement.batch_interval_seconds);
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match state.payments.process_settlements(Utc::now()).await {
                    Ok(0) => {}
                    Ok(n) => info!("settlement batch paid {} settlements", n),
                    Err(e) => error!("settlement batch failed: {}", e),
                }
            }
        }));
    }

    {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(AUTH_PURGE_INTERVAL_SECONDS));
            loop {
                ticker.tick().await;
                match state.auth.purge_expired().await {
                    Ok((0, 0)) => {}
                    Ok((blacklist, refresh)) => info!(
                        "auth purge dropped {} blacklist rows, {} refresh tokens",
                        blacklist, refresh
                    ),
                    Err(e) => error!("auth purge failed: {}", e),
                }
            }
        }));
    }

    handles
}
