use crate::error::{PlatformError, Result};
use serde::Deserialize;
use std::fs;

fn default_port() -> u16 {
    8080
}
fn default_access_expire() -> i64 {
    1800
}
fn default_refresh_expire() -> i64 {
    60 * 60 * 24 * 14
}
fn default_deposit_rate() -> f64 {
    0.10
}
fn default_payment_window_hours() -> i64 {
    24
}
fn default_sweep_interval() -> u64 {
    30
}
fn default_fee_rate() -> f64 {
    0.10
}
fn default_hold_days() -> i64 {
    7
}
fn default_batch_size() -> usize {
    100
}
fn default_batch_interval() -> u64 {
    3600
}
fn default_object_root() -> String {
    "objects".to_string()
}
fn default_object_base_url() -> String {
    "http://localhost:8080/objects".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_expire")]
    pub access_expire_seconds: i64,
    #[serde(default = "default_refresh_expire")]
    pub refresh_expire_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuctionConfig {
    /// Fraction of the start price frozen as a bid deposit.
    #[serde(default = "default_deposit_rate")]
    pub deposit_rate: f64,
    /// Hours the winner has to pay after the hammer falls.
    #[serde(default = "default_payment_window_hours")]
    pub payment_window_hours: i64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    /// Days a settlement rests before the batch pays it out.
    #[serde(default = "default_hold_days")]
    pub hold_days: i64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_interval")]
    pub batch_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    #[serde(default = "default_object_root")]
    pub root: String,
    #[serde(default = "default_object_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub auction: AuctionConfig,
    pub settlement: SettlementConfig,
    pub gateway: GatewayConfig,
    pub object_store: ObjectStoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlatformError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let mut config: AppConfig = toml::from_str(&content)?;

        // Secrets may be supplied through the environment instead of the file
        if let Ok(secret) = std::env::var("RAREBID_JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Ok(key) = std::env::var("RAREBID_GATEWAY_SECRET_KEY") {
            config.gateway.secret_key = key;
        }

        if config.jwt.secret.trim().is_empty() {
            return Err(PlatformError::Config("jwt.secret must not be empty".into()));
        }
        if config.jwt.access_expire_seconds <= 0 || config.jwt.refresh_expire_seconds <= 0 {
            return Err(PlatformError::Config(
                "jwt expiry seconds must be positive".into(),
            ));
        }
        Ok(config)
    }
}
