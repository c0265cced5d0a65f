use crate::app::ports::{GatewayConfirmation, PaymentGateway};
use crate::error::{PlatformError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

/// Adapter for the external payment gateway's confirm/cancel API.
/// Authenticates with HTTP Basic on the merchant secret key.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    #[serde(rename = "paymentKey")]
    payment_key: String,
    #[serde(rename = "totalAmount")]
    total_amount: i64,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }

    fn auth_header(&self) -> String {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key));
        format!("Basic {credentials}")
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn confirm(&self, payment_key: &str, order_id: &str, amount: i64) -> Result<GatewayConfirmation> {
        let url = format!("{}/v1/payments/confirm", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&json!({
                "paymentKey": payment_key,
                "orderId": order_id,
                "amount": amount,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Gateway {
                message: format!("confirm returned {status}: {body}"),
            });
        }

        let confirmed: ConfirmResponse = response.json().await?;
        Ok(GatewayConfirmation {
            payment_key: confirmed.payment_key,
            approved_amount: confirmed.total_amount,
        })
    }

    async fn cancel(&self, payment_key: &str, amount: i64, reason: &str) -> Result<()> {
        let url = format!("{}/v1/payments/{}/cancel", self.base_url, payment_key);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&json!({
                "cancelReason": reason,
                "cancelAmount": amount,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Gateway {
                message: format!("cancel returned {status}: {body}"),
            });
        }
        Ok(())
    }
}
