use crate::config::UpstreamConfig;
use crate::domain::model::DebtRecord;
use crate::domain::ports::DebtSource;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    data: AuthData,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DebtPageEnvelope {
    #[serde(default)]
    data: Vec<DebtRecord>,
}

/// HTTP client for the billing platform's debt feed.
pub struct BillingClient {
    client: Client,
    base_url: String,
    secret_token: String,
    shop_ids: String,
    currency: String,
    page_size: u32,
}

impl BillingClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_token: config.secret_token.clone(),
            shop_ids: config.shop_ids.clone(),
            currency: config.currency.clone(),
            page_size: config.page_size,
        })
    }
}

#[async_trait]
impl DebtSource for BillingClient {
    async fn authenticate(&self) -> Result<String> {
        let url = format!("{}/auth/login", self.base_url);
        tracing::debug!("Authenticating against {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "secret_token": self.secret_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Keep the response body; the operator needs it to tell a revoked
            // secret from an upstream outage.
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamAuth {
                message: format!("{} {}", status, body),
            });
        }

        let envelope: AuthEnvelope = response.json().await?;
        Ok(envelope.data.access_token)
    }

    async fn fetch_page(&self, access_token: &str, page: u32) -> Result<Vec<DebtRecord>> {
        let url = format!("{}/debt", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("page", page.to_string()),
                ("limit", self.page_size.to_string()),
                ("shop_ids", self.shop_ids.clone()),
                ("currency", self.currency.clone()),
                ("detalization_by_position", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let envelope: DebtPageEnvelope = response.json().await?;
        tracing::debug!("Page {} returned {} records", page, envelope.data.len());
        Ok(envelope.data)
    }
}
