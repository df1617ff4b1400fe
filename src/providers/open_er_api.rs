use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyCode, RateProvider};

// OpenErApiProvider implementation for RateProvider
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ccx/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(
        name = "OpenErApiLookup",
        skip(self),
        fields(from = %from, to = %to)
    )]
    async fn lookup(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal> {
        let url = format!("{}/v6/latest/{}", self.base_url, from);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency: {}", e, from))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency: {}",
                response.status(),
                from
            ));
        }

        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", from, e))?;

        if data.result != "success" {
            return Err(anyhow!(
                "Rate service returned '{}' for {}: {}",
                data.result,
                from,
                data.error_type.as_deref().unwrap_or("no details")
            ));
        }

        // The base currency is normally listed at 1, but don't rely on it.
        let rate = match data.rates.get(to.as_str()) {
            Some(rate) => *rate,
            None if from == to => 1.0,
            None => return Err(anyhow!("No rate found for currency pair: {}{}", from, to)),
        };

        let rate = Decimal::from_f64(rate)
            .filter(|r| *r > Decimal::ZERO)
            .ok_or_else(|| anyhow!("Invalid rate {} for currency pair: {}{}", rate, from, to))?;

        debug!(%rate, "Received exchange rate");
        Ok(rate)
    }
}
