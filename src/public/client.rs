//! REST client for the public day-summary endpoint.
//!
//! No authentication is involved: these are plain GET requests. The range
//! download is the one place in this crate that retries — transient
//! connection failures are retried a bounded number of times, while a bad
//! HTTP status aborts the download at once.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::config::MercadoBitcoinConfig;
use crate::error::{retry_with_backoff, ApiError, ApiResult};
use crate::public::types::DaySummary;
use crate::tapi::endpoints::PUBLIC_API_PATH;

/// REST client for the public data API.
pub struct PublicClient {
    /// HTTP client
    http_client: reqwest::Client,
    /// Base URL
    base_url: String,
    /// Connection-failure retries per request in [`Self::download_range`]
    max_retries: u32,
    /// Initial retry delay
    retry_delay: Duration,
}

impl PublicClient {
    /// Create a new public data client.
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }

    /// Build a client from configuration.
    pub fn from_config(config: &MercadoBitcoinConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.rest.timeout())
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            max_retries: config.rest.max_retries,
            retry_delay: config.rest.retry_delay(),
        })
    }

    /// Fetch the daily summary for a single day.
    pub async fn day_summary(&self, coin: &str, date: NaiveDate) -> ApiResult<DaySummary> {
        let url = format!(
            "{}{}/{}/day-summary/{}",
            self.base_url,
            PUBLIC_API_PATH,
            coin,
            date.format("%Y/%m/%d/")
        );

        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Connection(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .unwrap_or("unknown reason")
                .to_string();
            error!(
                "day-summary request failed: HTTP {} {}",
                status.as_u16(),
                reason
            );
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason,
            });
        }

        response
            .json::<DaySummary>()
            .await
            .map_err(|e| ApiError::Parse(format!("failed to parse day summary: {e}")))
    }

    /// Download the summaries for every day in `[start, end)`, one request
    /// per day, in order.
    ///
    /// Each request is retried on connection failures up to the configured
    /// retry limit before the error propagates; any other failure aborts
    /// immediately.
    pub async fn download_range(
        &self,
        coin: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<DaySummary>> {
        let num_days = (end - start).num_days().max(0);
        info!("downloading {} days of {} summary data", num_days, coin);

        let mut summaries = Vec::with_capacity(num_days as usize);
        for offset in 0..num_days {
            let date = start + chrono::Duration::days(offset);
            let summary = retry_with_backoff(
                || self.day_summary(coin, date),
                self.max_retries + 1,
                self.retry_delay,
            )
            .await?;
            summaries.push(summary);
        }

        info!("download complete: {} summaries", summaries.len());
        Ok(summaries)
    }
}
