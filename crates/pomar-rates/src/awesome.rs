//! AwesomeAPI client implementation.
//!
//! The shop prices against the commercial dollar published at
//! `economia.awesomeapi.com.br`. One GET, one JSON object, one field we
//! care about (`USDBRL.bid`, a decimal string).

use super::{RateError, RateQuote, RateSource};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use pomar_core::money::Rate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Quote source backed by the public AwesomeAPI last-quote endpoint.
#[derive(Debug, Clone)]
pub struct AwesomeApiSource {
    client: Client,
    base_url: String,
}

impl AwesomeApiSource {
    /// Create a source against a specific base URL (tests point this at a
    /// local server).
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Create with the public AwesomeAPI URL.
    pub fn default_url() -> Self {
        Self::new("https://economia.awesomeapi.com.br".to_string())
    }

    /// GET the last-quote payload, retrying transient failures.
    ///
    /// Bounded: gives up within ~15 seconds so the quote form never hangs
    /// on a dead network.
    async fn get_last(&self) -> Result<serde_json::Value, RateError> {
        let url = format!("{}/last/USD-BRL", self.base_url);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(15)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(RateError::Http(e.to_string())))?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(RateError::Status {
                    status: status.as_u16(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RateError::Status {
                    status: status.as_u16(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(RateError::Malformed(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl RateSource for AwesomeApiSource {
    async fn fetch_usd_brl(&self) -> Result<Option<RateQuote>, RateError> {
        let payload = self.get_last().await?;
        let quote = parse_quote(&payload)?;

        match &quote {
            Some(q) => debug!("Fetched USD-BRL bid: {}", q.rate),
            None => warn!("Rate service answered without a USD-BRL pair"),
        }

        Ok(quote)
    }
}

/// Extract the bid from a last-quote payload.
///
/// A payload without the `USDBRL` pair is "no quote" rather than an error;
/// a pair whose `bid` is absent, non-string, unparsable or zero is a
/// malformed payload.
fn parse_quote(payload: &serde_json::Value) -> Result<Option<RateQuote>, RateError> {
    let pair = match payload.get("USDBRL") {
        Some(pair) => pair,
        None => return Ok(None),
    };

    let bid = pair
        .get("bid")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RateError::Malformed("bid missing or not a string".to_string()))?;

    let rate = Rate::from_str_decimal(bid)
        .ok_or_else(|| RateError::Malformed(format!("bid is not a decimal: '{}'", bid)))?;

    if !rate.is_positive() {
        return Err(RateError::Malformed(format!("bid is not positive: '{}'", bid)));
    }

    Ok(Some(RateQuote {
        rate,
        source: Some("AwesomeAPI".to_string()),
    }))
}
