//! Fixed-quote source for tests and offline operation.

use super::{RateError, RateQuote, RateSource};
use async_trait::async_trait;
use pomar_core::money::Rate;

/// A source that always answers with the same quote.
///
/// Tests use it in place of [`AwesomeApiSource`](super::AwesomeApiSource);
/// a shop without reliable network can use it to pin the day's rate once at
/// opening time.
#[derive(Debug, Clone)]
pub struct FixedRateSource {
    quote: Option<RateQuote>,
}

impl FixedRateSource {
    /// A source that always yields `rate`, with no named origin.
    pub fn new(rate: Rate) -> Self {
        Self {
            quote: Some(RateQuote { rate, source: None }),
        }
    }

    /// A healthy source with no quote to offer.
    pub fn empty() -> Self {
        Self { quote: None }
    }

    /// Name the origin reported alongside the rate.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        if let Some(quote) = &mut self.quote {
            quote.source = Some(source.into());
        }
        self
    }
}

#[async_trait]
impl RateSource for FixedRateSource {
    async fn fetch_usd_brl(&self) -> Result<Option<RateQuote>, RateError> {
        Ok(self.quote.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_source_yields_its_quote() {
        let source = FixedRateSource::new(Rate::from_milli(5_200)).with_source("caderno");

        let quote = source.fetch_usd_brl().await.unwrap().unwrap();
        assert_eq!(quote.rate, Rate::from_milli(5_200));
        assert_eq!(quote.source.as_deref(), Some("caderno"));
    }

    #[tokio::test]
    async fn test_empty_source_yields_none() {
        let source = FixedRateSource::empty();
        assert_eq!(source.fetch_usd_brl().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        // callers hold these behind a dyn RateSource
        let source: Box<dyn RateSource> = Box::new(FixedRateSource::new(Rate::from_milli(5_300)));
        let quote = source.fetch_usd_brl().await.unwrap().unwrap();
        assert_eq!(quote.rate, Rate::from_milli(5_300));
    }
}
