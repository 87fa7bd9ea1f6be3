//! Yahoo Finance quote provider

use super::QuoteProvider;
use crate::error::{ResolveError, Result};
use crate::model::QuoteSnapshot;
use async_trait::async_trait;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Daily bars requested per quote; enough to span a weekend or holiday
const QUOTE_RANGE: &str = "5d";
const QUOTE_INTERVAL: &str = "1d";

/// Quote provider backed by Yahoo Finance daily bars
///
/// The most recent bar supplies the current price and day range; the bar
/// before it supplies the previous close.
#[derive(Debug, Clone, Default)]
pub struct YahooQuoteProvider {}

/// Prices taken from one daily bar
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyBar {
    close: f64,
    high: f64,
    low: f64,
}

impl From<&yahoo::Quote> for DailyBar {
    fn from(quote: &yahoo::Quote) -> Self {
        Self {
            close: quote.close,
            high: quote.high,
            low: quote.low,
        }
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider
    pub fn new() -> Self {
        Self {}
    }
}

/// Collapse daily bars (oldest first) into a snapshot.
///
/// Bars without a positive close are skipped; Yahoo pads holidays with zeros.
fn snapshot_from_bars(bars: &[DailyBar]) -> Option<QuoteSnapshot> {
    let mut priced = bars.iter().filter(|b| b.close.is_finite() && b.close > 0.0).rev();
    let last = priced.next()?;
    let previous = priced.next();

    Some(QuoteSnapshot {
        current_price: Some(last.close),
        previous_close: previous.map(|b| b.close),
        day_high: Some(last.high),
        day_low: Some(last.low),
    })
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn get_quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| ResolveError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_quote_range(symbol, QUOTE_INTERVAL, QUOTE_RANGE)
            .await
            .map_err(|e| ResolveError::YahooFinanceError(e.to_string()))?;

        // An unknown symbol comes back as a response with no usable bars.
        let Ok(quotes) = response.quotes() else {
            debug!(symbol, "no bars returned");
            return Ok(None);
        };

        let bars: Vec<DailyBar> = quotes.iter().map(DailyBar::from).collect();
        Ok(snapshot_from_bars(&bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> DailyBar {
        DailyBar {
            close,
            high: close + 1.0,
            low: close - 1.0,
        }
    }

    #[test]
    fn test_snapshot_uses_last_two_bars() {
        let snapshot = snapshot_from_bars(&[bar(98.0), bar(100.0), bar(102.0)]).unwrap();

        assert_eq!(snapshot.current_price, Some(102.0));
        assert_eq!(snapshot.previous_close, Some(100.0));
        assert_eq!(snapshot.day_high, Some(103.0));
        assert_eq!(snapshot.day_low, Some(101.0));
        assert!(snapshot.validate().is_some());
    }

    #[test]
    fn test_snapshot_skips_padded_bars() {
        let snapshot = snapshot_from_bars(&[bar(50.0), bar(0.0), bar(55.0), bar(f64::NAN)]).unwrap();

        assert_eq!(snapshot.current_price, Some(55.0));
        assert_eq!(snapshot.previous_close, Some(50.0));
    }

    #[test]
    fn test_single_bar_has_no_previous_close() {
        let snapshot = snapshot_from_bars(&[bar(10.0)]).unwrap();
        assert_eq!(snapshot.previous_close, None);
        assert!(snapshot.validate().is_none());
    }

    #[test]
    fn test_no_bars() {
        assert!(snapshot_from_bars(&[]).is_none());
        assert!(snapshot_from_bars(&[bar(0.0)]).is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_quote() {
        let provider = YahooQuoteProvider::new();
        let quote = provider.get_quote("AAPL").await.unwrap().unwrap();
        assert!(quote.validate().is_some());
    }
}
