//! Domain types shared by providers, strategies and the coordinator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sector used when no profile is available for a symbol
pub const FALLBACK_SECTOR: &str = "Other";

/// Raw quote fields as reported by a [`QuoteProvider`](crate::providers::QuoteProvider)
///
/// Fields are optional because upstream feeds routinely omit them; a snapshot
/// is only usable once [`QuoteSnapshot::validate`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
}

/// A quote carrying both a current price and a usable previous close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidQuote {
    pub current_price: f64,
    pub previous_close: f64,
}

impl ValidQuote {
    /// Percentage move from the previous close
    pub fn change_percent(&self) -> f64 {
        (self.current_price - self.previous_close) / self.previous_close * 100.0
    }
}

impl QuoteSnapshot {
    /// Build a snapshot with just the two fields required for validity
    pub fn priced(current_price: f64, previous_close: f64) -> Self {
        Self {
            current_price: Some(current_price),
            previous_close: Some(previous_close),
            ..Self::default()
        }
    }

    /// Returns the priced view, or `None` when the quote counts as not found.
    ///
    /// A non-positive or non-finite previous close is rejected since no change
    /// percent can be derived from it.
    pub fn validate(&self) -> Option<ValidQuote> {
        let current_price = self.current_price.filter(|p| p.is_finite())?;
        let previous_close = self
            .previous_close
            .filter(|p| p.is_finite() && *p > 0.0)?;
        Some(ValidQuote {
            current_price,
            previous_close,
        })
    }
}

/// Company profile fields, all best-effort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub display_name: Option<String>,
    pub sector_or_industry: Option<String>,
    /// Market capitalization in USD
    pub market_capitalization: Option<f64>,
}

/// One hit from a [`DirectorySearch`](crate::providers::DirectorySearch)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub symbol: String,
    pub name: Option<String>,
}

impl DirectoryEntry {
    pub fn new(symbol: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.map(str::to_string),
        }
    }
}

/// Coarse market capitalization class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapBucket {
    Mega,
    Large,
    Mid,
    Small,
    Micro,
    Unknown,
}

impl MarketCapBucket {
    /// Classify a USD market capitalization
    pub fn from_market_cap(market_cap: Option<f64>) -> Self {
        match market_cap {
            Some(cap) if cap.is_finite() && cap >= 200e9 => Self::Mega,
            Some(cap) if cap.is_finite() && cap >= 10e9 => Self::Large,
            Some(cap) if cap.is_finite() && cap >= 2e9 => Self::Mid,
            Some(cap) if cap.is_finite() && cap >= 300e6 => Self::Small,
            Some(cap) if cap.is_finite() && cap > 0.0 => Self::Micro,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mega => "mega",
            Self::Large => "large",
            Self::Mid => "mid",
            Self::Small => "small",
            Self::Micro => "micro",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MarketCapBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub display_name: String,
    pub sector: String,
    pub current_price: f64,
    pub change_percent: f64,
    pub market_cap_bucket: MarketCapBucket,
}

impl Candidate {
    /// Combine a validated quote with an optional profile.
    ///
    /// Missing profile fields fall back to the symbol as display name and
    /// [`FALLBACK_SECTOR`].
    pub fn from_quote(symbol: &str, quote: ValidQuote, profile: Option<&CompanyProfile>) -> Self {
        let display_name = profile
            .and_then(|p| p.display_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(symbol)
            .to_string();
        let sector = profile
            .and_then(|p| p.sector_or_industry.as_deref())
            .map(str::trim)
            .filter(|sector| !sector.is_empty())
            .unwrap_or(FALLBACK_SECTOR)
            .to_string();

        Self {
            symbol: symbol.to_string(),
            display_name,
            sector,
            current_price: quote.current_price,
            change_percent: quote.change_percent(),
            market_cap_bucket: MarketCapBucket::from_market_cap(
                profile.and_then(|p| p.market_capitalization),
            ),
        }
    }
}

/// Ordered candidates; insertion order is discovery order
pub type CandidateSet = Vec<Candidate>;

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    ExactSymbol,
    CachedFuzzy,
    DirectoryByName,
    TickerPattern,
}

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::ExactSymbol => "exact-symbol",
            Self::CachedFuzzy => "cached-fuzzy",
            Self::DirectoryByName => "directory-by-name",
            Self::TickerPattern => "ticker-pattern",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal outcome of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub generation_id: u64,
    pub candidates: CandidateSet,
    /// `None` when every strategy came back empty
    pub strategy: Option<StrategyKind>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_requires_both_prices() {
        assert!(QuoteSnapshot::default().validate().is_none());

        let missing_close = QuoteSnapshot {
            current_price: Some(10.0),
            ..Default::default()
        };
        assert!(missing_close.validate().is_none());

        let missing_price = QuoteSnapshot {
            previous_close: Some(10.0),
            ..Default::default()
        };
        assert!(missing_price.validate().is_none());

        assert!(QuoteSnapshot::priced(10.0, 0.0).validate().is_none());
        assert!(QuoteSnapshot::priced(f64::NAN, 9.0).validate().is_none());
    }

    #[test]
    fn test_change_percent() {
        let quote = QuoteSnapshot::priced(110.0, 100.0).validate().unwrap();
        assert!((quote.change_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_profile_fallbacks() {
        let quote = QuoteSnapshot::priced(50.0, 40.0).validate().unwrap();

        let bare = Candidate::from_quote("XYZ", quote, None);
        assert_eq!(bare.display_name, "XYZ");
        assert_eq!(bare.sector, FALLBACK_SECTOR);
        assert_eq!(bare.market_cap_bucket, MarketCapBucket::Unknown);

        let blank = CompanyProfile {
            display_name: Some("  ".to_string()),
            sector_or_industry: None,
            market_capitalization: Some(3.0e12),
        };
        let candidate = Candidate::from_quote("XYZ", quote, Some(&blank));
        assert_eq!(candidate.display_name, "XYZ");
        assert_eq!(candidate.market_cap_bucket, MarketCapBucket::Mega);
    }

    #[test]
    fn test_market_cap_buckets() {
        assert_eq!(MarketCapBucket::from_market_cap(Some(50e9)), MarketCapBucket::Large);
        assert_eq!(MarketCapBucket::from_market_cap(Some(5e9)), MarketCapBucket::Mid);
        assert_eq!(MarketCapBucket::from_market_cap(Some(1e9)), MarketCapBucket::Small);
        assert_eq!(MarketCapBucket::from_market_cap(Some(1e6)), MarketCapBucket::Micro);
        assert_eq!(MarketCapBucket::from_market_cap(Some(0.0)), MarketCapBucket::Unknown);
        assert_eq!(MarketCapBucket::from_market_cap(None), MarketCapBucket::Unknown);
    }
}
