//! Quote + profile enrichment for a single symbol

use crate::cancel::{Cancelled, guarded};
use crate::error::ResolveError;
use crate::model::Candidate;
use crate::providers::Providers;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of resolving one symbol against the providers
#[derive(Debug)]
pub enum Lookup {
    Found(Candidate),
    /// Unknown symbol, or a quote missing its current price or previous close
    NotFound,
    /// The quote provider failed; strategies treat this like a miss
    ProviderError(ResolveError),
}

impl Lookup {
    pub fn into_candidate(self) -> Option<Candidate> {
        match self {
            Self::Found(candidate) => Some(candidate),
            Self::NotFound | Self::ProviderError(_) => None,
        }
    }
}

/// Fetch and validate a quote for `symbol`, then enrich it with a profile.
///
/// Profile failures are tolerated and fall back to the bare symbol. The symbol
/// is used as given; callers normalize it.
pub async fn lookup_symbol(
    providers: &Providers,
    symbol: &str,
    token: &CancellationToken,
) -> Result<Lookup, Cancelled> {
    let quote = match guarded(token, || providers.quotes.get_quote(symbol)).await? {
        Ok(Some(quote)) => quote,
        Ok(None) => {
            debug!(symbol, "quote not found");
            return Ok(Lookup::NotFound);
        }
        Err(e) => {
            warn!(symbol, error = %e, "quote lookup failed");
            return Ok(Lookup::ProviderError(e));
        }
    };

    let Some(valid) = quote.validate() else {
        debug!(symbol, "quote missing current price or previous close");
        return Ok(Lookup::NotFound);
    };

    let profile = match guarded(token, || providers.profiles.get_profile(symbol)).await? {
        Ok(profile) => profile,
        Err(e) => {
            warn!(symbol, error = %e, "profile lookup failed, using bare symbol");
            None
        }
    };

    Ok(Lookup::Found(Candidate::from_quote(
        symbol,
        valid,
        profile.as_ref(),
    )))
}
