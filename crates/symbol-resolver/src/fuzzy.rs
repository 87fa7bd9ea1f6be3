//! Rule-priority fuzzy matching of a query against a (symbol, name) pair
//!
//! Rules are tried in a fixed order and the first one satisfied wins. There is
//! no scoring; reordering the rules changes which queries resolve.

/// The rule that accepted a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Symbol starts with the query
    SymbolPrefix,
    /// Display name contains the query
    NameSubstring,
    /// At least half the query words overlap a name word
    WordOverlap,
    /// Query characters appear in order in the name or symbol
    Subsequence,
}

/// Stateless matcher over candidate identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Whether `query` matches the instrument
    pub fn matches(&self, query: &str, symbol: &str, display_name: &str) -> bool {
        self.matched_rule(query, symbol, display_name).is_some()
    }

    /// The first rule `query` satisfies, if any.
    ///
    /// An empty query matches nothing.
    pub fn matched_rule(&self, query: &str, symbol: &str, display_name: &str) -> Option<MatchRule> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let symbol = symbol.to_lowercase();
        let name = display_name.trim().to_lowercase();

        if symbol.starts_with(&query) {
            return Some(MatchRule::SymbolPrefix);
        }
        if name.contains(&query) {
            return Some(MatchRule::NameSubstring);
        }
        if word_overlap(&query, &name) {
            return Some(MatchRule::WordOverlap);
        }
        if is_subsequence(&query, &name) || is_subsequence(&query, &symbol) {
            return Some(MatchRule::Subsequence);
        }
        None
    }
}

fn word_overlap(query: &str, name: &str) -> bool {
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let name_words: Vec<&str> = name.split_whitespace().collect();
    if query_words.is_empty() {
        return false;
    }

    let matched = query_words
        .iter()
        .filter(|qw| {
            name_words
                .iter()
                .any(|nw| nw.contains(**qw) || qw.contains(*nw))
        })
        .count();

    matched >= query_words.len().div_ceil(2)
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle.chars().all(|c| remaining.any(|h| h == c))
}
