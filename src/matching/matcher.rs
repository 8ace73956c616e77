//! Intent matching over a response table.

use super::scorer::score;
use super::table::ResponseTable;

/// Outcome of matching an utterance against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub response: Option<String>,
    pub score: u8,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            response: None,
            score: 0,
        }
    }

    /// The response, if the score is strictly above `threshold`.
    pub fn above(&self, threshold: u8) -> Option<&str> {
        match self.response {
            Some(ref response) if self.score > threshold => Some(response.as_str()),
            _ => None,
        }
    }
}

/// Best-scoring response for `query`.
///
/// Pairs are scored in table order and only a strictly higher score replaces
/// the current best, so on ties the first response seen wins.
pub fn best_match(query: &str, table: &ResponseTable) -> MatchResult {
    let mut best = MatchResult::none();
    for (response, phrase) in table.pairs() {
        let s = score(query, phrase);
        if s > best.score {
            best = MatchResult {
                response: Some(response.to_string()),
                score: s,
            };
        }
    }
    best
}

/// Response of the first phrase, in table order, scoring strictly above
/// `threshold`.
pub fn first_above<'t>(query: &str, table: &'t ResponseTable, threshold: u8) -> Option<&'t str> {
    table
        .pairs()
        .find(|(_, phrase)| score(query, phrase) > threshold)
        .map(|(response, _)| response)
}
