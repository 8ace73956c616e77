//! Token-set fuzzy similarity.
//!
//! Utterances are free-form while trigger phrases are short fragments, so the
//! score compares the shared tokens against each side's full token set and
//! keeps the best of the three ratios. A phrase whose tokens all appear in the
//! utterance scores 100 no matter how many extra words surround it.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not a letter or digit separates tokens.
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid separator regex"));

/// Lowercased, deduplicated, sorted tokens of `text`.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    SEPARATORS
        .split(&lowered)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Similarity of two strings on a 0–100 scale.
///
/// Case-insensitive, independent of word order, symmetric, and
/// `score(x, x) == 100`.
pub fn score(a: &str, b: &str) -> u8 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    match (tokens_a.is_empty(), tokens_b.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        (false, false) => {}
    }

    let shared: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

    let sect = shared.join(" ");
    let combined_a = join_tokens(&shared, &only_a);
    let combined_b = join_tokens(&shared, &only_b);

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn join_tokens(head: &[&str], tail: &[&str]) -> String {
    head.iter().chain(tail).copied().collect::<Vec<_>>().join(" ")
}

/// Normalized Levenshtein similarity scaled to 0–100.
fn ratio(a: &str, b: &str) -> u8 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 100,
        (true, false) | (false, true) => 0,
        (false, false) => (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8,
    }
}
