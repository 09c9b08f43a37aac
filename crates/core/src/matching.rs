//! Keyword-overlap scoring for course and job recommendations.

use std::collections::BTreeSet;

/// Words shorter than this are ignored when tokenizing.
const MIN_TOKEN_LEN: usize = 3;

/// Lower-cased alphanumeric words of `text`, de-duplicated.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Tokenize every string in `parts` into one set.
pub fn tokenize_all<'a>(parts: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    parts.into_iter().flat_map(tokenize).collect()
}

/// Percentage overlap between two keyword sets, 0 to 100.
///
/// The overlap is measured against the smaller set so that a short
/// interest list fully covered by a long description scores 100. Empty
/// input on either side scores 0.
pub fn match_score(profile: &BTreeSet<String>, target: &BTreeSet<String>) -> u8 {
    let smaller = profile.len().min(target.len());
    if smaller == 0 {
        return 0;
    }
    let shared = profile.intersection(target).count();
    ((shared * 100) / smaller) as u8
}

/// Keep the `limit` highest scoring items, best first.
///
/// Ties keep their input order.
pub fn rank_top<T>(mut scored: Vec<(u8, T)>, limit: usize) -> Vec<(u8, T)> {
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);
    scored
}
