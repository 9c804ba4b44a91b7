use std::collections::HashSet;

use bson::oid::ObjectId;

use crate::db::models::{Perk, Post};
use crate::search::fuzzy::FuzzyMatcher;

/// Maximum normalized distance for a word to count as a match.
///
/// Tuned by hand: words up to five characters must match exactly, longer
/// words tolerate roughly one typo per six characters.
pub const MATCH_THRESHOLD: f64 = 0.17;

fn matcher() -> FuzzyMatcher {
    FuzzyMatcher::new(MATCH_THRESHOLD)
}

fn query_words(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Hex ids of every perk whose name approximately matches any query word.
pub fn match_perk_ids(query: &str, perks: &[Perk]) -> HashSet<String> {
    let matcher = matcher();

    query_words(query)
        .into_iter()
        .flat_map(|word| matcher.search(word, perks))
        .map(|perk| perk.id.to_hex())
        .collect()
}

/// Find posts matching a free-text query.
///
/// Posts tagged with a matching perk come first, in `posts` order, followed
/// by posts whose name or description matches a query word, in match order.
/// Each post appears at most once.
pub fn search_posts<'a>(query: &str, posts: &'a [Post], perks: &[Perk]) -> Vec<&'a Post> {
    let words = query_words(query);
    if words.is_empty() {
        return vec![];
    }

    let perk_ids = match_perk_ids(query, perks);
    let matcher = matcher();

    let by_perk = posts
        .iter()
        .filter(|post| post.perks.iter().any(|id| perk_ids.contains(id)));
    let by_text = words
        .iter()
        .flat_map(|word| matcher.search(word, posts));

    let mut seen: HashSet<ObjectId> = HashSet::new();
    let results: Vec<&'a Post> = by_perk
        .chain(by_text)
        .filter(|post| seen.insert(post.id))
        .collect();

    tracing::debug!(
        query,
        matched_perks = perk_ids.len(),
        results = results.len(),
        "searched posts"
    );

    results
}
