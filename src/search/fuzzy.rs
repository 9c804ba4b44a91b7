//! Approximate string matching on a normalized 0..=1 distance scale.
//!
//! A score of `0.0` is an exact (or substring) match and `1.0` shares
//! nothing. Items are kept when their best key scores at or below the
//! matcher's threshold.

use strsim::normalized_levenshtein;

/// Items that expose one or more text fields to fuzzy matching.
pub trait FuzzyKeys {
    fn fuzzy_keys(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Distance between a single pattern word and a text field.
    ///
    /// Case-insensitive. Takes the best of substring containment, the whole
    /// text, each whitespace token, and each token cut to the pattern length
    /// so that partial words still match.
    pub fn score(&self, pattern: &str, text: &str) -> f64 {
        let pattern = pattern.trim().to_lowercase();
        let text = text.to_lowercase();

        if pattern.is_empty() || text.trim().is_empty() {
            return 1.0;
        }
        if text.contains(&pattern) {
            return 0.0;
        }

        let pattern_len = pattern.chars().count();
        let mut best = distance(&pattern, &text);

        for token in text.split_whitespace() {
            best = best.min(distance(&pattern, token));
            if token.chars().count() > pattern_len {
                let prefix: String = token.chars().take(pattern_len).collect();
                best = best.min(distance(&pattern, &prefix));
            }
        }

        best
    }

    /// Best score of `pattern` across all keys of `item`.
    pub fn best_score<T: FuzzyKeys>(&self, pattern: &str, item: &T) -> f64 {
        item.fuzzy_keys()
            .into_iter()
            .map(|key| self.score(pattern, key))
            .fold(1.0, f64::min)
    }

    /// Items within the threshold, ranked best first.
    ///
    /// Ties keep their input order.
    pub fn search<'a, T: FuzzyKeys>(&self, pattern: &str, items: &'a [T]) -> Vec<&'a T> {
        let mut scored: Vec<(f64, &'a T)> = items
            .iter()
            .map(|item| (self.best_score(pattern, item), item))
            .filter(|(score, _)| *score <= self.threshold)
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, item)| item).collect()
    }
}

fn distance(a: &str, b: &str) -> f64 {
    1.0 - normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static str);

    impl FuzzyKeys for Named {
        fn fuzzy_keys(&self) -> Vec<&str> {
            vec![self.0, self.1]
        }
    }

    fn matcher() -> FuzzyMatcher {
        FuzzyMatcher::new(0.17)
    }

    #[test]
    fn test_exact_and_substring_score_zero() {
        assert_eq!(matcher().score("dead", "Dead Hard"), 0.0);
        assert_eq!(matcher().score("HARD", "dead hard"), 0.0);
        assert_eq!(matcher().score("sprin", "Sprint Burst"), 0.0);
    }

    #[test]
    fn test_single_typo_in_long_word_matches() {
        // one edit over ten characters
        let score = matcher().score("adrenalin", "Adrenaline");
        assert!(score <= 0.17, "score was {score}");
        let score = matcher().score("borowed", "Borrowed Time");
        assert!(score <= 0.17, "score was {score}");
    }

    #[test]
    fn test_short_words_need_exact_match() {
        assert!(matcher().score("dad", "Dead Hard") > 0.17);
    }

    #[test]
    fn test_unrelated_text_scores_high() {
        assert!(matcher().score("dead", "unrelated") > 0.17);
        assert_eq!(matcher().score("dead", ""), 1.0);
        assert_eq!(matcher().score("   ", "dead"), 1.0);
    }

    #[test]
    fn test_best_score_uses_every_key() {
        let item = Named("Loadout", "uses dead hard and sprint");
        assert_eq!(matcher().best_score("sprint", &item), 0.0);
    }

    #[test]
    fn test_search_filters_and_ranks() {
        let items = [
            Named("Ballistic", ""),
            Named("Balanced Landing", ""),
            Named("Balanced Landin", ""),
        ];
        let found = matcher().search("balanced", &items);
        let names: Vec<&str> = found.iter().map(|n| n.0).collect();
        assert_eq!(names, vec!["Balanced Landing", "Balanced Landin"]);
    }

    #[test]
    fn test_search_ranks_closer_matches_first() {
        let items = [Named("Decisiv Strike", ""), Named("Decisive Strike", "")];
        let found = matcher().search("decisive", &items);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "Decisive Strike");
    }
}
