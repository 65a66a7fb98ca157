//! Word-frequency keyword ranking — the local fallback when the hosted extractor
//! is unavailable, and an optional companion view when it is.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::keywords::stopwords::StopwordSet;

/// Tokens of this many characters or fewer are discarded.
const MIN_TERM_CHARS: usize = 2;

/// A normalized term and the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedKeyword {
    pub term: String,
    pub count: u32,
}

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("static pattern compiles"))
}

/// Lowercases `text` and replaces every non-word, non-whitespace character with a space.
pub fn normalize(text: &str) -> String {
    punctuation()
        .replace_all(&text.to_lowercase(), " ")
        .into_owned()
}

/// Ranks the terms of `text` by frequency.
///
/// Algorithm:
/// 1. normalize (lowercase, punctuation → space) and split on whitespace
/// 2. drop stopwords and tokens of ≤ 2 characters
/// 3. count, then sort by count descending; equal counts keep first-seen order
/// 4. keep the first `top_n`
pub fn rank(text: &str, stopwords: &StopwordSet, top_n: usize) -> Vec<RankedKeyword> {
    let normalized = normalize(text);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<RankedKeyword> = Vec::new();

    for token in normalized.split_whitespace() {
        if token.chars().count() <= MIN_TERM_CHARS || stopwords.contains(token) {
            continue;
        }
        match index.get(token) {
            Some(&slot) => ranked[slot].count += 1,
            None => {
                index.insert(token, ranked.len());
                ranked.push(RankedKeyword {
                    term: token.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so ties stay in first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_n);
    ranked
}

/// A ranker bound to a stopword set and a default result size.
#[derive(Debug, Clone)]
pub struct KeywordRanker {
    stopwords: StopwordSet,
    default_top_n: usize,
}

impl KeywordRanker {
    pub fn new(stopwords: StopwordSet, default_top_n: usize) -> Self {
        Self {
            stopwords,
            default_top_n,
        }
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    pub fn rank(&self, text: &str, top_n: Option<usize>) -> Vec<RankedKeyword> {
        rank(text, &self.stopwords, top_n.unwrap_or(self.default_top_n))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const VOCABULARY: &[&str] = &[
        "Rust", "rust", "KAFKA", "kafka,", "the", "and", "don't", "go", "SQL", "café", "node.js",
        "(postgres)", "ci/cd", "Kubernetes!", "snake_case", "42", "x",
    ];

    fn first_seen(normalized: &str, term: &str) -> Option<usize> {
        normalized.split_whitespace().position(|t| t == term)
    }

    fn check_ranking(text: &str, top_n: usize) -> Result<(), TestCaseError> {
        let stopwords = StopwordSet::english();
        let ranked = rank(text, &stopwords, top_n);
        let normalized = normalize(text);

        prop_assert!(ranked.len() <= top_n);
        for entry in &ranked {
            prop_assert!(entry.term.chars().count() > MIN_TERM_CHARS);
            prop_assert!(!punctuation().is_match(&entry.term), "punctuation in {:?}", entry.term);
            prop_assert!(!entry.term.chars().any(char::is_whitespace));
            prop_assert_eq!(&entry.term, &entry.term.to_lowercase());
            prop_assert!(!stopwords.contains(&entry.term));

            let occurrences = normalized
                .split_whitespace()
                .filter(|t| *t == entry.term)
                .count();
            prop_assert_eq!(entry.count as usize, occurrences);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
            if pair[0].count == pair[1].count {
                prop_assert!(
                    first_seen(&normalized, &pair[0].term) < first_seen(&normalized, &pair[1].term),
                    "tie {:?} / {:?} out of first-seen order",
                    pair[0].term,
                    pair[1].term
                );
            }
        }
        prop_assert_eq!(&ranked, &rank(text, &stopwords, top_n));
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_invariants_hold_for_arbitrary_text(text in "\\PC{0,200}", top_n in 0usize..50) {
            check_ranking(&text, top_n)?;
        }

        #[test]
        fn prop_invariants_hold_for_repetitive_text(
            words in prop::collection::vec(prop::sample::select(VOCABULARY), 0..80),
            top_n in 0usize..50,
        ) {
            check_ranking(&words.join(" "), top_n)?;
        }
    }
}
