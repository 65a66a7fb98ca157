//! Stopword sets for frequency ranking.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Fragments left behind when normalization splits a contraction on its
/// apostrophe ("don't" becomes "don" and "t").
const CONTRACTION_STEMS: &[&str] = &[
    "aren", "couldn", "didn", "doesn", "don", "hadn", "hasn", "haven", "isn", "ll", "mightn",
    "mustn", "needn", "shan", "shouldn", "ve", "wasn", "weren", "won", "wouldn",
];

/// A lowercase stopword set. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// The `stop-words` English list plus contraction stems.
    pub fn english() -> Self {
        let mut set = Self::from_list(&get(LANGUAGE::English));
        set.extend(CONTRACTION_STEMS);
        set
    }

    /// A set that filters nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_list<S: AsRef<str>>(words: &[S]) -> Self {
        let mut set = Self::empty();
        set.extend(words);
        set
    }

    /// Adds words to the set, lowercasing and trimming each. Blanks are ignored.
    pub fn extend<S: AsRef<str>>(&mut self, words: &[S]) {
        self.words.extend(
            words
                .iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
    }

    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        // Ranker tokens are already lowercase; only fold for other callers.
        word.chars().any(char::is_uppercase) && self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_contains_function_words() {
        let set = StopwordSet::english();
        for word in ["the", "and", "with", "your", "will"] {
            assert!(set.contains(word), "missing {word}");
        }
        assert!(!set.contains("python"));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let set = StopwordSet::from_list(&["The"]);
        assert!(set.contains("the"));
        assert!(set.contains("THE"));
    }

    #[test]
    fn test_extend_ignores_blanks() {
        let mut set = StopwordSet::empty();
        set.extend(&["  ", "Remote ", ""]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("remote"));
    }

    #[test]
    fn test_empty_filters_nothing() {
        let set = StopwordSet::empty();
        assert_eq!(set.len(), 0);
        assert!(!set.contains("the"));
    }

    #[test]
    fn test_english_covers_contraction_stems() {
        let set = StopwordSet::english();
        for word in ["don", "doesn", "isn", "haven", "won", "ll", "ve"] {
            assert!(set.contains(word), "missing {word}");
        }
    }

    #[test]
    fn test_extend_adds_to_english() {
        let mut set = StopwordSet::english();
        assert!(!set.contains("hybrid"));
        set.extend(&["Hybrid"]);
        assert!(set.contains("hybrid"));
    }
}
