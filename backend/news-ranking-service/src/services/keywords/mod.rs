//! Keyword extraction shared by profile building and similarity scoring.

use std::collections::HashSet;

/// Tokens this short or shorter are discarded
const MIN_KEYWORD_LEN_EXCLUSIVE: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "has", "have", "had", "this", "that", "with", "from", "they", "been", "were", "said",
    "each", "which", "their", "will", "would", "there", "what", "about", "when", "make", "like",
    "into", "than", "them", "some", "could", "other", "more", "just", "your", "over", "also",
];

/// Stopword- and length-filtered tokenizer
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: HashSet<&'static str>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Keyword set of `text`
    pub fn extract_keywords(&self, text: &str) -> HashSet<String> {
        self.extract_ordered_keywords(text).into_iter().collect()
    }

    /// Same tokens as [`Self::extract_keywords`], de-duplicated in first-seen order
    pub fn extract_ordered_keywords(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        let mut seen = HashSet::new();
        normalized
            .split_whitespace()
            .filter(|token| self.is_keyword(token))
            .filter(|token| seen.insert(*token))
            .map(str::to_string)
            .collect()
    }

    fn is_keyword(&self, token: &str) -> bool {
        token.chars().count() > MIN_KEYWORD_LEN_EXCLUSIVE
            && !self.stop_words.contains(token)
            && !token.chars().all(|c| c.is_numeric())
    }
}
