//! Text normalization: raw ticket text → stemmed token stream.
//!
//! Per ticket:
//!
//! ```text
//! lowercase → strip non-alphanumerics → split on whitespace
//!   → length / numeric filter → stop-word filter → Snowball stem
//! ```
//!
//! Stemming (Porter2 via `rust-stemmers`) rather than dictionary
//! lemmatization: it needs no external word lists and maps a given surface
//! form to the same stem in every run.
//!
//! Each kept token remembers the surface word it came from, so later stages
//! can show "invoice" instead of the stem "invoic".

mod stopwords;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

// Letters and digits in any script, so accented words stay whole.
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("NON_ALNUM: invalid pattern"));

/// Language whose stop words and stemmer are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English stop words (standard + support-ticket filler), Porter2 stemmer.
    #[default]
    English,
}

impl Language {
    fn stemmer(self) -> Stemmer {
        match self {
            Language::English => Stemmer::create(Algorithm::English),
        }
    }

    fn is_stop_word(self, token: &str) -> bool {
        match self {
            Language::English => stopwords::is_english_stop_word(token),
        }
    }
}

/// Options for [`TextNormalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Stop-word list and stemmer.
    pub language: Language,
    /// Tokens with fewer characters are dropped.
    pub min_token_len: usize,
    /// Drop tokens made only of digits (ticket numbers, amounts).
    pub drop_numeric: bool,
    /// Additional stop words, matched case-insensitively before stemming.
    pub extra_stop_words: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            min_token_len: 3,
            drop_numeric: true,
            extra_stop_words: Vec::new(),
        }
    }
}

/// Token stream for one ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    tokens: Vec<String>,
    surface: Vec<String>,
}

impl NormalizedDocument {
    /// Stemmed tokens, in text order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Surface word each token was stemmed from (parallel to [`tokens`](Self::tokens)).
    pub fn surface_words(&self) -> &[String] {
        &self.surface
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when normalization left nothing (empty or all stop words).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for NormalizedDocument {
    /// Build a document from already-normalized tokens; surface = token.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let tokens: Vec<String> = iter.into_iter().map(Into::into).collect();
        let surface = tokens.clone();
        Self { tokens, surface }
    }
}

/// Cleans raw ticket text into a [`NormalizedDocument`].
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    language: Language,
    min_token_len: usize,
    drop_numeric: bool,
    extra_stop_words: HashSet<String>,
}

impl TextNormalizer {
    /// Create a normalizer from options.
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            language: config.language,
            min_token_len: config.min_token_len,
            drop_numeric: config.drop_numeric,
            extra_stop_words: config
                .extra_stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Normalize one text. Never fails; empty input gives an empty document.
    pub fn normalize(&self, text: &str) -> NormalizedDocument {
        let lowered = text.to_lowercase();
        let cleaned = NON_ALNUM.replace_all(&lowered, " ");
        let stemmer = self.language.stemmer();

        let mut doc = NormalizedDocument::default();
        for word in cleaned.split_whitespace() {
            if word.chars().count() < self.min_token_len {
                continue;
            }
            if self.drop_numeric && word.chars().all(char::is_numeric) {
                continue;
            }
            if self.language.is_stop_word(word) || self.extra_stop_words.contains(word) {
                continue;
            }
            let stem = stemmer.stem(word);
            if stem.is_empty() {
                continue;
            }
            doc.tokens.push(stem.into_owned());
            doc.surface.push(word.to_string());
        }
        doc
    }

    /// Normalize every text of a corpus, preserving order.
    pub fn normalize_all<'a, I>(&self, texts: I) -> Vec<NormalizedDocument>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts.into_iter().map(|t| self.normalize(t)).collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

/// Most frequent surface word for every stem in the corpus.
///
/// Count ties resolve to the alphabetically smallest word.
pub fn surface_forms(documents: &[NormalizedDocument]) -> HashMap<String, String> {
    let mut counts: HashMap<&str, BTreeMap<&str, usize>> = HashMap::new();
    for doc in documents {
        for (stem, word) in doc.tokens.iter().zip(doc.surface.iter()) {
            *counts
                .entry(stem.as_str())
                .or_default()
                .entry(word.as_str())
                .or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(stem, words)| {
            let mut best = stem;
            let mut best_count = 0;
            // BTreeMap iterates alphabetically; strict > keeps the first on ties.
            for (word, count) in words {
                if count > best_count {
                    best = word;
                    best_count = count;
                }
            }
            (stem.to_string(), best.to_string())
        })
        .collect()
}
