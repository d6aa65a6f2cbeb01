//! Turning raw text into n-gram profiles, and balancing labelled datasets.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::profile::Profile;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Whether n-grams are built from characters or from words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgramKind {
    /// Tokens are concatenated directly.
    Char,
    /// Tokens are joined with a single space.
    Word,
}

impl NgramKind {
    fn separator(self) -> &'static str {
        match self {
            NgramKind::Char => "",
            NgramKind::Word => " ",
        }
    }
}

/// Lowercased runs of word characters.
pub fn word_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Every character of `text` as its own token.
pub fn char_tokens(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

/// All contiguous windows of `n` tokens, in order.
pub fn collect_ngrams<S: AsRef<str>>(tokens: &[S], n: usize, kind: NgramKind) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    tokens
        .windows(n)
        .map(|window| {
            window
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(kind.separator())
        })
        .collect()
}

/// Profile of the `top` most frequent n-grams of `tokens`.
pub fn freq_ngrams<S: AsRef<str>>(tokens: &[S], n: usize, top: usize, kind: NgramKind) -> Profile<u64> {
    Profile::<u64>::from_tokens(collect_ngrams(tokens, n, kind)).truncate(top)
}

/// Indices of the first `limit` documents of each class, in input order.
pub fn limit_per_class<L: Ord>(labels: &[L], limit: usize) -> Vec<usize> {
    let mut seen: BTreeMap<&L, usize> = BTreeMap::new();
    labels
        .iter()
        .enumerate()
        .filter_map(|(idx, label)| {
            let count = seen.entry(label).or_insert(0);
            if *count >= limit {
                return None;
            }
            *count += 1;
            Some(idx)
        })
        .collect()
}

/// Classes with at least `min` documents, ascending.
pub fn classes_with_at_least<L: Ord + Clone>(labels: &[L], min: usize) -> Vec<L> {
    let mut counts: BTreeMap<&L, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count >= min)
        .map(|(label, _)| label.clone())
        .collect()
}
