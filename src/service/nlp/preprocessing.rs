use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::lemmatizer::lemmatize;
use super::stopwords::is_stop_word;
use crate::models::{BigramPair, FrequencyPair, PreprocessedText};

pub const DEFAULT_TOP_FREQUENCIES: usize = 25;
pub const DEFAULT_TOP_BIGRAMS: usize = 20;

/// Inputs are cut to this many whitespace tokens before inference.
pub const MAX_MODEL_TOKENS: usize = 512;

/// URLs, e-mail addresses and HTML tags are single non-word tokens, so they
/// are blanked out before segmentation instead of leaking their parts.
static NON_WORD_SPANS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<[^>]+>|https?://\S+|www\.\S+|\S+@\S+\.\w+")
        .expect("hardcoded regex is valid")
});

const CLITICS: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Tokenise `text`, drop stopwords, punctuation and non-alphabetic tokens, and
/// lemmatise what is left. Returns the space-joined clean text and its tokens.
pub fn clean_and_lemmatize(text: &str) -> (String, Vec<String>) {
    if text.trim().is_empty() {
        return (String::new(), Vec::new());
    }

    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().all(char::is_alphabetic))
        .map(|t| t.to_lowercase())
        .filter(|t| !is_stop_word(t))
        .map(|t| lemmatize(&t))
        .filter(|t| !t.is_empty() && !is_stop_word(t))
        .collect();

    (tokens.join(" "), tokens)
}

pub fn preprocess_texts<S: AsRef<str>>(texts: &[S]) -> Vec<PreprocessedText> {
    texts
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let (clean, tokens) = clean_and_lemmatize(raw);
            PreprocessedText {
                raw: raw.to_string(),
                clean,
                tokens,
            }
        })
        .collect()
}

/// Word tokens with English clitics split off (`don't` -> `do`, `n't`).
fn tokenize(text: &str) -> Vec<String> {
    let stripped = NON_WORD_SPANS.replace_all(text, " ");
    let normalized = stripped.replace(['\u{2019}', '\u{2018}'], "'");
    let mut out = Vec::new();

    for word in normalized.split_word_bounds() {
        if word.trim().is_empty() {
            continue;
        }
        let lower = word.to_lowercase();
        match CLITICS
            .iter()
            .find(|c| lower.ends_with(*c) && lower.len() > c.len())
        {
            Some(clitic) => {
                let cut = word.len() - clitic.len();
                out.push(word[..cut].to_string());
                out.push(word[cut..].to_string());
            }
            None => out.push(word.to_string()),
        }
    }
    out
}

/// Merge counts over every list and keep the `top_k` most frequent tokens.
pub fn compute_top_frequencies<S: AsRef<str>>(
    tokens_lists: &[Vec<S>],
    top_k: usize,
) -> Vec<FrequencyPair> {
    top_counts(
        tokens_lists
            .iter()
            .flat_map(|tokens| tokens.iter().map(|t| t.as_ref().to_string())),
        top_k,
    )
}

/// Count adjacent pairs inside each list (never across lists).
pub fn compute_top_bigrams<S: AsRef<str>>(
    tokens_lists: &[Vec<S>],
    top_k: usize,
) -> Vec<BigramPair> {
    top_counts(
        tokens_lists.iter().flat_map(|tokens| {
            let words: Vec<&str> = tokens
                .iter()
                .map(|t| t.as_ref())
                .filter(|t| !t.is_empty())
                .collect();
            words
                .windows(2)
                .map(|pair| format!("{} {}", pair[0], pair[1]))
                .collect::<Vec<_>>()
        }),
        top_k,
    )
}

/// Counts in first-seen order, then a stable sort so ties keep that order.
fn top_counts(items: impl Iterator<Item = String>, top_k: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_k);
    counts
}

/// Keep at most `max_tokens` whitespace-separated tokens.
///
/// The result is a prefix of `text`, so character offsets into it are also
/// offsets into the original.
pub fn truncate_to_max_tokens(text: &str, max_tokens: usize) -> &str {
    let mut seen = 0;
    let mut in_token = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_token = false;
        } else if !in_token {
            if seen == max_tokens {
                return text[..i].trim_end();
            }
            seen += 1;
            in_token = true;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_drops_stopwords_and_punctuation() {
        let (clean, tokens) =
            clean_and_lemmatize("The markets are rallying, and investors don't panic!");
        assert_eq!(tokens, vec!["market", "rally", "investor", "panic"]);
        assert_eq!(clean, "market rally investor panic");
    }

    #[test]
    fn numbers_are_dropped() {
        let (_, tokens) = clean_and_lemmatize("Stocks rose 3.5% in 2024");
        assert_eq!(tokens, vec!["stock", "rise"]);
    }

    #[test]
    fn links_and_markup_are_ignored() {
        let (_, tokens) =
            clean_and_lemmatize("<b>Rates</b> climb, see https://news.example.com/rates or mail desk@example.com");
        assert_eq!(tokens, vec!["rate", "climb", "mail"]);
    }

    #[test]
    fn blank_input() {
        assert_eq!(clean_and_lemmatize("   "), (String::new(), Vec::new()));
    }

    #[test]
    fn clitics_split() {
        assert_eq!(tokenize("Apple's"), vec!["Apple", "'s"]);
        assert_eq!(tokenize("can't"), vec!["ca", "n't"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let lists = vec![vec!["b", "a", "c", "a", "b"]];
        assert_eq!(
            compute_top_frequencies(&lists, 3),
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn bigrams_stay_within_a_list() {
        let lists = vec![vec!["a", "b"], vec!["c", "d"]];
        let pairs = compute_top_bigrams(&lists, 10);
        assert_eq!(
            pairs,
            vec![("a b".to_string(), 1), ("c d".to_string(), 1)]
        );
    }

    #[test]
    fn truncation_counts_whitespace_tokens() {
        assert_eq!(truncate_to_max_tokens("a  b\nc d", 3), "a  b\nc");
        assert_eq!(truncate_to_max_tokens("a b", 10), "a b");
        assert_eq!(truncate_to_max_tokens("  a b", 1), "  a");
        assert_eq!(truncate_to_max_tokens("a b", 0), "");
    }
}
