//! Offline sentiment scorer.
//!
//! A weighted word list for general news vocabulary. Intensifiers scale the
//! next scored word; a negation flips (and damps) scored words inside a short
//! window after it.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{SentimentLabel, SentimentResult};

static WORD_SCORES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let strong_positive = [
        ("breakthrough", 0.85), ("celebrate", 0.8), ("celebrates", 0.8),
        ("excellent", 0.8), ("amazing", 0.8), ("incredible", 0.85), ("fantastic", 0.8),
        ("triumph", 0.85), ("record", 0.6), ("soar", 0.8), ("soars", 0.8),
        ("soaring", 0.8), ("surge", 0.75), ("surges", 0.75), ("rally", 0.75),
        ("rallies", 0.75), ("win", 0.7), ("wins", 0.7), ("won", 0.7), ("winner", 0.75),
        ("victory", 0.8), ("success", 0.7), ("successful", 0.75), ("love", 0.7),
        ("best", 0.7), ("beat", 0.5), ("beats", 0.5), ("boom", 0.7), ("thrive", 0.75),
        ("thriving", 0.75), ("award", 0.65), ("honored", 0.7), ("hero", 0.75),
        ("great", 0.7), ("awesome", 0.75), ("profit", 0.65), ("profits", 0.65),
    ];
    let moderate_positive = [
        ("gain", 0.5), ("gains", 0.5), ("rise", 0.45), ("rises", 0.45), ("rising", 0.45),
        ("grow", 0.45), ("growth", 0.5), ("growing", 0.5), ("improve", 0.5),
        ("improves", 0.5), ("improved", 0.5), ("recovery", 0.5), ("recover", 0.5),
        ("boost", 0.5), ("boosts", 0.5), ("support", 0.35), ("agreement", 0.4),
        ("deal", 0.3), ("launch", 0.35), ("launches", 0.35), ("hope", 0.45),
        ("hopeful", 0.5), ("optimistic", 0.6), ("positive", 0.5), ("good", 0.5),
        ("strong", 0.5), ("stronger", 0.5), ("healthy", 0.5), ("stable", 0.3),
        ("promising", 0.55), ("innovative", 0.5), ("innovation", 0.45), ("peace", 0.6),
        ("safe", 0.45), ("rescue", 0.45), ("approve", 0.35), ("approved", 0.35),
        ("upgrade", 0.4), ("praise", 0.6), ("popular", 0.45), ("fun", 0.5),
        ("happy", 0.6), ("welcome", 0.45), ("opportunity", 0.5), ("benefit", 0.45),
    ];
    let strong_negative = [
        ("crash", -0.9), ("crashes", -0.9), ("collapse", -0.9), ("collapses", -0.9),
        ("disaster", -0.9), ("catastrophe", -0.95), ("killed", -0.9), ("kill", -0.85),
        ("kills", -0.85), ("dead", -0.85), ("death", -0.85), ("deaths", -0.85),
        ("war", -0.8), ("attack", -0.8), ("attacks", -0.8), ("terror", -0.9),
        ("fraud", -0.9), ("scandal", -0.8), ("bankrupt", -0.9), ("bankruptcy", -0.9),
        ("plunge", -0.8), ("plunges", -0.8), ("tumble", -0.7), ("tumbles", -0.7),
        ("crisis", -0.8), ("terrible", -0.8), ("horrible", -0.85), ("awful", -0.8),
        ("worst", -0.85), ("hate", -0.75), ("panic", -0.8), ("lawsuit", -0.6),
        ("arrest", -0.65), ("arrested", -0.65), ("hack", -0.8), ("hacked", -0.85),
        ("injured", -0.75), ("victims", -0.8), ("flood", -0.7), ("wildfire", -0.75),
        ("recession", -0.8), ("layoffs", -0.75), ("violence", -0.85), ("shooting", -0.9),
    ];
    let moderate_negative = [
        ("fall", -0.45), ("falls", -0.45), ("falling", -0.45), ("drop", -0.45),
        ("drops", -0.45), ("decline", -0.5), ("declines", -0.5), ("loss", -0.55),
        ("losses", -0.55), ("lose", -0.55), ("lost", -0.55), ("cut", -0.35),
        ("cuts", -0.35), ("weak", -0.5), ("weaker", -0.5), ("bad", -0.5),
        ("risk", -0.4), ("risks", -0.4), ("fear", -0.6), ("fears", -0.6),
        ("concern", -0.45), ("concerns", -0.45), ("worried", -0.5), ("warning", -0.5),
        ("warns", -0.5), ("threat", -0.6), ("threatens", -0.6), ("delay", -0.35),
        ("delayed", -0.35), ("fine", -0.3), ("fined", -0.5), ("probe", -0.4),
        ("uncertainty", -0.4), ("volatile", -0.3), ("slump", -0.6), ("struggle", -0.5),
        ("struggles", -0.5), ("fail", -0.6), ("fails", -0.6), ("failed", -0.6),
        ("failure", -0.6), ("criticism", -0.5), ("criticized", -0.5), ("protest", -0.4),
        ("strike", -0.4), ("injury", -0.55), ("sad", -0.55), ("angry", -0.6),
        ("problem", -0.45), ("shortage", -0.5), ("inflation", -0.35), ("debt", -0.35),
    ];

    strong_positive
        .into_iter()
        .chain(moderate_positive)
        .chain(strong_negative)
        .chain(moderate_negative)
        .collect()
});

static MODIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.5), ("really", 1.4), ("extremely", 1.8), ("incredibly", 1.7),
        ("hugely", 1.6), ("absolutely", 1.6), ("totally", 1.4), ("completely", 1.5),
        ("highly", 1.4), ("sharply", 1.5), ("deeply", 1.4), ("quite", 1.2),
        ("somewhat", 0.8), ("slightly", 0.7), ("barely", 0.6), ("modestly", 0.7),
        ("possibly", 0.7),
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "neither", "nobody", "nothing", "nowhere", "without",
        "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "cant", "can't",
        "couldnt", "couldn't", "wont", "won't", "wouldnt", "wouldn't", "isnt", "isn't",
        "arent", "aren't", "wasnt", "wasn't", "werent", "weren't", "hasnt", "hasn't",
        "havent", "haven't", "hadnt", "hadn't",
    ]
    .into_iter()
    .collect()
});

/// Below this absolute average a text is neutral.
const NEUTRAL_BAND: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    negation_window: usize,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self { negation_window: 3 }
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    /// Average polarity of the scored words in `text`, in `[-1, 1]`.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut modifier = 1.0;
        let mut since_negation: Option<usize> = None;

        for word in text.unicode_words() {
            let word = word.to_lowercase().replace('\u{2019}', "'");

            if NEGATIONS.contains(word.as_str()) {
                since_negation = Some(0);
                continue;
            }
            if let Some(m) = MODIFIERS.get(word.as_str()) {
                modifier = *m;
                continue;
            }

            if let Some(base) = WORD_SCORES.get(word.as_str()) {
                let mut score = base * modifier;
                if since_negation.is_some_and(|n| n < self.negation_window) {
                    score = -score * 0.8;
                }
                total += score;
                scored += 1;
                modifier = 1.0;
            }

            if let Some(n) = since_negation.as_mut() {
                *n += 1;
                if *n >= self.negation_window {
                    since_negation = None;
                }
            }
        }

        if scored == 0 {
            0.0
        } else {
            (total / scored as f64).clamp(-1.0, 1.0)
        }
    }

    pub fn classify(&self, text: &str) -> SentimentResult {
        let avg = self.polarity(text);
        let magnitude = avg.abs().min(1.0);

        let (label, score) = if magnitude < NEUTRAL_BAND {
            (SentimentLabel::Neutral, 1.0 - magnitude)
        } else if avg > 0.0 {
            (SentimentLabel::Positive, 0.5 + magnitude / 2.0)
        } else {
            (SentimentLabel::Negative, 0.5 + magnitude / 2.0)
        };

        SentimentResult {
            label,
            score: score as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_headlines() {
        let scorer = LexiconScorer::new();
        assert_eq!(
            scorer.classify("Stocks surge to record highs").label,
            SentimentLabel::Positive
        );
        assert_eq!(
            scorer.classify("Markets crash amid recession fears").label,
            SentimentLabel::Negative
        );
        assert_eq!(
            scorer.classify("Council meets on Tuesday").label,
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("The plan is good") > 0.0);
        assert!(scorer.polarity("The plan is not good") < 0.0);
    }

    #[test]
    fn intensifier_scales() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("very good") > scorer.polarity("good"));
    }

    #[test]
    fn neutral_score_is_high_confidence() {
        let result = LexiconScorer::new().classify("");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.score - 1.0).abs() < f32::EPSILON);
    }
}
