//! Lexicon sentiment scoring
//!
//! Counts positive and negative vocabulary in the normalized text and
//! labels whichever side wins, with the winning share as the score. No
//! matches (or a tie) is neutral at 0.5.

use serde::Serialize;

const POSITIVE_WORDS: &[&str] = &[
    "better", "calm", "glad", "good", "grateful", "happy", "heal", "healing", "helped",
    "helps", "hope", "hopeful", "improving", "love", "peace", "progress", "proud",
    "recovering", "relief", "stronger", "support", "thankful", "win",
];

const NEGATIVE_WORDS: &[&str] = &[
    "afraid", "alone", "anxious", "awful", "bad", "broken", "cry", "dark", "depressed",
    "despair", "empty", "exhausted", "fear", "heavy", "hopeless", "hurt", "lonely", "lost",
    "numb", "pain", "panic", "sad", "scared", "tired", "worse", "worthless",
];

/// A sentiment verdict for one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f64,
}

/// Score normalized text. Callers should run `text::normalize` first so
/// casing and stopwords don't skew the counts.
pub fn analyze(text: &str) -> Sentiment {
    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in text.split_whitespace() {
        if POSITIVE_WORDS.contains(&token) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&token) {
            negative += 1;
        }
    }

    let total = positive + negative;
    if total == 0 || positive == negative {
        return Sentiment {
            label: "neutral".into(),
            score: 0.5,
        };
    }

    if positive > negative {
        Sentiment {
            label: "positive".into(),
            score: positive as f64 / total as f64,
        }
    } else {
        Sentiment {
            label: "negative".into(),
            score: negative as f64 / total as f64,
        }
    }
}
