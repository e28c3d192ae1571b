//! Text cleaning and normalization
//!
//! Runs between collection and scoring: `clean` strips the artifacts that
//! confuse keyword matching (URLs, @-mentions, the `#` of hashtags),
//! `normalize` lowercases and drops stopwords for the lexicon passes.

use std::sync::OnceLock;

use regex::Regex;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "am", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "do", "for", "from", "had", "has", "have", "he", "her", "him", "his",
    "i", "if", "in", "is", "it", "its", "just", "me", "my", "no", "not", "of", "on", "or",
    "our", "she", "so", "that", "the", "their", "them", "they", "this", "to", "was", "we",
    "were", "what", "when", "which", "who", "will", "with", "you", "your",
];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("valid regex"))
}

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+").expect("valid regex"))
}

fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Strip URLs and mentions, unwrap hashtags, collapse whitespace.
pub fn clean(text: &str) -> String {
    let text = url_re().replace_all(text, "");
    let text = mention_re().replace_all(&text, "");
    let text = hashtag_re().replace_all(&text, "$1");
    whitespace_re().replace_all(&text, " ").trim().to_string()
}

/// Lowercase, keep word characters only, drop stopwords.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|token| !token.is_empty() && !STOPWORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}
