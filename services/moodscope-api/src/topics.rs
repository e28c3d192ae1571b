//! Keyword topic tagging
//!
//! First keyword hit per topic tags the post; posts that match nothing get
//! the `general` tag so downstream grouping never sees an empty set.

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "depression",
        &["depression", "depressed", "sad", "hopeless", "empty"],
    ),
    (
        "anxiety",
        &["anxiety", "anxious", "panic", "worry", "fear"],
    ),
    (
        "therapy",
        &["therapy", "counseling", "treatment", "medication", "help"],
    ),
    (
        "support",
        &["support", "community", "friend", "family", "talk"],
    ),
];

/// Tag text with every topic whose keyword list it matches.
pub fn detect(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut topics: Vec<String> = Vec::new();
    for (topic, keywords) in TOPIC_KEYWORDS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            topics.push((*topic).to_string());
        }
    }
    if topics.is_empty() {
        topics.push("general".to_string());
    }
    topics
}
