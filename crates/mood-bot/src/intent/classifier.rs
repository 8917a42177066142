//! Keyword intent classifier.
//!
//! Substring tests run in a fixed order and the first hit wins, so a message
//! mentioning both a theatre and a museum is classified as theatre.

use crate::types::Intent;

/// Ordered keyword table. Keys are lower-case stems.
const KEYWORDS: &[(&str, Intent)] = &[
    ("ресторан", Intent::Restaurant),
    ("кино", Intent::Cinema),
    ("театр", Intent::Theatre),
    ("музей", Intent::Museum),
    ("скучно", Intent::Bored),
];

/// Classify a raw chat message.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Unknown)
}
