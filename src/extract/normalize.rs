// src/extract/normalize.rs

//! Whitespace collapsing and stop-word removal.

/// Normalize raw page text.
///
/// Collapses every whitespace run to a single space, trims both ends, then
/// removes each stop-word in order, each pass working on the previous result.
pub fn normalize(raw: &str, stop_words: &[String]) -> String {
    let mut text = collapse_whitespace(raw);

    for word in stop_words {
        if word.is_empty() {
            continue;
        }
        text = text.replace(word.as_str(), "");
    }

    text
}

/// Split on whitespace (newlines and tabs included) and rejoin with one space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
