// src/extract/script.rs

//! Japanese script filtering.
//!
//! Accepted characters are described by a table of inclusive code-point
//! ranges rather than a regex character class.

use std::ops::RangeInclusive;

/// Inclusive code-point ranges counted as Japanese script.
pub const JAPANESE_RANGES: &[RangeInclusive<char>] = &[
    // Kanji: 一 .. 龯
    '\u{4E00}'..='\u{9FAF}',
    // Hiragana: ぁ .. ん
    '\u{3041}'..='\u{3093}',
    // Katakana: ァ .. ン
    '\u{30A1}'..='\u{30F3}',
    // Prolonged sound mark: ー
    '\u{30FC}'..='\u{30FC}',
];

/// Whether `c` falls in one of [`JAPANESE_RANGES`].
pub fn is_japanese(c: char) -> bool {
    JAPANESE_RANGES.iter().any(|range| range.contains(&c))
}

/// Keep only maximal runs of Japanese characters, joined by a single space.
pub fn filter_script(text: &str) -> String {
    let mut runs: Vec<&str> = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        match (is_japanese(c), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                runs.push(&text[s..idx]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(&text[s..]);
    }

    runs.join(" ")
}
