// src/extract/inventory.rs

//! Shared set of observed characters.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Deduplicating accumulator of characters seen across pages.
///
/// `observe` takes `&self` so the inventory can be shared between
/// concurrent page tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct CharacterInventory {
    chars: Mutex<HashSet<char>>,
}

impl CharacterInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every non-whitespace code point of `text`.
    pub fn observe(&self, text: &str) {
        let mut chars = self.lock();
        chars.extend(text.chars().filter(|c| !c.is_whitespace()));
    }

    /// All characters sorted by ascending code point.
    pub fn export(&self) -> Vec<char> {
        let mut sorted: Vec<char> = self.lock().iter().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    /// Number of unique characters observed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries inserted before a panicking observer stopped are still valid.
    fn lock(&self) -> MutexGuard<'_, HashSet<char>> {
        self.chars.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
