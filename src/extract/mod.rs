// src/extract/mod.rs

//! Character extraction pipeline.
//!
//! Raw page text flows through three stages:
//!
//! 1. [`normalize`]: collapse whitespace, strip stop-words
//! 2. [`filter_script`]: keep only kanji, hiragana, katakana and `ー`
//! 3. [`CharacterInventory::observe`]: fold the survivors into the shared set
//!
//! [`Extractor`] owns the stop-word list and the inventory for one run.

mod inventory;
mod normalize;
mod script;

pub use inventory::CharacterInventory;
pub use normalize::normalize;
pub use script::{JAPANESE_RANGES, filter_script, is_japanese};

/// Per-run extraction context.
#[derive(Debug, Default)]
pub struct Extractor {
    stop_words: Vec<String>,
    inventory: CharacterInventory,
}

impl Extractor {
    /// Create an extractor with a fixed stop-word list.
    pub fn new(stop_words: Vec<String>) -> Self {
        Self {
            stop_words,
            inventory: CharacterInventory::new(),
        }
    }

    /// Run one page's text through the pipeline, returning the filtered text.
    pub fn process(&self, raw: &str) -> String {
        let normalized = normalize(raw, &self.stop_words);
        let filtered = filter_script(&normalized);
        self.inventory.observe(&filtered);
        filtered
    }

    pub fn inventory(&self) -> &CharacterInventory {
        &self.inventory
    }
}
