//! Symbol catalog
//!
//! Read-only after construction. Hands out fresh instances by emoji and
//! builds the rarity-weighted bag the shop draws its offers from.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::consts::RARE_THRESHOLD;
use crate::error::CatalogError;
use crate::symbol::{Category, Symbol, SymbolRef, roster};

/// Lookup service for every known symbol kind
#[derive(Debug, Default)]
pub struct Catalog {
    /// Prototypes in registration order (shop sweeps follow this order)
    prototypes: Vec<Symbol>,
    by_emoji: HashMap<&'static str, usize>,
    /// Category -> emojis in that category
    categories: BTreeMap<Category, Vec<&'static str>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in roster
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for symbol in roster::all() {
            catalog.register(symbol);
        }
        catalog
    }

    /// Add a symbol kind. A later registration replaces an earlier one
    /// with the same emoji.
    pub fn register(&mut self, prototype: Symbol) {
        let emoji = prototype.emoji();
        if let Some(&index) = self.by_emoji.get(emoji) {
            log::debug!("Replacing catalog entry {emoji}");
            for list in self.categories.values_mut() {
                list.retain(|e| *e != emoji);
            }
            self.prototypes[index] = prototype;
        } else {
            self.by_emoji.insert(emoji, self.prototypes.len());
            self.prototypes.push(prototype);
        }
        for category in self.prototypes[self.by_emoji[emoji]].categories() {
            self.categories.entry(*category).or_default().push(emoji);
        }
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn contains(&self, emoji: &str) -> bool {
        self.by_emoji.contains_key(emoji)
    }

    /// Fresh instance of the symbol with this emoji
    pub fn symbol(&self, emoji: &str) -> Result<SymbolRef, CatalogError> {
        self.by_emoji
            .get(emoji)
            .map(|&index| SymbolRef::new(self.prototypes[index].copy()))
            .ok_or_else(|| CatalogError::NotFound(emoji.to_string()))
    }

    /// Emojis tagged with a category
    pub fn emojis_in(&self, category: Category) -> &[&'static str] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category membership through the precomputed index
    pub fn in_category(&self, emoji: &str, category: Category) -> bool {
        self.emojis_in(category).contains(&emoji)
    }

    /// Build a bag of offers.
    ///
    /// Sweeps every symbol outside `banned`, keeping each one when a draw
    /// falls under `rarity + luck / 100`, until the bag holds more than
    /// `min_count` symbols. `rare_only` does a single sweep that keeps
    /// every symbol rarer than [`RARE_THRESHOLD`] instead.
    pub fn generate_shop(
        &self,
        rng: &mut impl Rng,
        min_count: usize,
        luck: i64,
        rare_only: bool,
        banned: &[Category],
    ) -> Vec<SymbolRef> {
        let eligible: Vec<&Symbol> = self
            .prototypes
            .iter()
            .filter(|s| !s.categories().iter().any(|c| banned.contains(c)))
            .collect();

        if rare_only {
            return eligible
                .iter()
                .filter(|s| s.rarity() < RARE_THRESHOLD)
                .map(|s| SymbolRef::new(s.copy()))
                .collect();
        }

        let bonus = luck as f64 / 100.0;
        if eligible.iter().all(|s| s.rarity() + bonus <= 0.0) {
            log::warn!("No symbol can ever be drawn for the shop");
            return Vec::new();
        }

        let mut bag = Vec::new();
        while bag.len() <= min_count {
            for symbol in &eligible {
                if rng.random::<f64>() < symbol.rarity() + bonus {
                    bag.push(SymbolRef::new(symbol.copy()));
                }
            }
        }
        bag
    }

    /// Parse a run of emoji glyphs into fresh instances. Whitespace is
    /// ignored; unknown glyphs are logged and skipped.
    pub fn symbols_from_string(&self, text: &str) -> Vec<SymbolRef> {
        let mut out = Vec::new();
        let mut rest = text.trim_start();
        while !rest.is_empty() {
            // Longest known emoji at the front wins (some carry selectors)
            let matched = self
                .by_emoji
                .keys()
                .filter(|emoji| rest.starts_with(**emoji))
                .max_by_key(|emoji| emoji.len());
            match matched {
                Some(emoji) => {
                    if let Ok(symbol) = self.symbol(emoji) {
                        out.push(symbol);
                    }
                    rest = &rest[emoji.len()..];
                }
                None => {
                    let mut chars = rest.chars();
                    if let Some(unknown) = chars.next() {
                        log::warn!("Unknown symbol {unknown:?} in {text:?}");
                    }
                    rest = chars.as_str();
                }
            }
            rest = rest.trim_start();
        }
        out
    }
}
