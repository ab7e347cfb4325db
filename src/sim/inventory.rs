//! Player inventory: owned symbols and resources

use std::collections::BTreeMap;

use rand::Rng;

use crate::consts::{BOARD_ROWS, LUCK};
use crate::effect::Effect;
use crate::symbol::SymbolRef;
use crate::symbol::roster::EMPTY;

/// Everything the player owns
#[derive(Debug, Clone)]
pub struct Inventory {
    /// Owned symbol instances
    symbols: Vec<SymbolRef>,
    /// Resource amounts (money, turns, luck, research, ...)
    resources: BTreeMap<String, i64>,
    /// Every symbol ever removed, oldest first
    graveyard: Vec<SymbolRef>,
    /// Luck earned this turn; committed by `reset_luck`
    temp_luck_bonus: i64,
    /// Rows the board should show
    row_count: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(BOARD_ROWS)
    }
}

impl Inventory {
    pub fn new(row_count: usize) -> Self {
        Self {
            symbols: Vec::new(),
            resources: BTreeMap::new(),
            graveyard: Vec::new(),
            temp_luck_bonus: 0,
            row_count,
        }
    }

    pub fn symbols(&self) -> &[SymbolRef] {
        &self.symbols
    }

    pub fn graveyard(&self) -> &[SymbolRef] {
        &self.graveyard
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn owns(&self, symbol: &SymbolRef) -> bool {
        self.symbols.iter().any(|s| s.ptr_eq(symbol))
    }

    /// How many owned symbols show this emoji
    pub fn count(&self, emoji: &str) -> usize {
        self.symbols.iter().filter(|s| s.emoji() == emoji).count()
    }

    fn count_update(&self, emoji: &'static str) -> Effect {
        Effect::view("inventory.updateCount")
            .param("emoji", emoji)
            .param("count", self.count(emoji))
            .into()
    }

    pub fn add(&mut self, symbol: SymbolRef) -> Effect {
        let emoji = symbol.emoji();
        self.symbols.push(symbol);
        self.count_update(emoji)
    }

    /// Remove an owned instance and bury it in the graveyard.
    /// Removing something not owned does nothing.
    pub fn remove(&mut self, symbol: &SymbolRef) -> Effect {
        let Some(index) = self.symbols.iter().position(|s| s.ptr_eq(symbol)) else {
            log::debug!("{} is not in the inventory", symbol.emoji());
            return Effect::none();
        };
        let removed = self.symbols.remove(index);
        let emoji = removed.emoji();
        self.graveyard.push(removed);
        self.count_update(emoji)
    }

    /// Amount of a resource; unknown resources are 0
    pub fn get_resource(&self, key: &str) -> i64 {
        self.resources.get(key).copied().unwrap_or(0)
    }

    /// Add (or with a negative value, spend) a resource. Nothing is
    /// clamped: callers check affordability first.
    pub fn add_resource(&mut self, key: &str, value: i64) -> Effect {
        let total = self.get_resource(key) + value;
        self.set_resource(key, total)
    }

    fn set_resource(&mut self, key: &str, value: i64) -> Effect {
        self.resources.insert(key.to_string(), value);
        Effect::view("inventory.resourceSet")
            .param("key", key)
            .param("value", value)
            .into()
    }

    /// Whether every listed amount is available
    pub fn can_afford(&self, cost: &BTreeMap<String, i64>) -> bool {
        cost.iter().all(|(key, amount)| self.get_resource(key) >= *amount)
    }

    /// Luck earned now only counts from the next roll on
    pub fn add_luck(&mut self, bonus: i64) -> Effect {
        self.temp_luck_bonus += bonus;
        Effect::view("inventory.luckPending")
            .param("value", self.temp_luck_bonus)
            .into()
    }

    pub fn pending_luck(&self) -> i64 {
        self.temp_luck_bonus
    }

    /// Commit this turn's luck and start a new bucket
    pub fn reset_luck(&mut self) -> Effect {
        let committed = std::mem::take(&mut self.temp_luck_bonus);
        self.set_resource(LUCK, committed)
    }

    /// Emoji of a random owned symbol, for spin animations.
    /// Falls back to empty space when nothing is owned.
    pub fn random_owned_emoji(&self, rng: &mut impl Rng) -> &'static str {
        if self.symbols.is_empty() {
            return EMPTY;
        }
        self.symbols[rng.random_range(0..self.symbols.len())].emoji()
    }

    /// Bring a copy of a random buried symbol back
    pub fn resurrect(&mut self, rng: &mut impl Rng) -> Effect {
        if self.graveyard.is_empty() {
            log::debug!("Nothing to resurrect");
            return Effect::none();
        }
        let dead = &self.graveyard[rng.random_range(0..self.graveyard.len())];
        let revived = dead.copy();
        log::info!("Resurrected {}", revived.emoji());
        self.add(revived)
    }

    pub fn add_row(&mut self) -> Effect {
        self.row_count += 1;
        Effect::view("inventory.rowsSet")
            .param("value", self.row_count)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MONEY;
    use crate::symbol::Symbol;
    use crate::symbol::roster::{Cherry, Coin};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn coin() -> SymbolRef {
        SymbolRef::new(Symbol::new(Coin))
    }

    #[test]
    fn test_add_remove_count() {
        let mut inventory = Inventory::default();
        let a = coin();
        let b = coin();
        inventory.add(a.clone());
        let effect = inventory.add(b.clone());
        match effect {
            Effect::Leaf(leaf) => {
                assert_eq!(leaf.path(), "view.inventory.updateCount");
                assert_eq!(leaf.params.int("count").unwrap(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }

        let effect = inventory.remove(&a);
        assert!(effect.contains("view.inventory.updateCount"));
        assert_eq!(inventory.count("🪙"), 1);
        assert!(inventory.owns(&b));
        assert!(!inventory.owns(&a));
        assert_eq!(inventory.graveyard().len(), 1);
        assert!(inventory.graveyard()[0].ptr_eq(&a));

        // Second removal of the same instance is a no-op
        assert!(inventory.remove(&a).is_none());
        assert_eq!(inventory.graveyard().len(), 1);
    }

    #[test]
    fn test_resources_default_and_negative() {
        let mut inventory = Inventory::default();
        assert_eq!(inventory.get_resource("🦄"), 0);
        inventory.add_resource(MONEY, 5);
        inventory.add_resource(MONEY, -8);
        assert_eq!(inventory.get_resource(MONEY), -3);
    }

    #[test]
    fn test_luck_commit_delay() {
        let mut inventory = Inventory::default();
        inventory.add_luck(2);
        inventory.reset_luck();
        assert_eq!(inventory.get_resource(LUCK), 2);

        // Next turn: luck earned during evaluation stays pending
        inventory.add_luck(5);
        assert_eq!(inventory.get_resource(LUCK), 2);
        assert_eq!(inventory.pending_luck(), 5);

        inventory.reset_luck();
        assert_eq!(inventory.get_resource(LUCK), 5);
        assert_eq!(inventory.pending_luck(), 0);
    }

    #[test]
    fn test_random_owned_emoji() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut inventory = Inventory::default();
        assert_eq!(inventory.random_owned_emoji(&mut rng), EMPTY);

        inventory.add(coin());
        inventory.add(SymbolRef::new(Symbol::new(Cherry)));
        for _ in 0..20 {
            let emoji = inventory.random_owned_emoji(&mut rng);
            assert!(emoji == "🪙" || emoji == "🍒");
        }
        assert_eq!(inventory.symbols().len(), 2);
    }

    #[test]
    fn test_resurrect_copies_from_graveyard() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut inventory = Inventory::default();
        assert!(inventory.resurrect(&mut rng).is_none());

        let a = coin();
        inventory.add(a.clone());
        inventory.remove(&a);
        inventory.resurrect(&mut rng);
        assert_eq!(inventory.count("🪙"), 1);
        assert!(!inventory.owns(&a));
        assert_eq!(inventory.graveyard().len(), 1);
    }
}
