//! Symbols: the pieces that sit on the board
//!
//! Each kind of symbol implements [`Behavior`]. Its lifecycle hooks return
//! [`Effect`] trees instead of touching the board or inventory directly,
//! so a rule can be checked by looking at the tree it returns.
//!
//! Instances are shared through [`SymbolRef`]: the inventory, a board cell
//! and a lock entry may all point at the same instance, and identity is
//! pointer identity.

pub mod roster;

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::catalog::Catalog;
use crate::consts::{LUCK, MONEY, PASSIVE_X};
use crate::effect::Effect;
use crate::sim::{Board, Inventory, Shop};

/// Price of a symbol, keyed by resource
pub type Cost = BTreeMap<String, i64>;

/// Build a cost from `(resource, amount)` pairs
pub fn cost_of(pairs: &[(&str, i64)]) -> Cost {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Tags used for neighbor matching and shop filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    EmptySpace,
    Unbuyable,
    Food,
    Animal,
    Plant,
    Luck,
    Money,
    Science,
    Building,
}

/// Everything a hook may look at while it runs.
///
/// The game is read-only here; changes go into the returned effect tree.
/// The symbol whose hook is running is mutably borrowed for the duration
/// of the call, so read other symbols through [`SymbolRef::try_borrow`].
pub struct HookCtx<'a> {
    pub board: &'a Board,
    pub inventory: &'a Inventory,
    pub shop: &'a Shop,
    pub catalog: &'a Catalog,
    pub rng: &'a mut Pcg32,
    /// The symbol running the hook
    pub this: SymbolRef,
    pub x: i32,
    pub y: i32,
    pub turns: u32,
    pub multiplier: i64,
}

impl HookCtx<'_> {
    /// Whether the running symbol sits in a passive slot
    pub fn is_passive(&self) -> bool {
        self.x == PASSIVE_X
    }

    /// [`chance`] at the running symbol's own position
    pub fn chance(&mut self, base: f64) -> bool {
        let (x, y) = (self.x, self.y);
        chance(self, base, x, y)
    }

    /// [`bad_chance`] at the running symbol's own position
    pub fn bad_chance(&mut self, base: f64) -> bool {
        let (x, y) = (self.x, self.y);
        bad_chance(self, base, x, y)
    }

    /// Neighbor coordinates holding the given emoji
    pub fn next_to(&self, emoji: &str) -> Vec<(i32, i32)> {
        self.board.next_to_symbol(self.x, self.y, emoji)
    }

    /// A fresh instance from the catalog, or `None` (logged) if unknown
    pub fn new_symbol(&self, emoji: &str) -> Option<SymbolRef> {
        match self.catalog.symbol(emoji) {
            Ok(symbol) => Some(symbol),
            Err(err) => {
                log::warn!("{} could not create {emoji}: {err}", self.this.emoji());
                None
            }
        }
    }

    /// `inventory.addResource` for money, scaled by the multiplier
    pub fn earn(&self, amount: i64) -> Effect {
        if amount == 0 {
            return Effect::none();
        }
        crate::serial![
            Effect::view("board.bounce").at(self.x, self.y),
            Effect::model("inventory.addResource")
                .param("key", MONEY)
                .param("value", amount * self.multiplier),
        ]
    }
}

/// Emoji of the lucky charm that forces chance rolls around it
pub const LUCKY_CHARM: &str = "🧿";

/// Committed luck as a probability bonus
fn luck_bonus(cx: &HookCtx<'_>) -> f64 {
    cx.inventory.get_resource(LUCK) as f64 / 100.0
}

/// Roll for a good outcome.
///
/// Succeeds when a uniform draw in `[0, 1)` is below `base` plus the luck
/// committed at the end of the previous turn. A lucky charm next to
/// `(x, y)` makes it succeed outright.
pub fn chance(cx: &mut HookCtx<'_>, base: f64, x: i32, y: i32) -> bool {
    if !cx.board.next_to_symbol(x, y, LUCKY_CHARM).is_empty() {
        return true;
    }
    let bonus = luck_bonus(cx);
    cx.rng.random::<f64>() < base + bonus
}

/// Roll for a bad outcome: luck lowers the odds, a lucky charm next to
/// `(x, y)` rules it out.
pub fn bad_chance(cx: &mut HookCtx<'_>, base: f64, x: i32, y: i32) -> bool {
    if !cx.board.next_to_symbol(x, y, LUCKY_CHARM).is_empty() {
        return false;
    }
    let bonus = luck_bonus(cx);
    cx.rng.random::<f64>() < base - bonus
}

/// Behavior of one kind of symbol.
///
/// `emoji`, `copy` and `description` have no default: a symbol kind that
/// does not say who it is or how to duplicate itself does not compile.
pub trait Behavior: fmt::Debug {
    fn emoji(&self) -> &'static str;

    /// A new, independent instance carrying over the state a fresh
    /// instance of this kind should start with.
    fn copy(&self) -> Box<dyn Behavior>;

    fn description(&self) -> String;

    /// Shop draw weight
    fn rarity(&self) -> f64 {
        0.0
    }

    fn categories(&self) -> &'static [Category] {
        &[]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 1)])
    }

    fn evaluate_consume(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::none()
    }

    fn evaluate_produce(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::none()
    }

    fn score(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::none()
    }

    fn final_score(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::none()
    }

    fn on_buy(&mut self) -> Effect {
        Effect::none()
    }

    /// Small number shown on the symbol (turns left, stored value, ...)
    fn counter(&self, _turns: u32) -> Option<i64> {
        None
    }
}

/// A symbol instance: shared per-turn state plus its behavior
#[derive(Debug)]
pub struct Symbol {
    /// Score multiplier for the current turn
    pub multiplier: i64,
    /// Evaluation rounds survived
    pub turns: u32,
    behavior: Box<dyn Behavior>,
}

impl Symbol {
    pub fn new(behavior: impl Behavior + 'static) -> Self {
        Self::from_box(Box::new(behavior))
    }

    pub fn from_box(behavior: Box<dyn Behavior>) -> Self {
        Self {
            multiplier: 1,
            turns: 0,
            behavior,
        }
    }

    /// Independent instance; per-turn state starts fresh
    pub fn copy(&self) -> Symbol {
        Symbol::from_box(self.behavior.copy())
    }

    pub fn emoji(&self) -> &'static str {
        self.behavior.emoji()
    }

    pub fn description(&self) -> String {
        self.behavior.description()
    }

    pub fn rarity(&self) -> f64 {
        self.behavior.rarity()
    }

    pub fn categories(&self) -> &'static [Category] {
        self.behavior.categories()
    }

    pub fn cost(&self) -> Cost {
        self.behavior.cost()
    }

    /// Clear per-turn state
    pub fn reset(&mut self) {
        self.multiplier = 1;
    }

    pub fn counter(&self) -> Option<i64> {
        self.behavior.counter(self.turns)
    }

    pub fn evaluate_consume(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        self.behavior.evaluate_consume(cx)
    }

    pub fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        self.behavior.evaluate_produce(cx)
    }

    pub fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        self.behavior.score(cx)
    }

    pub fn final_score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        self.behavior.final_score(cx)
    }

    pub fn on_buy(&mut self) -> Effect {
        self.behavior.on_buy()
    }
}

struct Slot {
    emoji: &'static str,
    categories: &'static [Category],
    symbol: RefCell<Symbol>,
}

/// Shared handle to a symbol instance. Equality is identity.
#[derive(Clone)]
pub struct SymbolRef(Rc<Slot>);

impl SymbolRef {
    pub fn new(symbol: Symbol) -> Self {
        Self(Rc::new(Slot {
            emoji: symbol.emoji(),
            categories: symbol.categories(),
            symbol: RefCell::new(symbol),
        }))
    }

    /// Emoji of this instance; never borrows the symbol
    pub fn emoji(&self) -> &'static str {
        self.0.emoji
    }

    pub fn categories(&self) -> &'static [Category] {
        self.0.categories
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.0.categories.contains(&category)
    }

    pub fn borrow(&self) -> Ref<'_, Symbol> {
        self.0.symbol.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Symbol> {
        self.0.symbol.borrow_mut()
    }

    /// Read access that yields `None` while a hook on this symbol runs
    pub fn try_borrow(&self) -> Option<Ref<'_, Symbol>> {
        self.0.symbol.try_borrow().ok()
    }

    pub fn ptr_eq(&self, other: &SymbolRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// New independent instance of the same kind
    pub fn copy(&self) -> SymbolRef {
        SymbolRef::new(self.borrow().copy())
    }
}

impl PartialEq for SymbolRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.0.emoji, Rc::as_ptr(&self.0))
    }
}

impl From<Symbol> for SymbolRef {
    fn from(symbol: Symbol) -> Self {
        SymbolRef::new(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::roster::{Coin, PiggyBank};
    use super::*;

    #[test]
    fn test_copy_is_new_identity() {
        let coin = SymbolRef::new(Symbol::new(Coin));
        let copy = coin.copy();
        assert!(!coin.ptr_eq(&copy));
        assert_ne!(coin, copy);
        assert_eq!(coin.emoji(), copy.emoji());
        assert_eq!(coin, coin.clone());
    }

    #[test]
    fn test_copy_keeps_counters_independent() {
        let piggy = SymbolRef::new(Symbol::new(PiggyBank { saved: 3 }));
        let copy = piggy.copy();
        assert_eq!(copy.borrow().counter(), Some(3));

        copy.borrow_mut().turns = 7;
        copy.borrow_mut().multiplier = 4;
        assert_eq!(piggy.borrow().turns, 0);
        assert_eq!(piggy.borrow().multiplier, 1);
    }

    #[test]
    fn test_reset_idempotent() {
        let coin = SymbolRef::new(Symbol::new(Coin));
        coin.borrow_mut().multiplier = 5;
        coin.borrow_mut().reset();
        assert_eq!(coin.borrow().multiplier, 1);
        coin.borrow_mut().reset();
        assert_eq!(coin.borrow().multiplier, 1);
    }

    #[test]
    fn test_try_borrow_during_mutation() {
        let coin = SymbolRef::new(Symbol::new(Coin));
        let guard = coin.borrow_mut();
        assert!(coin.try_borrow().is_none());
        assert_eq!(coin.emoji(), "🪙");
        drop(guard);
        assert!(coin.try_borrow().is_some());
    }
}
