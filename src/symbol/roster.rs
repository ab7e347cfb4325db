//! Built-in symbols
//!
//! A small roster: enough rules to exercise every hook, every model action
//! and both chance helpers.

use rand::Rng;

use super::{Behavior, Category, Cost, HookCtx, Symbol, cost_of};
use crate::consts::{MONEY, RESEARCH};
use crate::effect::Effect;
use crate::{parallel, serial};

pub const EMPTY: &str = "⬜";
pub const HOLE: &str = "🕳️";
pub const CHICK: &str = "🐣";
pub const MILK: &str = "🥛";

/// Every built-in symbol, in catalog order
pub fn all() -> Vec<Symbol> {
    vec![
        Symbol::new(Empty),
        Symbol::new(Hole),
        Symbol::new(Coin),
        Symbol::new(Cherry),
        Symbol::new(Milk),
        Symbol::new(Cat),
        Symbol::new(Clover),
        Symbol::new(Nazar),
        Symbol::new(Egg),
        Symbol::new(Chick),
        Symbol::new(CreditCard),
        Symbol::new(ShoppingBag),
        Symbol::new(Ticket),
        Symbol::new(Pin),
        Symbol::new(Bank),
        Symbol::new(Zombie),
        Symbol::new(Microscope),
        Symbol::new(Dna),
        Symbol::new(Ice),
        Symbol::new(Star),
        Symbol::new(Crane),
        Symbol::new(PiggyBank::default()),
    ]
}

/// Declares the identity part of a stateless behavior
macro_rules! identity {
    ($ty:ident, $emoji:expr, $desc:expr) => {
        fn emoji(&self) -> &'static str {
            $emoji
        }

        fn copy(&self) -> Box<dyn Behavior> {
            Box::new($ty)
        }

        fn description(&self) -> String {
            $desc.to_string()
        }
    };
}

/// Empty space
#[derive(Debug, Clone, Copy)]
pub struct Empty;

impl Behavior for Empty {
    identity!(Empty, EMPTY, "Nothing here.");

    fn categories(&self) -> &'static [Category] {
        &[Category::EmptySpace, Category::Unbuyable]
    }
}

/// Empty space that stays empty whatever lands on it
#[derive(Debug, Clone, Copy)]
pub struct Hole;

impl Behavior for Hole {
    identity!(Hole, HOLE, "Always empty.");

    fn categories(&self) -> &'static [Category] {
        &[Category::EmptySpace, Category::Unbuyable]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Coin;

impl Behavior for Coin {
    identity!(Coin, "🪙", "Gives 💵1.");

    fn rarity(&self) -> f64 {
        0.8
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Money]
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Cherry;

impl Behavior for Cherry {
    identity!(Cherry, "🍒", "Gives 💵2.");

    fn rarity(&self) -> f64 {
        0.5
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Food, Category::Plant]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 2)])
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(2)
    }
}

/// Gives a little money, and may spoil
#[derive(Debug, Clone, Copy)]
pub struct Milk;

impl Behavior for Milk {
    identity!(Milk, MILK, "Gives 💵1. 10% chance to spoil.");

    fn rarity(&self) -> f64 {
        0.5
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Food]
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        if cx.is_passive() || !cx.bad_chance(0.1) {
            return Effect::none();
        }
        Effect::model("board.removeSymbol").at(cx.x, cx.y).into()
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(1)
    }
}

/// Drinks neighboring milk
#[derive(Debug, Clone, Copy)]
pub struct Cat;

impl Behavior for Cat {
    identity!(Cat, "🐈", "Drinks neighboring 🥛 for 💵9 each.");

    fn rarity(&self) -> f64 {
        0.3
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Animal]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 3)])
    }

    fn evaluate_consume(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        let drinks: Vec<Effect> = cx
            .next_to(MILK)
            .into_iter()
            .map(|(mx, my)| {
                serial![
                    Effect::view("board.moveSymbol")
                        .param("fromX", mx)
                        .param("fromY", my)
                        .at(cx.x, cx.y),
                    Effect::model("board.removeSymbol").at(mx, my),
                    cx.earn(9),
                ]
            })
            .collect();
        Effect::serial(drinks)
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(1)
    }
}

/// Luck for the next turn
#[derive(Debug, Clone, Copy)]
pub struct Clover;

impl Behavior for Clover {
    identity!(Clover, "☘️", "Gives 🍀1 next turn.");

    fn rarity(&self) -> f64 {
        0.3
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Plant, Category::Luck]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 2)])
    }

    fn evaluate_produce(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::model("inventory.addLuck").param("value", 1).into()
    }
}

/// Lucky charm: neighbors always win chance rolls and never lose bad ones
#[derive(Debug, Clone, Copy)]
pub struct Nazar;

impl Behavior for Nazar {
    identity!(Nazar, super::LUCKY_CHARM, "Neighbors always get lucky.");

    fn rarity(&self) -> f64 {
        0.05
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Luck]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 6)])
    }
}

/// Hatches into a chick
#[derive(Debug, Clone, Copy)]
pub struct Egg;

impl Behavior for Egg {
    identity!(Egg, "🥚", "10% chance to hatch into 🐣.");

    fn rarity(&self) -> f64 {
        0.4
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Food]
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        if cx.is_passive() || !cx.chance(0.1) {
            return Effect::none();
        }
        match cx.new_symbol(CHICK) {
            Some(chick) => Effect::model("board.replaceSymbol")
                .at(cx.x, cx.y)
                .param("symbol", chick)
                .into(),
            None => Effect::none(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Chick;

impl Behavior for Chick {
    identity!(Chick, CHICK, "Gives 💵2.");

    fn rarity(&self) -> f64 {
        0.1
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Animal]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 3)])
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(2)
    }
}

/// Money now, a bigger bill at the end
#[derive(Debug, Clone, Copy)]
pub struct CreditCard;

impl Behavior for CreditCard {
    identity!(CreditCard, "💳", "Gives 💵20 when bought. Costs 💵25 at the end of the game.");

    fn rarity(&self) -> f64 {
        0.1
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Money]
    }

    fn on_buy(&mut self) -> Effect {
        Effect::model("inventory.addResource")
            .param("key", MONEY)
            .param("value", 20)
            .into()
    }

    fn final_score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        Effect::model("inventory.addResource")
            .param("key", MONEY)
            .param("value", -25 * cx.multiplier)
            .into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShoppingBag;

impl Behavior for ShoppingBag {
    identity!(ShoppingBag, "🛍️", "One more purchase in every shop.");

    fn rarity(&self) -> f64 {
        0.08
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 6)])
    }

    fn on_buy(&mut self) -> Effect {
        Effect::model("shop.addBuyCount").param("value", 1).into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ticket;

impl Behavior for Ticket {
    identity!(Ticket, "🎟️", "Unlimited shop refreshes this turn.");

    fn rarity(&self) -> f64 {
        0.2
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 3)])
    }

    fn evaluate_produce(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::model("shop.grantRefresh").into()
    }
}

/// Pins a neighbor in place for good
#[derive(Debug, Clone, Copy)]
pub struct Pin;

impl Behavior for Pin {
    identity!(Pin, "📌", "25% chance to pin a neighbor in place forever.");

    fn rarity(&self) -> f64 {
        0.15
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 4)])
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        let board = cx.board;
        let candidates: Vec<(i32, i32)> = board
            .next_to_expr(cx.x, cx.y, |s| !s.has_category(Category::EmptySpace))
            .into_iter()
            .filter(|&(nx, ny)| !board.is_locked(nx, ny))
            .collect();
        if candidates.is_empty() || !cx.chance(0.25) {
            return Effect::none();
        }
        let (px, py) = candidates[cx.rng.random_range(0..candidates.len())];
        Effect::model("board.pinCell").at(px, py).into()
    }
}

/// Moves off the board after a few turns and pays from there
#[derive(Debug, Clone, Copy)]
pub struct Bank;

impl Bank {
    const TURNS_TO_BANK: u32 = 3;
}

impl Behavior for Bank {
    identity!(Bank, "🏦", "After 3 turns, becomes passive and gives 💵3 every turn.");

    fn rarity(&self) -> f64 {
        0.1
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Building, Category::Money]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 8)])
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        if cx.is_passive() || cx.turns < Self::TURNS_TO_BANK {
            return Effect::none();
        }
        Effect::model("board.makePassive").at(cx.x, cx.y).into()
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        if cx.is_passive() { cx.earn(3) } else { Effect::none() }
    }

    fn counter(&self, turns: u32) -> Option<i64> {
        (turns < Self::TURNS_TO_BANK).then(|| i64::from(Self::TURNS_TO_BANK - turns))
    }
}

/// Brings back something that was removed
#[derive(Debug, Clone, Copy)]
pub struct Zombie;

impl Behavior for Zombie {
    identity!(Zombie, "🧟", "When bought, brings back a removed symbol.");

    fn rarity(&self) -> f64 {
        0.05
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Animal]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 5)])
    }

    fn on_buy(&mut self) -> Effect {
        Effect::model("inventory.resurrect").into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Microscope;

impl Behavior for Microscope {
    identity!(Microscope, "🔬", "Gives 🧪1.");

    fn rarity(&self) -> f64 {
        0.2
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Science]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 4)])
    }

    fn score(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        Effect::model("inventory.addResource")
            .param("key", RESEARCH)
            .param("value", 1)
            .into()
    }
}

/// Paid for in research rather than money
#[derive(Debug, Clone, Copy)]
pub struct Dna;

impl Behavior for Dna {
    identity!(Dna, "🧬", "Gives 💵6. Costs 🧪3.");

    fn rarity(&self) -> f64 {
        0.1
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Science]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(RESEARCH, 3)])
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(6)
    }
}

/// Freezes its own cell for two rolls
#[derive(Debug, Clone, Copy)]
pub struct Ice;

impl Ice {
    const FREEZE_ROLLS: i64 = 2;
}

impl Behavior for Ice {
    identity!(Ice, "🧊", "Freezes in place for 2 spins.");

    fn rarity(&self) -> f64 {
        0.2
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 2)])
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        if cx.is_passive() || cx.board.is_locked(cx.x, cx.y) {
            return Effect::none();
        }
        Effect::model("board.lockCell")
            .at(cx.x, cx.y)
            .param("duration", Self::FREEZE_ROLLS)
            .into()
    }

    fn score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(1)
    }
}

/// Doubles its neighbors
#[derive(Debug, Clone, Copy)]
pub struct Star;

impl Behavior for Star {
    identity!(Star, "⭐", "Neighbors score double.");

    fn rarity(&self) -> f64 {
        0.1
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 5)])
    }

    fn evaluate_produce(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        let boosts: Vec<Effect> = cx
            .board
            .next_to_expr(cx.x, cx.y, |s| !s.has_category(Category::EmptySpace))
            .into_iter()
            .map(|(nx, ny)| Effect::from(Effect::model("board.multiply").at(nx, ny).param("factor", 2)))
            .collect();
        Effect::parallel(boosts)
    }
}

/// Adds a row to the board
#[derive(Debug, Clone, Copy)]
pub struct Crane;

impl Behavior for Crane {
    identity!(Crane, "🏗️", "When bought, adds a row to the board.");

    fn rarity(&self) -> f64 {
        0.05
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Building]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 10)])
    }

    fn on_buy(&mut self) -> Effect {
        parallel![
            Effect::model("inventory.addRow"),
            Effect::view("board.showMessage").param("text", "The board grows."),
        ]
    }
}

/// Saves a coin every turn, pays double at the end
#[derive(Debug, Clone, Copy, Default)]
pub struct PiggyBank {
    pub saved: i64,
}

impl Behavior for PiggyBank {
    fn emoji(&self) -> &'static str {
        "🐖"
    }

    fn copy(&self) -> Box<dyn Behavior> {
        Box::new(PiggyBank { saved: self.saved })
    }

    fn description(&self) -> String {
        format!("Saves 💵1 every turn. Pays out double at the end. Saved: {}", self.saved)
    }

    fn rarity(&self) -> f64 {
        0.2
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Animal, Category::Money]
    }

    fn cost(&self) -> Cost {
        cost_of(&[(MONEY, 3)])
    }

    fn evaluate_produce(&mut self, _cx: &mut HookCtx<'_>) -> Effect {
        self.saved += 1;
        Effect::none()
    }

    fn final_score(&mut self, cx: &mut HookCtx<'_>) -> Effect {
        cx.earn(self.saved * 2)
    }

    fn counter(&self, _turns: u32) -> Option<i64> {
        Some(self.saved)
    }
}
