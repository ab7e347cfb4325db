//! Headless text view
//!
//! Mirrors the board and resources from the view leaves it receives and logs
//! what a graphical view would animate. Nominal animation times are summed
//! into a virtual clock; with animations off every animation takes no time.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::consts::PASSIVE_X;
use crate::controller::View;
use crate::effect::Leaf;
use crate::error::{DispatchError, ViewError};
use crate::symbol::roster::EMPTY;

/// Domains [`LogView`] handles
pub const DOMAINS: &[&str] = &["board", "inventory", "shop", "game"];

/// Nominal length of an animation, in milliseconds
fn animation_ms(domain: &str, action: &str) -> u64 {
    match (domain, action) {
        ("board", "spin") => 600,
        ("board", "moveSymbol") => 250,
        ("board", "addSymbol" | "removeSymbol") => 200,
        ("board", "bounce" | "multiplier") => 120,
        ("board", "pin" | "lock" | "unlock") => 100,
        ("shop", "open" | "close") => 150,
        _ => 0,
    }
}

fn bad_params(leaf: &Leaf, err: DispatchError) -> ViewError {
    ViewError::Failed(format!("{}: {err}", leaf.path()))
}

#[derive(Debug, Default)]
pub struct LogView {
    animations: bool,
    /// Virtual time spent animating
    elapsed_ms: Cell<u64>,
    played: Cell<usize>,
    cells: RefCell<BTreeMap<(i64, i64), String>>,
    resources: RefCell<BTreeMap<String, i64>>,
    final_money: Cell<Option<i64>>,
}

impl LogView {
    pub fn new(animations: bool) -> Self {
        Self {
            animations,
            ..Self::default()
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.get()
    }

    /// Leaves played so far
    pub fn played(&self) -> usize {
        self.played.get()
    }

    pub fn resource(&self, key: &str) -> Option<i64> {
        self.resources.borrow().get(key).copied()
    }

    /// Money reported by `game.over`, once the run has ended
    pub fn final_money(&self) -> Option<i64> {
        self.final_money.get()
    }

    /// The mirrored board, one line per row
    pub fn render(&self) -> String {
        let cells = self.cells.borrow();
        let mut rows: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
        for ((x, y), emoji) in cells.iter() {
            if *x == i64::from(PASSIVE_X) {
                continue;
            }
            rows.entry(*y).or_default().push(emoji);
        }
        rows.values()
            .map(|row| row.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn set_cell(&self, leaf: &Leaf, key: &str) -> Result<(), ViewError> {
        let x = leaf.params.int("x").map_err(|e| bad_params(leaf, e))?;
        let y = leaf.params.int("y").map_err(|e| bad_params(leaf, e))?;
        let emoji = match leaf.params.symbol(key) {
            Ok(symbol) => symbol.emoji().to_string(),
            Err(_) => EMPTY.to_string(),
        };
        self.cells.borrow_mut().insert((x, y), emoji);
        Ok(())
    }

    fn handle(&self, leaf: &Leaf) -> Result<(), ViewError> {
        let p = &leaf.params;
        match (leaf.domain.as_str(), leaf.action.as_str()) {
            ("board", "spin" | "addSymbol") => self.set_cell(leaf, "symbol")?,
            ("board", "removeSymbol") => self.set_cell(leaf, "none")?,
            ("board", "showMessage") => {
                log::info!("{}", p.str("text").map_err(|e| bad_params(leaf, e))?);
            }
            ("board", "addPassive" | "removePassive") => log::info!("{leaf}"),
            (
                "board",
                "bounce" | "moveSymbol" | "multiplier" | "pin" | "lock" | "unlock",
            ) => log::debug!("{leaf}"),
            ("inventory", "resourceSet") => {
                let key = p.str("key").map_err(|e| bad_params(leaf, e))?;
                let value = p.int("value").map_err(|e| bad_params(leaf, e))?;
                self.resources.borrow_mut().insert(key.to_string(), value);
            }
            ("inventory", "updateCount" | "luckPending" | "rowsSet") => log::debug!("{leaf}"),
            ("shop", "showOffer" | "showRefresh" | "sold" | "buyCount") => log::info!("{leaf}"),
            ("shop", "open" | "close") => log::debug!("{leaf}"),
            ("game", "over") => {
                let money = p.int("money").map_err(|e| bad_params(leaf, e))?;
                log::info!("Game over with {money}");
                self.final_money.set(Some(money));
            }
            (domain, action) => {
                return Err(ViewError::UnknownAction {
                    domain: domain.to_string(),
                    action: action.to_string(),
                });
            }
        }
        if self.animations {
            self.elapsed_ms
                .set(self.elapsed_ms.get() + animation_ms(&leaf.domain, &leaf.action));
        }
        self.played.set(self.played.get() + 1);
        Ok(())
    }
}

impl View for LogView {
    fn play<'a>(&'a self, leaf: &'a Leaf) -> LocalBoxFuture<'a, Result<(), ViewError>> {
        async move { self.handle(leaf) }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MONEY;
    use crate::effect::Effect;
    use crate::symbol::roster::Coin;
    use crate::symbol::{Symbol, SymbolRef};
    use futures::executor::block_on;

    fn spin(x: i32, y: i32, symbol: &SymbolRef) -> Leaf {
        Effect::view("board.spin").at(x, y).param("symbol", symbol)
    }

    #[test]
    fn test_mirrors_board_and_resources() {
        let view = LogView::new(true);
        let coin = SymbolRef::new(Symbol::new(Coin));
        block_on(view.play(&spin(0, 0, &coin))).unwrap();
        block_on(view.play(&spin(1, 0, &coin))).unwrap();
        block_on(view.play(&Effect::view("board.removeSymbol").at(1, 0))).unwrap();
        block_on(view.play(
            &Effect::view("inventory.resourceSet")
                .param("key", MONEY)
                .param("value", 12),
        ))
        .unwrap();

        assert_eq!(view.render(), format!("🪙{EMPTY}"));
        assert_eq!(view.resource(MONEY), Some(12));
        assert_eq!(view.played(), 4);
    }

    #[test]
    fn test_animation_toggle() {
        let coin = SymbolRef::new(Symbol::new(Coin));
        let animated = LogView::new(true);
        let instant = LogView::new(false);
        for view in [&animated, &instant] {
            block_on(view.play(&spin(0, 0, &coin))).unwrap();
        }
        assert_eq!(animated.elapsed_ms(), 600);
        assert_eq!(instant.elapsed_ms(), 0);
    }

    #[test]
    fn test_unknown_action() {
        let view = LogView::new(false);
        let result = block_on(view.play(&Effect::view("board.explode")));
        assert!(matches!(result, Err(ViewError::UnknownAction { .. })));
        assert_eq!(view.played(), 0);
    }
}
