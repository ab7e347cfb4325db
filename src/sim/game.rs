//! The model aggregate and its dispatch table
//!
//! `Game` owns the board, inventory, shop and the run's RNG, and maps every
//! `model.<domain>.<action>` leaf onto them.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::{Board, LockDuration, Pass};
use super::inventory::Inventory;
use super::shop::Shop;
use crate::catalog::Catalog;
use crate::consts::{MONEY, PASSIVE_X, TURNS};
use crate::controller::Model;
use crate::effect::{Effect, Leaf, Params};
use crate::error::{DispatchError, SettingsError};
use crate::settings::Settings;
use crate::symbol::{HookCtx, SymbolRef};

/// Where a run stands between turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Ready to roll
    Idle,
    /// Shop open after a roll
    Shopping,
    /// Out of turns; final scores paid
    Over,
}

/// Which symbol hook to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Consume,
    Produce,
    Score,
    FinalScore,
}

impl From<Pass> for Hook {
    fn from(pass: Pass) -> Self {
        match pass {
            Pass::Consume => Hook::Consume,
            Pass::Produce => Hook::Produce,
        }
    }
}

/// Complete model state of one run
#[derive(Debug)]
pub struct Game {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub catalog: Rc<Catalog>,
    pub board: Board,
    pub inventory: Inventory,
    pub shop: Shop,
    rng: Pcg32,
}

impl Game {
    /// New run over the built-in catalog
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        Self::with_catalog(Rc::new(Catalog::standard()), settings)
    }

    pub fn with_catalog(catalog: Rc<Catalog>, settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut inventory = Inventory::new(settings.rows);
        inventory.add_resource(MONEY, settings.starting_money);
        inventory.add_resource(TURNS, settings.starting_turns);
        for symbol in catalog.symbols_from_string(&settings.starting_symbols) {
            inventory.add(symbol);
        }

        let mut board = Board::new(catalog.clone(), settings.columns, settings.rows);
        for lock in &settings.initial_locks {
            let symbol = match catalog.symbol(&lock.emoji) {
                Ok(symbol) => symbol,
                Err(err) => {
                    log::warn!("Skipping initial lock at ({}, {}): {err}", lock.x, lock.y);
                    continue;
                }
            };
            let duration = lock
                .duration
                .map_or(LockDuration::Forever, LockDuration::from_signed);
            let (x, y) = (lock.x as i32, lock.y as i32);
            if let Err(err) = board.lock(x, y, symbol, duration) {
                log::warn!("Skipping initial lock: {err}");
            }
        }

        let shop = Shop::new(catalog.clone(), settings);
        log::info!(
            "New run: seed={}, board={}x{}, {} starting symbols",
            settings.seed,
            settings.columns,
            settings.rows,
            inventory.symbols().len()
        );

        Ok(Self {
            seed: settings.seed,
            phase: GamePhase::Idle,
            catalog,
            board,
            inventory,
            shop,
            rng: Pcg32::seed_from_u64(settings.seed),
        })
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn money(&self) -> i64 {
        self.inventory.get_resource(MONEY)
    }

    pub fn turns_left(&self) -> i64 {
        self.inventory.get_resource(TURNS)
    }

    /// Run one hook on one symbol, sitting at `(x, y)`
    fn run_hook(&mut self, symbol: &SymbolRef, x: i32, y: i32, hook: Hook) -> Effect {
        let (turns, multiplier) = {
            let symbol = symbol.borrow();
            (symbol.turns, symbol.multiplier)
        };
        let mut cx = HookCtx {
            board: &self.board,
            inventory: &self.inventory,
            shop: &self.shop,
            catalog: &self.catalog,
            rng: &mut self.rng,
            this: symbol.clone(),
            x,
            y,
            turns,
            multiplier,
        };
        let mut this = symbol.borrow_mut();
        match hook {
            Hook::Consume => this.evaluate_consume(&mut cx),
            Hook::Produce => this.evaluate_produce(&mut cx),
            Hook::Score => this.score(&mut cx),
            Hook::FinalScore => this.final_score(&mut cx),
        }
    }

    /// One hook over passives then cells, in order
    fn run_all(&mut self, hook: Hook) -> Effect {
        let effects = self
            .board
            .snapshot()
            .into_iter()
            .map(|(symbol, x, y)| self.run_hook(&symbol, x, y, hook))
            .collect();
        Effect::serial(effects)
    }

    pub fn score(&mut self) -> Effect {
        self.run_all(Hook::Score)
    }

    pub fn final_score(&mut self) -> Effect {
        self.run_all(Hook::FinalScore)
    }

    /// Run a queued evaluation hook if its cell still holds the same symbol
    pub fn evaluate_symbol(
        &mut self,
        symbol: &SymbolRef,
        x: i32,
        y: i32,
        pass: Pass,
    ) -> Effect {
        if !self.board.holds(x, y, symbol) {
            log::debug!("Skipping {} at ({x}, {y}): no longer there", symbol.emoji());
            return Effect::none();
        }
        self.run_hook(symbol, x, y, pass.into())
    }

    /// A symbol from either a `symbol` or an `emoji` parameter
    fn symbol_param(&self, params: &Params) -> Result<SymbolRef, DispatchError> {
        if params.contains("symbol") {
            return Ok(params.symbol("symbol")?.clone());
        }
        Ok(self.catalog.symbol(params.str("emoji")?)?)
    }

    fn apply_board(&mut self, action: &str, p: &Params) -> Result<Effect, DispatchError> {
        match action {
            "roll" => Ok(self.board.roll(&self.inventory, &mut self.rng)),
            "evaluate" => Ok(self.board.evaluate()),
            "evaluatePass" => Ok(self.board.evaluate_pass(pass_param(p)?)),
            "evaluateSymbol" => {
                let symbol = p.symbol("symbol")?.clone();
                let (x, y) = p.coords()?;
                Ok(self.evaluate_symbol(&symbol, x, y, pass_param(p)?))
            }
            "score" => Ok(self.score()),
            "finalScore" => Ok(self.final_score()),
            "addSymbol" => {
                let symbol = self.symbol_param(p)?;
                let (x, y) = p.coords()?;
                self.board.add_symbol(&mut self.inventory, symbol, x, y)
            }
            "removeSymbol" => {
                let (x, y) = p.coords()?;
                if x == PASSIVE_X {
                    let symbol = p.symbol("symbol")?;
                    return Ok(self.board.remove_passive(&mut self.inventory, symbol));
                }
                self.board.remove_symbol(&mut self.inventory, x, y)
            }
            "replaceSymbol" => {
                let symbol = self.symbol_param(p)?;
                let (x, y) = p.coords()?;
                self.board.replace_symbol(&mut self.inventory, x, y, symbol)
            }
            "makePassive" => {
                let (x, y) = p.coords()?;
                self.board.make_passive(&mut self.inventory, x, y)
            }
            "pinCell" => {
                let (x, y) = p.coords()?;
                self.board.pin_cell(x, y)
            }
            "lockCell" => {
                let (x, y) = p.coords()?;
                let duration = LockDuration::from_signed(p.int_or("duration", -1)?);
                self.board.lock_cell(x, y, duration)
            }
            "unlockCell" => {
                let (x, y) = p.coords()?;
                Ok(self.board.unlock(x, y))
            }
            "multiply" => {
                let (x, y) = p.coords()?;
                self.board.multiply(x, y, p.int("factor")?)
            }
            _ => Err(unknown("board", action)),
        }
    }

    fn apply_inventory(&mut self, action: &str, p: &Params) -> Result<Effect, DispatchError> {
        match action {
            "add" => {
                let symbol = self.symbol_param(p)?;
                Ok(self.inventory.add(symbol))
            }
            "remove" => {
                // Removing an owned symbol takes it off the board too
                let symbol = p.symbol("symbol")?;
                let cell = self
                    .board
                    .iter()
                    .find(|(_, _, s)| s.ptr_eq(symbol))
                    .map(|(x, y, _)| (x, y));
                match cell {
                    Some((x, y)) => self.board.remove_symbol(&mut self.inventory, x, y),
                    None => Ok(self.inventory.remove(symbol)),
                }
            }
            "addResource" => Ok(self
                .inventory
                .add_resource(p.str("key")?, p.int("value")?)),
            "addLuck" => Ok(self.inventory.add_luck(p.int("value")?)),
            "resetLuck" => Ok(self.inventory.reset_luck()),
            "resurrect" => Ok(self.inventory.resurrect(&mut self.rng)),
            "addRow" => Ok(self.inventory.add_row()),
            _ => Err(unknown("inventory", action)),
        }
    }

    fn apply_shop(&mut self, action: &str, p: &Params) -> Result<Effect, DispatchError> {
        match action {
            "open" => Ok(self.shop.open(&self.inventory, &mut self.rng)),
            "close" => Ok(self.shop.close(&self.inventory)),
            "purchase" => {
                let id = count_param(p, "id")?;
                Ok(self.shop.attempt_purchase(id as usize, &mut self.inventory))
            }
            "refresh" => Ok(self.shop.attempt_refresh(&mut self.inventory, &mut self.rng)),
            "grantRefresh" => Ok(self.shop.grant_refresh()),
            "addBuyCount" => Ok(self.shop.add_buy_count(count_param(p, "value")?)),
            _ => Err(unknown("shop", action)),
        }
    }
}

fn unknown(domain: &str, action: &str) -> DispatchError {
    DispatchError::UnknownAction {
        domain: domain.to_string(),
        action: action.to_string(),
    }
}

fn pass_param(p: &Params) -> Result<Pass, DispatchError> {
    Pass::parse(p.str("pass")?).ok_or_else(|| DispatchError::ParamType {
        key: "pass".to_string(),
        expected: "consume or produce",
        found: "string",
    })
}

/// A non-negative integer parameter
fn count_param(p: &Params, key: &str) -> Result<u32, DispatchError> {
    u32::try_from(p.int(key)?).map_err(|_| DispatchError::ParamType {
        key: key.to_string(),
        expected: "non-negative int",
        found: "int",
    })
}

impl Model for Game {
    fn apply(&mut self, leaf: &Leaf) -> Result<Effect, DispatchError> {
        match leaf.domain.as_str() {
            "board" => self.apply_board(&leaf.action, &leaf.params),
            "inventory" => self.apply_inventory(&leaf.action, &leaf.params),
            "shop" => self.apply_shop(&leaf.action, &leaf.params),
            other => Err(DispatchError::UnknownDomain(other.to_string())),
        }
    }
}
