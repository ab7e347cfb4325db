//! Emoji Slots - an emoji slot-machine roguelike
//!
//! Core modules:
//! - `effect`: Declarative effect trees (serial/parallel phases of leaf actions)
//! - `symbol`: The symbol contract and the built-in roster
//! - `catalog`: Symbol lookup and rarity-weighted shop draws
//! - `sim`: Deterministic model (board, inventory, shop)
//! - `controller`: Two-phase interpreter (model pass, then view pass)
//! - `session`: Per-turn control flow for a single run

pub mod catalog;
pub mod controller;
pub mod effect;
pub mod error;
pub mod session;
pub mod settings;
pub mod sim;
pub mod symbol;
pub mod view;

pub use catalog::Catalog;
pub use controller::{Controller, Model, View};
pub use effect::{Effect, Leaf, Params, Phase, Strategy, Value};
pub use error::{CatalogError, DispatchError, SettingsError, ViewError};
pub use session::Session;
pub use settings::Settings;
pub use sim::{Board, Game, Inventory, Shop};
pub use symbol::{Behavior, Category, Symbol, SymbolRef};

/// Game configuration constants
pub mod consts {
    /// Board defaults
    pub const BOARD_COLUMNS: usize = 5;
    pub const BOARD_ROWS: usize = 4;

    /// Column used to address passive (off-grid) symbols
    pub const PASSIVE_X: i32 = -1;

    /// Starting economy
    pub const STARTING_MONEY: i64 = 1;
    pub const STARTING_TURNS: i64 = 40;

    /// Shop defaults
    pub const BUY_LINES: usize = 3;
    pub const BUY_COUNT: u32 = 1;
    pub const REFRESH_BASE_COST: i64 = 1;
    /// Added to the refresh cost before scaling, on every refresh
    pub const REFRESH_INCREMENT: i64 = 1;
    pub const REFRESH_FACTOR: f64 = 1.5;
    /// Share of current money charged for the first refresh of a visit
    pub const REFRESH_WEALTH_RATE: f64 = 0.01;

    /// Symbols below this rarity are drawn by rare-only shops
    pub const RARE_THRESHOLD: f64 = 0.06;

    /// Model cascades deeper than this are cut off and logged
    pub const MAX_CASCADE_DEPTH: usize = 256;

    /// Resource keys
    pub const MONEY: &str = "💵";
    pub const TURNS: &str = "⏳";
    pub const LUCK: &str = "🍀";
    pub const RESEARCH: &str = "🧪";
}
