//! Run settings
//!
//! Everything a single run is built from: board size, starting inventory,
//! shop economy and initial locks. Loaded from JSON; any field left out
//! keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::SettingsError;

/// A cell locked before the first roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialLock {
    pub x: usize,
    pub y: usize,
    /// Symbol placed in the cell
    pub emoji: String,
    /// Rolls the lock lasts; absent or negative means forever
    #[serde(default)]
    pub duration: Option<i64>,
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Board ===
    pub columns: usize,
    pub rows: usize,

    // === Starting state ===
    /// Emoji string parsed into the starting inventory
    pub starting_symbols: String,
    pub starting_money: i64,
    pub starting_turns: i64,
    pub initial_locks: Vec<InitialLock>,

    // === Shop ===
    /// Offers per visit
    pub buy_lines: usize,
    /// Purchases per visit
    pub buy_count: u32,
    pub refresh_base_cost: i64,
    pub refresh_increment: i64,
    pub refresh_factor: f64,
    pub refresh_wealth_rate: f64,

    // === Engine ===
    /// RNG seed; the same seed and inputs replay the same run
    pub seed: u64,
    /// Model cascades deeper than this are cut off
    pub max_cascade_depth: usize,
    /// Play view animations; off fast-forwards the view pass
    pub animations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: consts::BOARD_COLUMNS,
            rows: consts::BOARD_ROWS,

            starting_symbols: "🪙🍒🐈🥛🥚".to_string(),
            starting_money: consts::STARTING_MONEY,
            starting_turns: consts::STARTING_TURNS,
            initial_locks: Vec::new(),

            buy_lines: consts::BUY_LINES,
            buy_count: consts::BUY_COUNT,
            refresh_base_cost: consts::REFRESH_BASE_COST,
            refresh_increment: consts::REFRESH_INCREMENT,
            refresh_factor: consts::REFRESH_FACTOR,
            refresh_wealth_rate: consts::REFRESH_WEALTH_RATE,

            seed: 0,
            max_cascade_depth: consts::MAX_CASCADE_DEPTH,
            animations: true,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SettingsError::EmptyBoard);
        }
        if let Some(lock) = self
            .initial_locks
            .iter()
            .find(|lock| lock.x >= self.columns || lock.y >= self.rows)
        {
            return Err(SettingsError::LockOutOfBounds {
                x: lock.x,
                y: lock.y,
            });
        }
        Ok(())
    }

    /// Same settings with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
