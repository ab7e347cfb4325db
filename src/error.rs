//! Error types for the game core.
//!
//! None of these reach the player. The controller logs them and carries on
//! with the rest of the effect tree.

use thiserror::Error;

/// Catalog lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No symbol is registered under this emoji.
    #[error("unknown symbol {0:?}")]
    NotFound(String),
}

/// Failures while resolving a single model leaf.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown model domain {0:?}")]
    UnknownDomain(String),
    #[error("unknown action {action:?} in domain {domain:?}")]
    UnknownAction { domain: String, action: String },
    #[error("missing parameter {key:?}")]
    MissingParam { key: String },
    #[error("parameter {key:?} should be {expected}, found {found}")]
    ParamType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no cell at ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("effect cascade exceeded depth {0}")]
    CascadeTooDeep(usize),
}

/// Failures reported by view handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("unknown view action {domain}.{action}")]
    UnknownAction { domain: String, action: String },
    #[error("view handler failed: {0}")]
    Failed(String),
}

/// Failures loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    #[error("initial lock at ({x}, {y}) is outside the board")]
    LockOutOfBounds { x: usize, y: usize },
}
