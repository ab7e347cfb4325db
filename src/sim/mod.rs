//! Deterministic game model
//!
//! All gameplay state lives here. This module must stay pure and deterministic:
//! - Seeded RNG only, owned by the `Game`
//! - Stable iteration order (passives first, then cells row-major)
//! - No view or platform dependencies: changes are described by returned effects

pub mod board;
pub mod game;
pub mod inventory;
pub mod shop;

pub use board::{Board, LockDuration, LockedCell, Pass};
pub use game::{Game, GamePhase};
pub use inventory::Inventory;
pub use shop::{Offer, Shop};
