//! One run, turn by turn
//!
//! A roll is a fixed sequence of steps. Each step is dispatched through the
//! controller (both passes) before the next one is built, so every step
//! sees the state the previous one left behind.

use std::rc::Rc;

use crate::consts::TURNS;
use crate::controller::{Controller, View};
use crate::effect::Effect;
use crate::error::SettingsError;
use crate::settings::Settings;
use crate::sim::{Game, GamePhase};
use crate::view;

pub struct Session {
    game: Game,
    controller: Controller,
}

impl Session {
    /// A session with no views attached; view leaves are logged and skipped
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            game: Game::new(settings)?,
            controller: Controller::new(settings.max_cascade_depth),
        })
    }

    /// A session playing into `view` for every game domain
    pub fn with_view(settings: &Settings, view: Rc<dyn View>) -> Result<Self, SettingsError> {
        let mut session = Self::new(settings)?;
        session.controller.register_all(view::DOMAINS, view);
        Ok(session)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn phase(&self) -> GamePhase {
        self.game.phase
    }

    pub fn is_over(&self) -> bool {
        self.game.phase == GamePhase::Over
    }

    /// Dispatch one tree through both passes
    pub async fn dispatch(&mut self, effect: Effect) -> Effect {
        self.controller.dispatch(&mut self.game, effect).await
    }

    async fn step(&mut self, path: &str) -> Effect {
        self.dispatch(Effect::model(path).into()).await
    }

    /// Play one turn: spend a turn, close the shop, roll, evaluate, score,
    /// commit luck, then open the shop or end the game.
    pub async fn roll(&mut self) -> GamePhase {
        if self.is_over() {
            log::warn!("Roll ignored: the game is over");
            return GamePhase::Over;
        }
        if self.game.turns_left() <= 0 {
            self.game_over().await;
            return GamePhase::Over;
        }

        self.dispatch(
            Effect::model("inventory.addResource")
                .param("key", TURNS)
                .param("value", -1)
                .into(),
        )
        .await;
        self.step("shop.close").await;
        self.step("board.roll").await;
        self.step("board.evaluate").await;
        self.step("board.score").await;
        self.step("inventory.resetLuck").await;

        log::info!(
            "Turn done: money={}, turns left={}",
            self.game.money(),
            self.game.turns_left()
        );
        if self.game.turns_left() <= 0 {
            self.game_over().await;
        } else {
            self.step("shop.open").await;
            self.game.phase = if self.game.shop.is_open() {
                GamePhase::Shopping
            } else {
                GamePhase::Idle
            };
        }
        self.game.phase
    }

    /// Buy offer `id` from the open shop
    pub async fn buy(&mut self, id: usize) -> Effect {
        let resolved = self
            .dispatch(Effect::model("shop.purchase").param("id", id).into())
            .await;
        if !self.game.shop.is_open() && self.game.phase == GamePhase::Shopping {
            self.game.phase = GamePhase::Idle;
        }
        resolved
    }

    /// Pay for new offers
    pub async fn refresh(&mut self) -> Effect {
        self.step("shop.refresh").await
    }

    /// Pay final scores and report the result
    async fn game_over(&mut self) {
        self.step("shop.close").await;
        self.step("board.finalScore").await;
        let money = self.game.money();
        log::info!("Game over: final money {money}");
        self.dispatch(Effect::view("game.over").param("money", money).into())
            .await;
        self.game.phase = GamePhase::Over;
    }
}
