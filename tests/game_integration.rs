//! Multi-turn integration tests for a whole run.
//!
//! Run with: cargo test --release game_integration

#![allow(clippy::unwrap_used)]

use std::rc::Rc;

use emoji_slots::consts::{LUCK, MONEY};
use emoji_slots::sim::GamePhase;
use emoji_slots::view::LogView;
use emoji_slots::{Effect, Inventory, Session, Settings};
use futures::executor::block_on;

fn settings(symbols: &str, turns: i64, seed: u64) -> Settings {
    Settings {
        starting_symbols: symbols.to_string(),
        starting_turns: turns,
        seed,
        ..Settings::default()
    }
}

/// Buys the first affordable offer every visit until the run ends
fn play_out(session: &mut Session) -> usize {
    let mut rolls = 0;
    while !session.is_over() {
        rolls += 1;
        if block_on(session.roll()) != GamePhase::Shopping {
            continue;
        }
        let affordable = session
            .game()
            .shop
            .offers()
            .iter()
            .find(|(_, offer)| session.game().inventory.can_afford(&offer.cost))
            .map(|(id, _)| *id);
        if let Some(id) = affordable {
            block_on(session.buy(id));
        }
    }
    rolls
}

#[test]
fn test_full_run_ends_after_all_turns() {
    let view = Rc::new(LogView::new(false));
    let mut session =
        Session::with_view(&settings("🪙🍒🐈🥛🥚☘️", 20, 42), view.clone()).unwrap();

    let rolls = play_out(&mut session);

    assert_eq!(rolls, 20);
    assert_eq!(session.game().turns_left(), 0);
    assert_eq!(view.final_money(), Some(session.game().money()));
    assert_eq!(view.resource(MONEY), Some(session.game().money()));
    assert_eq!(view.elapsed_ms(), 0);
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut session = Session::new(&settings("🪙🍒🐈🥛🥚☘️📌🧊", 15, seed)).unwrap();
        play_out(&mut session);
        (
            session.game().money(),
            session.game().board.emojis().concat(),
            session.game().inventory.symbols().len(),
        )
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn test_luck_applies_from_next_turn() {
    let mut session = Session::new(&settings("☘️☘️☘️", 5, 1)).unwrap();
    block_on(session.roll());
    // Three clovers committed at the end of the turn
    assert_eq!(session.game().inventory.get_resource(LUCK), 3);
    assert_eq!(session.game().inventory.pending_luck(), 0);

    block_on(session.roll());
    assert_eq!(session.game().inventory.get_resource(LUCK), 3);
}

#[test]
fn test_cat_drinks_milk() {
    let mut session = Session::new(&settings("🐈🥛", 5, 9)).unwrap();
    let catalog = session.game().catalog.clone();
    let mut inventory = Inventory::new(1);
    inventory.add(catalog.symbol("🐈").unwrap());
    inventory.add(catalog.symbol("🥛").unwrap());
    session.game_mut().inventory = inventory;

    // On a 5x1 board the two may land apart, so roll until they touch
    for _ in 0..50 {
        block_on(session.dispatch(Effect::model("board.roll").into()));
        let board = &session.game().board;
        let (x, y) = board
            .iter()
            .find(|(_, _, s)| s.emoji() == "🐈")
            .map(|(x, y, _)| (x, y))
            .unwrap();
        if board.next_to_symbol(x, y, "🥛").is_empty() {
            continue;
        }
        let before = session.game().money();
        block_on(session.dispatch(Effect::model("board.evaluate").into()));
        assert_eq!(session.game().inventory.count("🥛"), 0);
        assert_eq!(session.game().inventory.graveyard().len(), 1);
        assert_eq!(session.game().money(), before + 9);
        return;
    }
    panic!("cat and milk never met");
}

#[test]
fn test_locked_coin_multiplier_resets_each_turn() {
    let settings = Settings::from_json(
        r#"{
            "columns": 2,
            "rows": 1,
            "starting_symbols": "⭐",
            "starting_money": 0,
            "initial_locks": [{"x": 0, "y": 0, "emoji": "🪙"}]
        }"#,
    )
    .unwrap();
    let mut session = Session::new(&settings).unwrap();
    let mut gains = Vec::new();
    for _ in 0..4 {
        let before = session.game().money();
        block_on(session.roll());
        gains.push(session.game().money() - before);
    }
    assert_eq!(gains, vec![2, 2, 2, 2]);
}

#[test]
fn test_hole_stays_empty() {
    let settings = Settings::from_json(
        r#"{
            "columns": 2,
            "rows": 1,
            "starting_symbols": "🪙🍒🥚",
            "initial_locks": [{"x": 0, "y": 0, "emoji": "🕳️"}]
        }"#,
    )
    .unwrap();
    let mut session = Session::new(&settings).unwrap();
    for _ in 0..5 {
        block_on(session.roll());
        assert_eq!(session.game().board.get(0, 0).unwrap().emoji(), "🕳️");
    }
}
