//! Emoji Slots - native idle-mode demo
//!
//! Plays one run headlessly with an auto-buyer and prints the board after
//! every roll.
//!
//! Usage: `emoji-slots [settings.json] [seed]`

use std::rc::Rc;

use emoji_slots::consts::MONEY;
use emoji_slots::sim::GamePhase;
use emoji_slots::view::LogView;
use emoji_slots::{Session, Settings, SettingsError};
use futures::executor::block_on;

/// Cheapest offer the player can pay for right now
fn pick_offer(session: &Session) -> Option<usize> {
    let game = session.game();
    game.shop
        .offers()
        .iter()
        .filter(|(_, offer)| game.inventory.can_afford(&offer.cost))
        .min_by_key(|(_, offer)| offer.cost.get(MONEY).copied().unwrap_or(0))
        .map(|(id, _)| *id)
}

async fn play(session: &mut Session, view: &LogView) {
    let mut turn = 0;
    while !session.is_over() {
        turn += 1;
        let phase = session.roll().await;
        println!(
            "Turn {turn}: 💵{} ⏳{}\n{}\n",
            session.game().money(),
            session.game().turns_left(),
            view.render()
        );
        if phase != GamePhase::Shopping {
            continue;
        }
        while let Some(id) = pick_offer(session) {
            let emoji = session.game().shop.offers()[&id].symbol.emoji();
            log::info!("Auto-buying {emoji}");
            session.buy(id).await;
            if session.phase() != GamePhase::Shopping {
                break;
            }
        }
    }
}

fn main() -> Result<(), SettingsError> {
    env_logger::init();
    log::info!("Emoji Slots (native) starting...");

    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
        settings = settings.with_seed(seed);
    }
    log::info!("Game initialized with seed: {}", settings.seed);

    let view = Rc::new(LogView::new(settings.animations));
    let mut session = Session::with_view(&settings, view.clone())?;
    block_on(play(&mut session, &view));

    println!(
        "Final money: 💵{}",
        view.final_money().unwrap_or_else(|| session.game().money())
    );
    println!("Animation time: {} ms over {} effects", view.elapsed_ms(), view.played());
    Ok(())
}
