//! The shop between rolls
//!
//! Closed while the board rolls; opened with a fresh set of offers after
//! scoring. A visit allows `buy_count` purchases and, unless a refresh
//! symbol was played this turn, a single refresh.

use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;

use super::inventory::Inventory;
use crate::catalog::Catalog;
use crate::consts::{LUCK, MONEY};
use crate::effect::Effect;
use crate::serial;
use crate::settings::Settings;
use crate::symbol::{Category, Cost, SymbolRef, cost_of};

/// Categories never offered
const BANNED: &[Category] = &[Category::Unbuyable];

/// One purchasable slot
#[derive(Debug, Clone)]
pub struct Offer {
    pub symbol: SymbolRef,
    pub cost: Cost,
    /// Affordability when the shop opened; not rechecked after other
    /// purchases in the same visit
    pub can_buy: bool,
}

#[derive(Debug)]
pub struct Shop {
    catalog: Rc<Catalog>,
    is_open: bool,
    offers: BTreeMap<usize, Offer>,

    buy_lines: usize,
    base_buy_lines: usize,
    buy_count: u32,
    base_buy_count: u32,

    refresh_cost: i64,
    refresh_count: u32,
    refresh_base_cost: i64,
    refresh_increment: i64,
    refresh_factor: f64,
    refresh_wealth_rate: f64,
    /// Granted by a board symbol: unlimited refreshes this visit
    have_refresh_symbol: bool,
}

impl Shop {
    pub fn new(catalog: Rc<Catalog>, settings: &Settings) -> Self {
        Self {
            catalog,
            is_open: false,
            offers: BTreeMap::new(),
            buy_lines: settings.buy_lines,
            base_buy_lines: settings.buy_lines,
            buy_count: settings.buy_count,
            base_buy_count: settings.buy_count,
            refresh_cost: settings.refresh_base_cost,
            refresh_count: 0,
            refresh_base_cost: settings.refresh_base_cost,
            refresh_increment: settings.refresh_increment,
            refresh_factor: settings.refresh_factor,
            refresh_wealth_rate: settings.refresh_wealth_rate,
            have_refresh_symbol: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn offers(&self) -> &BTreeMap<usize, Offer> {
        &self.offers
    }

    pub fn buy_count(&self) -> u32 {
        self.buy_count
    }

    pub fn refresh_cost(&self) -> i64 {
        self.refresh_cost
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    pub fn has_refresh_symbol(&self) -> bool {
        self.have_refresh_symbol
    }

    /// A refresh is on offer with the symbol, or until the first refresh
    pub fn refresh_available(&self) -> bool {
        self.have_refresh_symbol || self.refresh_count == 0
    }

    /// Open with `buy_lines` offers. No-op when no purchases are left.
    pub fn open(&mut self, inventory: &Inventory, rng: &mut impl Rng) -> Effect {
        if self.buy_count == 0 {
            log::debug!("Shop stays closed: no purchases left");
            return Effect::none();
        }
        self.is_open = true;
        self.offers.clear();

        let luck = inventory.get_resource(LUCK);
        let bag = self
            .catalog
            .generate_shop(rng, self.buy_lines, luck, false, BANNED);
        if bag.is_empty() {
            return Effect::view("shop.open").into();
        }

        let mut lanes: Vec<Effect> = Vec::with_capacity(self.buy_lines + 1);
        for id in 0..self.buy_lines {
            let symbol = bag[rng.random_range(0..bag.len())].copy();
            let cost = symbol.borrow().cost();
            let can_buy = inventory.can_afford(&cost);
            lanes.push(
                Effect::view("shop.showOffer")
                    .param("id", id)
                    .param("symbol", &symbol)
                    .param("cost", cost.clone())
                    .param("canBuy", can_buy)
                    .into(),
            );
            self.offers.insert(
                id,
                Offer {
                    symbol,
                    cost,
                    can_buy,
                },
            );
        }
        if self.refresh_available() {
            lanes.push(
                Effect::view("shop.showRefresh")
                    .param("cost", self.refresh_cost)
                    .param("canBuy", inventory.get_resource(MONEY) >= self.refresh_cost)
                    .into(),
            );
        }
        serial![Effect::view("shop.open"), Effect::parallel(lanes)]
    }

    /// Close the shop and reset it for the next visit.
    ///
    /// The next visit's first refresh costs a share of current money.
    pub fn close(&mut self, inventory: &Inventory) -> Effect {
        let was_open = std::mem::replace(&mut self.is_open, false);
        self.offers.clear();
        self.have_refresh_symbol = false;
        self.refresh_count = 0;
        let wealth = inventory.get_resource(MONEY) as f64 * self.refresh_wealth_rate;
        self.refresh_cost = self.refresh_base_cost.max(wealth.round() as i64);
        self.buy_count = self.base_buy_count;
        self.buy_lines = self.base_buy_lines;
        if was_open {
            Effect::view("shop.close").into()
        } else {
            Effect::none()
        }
    }

    /// Buy the offer in slot `id`.
    ///
    /// Not being able to pay is a normal outcome and yields no effect. On
    /// success the tree pays, adds the symbol, runs its buy hook and closes
    /// the shop once the last purchase is used up.
    pub fn attempt_purchase(&mut self, id: usize, inventory: &mut Inventory) -> Effect {
        if !self.is_open || self.buy_count == 0 {
            log::debug!("Purchase {id} rejected: shop closed");
            return Effect::none();
        }
        let Some(offer) = self.offers.get(&id) else {
            log::debug!("Purchase {id} rejected: no such offer");
            return Effect::none();
        };
        if !inventory.can_afford(&offer.cost) {
            log::debug!("Purchase {id} rejected: cannot afford {}", offer.symbol.emoji());
            return Effect::none();
        }
        let Some(offer) = self.offers.remove(&id) else {
            return Effect::none();
        };

        let payments: Vec<Effect> = offer
            .cost
            .iter()
            .map(|(key, amount)| inventory.add_resource(key, -amount))
            .collect();
        self.buy_count -= 1;
        log::info!("Bought {} for {:?}", offer.symbol.emoji(), offer.cost);

        let on_buy = offer.symbol.borrow_mut().on_buy();
        let closing = if self.buy_count == 0 {
            Effect::model("shop.close").into()
        } else {
            Effect::none()
        };
        serial![
            Effect::serial(payments),
            Effect::view("shop.sold").param("id", id),
            Effect::model("inventory.add").param("symbol", offer.symbol),
            on_buy,
            closing,
        ]
    }

    /// Pay for a fresh set of offers.
    ///
    /// The cost grows by a fixed step and then a factor on every refresh.
    pub fn attempt_refresh(&mut self, inventory: &mut Inventory, rng: &mut impl Rng) -> Effect {
        if !self.is_open || !self.refresh_available() {
            log::debug!("Refresh rejected: none available");
            return Effect::none();
        }
        let price = cost_of(&[(MONEY, self.refresh_cost)]);
        if !inventory.can_afford(&price) {
            log::debug!("Refresh rejected: cannot afford {}", self.refresh_cost);
            return Effect::none();
        }
        let paid = inventory.add_resource(MONEY, -self.refresh_cost);
        self.refresh_count += 1;
        let next = (self.refresh_cost + self.refresh_increment) as f64 * self.refresh_factor;
        self.refresh_cost = next.ceil() as i64;
        log::debug!("Refresh #{} done, next costs {}", self.refresh_count, self.refresh_cost);
        serial![paid, self.open(inventory, rng)]
    }

    /// A board symbol waives the one-refresh limit until the shop closes
    pub fn grant_refresh(&mut self) -> Effect {
        self.have_refresh_symbol = true;
        Effect::none()
    }

    /// More purchases, this visit and every visit after
    pub fn add_buy_count(&mut self, value: u32) -> Effect {
        self.base_buy_count += value;
        self.buy_count += value;
        Effect::view("shop.buyCount")
            .param("value", self.buy_count)
            .into()
    }
}
