//! The slot board
//!
//! A grid of symbol references plus off-grid passive slots. Every on-grid
//! coordinate always holds a symbol; empty space is a symbol too.

use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;

use super::inventory::Inventory;
use crate::catalog::Catalog;
use crate::consts::PASSIVE_X;
use crate::effect::Effect;
use crate::error::DispatchError;
use crate::serial;
use crate::symbol::roster::{EMPTY, Empty, HOLE};
use crate::symbol::{Category, Symbol, SymbolRef};

/// How long a cell stays locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDuration {
    /// Counts down once per roll; the cell unlocks when it reaches zero
    Rolls(u32),
    /// Stays until explicitly unlocked
    Forever,
}

impl LockDuration {
    /// Negative durations mean forever
    pub fn from_signed(duration: i64) -> Self {
        if duration < 0 {
            LockDuration::Forever
        } else {
            LockDuration::Rolls(u32::try_from(duration).unwrap_or(u32::MAX))
        }
    }

    pub fn as_signed(&self) -> i64 {
        match self {
            LockDuration::Rolls(n) => i64::from(*n),
            LockDuration::Forever => -1,
        }
    }
}

/// A cell held in place across rolls
#[derive(Debug, Clone, PartialEq)]
pub struct LockedCell {
    pub symbol: SymbolRef,
    pub duration: LockDuration,
}

/// Which hook a snapshot entry should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Consume,
    Produce,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Consume => "consume",
            Pass::Produce => "produce",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consume" => Some(Pass::Consume),
            "produce" => Some(Pass::Produce),
            _ => None,
        }
    }
}

/// The grid and its passive slots
#[derive(Debug)]
pub struct Board {
    catalog: Rc<Catalog>,
    columns: usize,
    /// Rows currently in play; `cells` may hold more (hidden) rows
    current_rows: usize,
    /// `cells[y][x]`
    cells: Vec<Vec<SymbolRef>>,
    locked: BTreeMap<(usize, usize), LockedCell>,
    passives: Vec<SymbolRef>,
}

impl Board {
    pub fn new(catalog: Rc<Catalog>, columns: usize, rows: usize) -> Self {
        let mut board = Self {
            catalog,
            columns,
            current_rows: 0,
            cells: Vec::new(),
            locked: BTreeMap::new(),
            passives: Vec::new(),
        };
        board.resize(rows);
        board
    }

    fn empty(&self) -> SymbolRef {
        self.catalog
            .symbol(EMPTY)
            .unwrap_or_else(|_| SymbolRef::new(Symbol::new(Empty)))
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn current_rows(&self) -> usize {
        self.current_rows
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Grid index for an on-board coordinate in play
    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.columns && y < self.current_rows).then_some((x, y))
    }

    fn index_or_err(&self, x: i32, y: i32) -> Result<(usize, usize), DispatchError> {
        self.index(x, y).ok_or(DispatchError::OutOfBounds { x, y })
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&SymbolRef> {
        self.index(x, y).map(|(x, y)| &self.cells[y][x])
    }

    pub fn passives(&self) -> &[SymbolRef] {
        &self.passives
    }

    /// Cells in play, row-major
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &SymbolRef)> {
        self.cells
            .iter()
            .take(self.current_rows)
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(x, symbol)| (x as i32, y as i32, symbol))
            })
    }

    /// Passives (addressed as `x = PASSIVE_X, y = slot`) then cells,
    /// row-major. Hooks run over this order.
    pub fn snapshot(&self) -> Vec<(SymbolRef, i32, i32)> {
        let passives = self
            .passives
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), PASSIVE_X, i as i32));
        let cells = self.iter().map(|(x, y, s)| (s.clone(), x, y));
        passives.chain(cells).collect()
    }

    /// Whether `(x, y)` still holds this exact instance
    pub fn holds(&self, x: i32, y: i32, symbol: &SymbolRef) -> bool {
        if x == PASSIVE_X {
            return self.passives.iter().any(|s| s.ptr_eq(symbol));
        }
        self.get(x, y).is_some_and(|s| s.ptr_eq(symbol))
    }

    /// Emojis of the cells in play, row-major
    pub fn emojis(&self) -> Vec<&'static str> {
        self.iter().map(|(_, _, s)| s.emoji()).collect()
    }

    /// Grow or shrink the rows in play. Growing appends empty rows;
    /// shrinking keeps hidden rows so they come back unchanged.
    pub fn resize(&mut self, rows: usize) {
        while self.cells.len() < rows {
            let row = (0..self.columns).map(|_| self.empty()).collect();
            self.cells.push(row);
        }
        self.current_rows = rows;
    }

    pub fn is_locked(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|key| self.locked.contains_key(&key))
    }

    pub fn lock_of(&self, x: i32, y: i32) -> Option<&LockedCell> {
        self.index(x, y).and_then(|key| self.locked.get(&key))
    }

    /// Lock a cell to `symbol`, placing it there
    pub fn lock(
        &mut self,
        x: i32,
        y: i32,
        symbol: SymbolRef,
        duration: LockDuration,
    ) -> Result<Effect, DispatchError> {
        let (cx, cy) = self.index_or_err(x, y)?;
        if duration == LockDuration::Rolls(0) {
            return Ok(self.unlock(x, y));
        }
        self.cells[cy][cx] = symbol.clone();
        self.locked
            .insert((cx, cy), LockedCell { symbol, duration });
        Ok(Effect::view("board.lock")
            .at(x, y)
            .param("duration", duration.as_signed())
            .into())
    }

    /// Lock a cell to whatever occupies it now
    pub fn lock_cell(
        &mut self,
        x: i32,
        y: i32,
        duration: LockDuration,
    ) -> Result<Effect, DispatchError> {
        let occupant = self
            .get(x, y)
            .cloned()
            .ok_or(DispatchError::OutOfBounds { x, y })?;
        self.lock(x, y, occupant, duration)
    }

    /// Lock a cell to its occupant forever, with a pin marker
    pub fn pin_cell(&mut self, x: i32, y: i32) -> Result<Effect, DispatchError> {
        self.lock_cell(x, y, LockDuration::Forever)?;
        Ok(Effect::view("board.pin").at(x, y).into())
    }

    pub fn unlock(&mut self, x: i32, y: i32) -> Effect {
        let removed = self
            .index(x, y)
            .and_then(|key| self.locked.remove(&key));
        match removed {
            Some(_) => Effect::view("board.unlock").at(x, y).into(),
            None => Effect::none(),
        }
    }

    /// Roll the board.
    ///
    /// Locked cells keep their symbol. Every other cell is emptied, then
    /// owned symbols that are not already locked in place are dealt onto
    /// random empty cells until either runs out.
    pub fn roll(&mut self, inventory: &Inventory, rng: &mut impl Rng) -> Effect {
        // Locked symbols need not be owned, so reset those too
        let locked = self.locked.values().map(|lock| &lock.symbol);
        for symbol in inventory.symbols().iter().chain(&self.passives).chain(locked) {
            symbol.borrow_mut().reset();
        }
        if inventory.row_count() != self.current_rows {
            log::debug!(
                "Board rows {} -> {}",
                self.current_rows,
                inventory.row_count()
            );
            self.resize(inventory.row_count());
        }

        let mut placed: Vec<SymbolRef> = Vec::new();
        let mut open: Vec<(usize, usize)> = Vec::new();
        for y in 0..self.current_rows {
            for x in 0..self.columns {
                match self.locked.get(&(x, y)) {
                    Some(lock) => {
                        self.cells[y][x] = lock.symbol.clone();
                        placed.push(lock.symbol.clone());
                    }
                    None => {
                        self.cells[y][x] = self.empty();
                        open.push((x, y));
                    }
                }
            }
        }

        // Count down the locks in play
        let rows = self.current_rows;
        self.locked.retain(|&(_, y), lock| {
            if y >= rows {
                return true;
            }
            match &mut lock.duration {
                LockDuration::Forever => true,
                LockDuration::Rolls(n) => {
                    *n = n.saturating_sub(1);
                    *n > 0
                }
            }
        });

        let mut pool: Vec<SymbolRef> = inventory
            .symbols()
            .iter()
            .filter(|s| !placed.iter().any(|p| p.ptr_eq(s)))
            .cloned()
            .collect();

        let mut filled: Vec<(usize, usize)> = Vec::with_capacity(open.len());
        let mut empty_cells = open;
        while !pool.is_empty() && !empty_cells.is_empty() {
            let symbol = pool.swap_remove(rng.random_range(0..pool.len()));
            let (x, y) = empty_cells.swap_remove(rng.random_range(0..empty_cells.len()));
            self.cells[y][x] = symbol;
            filled.push((x, y));
        }
        filled.sort_by_key(|&(x, y)| (y, x));
        empty_cells.sort_by_key(|&(x, y)| (y, x));

        let mut spins: Vec<Effect> = Vec::with_capacity(filled.len() + empty_cells.len());
        for (x, y) in filled {
            spins.push(
                Effect::view("board.spin")
                    .at(x as i32, y as i32)
                    .param("symbol", &self.cells[y][x])
                    .param("teaser", inventory.random_owned_emoji(rng))
                    .into(),
            );
        }
        // Cells left empty just clear
        for (x, y) in empty_cells {
            spins.push(Effect::view("board.removeSymbol").at(x as i32, y as i32).into());
        }
        Effect::parallel(spins)
    }

    /// Age every symbol in play. Empty space does not age.
    pub fn age(&mut self) {
        for (symbol, _, _) in self.snapshot() {
            if symbol.has_category(Category::EmptySpace) {
                continue;
            }
            symbol.borrow_mut().turns += 1;
        }
    }

    /// Age the board, then queue the consume / produce / consume passes.
    ///
    /// Each pass is its own `board.evaluatePass` leaf, so it snapshots the
    /// board only once the pass before it has fully resolved.
    pub fn evaluate(&mut self) -> Effect {
        self.age();
        let pass = |pass: Pass| Effect::model("board.evaluatePass").param("pass", pass.as_str());
        serial![pass(Pass::Consume), pass(Pass::Produce), pass(Pass::Consume)]
    }

    /// One pass: a serial run of `board.evaluateSymbol` leaves over the
    /// board as it stands now. A leaf whose cell has changed hands by the
    /// time it runs is skipped.
    pub fn evaluate_pass(&self, pass: Pass) -> Effect {
        let leaves = self
            .snapshot()
            .into_iter()
            .map(|(symbol, x, y)| {
                Effect::from(
                    Effect::model("board.evaluateSymbol")
                        .at(x, y)
                        .param("symbol", symbol)
                        .param("pass", pass.as_str()),
                )
            })
            .collect();
        Effect::serial(leaves)
    }

    /// Up to eight neighbors of `(x, y)` within the rows in play.
    /// Passive slots have no neighbors.
    pub fn next_to_coords(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        if x < 0 || y < 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if self.index(nx, ny).is_some() {
                    out.push((nx, ny));
                }
            }
        }
        out
    }

    /// Neighbors matching a predicate
    pub fn next_to_expr(
        &self,
        x: i32,
        y: i32,
        pred: impl Fn(&SymbolRef) -> bool,
    ) -> Vec<(i32, i32)> {
        self.next_to_coords(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.get(nx, ny).is_some_and(&pred))
            .collect()
    }

    /// Neighbors showing this emoji
    pub fn next_to_symbol(&self, x: i32, y: i32, emoji: &str) -> Vec<(i32, i32)> {
        self.next_to_expr(x, y, |s| s.emoji() == emoji)
    }

    /// Neighbors in a category, per the catalog's index
    pub fn next_to_category(&self, x: i32, y: i32, category: Category) -> Vec<(i32, i32)> {
        self.next_to_expr(x, y, |s| self.catalog.in_category(s.emoji(), category))
    }

    /// Put a symbol into the inventory and onto the board.
    ///
    /// `x = PASSIVE_X` adds it as a passive. Landing on a hole leaves the
    /// hole in place: the newcomer shows up, then the hole comes back.
    pub fn add_symbol(
        &mut self,
        inventory: &mut Inventory,
        symbol: SymbolRef,
        x: i32,
        y: i32,
    ) -> Result<Effect, DispatchError> {
        if x == PASSIVE_X {
            self.passives.push(symbol.clone());
            let owned = inventory.add(symbol.clone());
            return Ok(serial![
                owned,
                Effect::view("board.addPassive").param("symbol", symbol),
            ]);
        }
        let (cx, cy) = self.index_or_err(x, y)?;
        let owned = inventory.add(symbol.clone());
        let occupant = self.cells[cy][cx].clone();
        let shown = Effect::view("board.addSymbol")
            .at(x, y)
            .param("symbol", &symbol);
        if occupant.emoji() == HOLE {
            return Ok(serial![
                owned,
                shown,
                Effect::view("board.addSymbol")
                    .at(x, y)
                    .param("symbol", &occupant),
            ]);
        }
        if let Some(lock) = self.locked.get_mut(&(cx, cy)) {
            lock.symbol = symbol.clone();
        }
        self.cells[cy][cx] = symbol;
        Ok(serial![owned, shown])
    }

    /// Take the symbol at `(x, y)` out of the inventory and off the board.
    /// A hole cannot be removed; the cell and its lock stay as they are.
    pub fn remove_symbol(
        &mut self,
        inventory: &mut Inventory,
        x: i32,
        y: i32,
    ) -> Result<Effect, DispatchError> {
        let (cx, cy) = self.index_or_err(x, y)?;
        if self.cells[cy][cx].emoji() == HOLE {
            log::debug!("Hole at ({x}, {y}) stays");
            return Ok(Effect::none());
        }
        let empty = self.empty();
        let symbol = std::mem::replace(&mut self.cells[cy][cx], empty);
        self.locked.remove(&(cx, cy));
        let owned = inventory.remove(&symbol);
        Ok(serial![
            owned,
            Effect::view("board.removeSymbol")
                .at(x, y)
                .param("symbol", symbol),
        ])
    }

    /// Take a passive out of the inventory and its slot
    pub fn remove_passive(&mut self, inventory: &mut Inventory, symbol: &SymbolRef) -> Effect {
        let Some(index) = self.passives.iter().position(|s| s.ptr_eq(symbol)) else {
            return Effect::none();
        };
        let removed = self.passives.remove(index);
        serial![
            inventory.remove(&removed),
            Effect::view("board.removePassive").param("symbol", removed),
        ]
    }

    pub fn replace_symbol(
        &mut self,
        inventory: &mut Inventory,
        x: i32,
        y: i32,
        symbol: SymbolRef,
    ) -> Result<Effect, DispatchError> {
        let removed = self.remove_symbol(inventory, x, y)?;
        let added = self.add_symbol(inventory, symbol, x, y)?;
        Ok(serial![removed, added])
    }

    /// Move a board symbol into a passive slot for good, crediting one
    /// unit of the resource named after it.
    pub fn make_passive(
        &mut self,
        inventory: &mut Inventory,
        x: i32,
        y: i32,
    ) -> Result<Effect, DispatchError> {
        let original = self
            .get(x, y)
            .cloned()
            .ok_or(DispatchError::OutOfBounds { x, y })?;
        if original.emoji() == HOLE {
            return Ok(Effect::none());
        }
        let passive = original.copy();
        self.passives.push(passive.clone());
        let removed = self.remove_symbol(inventory, x, y)?;
        Ok(serial![
            removed,
            Effect::view("board.addPassive").param("symbol", passive),
            inventory.add_resource(original.emoji(), 1),
        ])
    }

    /// Scale the occupant's multiplier for this turn
    pub fn multiply(&mut self, x: i32, y: i32, factor: i64) -> Result<Effect, DispatchError> {
        let symbol = self
            .get(x, y)
            .ok_or(DispatchError::OutOfBounds { x, y })?;
        let value = {
            let mut symbol = symbol.borrow_mut();
            symbol.multiplier *= factor;
            symbol.multiplier
        };
        Ok(Effect::view("board.multiplier")
            .at(x, y)
            .param("value", value)
            .into())
    }

    /// Counter values to display, by position
    pub fn counters(&self) -> Vec<(i32, i32, i64)> {
        self.snapshot()
            .into_iter()
            .filter_map(|(symbol, x, y)| symbol.try_borrow()?.counter().map(|c| (x, y, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::roster::{Cherry, Coin, Hole};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn board(columns: usize, rows: usize) -> Board {
        Board::new(Rc::new(Catalog::standard()), columns, rows)
    }

    fn owned(inventory: &mut Inventory, emojis: &[&str]) -> Vec<SymbolRef> {
        let catalog = Catalog::standard();
        emojis
            .iter()
            .map(|e| {
                let s = catalog.symbol(e).unwrap();
                inventory.add(s.clone());
                s
            })
            .collect()
    }

    #[test]
    fn test_new_board_is_all_empty() {
        let board = board(5, 4);
        assert_eq!(board.iter().count(), 20);
        assert!(board.emojis().iter().all(|e| *e == EMPTY));
    }

    #[test]
    fn test_roll_fills_with_permutation() {
        let mut board = board(2, 2);
        let mut inventory = Inventory::new(2);
        owned(&mut inventory, &["🪙", "🍒", "🐈", "🥛"]);
        let mut rng = Pcg32::seed_from_u64(11);

        let effect = board.roll(&inventory, &mut rng);

        let mut cells = board.emojis();
        cells.sort();
        let mut expected = vec!["🪙", "🍒", "🐈", "🥛"];
        expected.sort();
        assert_eq!(cells, expected);
        assert_eq!(effect.leaves().len(), 4);
        assert!(effect.leaves().iter().all(|l| l.path() == "view.board.spin"));
    }

    #[test]
    fn test_roll_small_inventory_leaves_empty_space() {
        let mut board = board(3, 3);
        let mut inventory = Inventory::new(3);
        owned(&mut inventory, &["🪙", "🍒"]);
        let mut rng = Pcg32::seed_from_u64(5);
        let effect = board.roll(&inventory, &mut rng);
        let emojis = board.emojis();
        assert_eq!(emojis.iter().filter(|e| **e == EMPTY).count(), 7);
        let spins = effect
            .leaves()
            .iter()
            .filter(|l| l.path() == "view.board.spin")
            .count();
        assert_eq!(spins, 2);
    }

    #[test]
    fn test_roll_large_inventory_fills_every_cell() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        owned(&mut inventory, &["🪙", "🍒", "🐈", "🥛"]);
        let mut rng = Pcg32::seed_from_u64(5);
        board.roll(&inventory, &mut rng);
        assert!(board.emojis().iter().all(|e| *e != EMPTY));
    }

    #[test]
    fn test_lock_countdown() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coins = owned(&mut inventory, &["🪙"]);
        let mut rng = Pcg32::seed_from_u64(1);

        let cherry = SymbolRef::new(Symbol::new(Cherry));
        board.lock(0, 0, cherry.clone(), LockDuration::Rolls(3)).unwrap();

        for roll in 1..=3 {
            board.roll(&inventory, &mut rng);
            assert!(board.get(0, 0).unwrap().ptr_eq(&cherry), "roll {roll}");
            assert!(board.get(1, 0).unwrap().ptr_eq(&coins[0]));
        }
        assert!(!board.is_locked(0, 0));

        // Free again: the coin may land anywhere, the cherry is gone
        board.roll(&inventory, &mut rng);
        assert!(board.iter().all(|(_, _, s)| !s.ptr_eq(&cherry)));
    }

    #[test]
    fn test_lock_forever() {
        let mut board = board(2, 1);
        let inventory = Inventory::new(1);
        let mut rng = Pcg32::seed_from_u64(1);
        let hole = SymbolRef::new(Symbol::new(Hole));
        board.lock(1, 0, hole.clone(), LockDuration::Forever).unwrap();
        for _ in 0..10 {
            board.roll(&inventory, &mut rng);
        }
        assert!(board.is_locked(1, 0));
        assert!(board.get(1, 0).unwrap().ptr_eq(&hole));
        assert_eq!(LockDuration::from_signed(-1), LockDuration::Forever);
    }

    #[test]
    fn test_locked_owned_symbol_not_dealt_twice() {
        let mut board = board(3, 1);
        let mut inventory = Inventory::new(1);
        let symbols = owned(&mut inventory, &["🪙", "🍒"]);
        let mut rng = Pcg32::seed_from_u64(9);
        board.lock(2, 0, symbols[0].clone(), LockDuration::Forever).unwrap();
        for _ in 0..5 {
            board.roll(&inventory, &mut rng);
            let coins = board.iter().filter(|(_, _, s)| s.ptr_eq(&symbols[0])).count();
            assert_eq!(coins, 1);
        }
    }

    #[test]
    fn test_next_to_coords_bounds() {
        let board = board(5, 4);
        assert_eq!(board.next_to_coords(0, 0).len(), 3);
        assert_eq!(board.next_to_coords(2, 2).len(), 8);
        assert_eq!(board.next_to_coords(4, 3).len(), 3);
        assert!(board.next_to_coords(PASSIVE_X, 0).is_empty());
        assert!(board.next_to_coords(0, -1).is_empty());
    }

    #[test]
    fn test_next_to_uses_current_rows() {
        let mut board = board(3, 3);
        board.resize(1);
        assert_eq!(board.next_to_coords(1, 0).len(), 2);
        board.resize(3);
        assert_eq!(board.next_to_coords(1, 0).len(), 5);
    }

    #[test]
    fn test_next_to_symbol() {
        let mut board = board(3, 3);
        let mut inventory = Inventory::new(3);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin, 1, 2).unwrap();
        assert_eq!(board.next_to_symbol(1, 1, "🪙"), vec![(1, 2)]);
        assert!(board.next_to_symbol(1, 1, "🍒").is_empty());
        assert_eq!(board.next_to_category(1, 1, Category::Money), vec![(1, 2)]);
    }

    #[test]
    fn test_shrink_keeps_hidden_rows() {
        let mut board = board(2, 2);
        let mut inventory = Inventory::new(2);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 0, 1).unwrap();
        board.resize(1);
        assert!(board.get(0, 1).is_none());
        assert_eq!(board.iter().count(), 2);
        board.resize(3);
        assert!(board.get(0, 1).unwrap().ptr_eq(&coin));
        assert_eq!(board.get(0, 2).unwrap().emoji(), EMPTY);
    }

    #[test]
    fn test_add_onto_hole_keeps_hole() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let hole = SymbolRef::new(Symbol::new(Hole));
        board.lock(0, 0, hole.clone(), LockDuration::Forever).unwrap();

        let coin = SymbolRef::new(Symbol::new(Coin));
        let effect = board.add_symbol(&mut inventory, coin.clone(), 0, 0).unwrap();

        assert!(board.get(0, 0).unwrap().ptr_eq(&hole));
        assert!(inventory.owns(&coin));
        let shown: Vec<String> = effect
            .leaves()
            .iter()
            .filter(|l| l.path() == "view.board.addSymbol")
            .map(|l| l.params.symbol("symbol").unwrap().emoji().to_string())
            .collect();
        assert_eq!(shown, vec!["🪙".to_string(), HOLE.to_string()]);
    }

    #[test]
    fn test_remove_symbol() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 1, 0).unwrap();
        let effect = board.remove_symbol(&mut inventory, 1, 0).unwrap();
        assert_eq!(board.get(1, 0).unwrap().emoji(), EMPTY);
        assert!(!inventory.owns(&coin));
        assert!(effect.contains("view.inventory.updateCount"));
        assert!(effect.contains("view.board.removeSymbol"));
        assert!(matches!(
            board.remove_symbol(&mut inventory, 5, 0),
            Err(DispatchError::OutOfBounds { x: 5, y: 0 })
        ));
    }

    #[test]
    fn test_make_passive() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 0, 0).unwrap();
        board.make_passive(&mut inventory, 0, 0).unwrap();

        assert_eq!(board.passives().len(), 1);
        assert!(!board.passives()[0].ptr_eq(&coin));
        assert_eq!(board.get(0, 0).unwrap().emoji(), EMPTY);
        assert_eq!(inventory.get_resource("🪙"), 1);
        assert!(board.holds(PASSIVE_X, 0, &board.passives()[0].clone()));
    }

    #[test]
    fn test_pin_cell() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 1, 0).unwrap();
        let effect = board.pin_cell(1, 0).unwrap();
        assert!(effect.contains("view.board.pin"));
        assert_eq!(board.lock_of(1, 0).unwrap().duration, LockDuration::Forever);
        assert!(board.lock_of(1, 0).unwrap().symbol.ptr_eq(&coin));
    }

    #[test]
    fn test_evaluate_ages_and_queues_three_passes() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 0, 0).unwrap();

        let effect = board.evaluate();
        assert_eq!(coin.borrow().turns, 1);
        assert_eq!(board.get(1, 0).unwrap().borrow().turns, 0);

        let passes: Vec<String> = effect
            .leaves()
            .iter()
            .inspect(|l| assert_eq!(l.path(), "model.board.evaluatePass"))
            .map(|l| l.params.str("pass").unwrap().to_string())
            .collect();
        assert_eq!(passes, vec!["consume", "produce", "consume"]);
    }

    #[test]
    fn test_evaluate_pass_snapshots_when_run() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 0, 0).unwrap();
        let before = board.evaluate_pass(Pass::Produce);

        let cherry = SymbolRef::new(Symbol::new(Cherry));
        board.add_symbol(&mut inventory, cherry.clone(), 1, 0).unwrap();
        let after = board.evaluate_pass(Pass::Produce);

        let queued = |effect: &Effect| -> Vec<String> {
            effect
                .leaves()
                .iter()
                .map(|l| l.params.symbol("symbol").unwrap().emoji().to_string())
                .collect()
        };
        assert_eq!(queued(&before), vec!["🪙".to_string(), EMPTY.to_string()]);
        assert_eq!(queued(&after), vec!["🪙".to_string(), "🍒".to_string()]);
    }

    #[test]
    fn test_roll_resets_unowned_locked_symbol() {
        let mut board = board(2, 1);
        let inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.lock(0, 0, coin.clone(), LockDuration::Forever).unwrap();
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..4 {
            board.multiply(0, 0, 2).unwrap();
            assert_eq!(coin.borrow().multiplier, 2);
            board.roll(&inventory, &mut rng);
            assert_eq!(coin.borrow().multiplier, 1);
        }
    }

    #[test]
    fn test_remove_hole_keeps_hole() {
        let mut board = board(2, 1);
        let mut inventory = Inventory::new(1);
        let hole = SymbolRef::new(Symbol::new(Hole));
        board.lock(0, 0, hole.clone(), LockDuration::Forever).unwrap();

        let removed = board.remove_symbol(&mut inventory, 0, 0).unwrap();
        assert!(removed.is_none());
        assert!(board.get(0, 0).unwrap().ptr_eq(&hole));
        assert!(board.is_locked(0, 0));

        let coin = SymbolRef::new(Symbol::new(Coin));
        board.replace_symbol(&mut inventory, 0, 0, coin.clone()).unwrap();
        assert!(board.get(0, 0).unwrap().ptr_eq(&hole));
        assert!(board.make_passive(&mut inventory, 0, 0).unwrap().is_none());
        assert!(board.passives().is_empty());
    }

    #[test]
    fn test_multiply_and_reset_on_roll() {
        let mut board = board(1, 1);
        let mut inventory = Inventory::new(1);
        let coin = SymbolRef::new(Symbol::new(Coin));
        board.add_symbol(&mut inventory, coin.clone(), 0, 0).unwrap();
        board.multiply(0, 0, 2).unwrap();
        board.multiply(0, 0, 3).unwrap();
        assert_eq!(coin.borrow().multiplier, 6);

        let mut rng = Pcg32::seed_from_u64(1);
        board.roll(&inventory, &mut rng);
        assert_eq!(coin.borrow().multiplier, 1);
    }
}
