//! The authoritative map.
//!
//! [`World`] is the only owner of hazard and gold placement. Agents never see it
//! directly; they receive [`Percepts`] for the cell they stand on and, at the end of
//! the episode, a read-only [`WorldState`] snapshot.

use crate::config::GameConfig;
use crate::world::components::{CellContents, Direction, Marker, Percepts, Point};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info};

/// Ground truth for one episode.
#[derive(Debug, Clone)]
pub struct World {
    size: usize,
    start: Point,
    pit_probability: f64,
    wumpus_count: usize,
    cells: Vec<CellContents>,
    wumpus_locations: Vec<Point>,
    gold_locations: Vec<Point>,
    rng: fastrand::Rng,
}

/// Read-only view of a [`World`], for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldState {
    pub size: usize,
    /// Row-major, `grid[y][x]`.
    pub grid: Vec<Vec<CellContents>>,
    pub wumpus_locations: Vec<Point>,
    pub gold_locations: Vec<Point>,
    pub pit_locations: Vec<Point>,
    pub pit_probability: f64,
    pub number_of_wumpus: usize,
}

/// A Wumpus that changed cell during [`World::move_wumpuses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WumpusMove {
    pub from: Point,
    pub to: Point,
}

impl World {
    /// An empty map. Use the `place_*` methods to build a fixed layout.
    #[must_use]
    pub fn empty(size: usize, start: Point) -> Self {
        Self {
            size,
            start,
            pit_probability: 0.0,
            wumpus_count: 0,
            cells: vec![CellContents::empty(); size * size],
            wumpus_locations: Vec::new(),
            gold_locations: Vec::new(),
            rng: fastrand::Rng::with_seed(0),
        }
    }

    /// A randomly generated map following `config`.
    ///
    /// The same seed always yields the same layout and the same Wumpus walk.
    #[must_use]
    pub fn generate(config: &GameConfig, seed: u64) -> Self {
        let mut world = Self::empty(config.map_size, config.start);
        world.pit_probability = config.pit_probability;
        world.rng = fastrand::Rng::with_seed(seed);
        world.generate_map(config.wumpus_count, config.gold_count);
        world
    }

    /// Reseeds the generator used for Wumpus movement.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    fn generate_map(&mut self, wumpus_count: usize, gold_count: usize) {
        let mut cells = (0..self.size * self.size)
            .map(|i| Point::from_index(i, self.size))
            .filter(|&p| p != self.start)
            .collect_vec();
        self.rng.shuffle(&mut cells);

        for _ in 0..gold_count {
            let Some(gold) = cells.pop() else { break };
            self.place_gold(gold);
        }

        for _ in 0..wumpus_count {
            let Some(pos) = cells.pop() else { break };
            self.place_wumpus(pos);
        }

        for cell in cells {
            if self.rng.f64() < self.pit_probability {
                self.place_pit(cell);
            }
        }

        info!(
            size = self.size,
            wumpuses = self.wumpus_locations.len(),
            pits = self.pit_locations().len(),
            "generated map"
        );
    }

    /// Places a pit and marks breeze on its neighbours.
    pub fn place_pit(&mut self, pos: Point) {
        self.cell_mut(pos).insert(Marker::Pit);
        self.mark_neighbours(pos, Marker::Breeze);
    }

    /// Places a live Wumpus and marks stench on its neighbours.
    pub fn place_wumpus(&mut self, pos: Point) {
        if self.contents(pos).contains(Marker::Wumpus) {
            return;
        }
        self.cell_mut(pos).insert(Marker::Wumpus);
        self.wumpus_locations.push(pos);
        self.wumpus_count += 1;
        self.mark_neighbours(pos, Marker::Stench);
    }

    /// Places a gold piece.
    pub fn place_gold(&mut self, pos: Point) {
        if self.contents(pos).contains(Marker::Gold) {
            return;
        }
        self.cell_mut(pos).insert(Marker::Gold);
        self.gold_locations.push(pos);
    }

    fn mark_neighbours(&mut self, center: Point, marker: Marker) {
        for (adj, _) in center.neighbours(self.size) {
            self.cell_mut(adj).insert(marker);
        }
    }

    fn cell_mut(&mut self, pos: Point) -> &mut CellContents {
        let size = self.size;
        &mut self.cells[pos.index(size)]
    }

    /// Markers at `pos`. Out-of-bounds cells are empty.
    #[must_use]
    pub fn contents(&self, pos: Point) -> CellContents {
        if pos.in_bounds(self.size) {
            self.cells[pos.index(self.size)]
        } else {
            CellContents::empty()
        }
    }

    /// Percepts an agent at `pos` receives. Scream is never a cell percept.
    #[must_use]
    pub fn get_percepts(&self, pos: Point) -> Percepts {
        self.contents(pos).percepts()
    }

    #[must_use]
    pub fn has_pit(&self, pos: Point) -> bool {
        self.contents(pos).contains(Marker::Pit)
    }

    #[must_use]
    pub fn has_wumpus(&self, pos: Point) -> bool {
        self.contents(pos).contains(Marker::Wumpus)
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    #[must_use]
    pub fn wumpus_locations(&self) -> &[Point] {
        &self.wumpus_locations
    }

    #[must_use]
    pub fn gold_locations(&self) -> &[Point] {
        &self.gold_locations
    }

    #[must_use]
    pub fn pit_locations(&self) -> Vec<Point> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.contains(Marker::Pit))
            .map(|(i, _)| Point::from_index(i, self.size))
            .collect()
    }

    /// Cells an arrow crosses when fired from `from` facing `direction`, nearest first.
    #[must_use]
    pub fn arrow_path(&self, from: Point, direction: Direction) -> Vec<Point> {
        let step = direction.vector();
        let mut path = Vec::new();
        let mut pos = from + step;
        while pos.in_bounds(self.size) {
            path.push(pos);
            pos += step;
        }
        path
    }

    /// Kills the Wumpus at `pos`, if any, and clears stench no other Wumpus explains.
    pub fn kill_wumpus(&mut self, pos: Point) -> bool {
        if !self.has_wumpus(pos) {
            return false;
        }
        self.cell_mut(pos).remove(Marker::Wumpus);
        self.wumpus_locations.retain(|&w| w != pos);

        for (adj, _) in pos.neighbours(self.size) {
            let still_smelly = adj
                .neighbours(self.size)
                .any(|(n, _)| self.has_wumpus(n));
            if !still_smelly {
                self.cell_mut(adj).remove(Marker::Stench);
            }
        }

        info!(%pos, alive = self.wumpus_locations.len(), "wumpus killed");
        true
    }

    /// Clears the gold at `pos`, returning whether there was any.
    pub fn remove_gold(&mut self, pos: Point) -> bool {
        if !self.contents(pos).contains(Marker::Gold) {
            return false;
        }
        self.cell_mut(pos).remove(Marker::Gold);
        self.gold_locations.retain(|&g| g != pos);
        true
    }

    /// Every live Wumpus attempts one random cardinal step.
    ///
    /// A step is refused when it leaves the grid, enters a pit, enters a cell that
    /// held a Wumpus before this round, or targets a cell another Wumpus also
    /// targets. Stench is rebuilt from scratch afterwards.
    pub fn move_wumpuses(&mut self) -> Vec<WumpusMove> {
        let before = self.wumpus_locations.clone();

        let mut proposals = Vec::with_capacity(before.len());
        for &from in &before {
            let direction = Direction::ALL[self.rng.usize(0..Direction::ALL.len())];
            let to = from + direction.vector();
            let allowed = to.in_bounds(self.size) && !self.has_pit(to) && !before.contains(&to);
            proposals.push((from, allowed.then_some(to)));
        }

        let mut claims: FxHashMap<Point, usize> = FxHashMap::default();
        for to in proposals.iter().filter_map(|(_, to)| *to) {
            *claims.entry(to).or_default() += 1;
        }

        let mut moves = Vec::new();
        let mut after = Vec::with_capacity(before.len());
        for (from, to) in proposals {
            match to {
                Some(to) if claims.get(&to) == Some(&1) => {
                    moves.push(WumpusMove { from, to });
                    after.push(to);
                }
                _ => after.push(from),
            }
        }

        for &from in &before {
            self.cell_mut(from).remove(Marker::Wumpus);
        }
        for &to in &after {
            self.cell_mut(to).insert(Marker::Wumpus);
        }
        self.wumpus_locations = after;
        self.recompute_stench();

        debug!(moved = moves.len(), "wumpuses moved");
        moves
    }

    fn recompute_stench(&mut self) {
        for cell in &mut self.cells {
            cell.remove(Marker::Stench);
        }
        for pos in self.wumpus_locations.clone() {
            self.mark_neighbours(pos, Marker::Stench);
        }
    }

    /// Snapshot for presentation.
    #[must_use]
    pub fn get_state(&self) -> WorldState {
        WorldState {
            size: self.size,
            grid: self
                .cells
                .chunks(self.size)
                .map(<[CellContents]>::to_vec)
                .collect(),
            wumpus_locations: self.wumpus_locations.clone(),
            gold_locations: self.gold_locations.clone(),
            pit_locations: self.pit_locations(),
            pit_probability: self.pit_probability,
            number_of_wumpus: self.wumpus_count,
        }
    }
}
