//! Per-cell Wumpus probabilities for the moving-hazard variant.

use crate::world::components::{Direction, Point};
use std::collections::BTreeSet;

/// Dense grid of Wumpus probabilities, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WumpusBelief {
    size: usize,
    probs: Vec<f64>,
}

impl WumpusBelief {
    /// Spreads `alive` Wumpuses uniformly over every cell except `start`.
    #[must_use]
    pub fn new(size: usize, start: Point, alive: usize) -> Self {
        let cells = size * size;
        #[allow(clippy::cast_precision_loss)]
        let p = if cells > 1 {
            alive as f64 / (cells - 1) as f64
        } else {
            0.0
        };
        let mut probs = vec![p.min(1.0); cells];
        if start.in_bounds(size) {
            probs[start.index(size)] = 0.0;
        }
        Self { size, probs }
    }

    pub fn get(&self, cell: Point) -> f64 {
        if cell.in_bounds(self.size) {
            self.probs[cell.index(self.size)]
        } else {
            0.0
        }
    }

    pub fn set(&mut self, cell: Point, p: f64) {
        if cell.in_bounds(self.size) {
            self.probs[cell.index(self.size)] = p;
        }
    }

    /// Total probability mass, i.e. the expected number of live Wumpuses.
    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Folds one observation at `cell` into the grid.
    ///
    /// The agent stands on `cell`, so it holds no Wumpus. Without stench every
    /// neighbour is cleared; with stench the neighbours that are not `known_free`
    /// are scaled by `boost`.
    pub fn observe(&mut self, cell: Point, stench: bool, boost: f64, known_free: &BTreeSet<Point>) {
        self.set(cell, 0.0);
        for (n, _) in cell.neighbours(self.size) {
            if !stench || known_free.contains(&n) {
                self.set(n, 0.0);
            } else {
                let idx = n.index(self.size);
                self.probs[idx] *= boost;
            }
        }
    }

    /// Rescales so proven cells hold exactly one and the remaining cells share
    /// `alive − |proven|`. A cell scaled past one is pinned there and the excess
    /// goes to the cells still below the cap.
    pub fn normalize(&mut self, alive: usize, proven: &BTreeSet<Point>) {
        let proven_here = proven.iter().filter(|p| p.in_bounds(self.size)).count();
        #[allow(clippy::cast_precision_loss)]
        let mut target = alive.saturating_sub(proven_here) as f64;

        let mut open = Vec::with_capacity(self.probs.len());
        for (i, p) in self.probs.iter_mut().enumerate() {
            if proven.contains(&Point::from_index(i, self.size)) {
                *p = 1.0;
            } else if *p > 0.0 {
                open.push(i);
            }
        }

        loop {
            let mass: f64 = open.iter().map(|&i| self.probs[i]).sum();
            if mass <= f64::EPSILON {
                return;
            }
            let scale = target.max(0.0) / mass;
            let (capped, below): (Vec<usize>, Vec<usize>) =
                open.iter().partition(|&&i| self.probs[i] * scale >= 1.0);
            if capped.is_empty() {
                for &i in &below {
                    self.probs[i] *= scale;
                }
                return;
            }
            for &i in &capped {
                self.probs[i] = 1.0;
            }
            #[allow(clippy::cast_precision_loss)]
            let pinned = capped.len() as f64;
            target -= pinned;
            open = below;
        }
    }

    /// One random-walk step: every cell sends a quarter of its mass to each
    /// neighbour. Shares aimed at a wall or a `blocked` cell stay where they are,
    /// so the total is unchanged.
    pub fn diffuse<F: Fn(Point) -> bool>(&mut self, blocked: F) {
        let mut next = vec![0.0; self.probs.len()];
        for (i, &p) in self.probs.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            let from = Point::from_index(i, self.size);
            let share = p / 4.0;
            for direction in Direction::ALL {
                let to = from + direction.vector();
                if to.in_bounds(self.size) && !blocked(to) {
                    next[to.index(self.size)] += share;
                } else {
                    next[i] += share;
                }
            }
        }
        self.probs = next;
    }

    /// `grid[y][x]`, for snapshots.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.probs.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}
