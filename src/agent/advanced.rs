//! Logic agent for maps where the Wumpuses wander.
//!
//! Runs the same ladder as [`HybridAgent`], with two differences. When no safe
//! move is left it may step into the least risky frontier cell. Next to the
//! knowledge base it tracks a [`WumpusBelief`] that absorbs stench evidence and
//! diffuses after every scheduled hazard step. Proofs about Wumpuses do not
//! survive a hazard step, so the Wumpus partition is reset and everything is
//! re-derived from the pit partition and fresh percepts.

use crate::agent::belief::WumpusBelief;
use crate::agent::hybrid::first_suspect;
use crate::agent::planner::RiskWeighted;
use crate::agent::{Agent, AgentCore, HybridAgent};
use crate::config::{AdvancedSettings, GameConfig};
use crate::inference::Reasoner;
use crate::world::components::{Action, Percept, Percepts, Point};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedAgent {
    inner: HybridAgent,
    belief: WumpusBelief,
    settings: AdvancedSettings,
    pit_probability: f64,
    wumpuses_alive: usize,
    action_count: usize,
    breezy_cells: BTreeSet<Point>,
    /// Cell and stench reading already folded into the belief since the last
    /// hazard step.
    last_observation: Option<(Point, bool)>,
}

impl AdvancedAgent {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            inner: HybridAgent::new(config),
            belief: WumpusBelief::new(config.map_size, config.start, config.wumpus_count),
            settings: config.advanced,
            pit_probability: config.pit_probability,
            wumpuses_alive: config.wumpus_count,
            action_count: 0,
            breezy_cells: BTreeSet::new(),
            last_observation: None,
        }
    }

    #[must_use]
    pub const fn belief(&self) -> &WumpusBelief {
        &self.belief
    }

    #[must_use]
    pub const fn wumpuses_alive(&self) -> usize {
        self.wumpuses_alive
    }

    /// Estimated pit probability of an unproven cell. Each breezy visited neighbour
    /// with `k` unresolved candidates lifts the estimate to at least `1/k`.
    fn pit_risk(&self, cell: Point, reasoner: &mut Reasoner) -> f64 {
        let core = self.inner.core();
        if core.proven_pits.contains(&cell) {
            return 1.0;
        }
        if core.safe_cells.contains(&cell)
            || (core.frontier_cells.contains(&cell) && reasoner.proves_no_pit(cell))
        {
            return 0.0;
        }

        let mut risk = self.pit_probability;
        for (n, _) in cell.neighbours(core.map_size) {
            if !self.breezy_cells.contains(&n) {
                continue;
            }
            let candidates = n
                .neighbours(core.map_size)
                .filter(|(c, _)| !core.safe_cells.contains(c))
                .count();
            if candidates > 0 {
                #[allow(clippy::cast_precision_loss)]
                let share = 1.0 / candidates as f64;
                risk = risk.max(share);
            }
        }
        risk
    }

    /// `max(0, (1 − (1 − pit)(1 − wumpus)) × scale − escape_bonus × visited neighbours)`.
    pub fn risk_score(&self, cell: Point, reasoner: &mut Reasoner) -> f64 {
        let core = self.inner.core();
        if core.safe_cells.contains(&cell) {
            return 0.0;
        }
        let pit = self.pit_risk(cell, reasoner);
        let wumpus = if core.proven_wumpuses.contains(&cell) {
            1.0
        } else {
            self.belief.get(cell)
        };
        let death = 1.0 - (1.0 - pit) * (1.0 - wumpus);

        let core = self.inner.core();
        let visited_neighbours = cell
            .neighbours(core.map_size)
            .filter(|(n, _)| core.visited_cells.contains(n))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let bonus = self.settings.escape_bonus * visited_neighbours as f64;
        death.mul_add(self.settings.risk_scale, -bonus).max(0.0)
    }

    /// Risk of every cell, row-major, for the weighted planner.
    fn risk_grid(&self, reasoner: &mut Reasoner) -> Vec<f64> {
        let size = self.inner.core().map_size;
        (0..size * size)
            .map(|i| self.risk_score(Point::from_index(i, size), reasoner))
            .collect()
    }

    /// Walks into the frontier cell with the lowest risk, provided it is within
    /// tolerance. Pits proven by the knowledge base are never entered.
    fn plan_risky_move(&mut self, reasoner: &mut Reasoner) -> bool {
        let candidates: Vec<Point> = {
            let core = self.inner.core();
            core.frontier_cells
                .iter()
                .filter(|c| !core.safe_cells.contains(*c) && !core.proven_pits.contains(*c))
                .copied()
                .collect()
        };

        let mut best: Option<(Point, f64)> = None;
        for cell in candidates {
            let risk = self.risk_score(cell, reasoner);
            if best.is_none_or(|(_, r)| risk < r) {
                best = Some((cell, risk));
            }
        }
        let Some((target, risk)) = best else {
            return false;
        };
        if risk > self.settings.risk_tolerance {
            debug!(%target, risk, "least risky frontier cell is over tolerance");
            return false;
        }

        let grid = self.risk_grid(reasoner);
        let core = self.inner.core_mut();
        let pits = core.proven_pits.clone();
        let rule = RiskWeighted {
            proven_pits: &pits,
            risk: &grid,
            size: core.map_size,
            weight: self.settings.risk_weight,
        };
        info!(%target, risk, "taking a calculated risk");
        core.plan_path(&BTreeSet::from([target]), &rule)
    }
}

impl Agent for AdvancedAgent {
    fn core(&self) -> &AgentCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        self.inner.core_mut()
    }

    fn update_percepts(&mut self, percepts: Percepts) {
        let core = self.inner.core_mut();
        core.observe(percepts);
        let here = core.location;
        if percepts.contains(Percept::Breeze) {
            self.breezy_cells.insert(here);
        } else {
            self.breezy_cells.remove(&here);
        }

        let stench = percepts.contains(Percept::Stench);
        if self.last_observation == Some((here, stench)) {
            return;
        }
        self.last_observation = Some((here, stench));

        let core = self.inner.core();
        self.belief
            .observe(here, stench, self.settings.stench_boost, &core.visited_cells);
        self.belief.normalize(self.wumpuses_alive, &core.proven_wumpuses);
    }

    fn choose_next_decision(&mut self, reasoner: &mut Reasoner) {
        if !self.core().planned_actions.is_empty() {
            return;
        }
        if self.inner.plan_without_risk(reasoner) {
            return;
        }
        if self.core().unvisited_safe_cells().is_empty() {
            if self.plan_risky_move(reasoner) {
                return;
            }
            if self.inner.plan_risky_shot(reasoner) {
                return;
            }
        }
        info!(at = %self.core().location, "no acceptable risk left, heading home");
        self.core_mut().plan_retreat();
    }

    fn process_scream(&mut self, shot_path: &[Point], reasoner: &mut Reasoner) {
        let victim = {
            let proven = &self.inner.core().proven_wumpuses;
            match first_suspect(shot_path, reasoner) {
                Some(cell) if proven.contains(&cell) => Some(cell),
                _ => {
                    // A live Wumpus stops the arrow, so the victim lies before the
                    // first proven one.
                    let reach = shot_path
                        .iter()
                        .position(|c| proven.contains(c))
                        .unwrap_or(shot_path.len());
                    shot_path[..reach]
                        .iter()
                        .copied()
                        .filter(|&c| !reasoner.proves_no_wumpus(c))
                        .max_by(|a, b| self.belief.get(*a).total_cmp(&self.belief.get(*b)))
                }
            }
        };

        self.inner.forget_victim(shot_path, reasoner);
        self.wumpuses_alive = self.wumpuses_alive.saturating_sub(1);
        if let Some(victim) = victim {
            debug!(%victim, "scream attributed");
            self.belief.set(victim, 0.0);
        }
        self.belief
            .normalize(self.wumpuses_alive, &self.inner.core().proven_wumpuses);
    }

    fn after_action(&mut self, _: Action) {
        self.action_count += 1;
    }

    fn needs_hazard_move(&self) -> bool {
        self.action_count > 0
            && self.settings.wumpus_move_interval > 0
            && self.action_count % self.settings.wumpus_move_interval == 0
    }

    fn on_hazard_move(&mut self, reasoner: &mut Reasoner) {
        let core = self.inner.core();
        let blocked: BTreeSet<Point> = core
            .proven_pits
            .iter()
            .chain(&core.proven_wumpuses)
            .copied()
            .collect();
        self.belief.diffuse(|p| blocked.contains(&p));

        reasoner.kb.reset_wumpus_facts();

        let core = self.inner.core_mut();
        core.safe_cells = core.visited_cells.clone();
        core.proven_wumpuses.clear();
        core.needs_full_rethink = true;
        core.planned_actions.clear();
        self.last_observation = None;
        debug!(alive = self.wumpuses_alive, mass = self.belief.total(), "belief diffused");
    }

    fn wumpus_probabilities(&self) -> Option<Vec<Vec<f64>>> {
        Some(self.belief.rows())
    }
}
