//! Logic agent for static maps.
//!
//! Each fresh decision walks a fixed ladder and stops at the first rung that
//! produces a plan:
//!
//! 1. grab the gold when standing on glitter;
//! 2. carry the gold home and climb;
//! 3. walk to the nearest proven-safe unvisited cell;
//! 4. re-derive frontier safety and walk to anything new;
//! 5. shoot a proven Wumpus, moving into line with it first if needed;
//! 6. take a risky shot at the most suspicious direction;
//! 7. go home and climb out empty-handed.

use crate::agent::{Agent, AgentCore};
use crate::config::GameConfig;
use crate::inference::Reasoner;
use crate::sat::literal::{Literal, Symbol};
use crate::world::components::{Action, Direction, Point};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct HybridAgent {
    core: AgentCore,
}

impl HybridAgent {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            core: AgentCore::from_config(config),
        }
    }

    #[must_use]
    pub const fn with_core(core: AgentCore) -> Self {
        Self { core }
    }

    /// Rungs 1 through 5. Returns whether a plan was queued.
    pub(crate) fn plan_without_risk(&mut self, reasoner: &mut Reasoner) -> bool {
        let core = &mut self.core;

        if core.should_grab() {
            info!(at = %core.location, "glitter, grabbing");
            core.planned_actions.push_back(Action::Grab);
            return true;
        }

        if core.has_gold {
            if core.at_start() {
                core.planned_actions.push_back(Action::ClimbOut);
                return true;
            }
            debug!("carrying gold home");
            if core.plan_safe_path(&BTreeSet::from([core.start])) {
                return true;
            }
        }

        let unvisited_safe = core.unvisited_safe_cells();
        if !unvisited_safe.is_empty() && core.plan_safe_path(&unvisited_safe) {
            return true;
        }

        let fresh = core.find_safe_cells(reasoner);
        if !fresh.is_empty() && core.plan_safe_path(&fresh) {
            return true;
        }

        self.plan_safe_shot(reasoner)
    }

    /// Turns toward a proven Wumpus and shoots, or walks to a safe cell in line
    /// with one.
    pub(crate) fn plan_safe_shot(&mut self, reasoner: &mut Reasoner) -> bool {
        let core = &mut self.core;
        if !core.has_arrow {
            return false;
        }

        for &cell in &core.frontier_cells {
            if !core.proven_wumpuses.contains(&cell) && reasoner.proves_wumpus(cell) {
                core.proven_wumpuses.insert(cell);
            }
        }
        if core.proven_wumpuses.is_empty() {
            return false;
        }

        let aligned = core
            .proven_wumpuses
            .iter()
            .filter_map(|&w| Direction::towards(core.location, w))
            .min_by_key(|&d| core.direction.turns_to(d).len());
        if let Some(direction) = aligned {
            info!(at = %core.location, %direction, "proven wumpus in line, planning safe shot");
            core.plan_turns(direction);
            core.planned_actions.push_back(Action::Shoot);
            return true;
        }

        let firing_spots: BTreeSet<Point> = core
            .safe_cells
            .iter()
            .filter(|&&c| {
                core.proven_wumpuses
                    .iter()
                    .any(|&w| Direction::towards(c, w).is_some())
            })
            .copied()
            .collect();
        core.plan_safe_path(&firing_spots)
    }

    /// Scores every open direction: one point per suspected Wumpus on the arrow's
    /// path, a tenth per other unvisited cell, minus a hundredth per turn.
    pub(crate) fn plan_risky_shot(&mut self, reasoner: &mut Reasoner) -> bool {
        let core = &mut self.core;
        if !core.planned_actions.is_empty() || !core.has_arrow {
            return false;
        }

        let suspects: BTreeSet<Point> = core
            .uncertain_cells()
            .into_iter()
            .filter(|&c| !reasoner.proves_no_wumpus(c))
            .collect();

        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| (core.location + d.vector()).in_bounds(core.map_size))
            .collect();

        let mut best: Option<(Direction, f64)> = None;
        for &direction in &open {
            let score = shot_score(core, direction, &suspects);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((direction, score));
            }
        }

        let direction = match best {
            Some((direction, score)) if score > 0.0 => {
                info!(%direction, score, "risky shot");
                direction
            }
            _ => {
                let Some(&cheapest) = open
                    .iter()
                    .min_by_key(|&&d| core.direction.turns_to(d).len())
                else {
                    return false;
                };
                info!(direction = %cheapest, "no promising direction, shooting for information");
                cheapest
            }
        };

        core.plan_turns(direction);
        core.planned_actions.push_back(Action::Shoot);
        true
    }

    /// After a kill the arrow stopped at the first cell on its path that may hold
    /// a Wumpus. The victim is only known when that cell is a proven Wumpus.
    pub(crate) fn forget_victim(&mut self, shot_path: &[Point], reasoner: &mut Reasoner) {
        let core = &mut self.core;
        let first = first_suspect(shot_path, reasoner);
        if let Some(victim) = first.filter(|c| core.proven_wumpuses.contains(c)) {
            reasoner
                .kb
                .tell_fact(Literal::negative(Symbol::Wumpus(victim)));
            core.proven_wumpuses.remove(&victim);
        }
        core.planned_actions.clear();
        core.needs_full_rethink = true;
    }
}

/// First cell on `shot_path` not proven Wumpus-free.
pub(crate) fn first_suspect(shot_path: &[Point], reasoner: &mut Reasoner) -> Option<Point> {
    shot_path
        .iter()
        .copied()
        .find(|&c| !reasoner.proves_no_wumpus(c))
}

fn shot_score(core: &AgentCore, direction: Direction, suspects: &BTreeSet<Point>) -> f64 {
    let step = direction.vector();
    let mut score = 0.0;
    let mut cell = core.location + step;
    while cell.in_bounds(core.map_size) {
        if suspects.contains(&cell) {
            score += 1.0;
        } else if !core.visited_cells.contains(&cell) {
            score += 0.1;
        }
        cell += step;
    }
    #[allow(clippy::cast_precision_loss)]
    let turns = core.direction.turns_to(direction).len() as f64;
    turns.mul_add(-0.01, score)
}

impl Agent for HybridAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn choose_next_decision(&mut self, reasoner: &mut Reasoner) {
        if !self.core.planned_actions.is_empty() {
            return;
        }
        if self.plan_without_risk(reasoner) {
            return;
        }
        if self.core.unvisited_safe_cells().is_empty() && self.plan_risky_shot(reasoner) {
            return;
        }
        info!(at = %self.core.location, "nothing left to try, heading home");
        self.core.plan_retreat();
    }

    fn process_scream(&mut self, shot_path: &[Point], reasoner: &mut Reasoner) {
        self.forget_victim(shot_path, reasoner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceSettings;
    use crate::world::components::{Percept, Percepts};

    fn setup() -> (HybridAgent, Reasoner) {
        let config = GameConfig::default();
        let mut reasoner = Reasoner::new(InferenceSettings::default());
        let agent = HybridAgent::new(&config);
        learn(&mut reasoner, Point::new(0, 0), Percepts::empty());
        (agent, reasoner)
    }

    fn learn(r: &mut Reasoner, cell: Point, percepts: Percepts) {
        r.kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
        r.kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
        r.kb.tell_cell_rules(cell, 4);
        r.kb.retract_and_tell_percept_facts(cell, percepts);
    }

    #[test]
    fn test_grab_first() {
        let (mut agent, mut reasoner) = setup();
        agent.update_percepts([Percept::Glitter].into_iter().collect());
        agent.choose_next_decision(&mut reasoner);
        assert_eq!(agent.core().planned_actions.front(), Some(&Action::Grab));
    }

    #[test]
    fn test_gold_at_start_climbs() {
        let (mut agent, mut reasoner) = setup();
        agent.core_mut().has_gold = true;
        agent.choose_next_decision(&mut reasoner);
        assert_eq!(
            agent.core().planned_actions.iter().copied().collect::<Vec<_>>(),
            vec![Action::ClimbOut]
        );
    }

    #[test]
    fn test_explores_derived_safe_cell() {
        let (mut agent, mut reasoner) = setup();
        agent.derive(&mut reasoner);
        assert!(agent.core().safe_cells.contains(&Point::new(1, 0)));
        agent.choose_next_decision(&mut reasoner);
        // Facing east, so the nearest safe cell is straight ahead.
        assert_eq!(
            agent.core().planned_actions.front(),
            Some(&Action::MoveForward)
        );
    }

    #[test]
    fn test_safe_shot_when_aligned() {
        let (mut agent, mut reasoner) = setup();
        agent.core_mut().proven_wumpuses.insert(Point::new(0, 2));
        agent.core_mut().safe_cells.clear();
        agent.core_mut().safe_cells.insert(Point::new(0, 0));
        assert!(agent.plan_safe_shot(&mut reasoner));
        assert_eq!(
            agent.core().planned_actions.iter().copied().collect::<Vec<_>>(),
            vec![Action::TurnLeft, Action::Shoot]
        );
    }

    #[test]
    fn test_risky_shot_faces_suspects() {
        let (mut agent, mut reasoner) = setup();
        // Stench at the start: both neighbours are Wumpus suspects.
        learn(&mut reasoner, Point::new(0, 0), [Percept::Stench].into_iter().collect());
        assert!(agent.plan_risky_shot(&mut reasoner));
        assert_eq!(agent.core().planned_actions.back(), Some(&Action::Shoot));
        // East needs no turn, so it edges out north.
        assert_eq!(agent.core().planned_actions.len(), 1);
    }

    #[test]
    fn test_scream_forgets_victim() {
        let (mut agent, mut reasoner) = setup();
        agent.core_mut().proven_wumpuses.insert(Point::new(2, 0));
        agent.process_scream(&[Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)], &mut reasoner);
        assert!(agent.core().proven_wumpuses.is_empty());
        assert!(agent.core().needs_full_rethink);
        assert!(reasoner.proves_no_wumpus(Point::new(2, 0)));
    }

    #[test]
    fn test_scream_keeps_proven_wumpus_behind_a_suspect() {
        let (mut agent, mut reasoner) = setup();
        agent.core_mut().proven_wumpuses.insert(Point::new(3, 0));
        // (2,0) is unresolved and comes first, so it may be the one that died.
        agent.process_scream(&[Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)], &mut reasoner);
        assert!(agent.core().proven_wumpuses.contains(&Point::new(3, 0)));
        assert!(!reasoner.proves_no_wumpus(Point::new(3, 0)));
        assert!(agent.core().needs_full_rethink);
    }

    #[test]
    fn test_retreats_when_stuck() {
        let (mut agent, mut reasoner) = setup();
        agent.core_mut().has_arrow = false;
        learn(&mut reasoner, Point::new(0, 0), [Percept::Breeze].into_iter().collect());
        agent.choose_next_decision(&mut reasoner);
        assert_eq!(
            agent.core().planned_actions.iter().copied().collect::<Vec<_>>(),
            vec![Action::ClimbOut]
        );
    }
}
