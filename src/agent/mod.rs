//! Decision policies.
//!
//! Every variant owns an [`AgentCore`]: the body (location, facing, inventory,
//! score), the exploration memory and the queue of planned actions. Variants only
//! differ in how they fill that queue. The set of variants is closed, so the
//! orchestrator holds an [`AgentVariant`] rather than a trait object.

pub mod advanced;
pub mod belief;
pub mod hybrid;
pub mod planner;
pub mod random;

use crate::config::{AgentKind, GameConfig};
use crate::inference::Reasoner;
use crate::world::components::{Action, Direction, Percept, Percepts, Point};
use planner::{SafeCells, StepCost};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

pub use advanced::AdvancedAgent;
pub use hybrid::HybridAgent;
pub use random::RandomAgent;

/// State shared by every policy.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCore {
    pub location: Point,
    pub direction: Direction,
    pub has_arrow: bool,
    pub has_gold: bool,
    pub alive: bool,
    pub last_action: Option<Action>,
    pub score: i64,
    pub planned_actions: VecDeque<Action>,
    pub map_size: usize,
    pub start: Point,
    pub current_percepts: Percepts,

    /// Cells the agent has stood on.
    pub visited_cells: BTreeSet<Point>,
    /// Cells proven free of both hazards. Always contains `visited_cells`.
    pub safe_cells: BTreeSet<Point>,
    /// Unvisited neighbours of visited cells.
    pub frontier_cells: BTreeSet<Point>,
    pub proven_wumpuses: BTreeSet<Point>,
    pub proven_pits: BTreeSet<Point>,
    /// Cells whose adjacency rules are already in the knowledge base.
    pub cells_learned_from: BTreeSet<Point>,

    /// Set when a stench or breeze appears where none was sensed before.
    pub just_encountered_danger: bool,
    /// Next derivation pass re-checks every known unvisited cell.
    pub needs_full_rethink: bool,
}

impl AgentCore {
    #[must_use]
    pub fn new(location: Point, direction: Direction, map_size: usize) -> Self {
        let mut core = Self {
            location,
            direction,
            has_arrow: true,
            has_gold: false,
            alive: true,
            last_action: None,
            score: 0,
            planned_actions: VecDeque::new(),
            map_size,
            start: location,
            current_percepts: Percepts::empty(),
            visited_cells: BTreeSet::new(),
            safe_cells: BTreeSet::new(),
            frontier_cells: BTreeSet::new(),
            proven_wumpuses: BTreeSet::new(),
            proven_pits: BTreeSet::new(),
            cells_learned_from: BTreeSet::new(),
            just_encountered_danger: false,
            needs_full_rethink: false,
        };
        core.visit(location);
        core
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.start, config.start_direction, config.map_size)
    }

    fn visit(&mut self, cell: Point) {
        self.visited_cells.insert(cell);
        self.safe_cells.insert(cell);
        self.frontier_cells.remove(&cell);
        for (n, _) in cell.neighbours(self.map_size) {
            if !self.visited_cells.contains(&n) {
                self.frontier_cells.insert(n);
            }
        }
    }

    /// Moves the body to `cell` and updates the exploration memory.
    pub fn update_location(&mut self, cell: Point) {
        self.location = cell;
        self.visit(cell);
        self.last_action = Some(Action::MoveForward);
    }

    pub fn turn_left(&mut self) {
        self.direction = self.direction.turn_left();
        self.last_action = Some(Action::TurnLeft);
    }

    pub fn turn_right(&mut self) {
        self.direction = self.direction.turn_right();
        self.last_action = Some(Action::TurnRight);
    }

    /// The cell a forward step would enter. It may be off the grid.
    #[must_use]
    pub fn ahead(&self) -> Point {
        self.location + self.direction.vector()
    }

    pub fn shoot(&mut self) {
        if self.has_arrow {
            self.has_arrow = false;
            self.last_action = Some(Action::Shoot);
        }
    }

    pub fn grab_gold(&mut self) {
        self.has_gold = true;
        self.last_action = Some(Action::Grab);
    }

    pub fn climb_out(&mut self) {
        self.last_action = Some(Action::ClimbOut);
    }

    /// Records fresh percepts, flagging danger that was not sensed last time.
    pub fn observe(&mut self, percepts: Percepts) {
        if percepts.has_danger() && !self.current_percepts.has_danger() {
            self.just_encountered_danger = true;
        }
        self.current_percepts = percepts;
    }

    pub fn at_start(&self) -> bool {
        self.location == self.start
    }

    pub fn unvisited_safe_cells(&self) -> BTreeSet<Point> {
        self.safe_cells
            .difference(&self.visited_cells)
            .copied()
            .collect()
    }

    /// Frontier cells not yet proven safe.
    pub fn uncertain_cells(&self) -> BTreeSet<Point> {
        self.frontier_cells
            .difference(&self.safe_cells)
            .copied()
            .collect()
    }

    /// Queues the turns that bring the agent to face `target`.
    pub fn plan_turns(&mut self, target: Direction) {
        self.planned_actions
            .extend(self.direction.turns_to(target));
    }

    /// Runs A* from the current state and queues the result. Returns whether a
    /// non-empty plan was queued. Does nothing while a plan is pending.
    pub fn plan_path<C: StepCost>(&mut self, goals: &BTreeSet<Point>, cost: &C) -> bool {
        if !self.planned_actions.is_empty() || goals.is_empty() {
            return false;
        }
        match planner::plan(self.map_size, self.location, self.direction, goals, cost) {
            Some(actions) if !actions.is_empty() => {
                debug!(from = %self.location, steps = actions.len(), "planned path");
                self.planned_actions.extend(actions);
                true
            }
            Some(_) => false,
            None => {
                debug!(from = %self.location, goals = goals.len(), "no path to any goal");
                false
            }
        }
    }

    /// A* restricted to visited and proven-safe cells.
    pub fn plan_safe_path(&mut self, goals: &BTreeSet<Point>) -> bool {
        let visited = self.visited_cells.clone();
        let safe = self.safe_cells.clone();
        self.plan_path(
            goals,
            &SafeCells {
                visited: &visited,
                safe: &safe,
            },
        )
    }

    /// Iterative derivation over frontier cells (every known unvisited cell after a
    /// full-rethink trigger), repeated until a pass adds nothing.
    pub fn derive(&mut self, reasoner: &mut Reasoner) {
        let mut cells: BTreeSet<Point> = self.frontier_cells.clone();
        if self.needs_full_rethink {
            cells.extend(
                self.safe_cells
                    .union(&self.frontier_cells)
                    .filter(|c| !self.visited_cells.contains(*c))
                    .copied(),
            );
            self.needs_full_rethink = false;
        }

        loop {
            let mut learned = false;
            for &cell in &cells {
                if self.safe_cells.contains(&cell) {
                    continue;
                }
                if reasoner.ask_safe(cell) {
                    debug!(%cell, "inferred safe");
                    self.safe_cells.insert(cell);
                    learned = true;
                    continue;
                }
                if !self.proven_wumpuses.contains(&cell) && reasoner.proves_wumpus(cell) {
                    debug!(%cell, "inferred wumpus");
                    self.proven_wumpuses.insert(cell);
                    learned = true;
                }
                if !self.proven_pits.contains(&cell) && reasoner.proves_pit(cell) {
                    debug!(%cell, "inferred pit");
                    self.proven_pits.insert(cell);
                    learned = true;
                }
            }
            if !learned {
                break;
            }
        }
    }

    /// Frontier cells not yet in `safe_cells` that the knowledge base now proves
    /// safe. They are added to `safe_cells` and returned.
    pub fn find_safe_cells(&mut self, reasoner: &mut Reasoner) -> BTreeSet<Point> {
        let found: BTreeSet<Point> = self
            .uncertain_cells()
            .into_iter()
            .filter(|&cell| reasoner.ask_safe(cell))
            .collect();
        self.safe_cells.extend(found.iter().copied());
        found
    }

    /// Plans the way home and a climb. Used once nothing better is left.
    pub fn plan_retreat(&mut self) {
        if !self.at_start() {
            self.plan_safe_path(&BTreeSet::from([self.start]));
        }
        self.planned_actions.push_back(Action::ClimbOut);
    }

    /// Glitter here and no gold in hand.
    pub fn should_grab(&self) -> bool {
        self.current_percepts.contains(Percept::Glitter) && !self.has_gold
    }
}

/// Behaviour the orchestrator needs from a policy.
pub trait Agent {
    fn core(&self) -> &AgentCore;
    fn core_mut(&mut self) -> &mut AgentCore;

    fn update_percepts(&mut self, percepts: Percepts) {
        self.core_mut().observe(percepts);
    }

    /// Fills the plan queue if it is empty.
    fn choose_next_decision(&mut self, reasoner: &mut Reasoner);

    /// Called after an arrow kills a Wumpus, with the cells the arrow crossed.
    fn process_scream(&mut self, shot_path: &[Point], reasoner: &mut Reasoner);

    fn after_action(&mut self, _action: Action) {}

    /// Whether the policy reasons over the knowledge base at all.
    fn uses_inference(&self) -> bool {
        true
    }

    /// Iterative derivation pass before a fresh decision.
    fn derive(&mut self, reasoner: &mut Reasoner) {
        self.core_mut().derive(reasoner);
    }

    /// Whether the hazards should take their scheduled step now.
    fn needs_hazard_move(&self) -> bool {
        false
    }

    /// Reconciles memory with a hazard step that has just happened.
    fn on_hazard_move(&mut self, _reasoner: &mut Reasoner) {}

    /// Wumpus probability grid, for variants that keep one.
    fn wumpus_probabilities(&self) -> Option<Vec<Vec<f64>>> {
        None
    }
}

/// The closed set of policies.
#[derive(Debug, Clone)]
pub enum AgentVariant {
    Random(RandomAgent),
    Hybrid(HybridAgent),
    Advanced(AdvancedAgent),
}

macro_rules! delegate {
    ($self:ident, $agent:ident => $body:expr) => {
        match $self {
            AgentVariant::Random($agent) => $body,
            AgentVariant::Hybrid($agent) => $body,
            AgentVariant::Advanced($agent) => $body,
        }
    };
}

impl AgentVariant {
    /// Builds the policy `config.agent` names. `seed` drives any randomness.
    #[must_use]
    pub fn from_config(config: &GameConfig, seed: u64) -> Self {
        match config.agent {
            AgentKind::Random => Self::Random(RandomAgent::new(config, seed)),
            AgentKind::Hybrid => Self::Hybrid(HybridAgent::new(config)),
            AgentKind::Advanced => Self::Advanced(AdvancedAgent::new(config)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        match self {
            Self::Random(_) => AgentKind::Random,
            Self::Hybrid(_) => AgentKind::Hybrid,
            Self::Advanced(_) => AgentKind::Advanced,
        }
    }
}

impl Agent for AgentVariant {
    fn core(&self) -> &AgentCore {
        delegate!(self, a => a.core())
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        delegate!(self, a => a.core_mut())
    }

    fn update_percepts(&mut self, percepts: Percepts) {
        delegate!(self, a => a.update_percepts(percepts));
    }

    fn choose_next_decision(&mut self, reasoner: &mut Reasoner) {
        delegate!(self, a => a.choose_next_decision(reasoner));
    }

    fn process_scream(&mut self, shot_path: &[Point], reasoner: &mut Reasoner) {
        delegate!(self, a => a.process_scream(shot_path, reasoner));
    }

    fn after_action(&mut self, action: Action) {
        delegate!(self, a => a.after_action(action));
    }

    fn uses_inference(&self) -> bool {
        delegate!(self, a => a.uses_inference())
    }

    fn derive(&mut self, reasoner: &mut Reasoner) {
        delegate!(self, a => a.derive(reasoner));
    }

    fn needs_hazard_move(&self) -> bool {
        delegate!(self, a => a.needs_hazard_move())
    }

    fn on_hazard_move(&mut self, reasoner: &mut Reasoner) {
        delegate!(self, a => a.on_hazard_move(reasoner));
    }

    fn wumpus_probabilities(&self) -> Option<Vec<Vec<f64>>> {
        delegate!(self, a => a.wumpus_probabilities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_invariants_after_moves() {
        let mut core = AgentCore::new(Point::new(0, 0), Direction::East, 4);
        assert_eq!(
            core.frontier_cells,
            BTreeSet::from([Point::new(1, 0), Point::new(0, 1)])
        );

        core.update_location(Point::new(1, 0));
        core.update_location(Point::new(1, 1));
        assert!(core.visited_cells.is_subset(&core.safe_cells));
        assert!(core.frontier_cells.is_disjoint(&core.visited_cells));
        assert!(core.frontier_cells.contains(&Point::new(2, 1)));
        assert!(!core.frontier_cells.contains(&Point::new(1, 0)));
    }

    #[test]
    fn test_danger_flag_only_on_new_danger() {
        let mut core = AgentCore::new(Point::new(0, 0), Direction::East, 4);
        core.observe([Percept::Glitter].into_iter().collect());
        assert!(!core.just_encountered_danger);
        core.observe([Percept::Breeze].into_iter().collect());
        assert!(core.just_encountered_danger);
        core.just_encountered_danger = false;
        core.observe([Percept::Breeze, Percept::Stench].into_iter().collect());
        assert!(!core.just_encountered_danger);
    }

    #[test]
    fn test_retreat_plan() {
        let mut core = AgentCore::new(Point::new(0, 0), Direction::East, 4);
        core.update_location(Point::new(1, 0));
        core.plan_retreat();
        assert_eq!(
            core.planned_actions,
            VecDeque::from([
                Action::TurnLeft,
                Action::TurnLeft,
                Action::MoveForward,
                Action::ClimbOut
            ])
        );
    }
}
