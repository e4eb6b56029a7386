//! One episode, one action at a time.
//!
//! [`GamePlay`] owns the world, the agent and the reasoner. Each call to
//! [`GamePlay::run_single_action`] runs exactly one cycle:
//!
//! 1. sense the current cell and fold the percepts into the knowledge base;
//! 2. drop the pending plan if danger has just appeared;
//! 3. when no plan is pending, derive what can be proven and let the policy plan;
//! 4. check the next action against the rules and execute it;
//! 5. settle terminal conditions and, in the moving-hazard variant, the
//!    scheduled Wumpus step.
//!
//! Presentation layers read [`GameState`] snapshots and never mutate anything.

use crate::agent::{Agent, AgentVariant};
use crate::config::{AgentKind, GameConfig};
use crate::error::{ActionError, ConfigResult};
use crate::inference::{InferenceStats, Reasoner};
use crate::sat::literal::{Literal, Symbol};
use crate::world::components::{Action, Direction, Percept, Percepts, Point};
use crate::world::grid::{World, WorldState};
use core::fmt::{self, Display};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Where an episode stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    /// Climbed out at the start holding the gold.
    ClimbSuccess,
    /// Climbed out at the start empty-handed.
    ClimbFail,
    DeadByWumpus,
    DeadByPit,
    /// `max_actions` actions were executed without an ending.
    ActionLimit,
}

impl GameStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    #[must_use]
    pub const fn is_death(self) -> bool {
        matches!(self, Self::DeadByWumpus | Self::DeadByPit)
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InProgress => "in progress",
            Self::ClimbSuccess => "climbed out with the gold",
            Self::ClimbFail => "climbed out without the gold",
            Self::DeadByWumpus => "eaten by a wumpus",
            Self::DeadByPit => "fell into a pit",
            Self::ActionLimit => "action limit reached",
        };
        f.write_str(text)
    }
}

/// Number of clauses held by each knowledge base partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClauseCounts {
    pub pit: usize,
    pub wumpus: usize,
}

/// Read-only snapshot of an episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub world: WorldState,
    pub agent: AgentKind,
    pub seed: u64,
    pub location: Point,
    pub direction: Direction,
    pub has_arrow: bool,
    pub has_gold: bool,
    pub alive: bool,
    pub score: i64,
    pub last_action: Option<Action>,
    pub percepts: Percepts,
    pub planned_actions: Vec<Action>,
    pub message: String,
    pub status: GameStatus,
    pub stop_game: bool,
    pub action_count: usize,
    pub visited_cells: BTreeSet<Point>,
    pub safe_cells: BTreeSet<Point>,
    pub frontier_cells: BTreeSet<Point>,
    pub proven_wumpuses: BTreeSet<Point>,
    pub proven_pits: BTreeSet<Point>,
    pub clauses: ClauseCounts,
    pub inference: InferenceStats,
    /// `grid[y][x]`, only for agents that track Wumpus movement.
    pub wumpus_probabilities: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone)]
pub struct GamePlay {
    config: GameConfig,
    world: World,
    agent: AgentVariant,
    reasoner: Reasoner,
    status: GameStatus,
    message: String,
    action_count: usize,
    seed: u64,
}

impl GamePlay {
    /// Validates `config` and generates a map from its seed, or from a fresh one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`](crate::error::ConfigError) found by
    /// [`GameConfig::validate`].
    pub fn new(config: &GameConfig) -> ConfigResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        let world = World::generate(config, seed);
        Ok(Self::with_world(config.clone(), world, seed))
    }

    /// Plays on a prepared map. `seed` drives the agent's own randomness.
    #[must_use]
    pub fn with_world(config: GameConfig, world: World, seed: u64) -> Self {
        let agent = AgentVariant::from_config(&config, seed);
        let reasoner = Reasoner::new(config.inference);
        let mut game = Self {
            config,
            world,
            agent,
            reasoner,
            status: GameStatus::InProgress,
            message: String::new(),
            action_count: 0,
            seed,
        };
        game.update_state();
        // Nothing is planned yet, so danger at the start has nothing to invalidate.
        game.agent.core_mut().just_encountered_danger = false;
        game.check_game_status();
        game
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn world(&self) -> &World {
        &self.world
    }

    pub const fn agent(&self) -> &AgentVariant {
        &self.agent
    }

    pub const fn agent_mut(&mut self) -> &mut AgentVariant {
        &mut self.agent
    }

    pub const fn reasoner(&self) -> &Reasoner {
        &self.reasoner
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn action_count(&self) -> usize {
        self.action_count
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn score(&self) -> i64 {
        self.agent.core().score
    }

    pub const fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Runs one decision and action cycle. Does nothing once the episode is over.
    pub fn run_single_action(&mut self) {
        if self.is_finished() {
            return;
        }

        self.update_state();

        let core = self.agent.core_mut();
        if core.just_encountered_danger {
            if !core.planned_actions.is_empty() {
                debug!(at = %core.location, "new danger, dropping plan");
                core.planned_actions.clear();
            }
            core.just_encountered_danger = false;
        }

        if self.agent.core().planned_actions.is_empty() {
            if self.agent.uses_inference() {
                self.agent.derive(&mut self.reasoner);
            }
            self.agent.choose_next_decision(&mut self.reasoner);
        }

        let action = if let Some(action) = self.agent.core_mut().planned_actions.pop_front() {
            action
        } else {
            self.message = "no plan left, climbing out".to_owned();
            Action::ClimbOut
        };

        match self.validate_action(action) {
            Ok(()) => self.execute_action(action),
            Err(err) => {
                warn!(%action, %err, "rejected action");
                self.message = format!("rejected {action}: {err}");
                self.agent.core_mut().planned_actions.clear();
            }
        }

        self.action_count += 1;
        self.agent.after_action(action);
        self.check_game_status();

        if !self.is_finished() && self.agent.needs_hazard_move() {
            self.move_hazards();
        }

        if !self.is_finished() && self.action_count >= self.config.max_actions {
            info!(actions = self.action_count, "action limit reached");
            self.status = GameStatus::ActionLimit;
            self.message = self.status.to_string();
        }
    }

    /// Runs cycles until the episode ends and returns how it ended.
    pub fn run_to_completion(&mut self) -> GameStatus {
        while !self.is_finished() {
            self.run_single_action();
        }
        self.status
    }

    /// Senses the current cell and records it in the agent and the knowledge base.
    fn update_state(&mut self) {
        let here = self.agent.core().location;
        let percepts = self.world.get_percepts(here);

        if self.config.agent.moving_hazards() {
            self.reasoner.kb.tell_fact(Literal::negative(Symbol::Pit(here)));
            self.reasoner
                .kb
                .tell_fact(Literal::negative(Symbol::Wumpus(here)));
        }
        if !self.agent.core().cells_learned_from.contains(&here) {
            self.learn_from_new_cell(here);
        }

        self.agent.update_percepts(percepts);
        self.reasoner.kb.retract_and_tell_percept_facts(here, percepts);
    }

    /// The agent is alive on `cell`, so it holds neither hazard.
    fn learn_from_new_cell(&mut self, cell: Point) {
        let kb = &mut self.reasoner.kb;
        kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
        kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
        kb.tell_cell_rules(cell, self.config.map_size);
        self.agent.core_mut().cells_learned_from.insert(cell);
    }

    fn validate_action(&self, action: Action) -> Result<(), ActionError> {
        let core = self.agent.core();
        match action {
            Action::MoveForward if !core.ahead().in_bounds(self.config.map_size) => {
                Err(ActionError::WallAhead {
                    location: core.location,
                    direction: core.direction,
                })
            }
            Action::Shoot if !core.has_arrow => Err(ActionError::NoArrow),
            _ => Ok(()),
        }
    }

    fn execute_action(&mut self, action: Action) {
        let scores = self.config.scores;
        match action {
            Action::MoveForward => {
                let core = self.agent.core_mut();
                let next = core.ahead();
                core.update_location(next);
                core.score += scores.move_forward;
                self.message = format!("moved to {next}");
            }
            Action::TurnLeft => {
                let core = self.agent.core_mut();
                core.turn_left();
                core.score += scores.turn_left;
                self.message = format!("turned to face {}", core.direction);
            }
            Action::TurnRight => {
                let core = self.agent.core_mut();
                core.turn_right();
                core.score += scores.turn_right;
                self.message = format!("turned to face {}", core.direction);
            }
            Action::Shoot => self.shoot(),
            Action::Grab => {
                let here = self.agent.core().location;
                if self.world.remove_gold(here) {
                    let core = self.agent.core_mut();
                    core.grab_gold();
                    core.score += scores.grab_gold;
                    info!(at = %here, "gold grabbed");
                    self.message = "grabbed the gold".to_owned();
                } else {
                    self.message = "nothing to grab here".to_owned();
                }
            }
            Action::ClimbOut => {
                let core = self.agent.core_mut();
                core.climb_out();
                if core.at_start() {
                    self.status = if core.has_gold {
                        core.score += scores.climb_success;
                        GameStatus::ClimbSuccess
                    } else {
                        core.score += scores.climb_fail;
                        GameStatus::ClimbFail
                    };
                    info!(status = %self.status, score = core.score, "climbed out");
                    self.message = self.status.to_string();
                } else {
                    self.message = "can only climb out at the start".to_owned();
                }
            }
        }
    }

    /// Fires the arrow along the current facing. A kill retracts stench facts and
    /// lets the policy re-derive; a miss proves every cell on the path Wumpus-free.
    fn shoot(&mut self) {
        let core = self.agent.core_mut();
        core.shoot();
        core.score += self.config.scores.shoot;
        let path = self.world.arrow_path(core.location, core.direction);

        let target = path.iter().copied().find(|&c| self.world.has_wumpus(c));
        if let Some(victim) = target.filter(|&c| self.world.kill_wumpus(c)) {
            self.agent.core_mut().current_percepts.insert(Percept::Scream);
            self.reasoner.kb.process_scream_event();
            self.agent.process_scream(&path, &mut self.reasoner);
            self.message = format!("scream: wumpus at {victim} killed");
        } else {
            for &cell in &path {
                self.reasoner
                    .kb
                    .tell_fact(Literal::negative(Symbol::Wumpus(cell)));
                self.agent.core_mut().proven_wumpuses.remove(&cell);
            }
            debug!(cells = path.len(), "arrow missed");
            self.message = "the arrow missed".to_owned();
        }
    }

    fn move_hazards(&mut self) {
        let moves = self.world.move_wumpuses();
        info!(moved = moves.len(), "wumpuses stepped");
        self.agent.on_hazard_move(&mut self.reasoner);
        self.check_game_status();
    }

    fn check_game_status(&mut self) {
        if self.is_finished() {
            return;
        }
        let scores = self.config.scores;
        let core = self.agent.core_mut();
        let here = core.location;

        let death = if self.world.has_wumpus(here) {
            Some((GameStatus::DeadByWumpus, scores.death_wumpus))
        } else if self.world.has_pit(here) {
            Some((GameStatus::DeadByPit, scores.death_pit))
        } else {
            None
        };

        if let Some((status, penalty)) = death {
            core.alive = false;
            core.score += penalty;
            self.status = status;
            self.message = status.to_string();
            info!(at = %here, %status, score = core.score, "agent died");
        }
    }

    /// Snapshot for presentation layers.
    #[must_use]
    pub fn get_game_state(&self) -> GameState {
        let core = self.agent.core();
        let (pit, wumpus) = self.reasoner.kb.clause_counts();
        GameState {
            world: self.world.get_state(),
            agent: self.agent.kind(),
            seed: self.seed,
            location: core.location,
            direction: core.direction,
            has_arrow: core.has_arrow,
            has_gold: core.has_gold,
            alive: core.alive,
            score: core.score,
            last_action: core.last_action,
            percepts: core.current_percepts,
            planned_actions: core.planned_actions.iter().copied().collect(),
            message: self.message.clone(),
            status: self.status,
            stop_game: self.is_finished(),
            action_count: self.action_count,
            visited_cells: core.visited_cells.clone(),
            safe_cells: core.safe_cells.clone(),
            frontier_cells: core.frontier_cells.clone(),
            proven_wumpuses: core.proven_wumpuses.clone(),
            proven_pits: core.proven_pits.clone(),
            clauses: ClauseCounts { pit, wumpus },
            inference: self.reasoner.engine.stats(),
            wumpus_probabilities: self.agent.wumpus_probabilities(),
        }
    }
}
