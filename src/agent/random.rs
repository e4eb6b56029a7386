//! Uninformed baseline.

use crate::agent::{Agent, AgentCore};
use crate::config::GameConfig;
use crate::inference::Reasoner;
use crate::world::components::{Action, Direction, Point};

const SHOOT_PROBABILITY: f64 = 0.05;

/// Wanders one random step at a time, grabs gold it stumbles on and climbs out if
/// it ever brings the gold back to the start.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    core: AgentCore,
    rng: fastrand::Rng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            core: AgentCore::from_config(config),
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn choose_next_decision(&mut self, _: &mut Reasoner) {
        let core = &mut self.core;
        if !core.planned_actions.is_empty() {
            return;
        }

        if core.should_grab() {
            core.planned_actions.push_back(Action::Grab);
            return;
        }

        if core.has_gold && core.at_start() {
            core.planned_actions.push_back(Action::ClimbOut);
            return;
        }

        if core.has_arrow && self.rng.f64() < SHOOT_PROBABILITY {
            core.planned_actions.push_back(Action::Shoot);
            return;
        }

        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| (core.location + d.vector()).in_bounds(core.map_size))
            .collect();
        let Some(&target) = open.get(self.rng.usize(..open.len().max(1))) else {
            core.planned_actions.push_back(Action::ClimbOut);
            return;
        };

        core.plan_turns(target);
        core.planned_actions.push_back(Action::MoveForward);
    }

    fn process_scream(&mut self, _: &[Point], _: &mut Reasoner) {
        self.core.planned_actions.clear();
    }

    fn uses_inference(&self) -> bool {
        false
    }

    fn derive(&mut self, _: &mut Reasoner) {}
}
