//! Episode configuration.
//!
//! A [`GameConfig`] is built once, validated, and then handed by reference to the
//! world generator and the orchestrator. Nothing reads configuration from global
//! state. Every field has a default so a TOML file only needs the keys it changes.

use crate::error::{ConfigError, ConfigResult};
use crate::world::components::{Direction, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which decision policy drives the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Uninformed baseline.
    Random,
    /// Logic agent on a static map.
    #[default]
    Hybrid,
    /// Logic agent plus probabilistic tracking of moving Wumpuses.
    Advanced,
}

impl AgentKind {
    /// Whether Wumpuses wander during the episode.
    #[must_use]
    pub const fn moving_hazards(self) -> bool {
        matches!(self, Self::Advanced)
    }
}

/// Score deltas applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scores {
    pub grab_gold: i64,
    pub move_forward: i64,
    pub turn_left: i64,
    pub turn_right: i64,
    pub shoot: i64,
    pub death_wumpus: i64,
    pub death_pit: i64,
    pub climb_success: i64,
    pub climb_fail: i64,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            grab_gold: 10,
            move_forward: -1,
            turn_left: -1,
            turn_right: -1,
            shoot: -10,
            death_wumpus: -1000,
            death_pit: -1000,
            climb_success: 1000,
            climb_fail: 0,
        }
    }
}

/// Limits on the entailment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// DPLL branching decisions allowed per query before it is declared inconclusive.
    pub max_decisions: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            max_decisions: 20_000,
        }
    }
}

/// Tuning for the moving-hazard variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Wumpuses step after every this many agent actions.
    pub wumpus_move_interval: usize,
    /// Extra A* cost per unit of risk score.
    pub risk_weight: f64,
    /// Multiplier applied to the raw death probability.
    pub risk_scale: f64,
    /// Risk discount per already visited neighbour.
    pub escape_bonus: f64,
    /// Likelihood ratio applied to stench suspects before renormalising.
    pub stench_boost: f64,
    /// A risky step is only taken into cells scoring at or below this.
    pub risk_tolerance: f64,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            wumpus_move_interval: 5,
            risk_weight: 20.0,
            risk_scale: 1.0,
            escape_bonus: 0.05,
            stench_boost: 3.0,
            risk_tolerance: 0.75,
        }
    }
}

/// Complete description of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_size: usize,
    pub pit_probability: f64,
    pub wumpus_count: usize,
    pub gold_count: usize,
    pub start: Point,
    pub start_direction: Direction,
    pub agent: AgentKind,
    /// Seed for map generation and every other random choice. `None` draws one.
    pub seed: Option<u64>,
    /// Hard cap on executed actions.
    pub max_actions: usize,
    pub scores: Scores,
    pub inference: InferenceSettings,
    pub advanced: AdvancedSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size: 4,
            pit_probability: 0.2,
            wumpus_count: 2,
            gold_count: 1,
            start: Point::new(0, 0),
            start_direction: Direction::East,
            agent: AgentKind::default(),
            seed: None,
            max_actions: 1000,
            scores: Scores::default(),
            inference: InferenceSettings::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

impl GameConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and [`ConfigError::Invalid`]
    /// when the parsed values fail [`GameConfig::validate`].
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise see
    /// [`GameConfig::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the values that the world generator and the agents rely on.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as [`ConfigError::Invalid`].
    pub fn validate(&self) -> ConfigResult<()> {
        if self.map_size < 2 {
            return Err(invalid("map_size", format!("{} is below 2", self.map_size)));
        }
        if !(0.0..=1.0).contains(&self.pit_probability) {
            return Err(invalid(
                "pit_probability",
                format!("{} is outside [0, 1]", self.pit_probability),
            ));
        }
        if !self.start.in_bounds(self.map_size) {
            return Err(invalid(
                "start",
                format!(
                    "{} is outside a {size}x{size} grid",
                    self.start,
                    size = self.map_size
                ),
            ));
        }
        let free_cells = self.map_size * self.map_size - 1;
        if self.wumpus_count + self.gold_count > free_cells {
            return Err(invalid(
                "wumpus_count",
                format!(
                    "{} wumpuses and {} gold do not fit in {free_cells} free cells",
                    self.wumpus_count, self.gold_count
                ),
            ));
        }
        if self.max_actions == 0 {
            return Err(invalid("max_actions", "must be positive".to_owned()));
        }
        if self.inference.max_decisions == 0 {
            return Err(invalid(
                "inference.max_decisions",
                "must be positive".to_owned(),
            ));
        }
        if self.agent.moving_hazards() && self.advanced.wumpus_move_interval == 0 {
            return Err(invalid(
                "advanced.wumpus_move_interval",
                "must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
