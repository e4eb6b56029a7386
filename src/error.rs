//! Error types.
//!
//! Only two things can go wrong in this crate: a configuration can be unreadable or
//! nonsensical, and a policy can ask for an action the rules forbid. Everything else
//! (inconclusive inference, a stuck policy) is an ordinary branch outcome.

use crate::world::components::{Direction, Point};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or validate a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// An action that would break a world invariant if it were executed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("agent at {location} facing {direction} would walk into a wall")]
    WallAhead {
        location: Point,
        direction: Direction,
    },

    #[error("agent tried to shoot without an arrow")]
    NoArrow,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
