//! This crate simulates an agent exploring the Wumpus World, deciding every step by
//! propositional inference over what it has sensed so far.

/// The `agent` module holds the decision policies, the A* planner and the Wumpus belief model.
pub mod agent;

/// The `config` module describes an episode: map, scoring and tuning.
pub mod config;

/// The `error` module defines configuration and action errors.
pub mod error;

/// The `game` module drives an episode one action at a time and exposes read-only snapshots.
pub mod game;

/// The `inference` module answers entailment queries against the knowledge base.
pub mod inference;

/// The `knowledge_base` module stores pit and Wumpus rules as CNF clause sets.
pub mod knowledge_base;

/// The `sat` module implements the DPLL satisfiability solver behind every query.
pub mod sat;

/// The `world` module holds the grid, its value types and percept generation.
pub mod world;
