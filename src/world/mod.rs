//! The simulated environment: value types and the authoritative grid.

pub mod components;
pub mod grid;

pub use components::{Action, CellContents, Direction, Marker, Percept, Percepts, Point};
pub use grid::{World, WorldState, WumpusMove};
