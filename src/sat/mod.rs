#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod dpll;
pub mod literal;
pub mod propagation;
pub mod solver;
pub mod trail;
pub mod variable_selection;
