#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use core::ops::AddAssign;
use serde::Serialize;

/// Outcome of one satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Sat(Model),
    Unsat,
    /// The decision budget ran out first.
    Unknown,
}

impl SolveResult {
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverLimits {
    pub max_decisions: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_decisions: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SolutionStats {
    pub decisions: usize,
    pub propagations: usize,
    pub pure_literals: usize,
    pub conflicts: usize,
}

impl AddAssign for SolutionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.decisions += rhs.decisions;
        self.propagations += rhs.propagations;
        self.pure_literals += rhs.pure_literals;
        self.conflicts += rhs.conflicts;
    }
}

pub trait Solver {
    fn new(cnf: Cnf, limits: SolverLimits) -> Self;
    fn solve(&mut self) -> SolveResult;
    fn stats(&self) -> SolutionStats;
}
