#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! The search is iterative. Every assignment goes on an explicit [`Trail`], and a
//! conflict pops the trail back to the most recent decision whose second value is
//! still untried. At each node the solver:
//! 1.  stops if every clause is satisfied or some clause is falsified;
//! 2.  assigns the literal of a unit clause, if there is one;
//! 3.  otherwise assigns a pure literal, if there is one;
//! 4.  otherwise branches on the literal the selection heuristic picks, trying
//!     its negation only after the first value leads to a conflict.
//!
//! The number of branching decisions is capped by [`SolverLimits`]. Running out
//! yields [`SolveResult::Unknown`] rather than a wrong answer.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::propagation::{Propagation, Propagator, UnitPropagationWithPureLiterals};
use crate::sat::solver::{SolutionStats, SolveResult, Solver, SolverLimits};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::{Moms, VariableSelection};

#[derive(Debug, Clone)]
pub struct Dpll<P = UnitPropagationWithPureLiterals, S = Moms> {
    pub cnf: Cnf,
    pub assignment: Assignment,
    pub trail: Trail,
    pub propagator: P,
    pub selector: S,
    limits: SolverLimits,
    stats: SolutionStats,
}

impl<P: Propagator, S: VariableSelection> Solver for Dpll<P, S> {
    fn new(cnf: Cnf, limits: SolverLimits) -> Self {
        Self {
            assignment: Assignment::new(cnf.num_vars),
            trail: Trail::new(cnf.num_vars),
            propagator: P::new(&cnf),
            selector: S::new(&cnf),
            cnf,
            limits,
            stats: SolutionStats::default(),
        }
    }

    fn solve(&mut self) -> SolveResult {
        loop {
            match self.propagator.propagate(&self.cnf, &self.assignment) {
                Propagation::Satisfied => {
                    debug_assert!(self.cnf.verify(&self.assignment.to_vec()));
                    return SolveResult::Sat(self.assignment.to_model(&self.cnf));
                }
                Propagation::Conflict(_) => {
                    if !self.backtrack() {
                        return SolveResult::Unsat;
                    }
                }
                Propagation::Forced(lit, reason) => {
                    if reason == Reason::Pure {
                        self.stats.pure_literals += 1;
                    } else {
                        self.stats.propagations += 1;
                    }
                    self.trail.push(&mut self.assignment, lit, reason);
                }
                Propagation::Undecided => {
                    if self.stats.decisions >= self.limits.max_decisions {
                        return SolveResult::Unknown;
                    }
                    match self.selector.pick(&self.cnf, &self.assignment) {
                        Some(lit) => {
                            self.stats.decisions += 1;
                            self.trail
                                .push(&mut self.assignment, lit, Reason::default());
                        }
                        None => {
                            if !self.backtrack() {
                                return SolveResult::Unsat;
                            }
                        }
                    }
                }
            }
        }
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}

impl<P: Propagator, S: VariableSelection> Dpll<P, S> {
    /// Flips the latest open decision. `false` once no decision is left.
    fn backtrack(&mut self) -> bool {
        self.stats.conflicts += 1;
        match self.trail.backtrack(&mut self.assignment) {
            Some(lit) => {
                self.trail
                    .push(&mut self.assignment, !lit, Reason::Decision { flipped: true });
                true
            }
            None => false,
        }
    }
}
