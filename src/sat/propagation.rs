#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Simplification step run at every node of the search.
//!
//! One scan over the clause list classifies each clause under the current
//! assignment. The outcome either settles the node (every clause satisfied, or one
//! falsified) or names the next literal the solver is forced to assign.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::PackedLiteral;
use crate::sat::trail::Reason;
use bit_vec::BitVec;

/// What a propagator concluded about the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Every clause has a true literal.
    Satisfied,
    /// The clause at this index is false.
    Conflict(usize),
    /// This literal must be assigned.
    Forced(PackedLiteral, Reason),
    /// Nothing forced; the solver has to branch.
    Undecided,
}

pub trait Propagator {
    fn new(cnf: &Cnf) -> Self;
    fn propagate(&mut self, cnf: &Cnf, assignment: &Assignment) -> Propagation;
}

/// Unit clauses first, then pure literals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitPropagationWithPureLiterals {
    positive: BitVec,
    negative: BitVec,
}

impl Propagator for UnitPropagationWithPureLiterals {
    fn new(cnf: &Cnf) -> Self {
        Self {
            positive: BitVec::from_elem(cnf.num_vars, false),
            negative: BitVec::from_elem(cnf.num_vars, false),
        }
    }

    fn propagate(&mut self, cnf: &Cnf, assignment: &Assignment) -> Propagation {
        self.positive.clear();
        self.negative.clear();

        let mut all_satisfied = true;
        let mut unit = None;

        for (idx, clause) in cnf.iter().enumerate() {
            let mut satisfied = false;
            let mut free = 0usize;
            let mut last_free = None;

            for &lit in clause {
                match assignment.literal_value(lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        free += 1;
                        last_free = Some(lit);
                    }
                }
            }

            if satisfied {
                continue;
            }
            all_satisfied = false;

            match (free, last_free) {
                (0, _) => return Propagation::Conflict(idx),
                (1, Some(lit)) if unit.is_none() => unit = Some((lit, idx)),
                _ => {}
            }

            for &lit in clause {
                if assignment.literal_value(lit).is_none() {
                    if lit.polarity() {
                        self.positive.set(lit.index(), true);
                    } else {
                        self.negative.set(lit.index(), true);
                    }
                }
            }
        }

        if all_satisfied {
            return Propagation::Satisfied;
        }

        if let Some((lit, idx)) = unit {
            return Propagation::Forced(lit, Reason::Unit(idx));
        }

        self.pure_literal()
            .map_or(Propagation::Undecided, |lit| Propagation::Forced(lit, Reason::Pure))
    }
}

impl UnitPropagationWithPureLiterals {
    /// Lowest variable occurring in only one polarity among unsatisfied clauses.
    fn pure_literal(&self) -> Option<PackedLiteral> {
        self.positive
            .iter()
            .zip(self.negative.iter())
            .enumerate()
            .find_map(|(var, (pos, neg))| {
                #[allow(clippy::cast_possible_truncation)]
                let var = var as u32;
                match (pos, neg) {
                    (true, false) => Some(PackedLiteral::new(var, true)),
                    (false, true) => Some(PackedLiteral::new(var, false)),
                    _ => None,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::literal::{Literal, Symbol};
    use crate::world::components::Point;

    fn lit(x: i32, negated: bool) -> Literal {
        Literal::new(Symbol::Wumpus(Point::new(x, 0)), negated)
    }

    fn var(cnf: &Cnf, x: i32) -> u32 {
        cnf.variable(Symbol::Wumpus(Point::new(x, 0))).unwrap()
    }

    #[test]
    fn test_unit_before_pure() {
        let clauses = [
            Clause::new([lit(0, false), lit(1, false)]),
            Clause::unit(lit(1, true)),
        ];
        let cnf = Cnf::from_clauses(&clauses);
        let a = Assignment::new(cnf.num_vars);
        let mut p = UnitPropagationWithPureLiterals::new(&cnf);

        assert_eq!(
            p.propagate(&cnf, &a),
            Propagation::Forced(PackedLiteral::new(var(&cnf, 1), false), Reason::Unit(1))
        );
    }

    #[test]
    fn test_pure_literal() {
        let clauses = [
            Clause::new([lit(0, false), lit(1, false)]),
            Clause::new([lit(0, false), lit(1, true)]),
        ];
        let cnf = Cnf::from_clauses(&clauses);
        let a = Assignment::new(cnf.num_vars);
        let mut p = UnitPropagationWithPureLiterals::new(&cnf);

        assert_eq!(
            p.propagate(&cnf, &a),
            Propagation::Forced(PackedLiteral::new(var(&cnf, 0), true), Reason::Pure)
        );
    }

    #[test]
    fn test_conflict_and_satisfied() {
        let clauses = [Clause::unit(lit(0, false)), Clause::unit(lit(1, false))];
        let cnf = Cnf::from_clauses(&clauses);
        let mut p = UnitPropagationWithPureLiterals::new(&cnf);

        let mut a = Assignment::new(cnf.num_vars);
        a.assign(PackedLiteral::new(var(&cnf, 0), false));
        assert_eq!(p.propagate(&cnf, &a), Propagation::Conflict(0));

        let mut a = Assignment::new(cnf.num_vars);
        a.assign(PackedLiteral::new(var(&cnf, 0), true));
        a.assign(PackedLiteral::new(var(&cnf, 1), true));
        assert_eq!(p.propagate(&cnf, &a), Propagation::Satisfied);
    }

    #[test]
    fn test_empty_clause_conflicts() {
        let cnf = Cnf::from_clauses(&[Clause::default()]);
        let mut p = UnitPropagationWithPureLiterals::new(&cnf);
        assert_eq!(
            p.propagate(&cnf, &Assignment::new(0)),
            Propagation::Conflict(0)
        );
    }
}
