#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::PackedLiteral;

/// Branching heuristic. Returns the literal to try first; the solver tries its
/// negation after a conflict.
pub trait VariableSelection {
    fn new(cnf: &Cnf) -> Self;
    fn pick(&mut self, cnf: &Cnf, assignment: &Assignment) -> Option<PackedLiteral>;
}

/// Maximum Occurrences in clauses of Minimum Size.
///
/// Only clauses not yet satisfied count, and size means unassigned literals. Ties
/// go to the lowest variable. The positive literal is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Moms {
    counts: Vec<u32>,
}

impl VariableSelection for Moms {
    fn new(cnf: &Cnf) -> Self {
        Self {
            counts: vec![0; cnf.num_vars],
        }
    }

    fn pick(&mut self, cnf: &Cnf, assignment: &Assignment) -> Option<PackedLiteral> {
        self.counts.iter_mut().for_each(|c| *c = 0);

        let min_size = cnf
            .iter()
            .filter(|c| is_open(c, assignment))
            .map(|c| free_count(c, assignment))
            .filter(|&n| n > 0)
            .min()?;

        for clause in cnf
            .iter()
            .filter(|c| is_open(c, assignment) && free_count(c, assignment) == min_size)
        {
            for &lit in clause {
                if assignment.literal_value(lit).is_none() {
                    self.counts[lit.index()] += 1;
                }
            }
        }

        let mut best: Option<(u32, u32)> = None;
        for (var, &count) in (0..).zip(self.counts.iter()) {
            if count > 0 && best.is_none_or(|(_, c)| count > c) {
                best = Some((var, count));
            }
        }

        best.map(|(var, _)| PackedLiteral::new(var, true))
    }
}

fn is_open(clause: &[PackedLiteral], assignment: &Assignment) -> bool {
    !clause
        .iter()
        .any(|&l| assignment.literal_value(l) == Some(true))
}

fn free_count(clause: &[PackedLiteral], assignment: &Assignment) -> usize {
    clause
        .iter()
        .filter(|&&l| assignment.literal_value(l).is_none())
        .count()
}

/// Lowest unassigned variable, positive first. Used as a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedOrder;

impl VariableSelection for FixedOrder {
    fn new(_: &Cnf) -> Self {
        Self
    }

    fn pick(&mut self, _: &Cnf, assignment: &Assignment) -> Option<PackedLiteral> {
        assignment
            .unassigned()
            .next()
            .map(|var| PackedLiteral::new(var, true))
    }
}
