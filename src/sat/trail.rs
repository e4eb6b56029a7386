#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::assignment::Assignment;
use crate::sat::literal::PackedLiteral;
use std::ops::Index;

/// Why a literal sits on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// A branching choice. `flipped` once its second value is being explored.
    Decision { flipped: bool },
    /// Forced by the clause at this index.
    Unit(usize),
    /// Pure literal.
    Pure,
}

impl Default for Reason {
    fn default() -> Self {
        Self::Decision { flipped: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    pub lit: PackedLiteral,
    pub decision_level: usize,
    pub reason: Reason,
}

/// Chronological record of assignments, used to undo them on backtrack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
        }
    }

    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.t.last().map_or(0, |s| s.decision_level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    /// Records `lit` and assigns it.
    pub fn push(&mut self, assignment: &mut Assignment, lit: PackedLiteral, reason: Reason) {
        let decision_level = match reason {
            Reason::Decision { .. } => self.decision_level() + 1,
            _ => self.decision_level(),
        };
        assignment.assign(lit);
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
    }

    /// Undoes assignments up to and including the most recent decision whose
    /// other value has not been tried, and returns that decision's literal.
    ///
    /// Flipped decisions are exhausted and are popped as well. `None` means the
    /// search space is exhausted.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> Option<PackedLiteral> {
        while let Some(step) = self.t.pop() {
            assignment.unassign(step.lit.variable());
            if step.reason == (Reason::Decision { flipped: false }) {
                return Some(step.lit);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtrack_to_unflipped_decision() {
        let mut a = Assignment::new(4);
        let mut trail = Trail::new(4);

        trail.push(&mut a, PackedLiteral::new(0, true), Reason::Unit(0));
        trail.push(&mut a, PackedLiteral::new(1, true), Reason::default());
        trail.push(&mut a, PackedLiteral::new(2, false), Reason::Unit(3));
        trail.push(&mut a, PackedLiteral::new(3, false), Reason::Decision { flipped: true });
        assert_eq!(trail.decision_level(), 2);

        let lit = trail.backtrack(&mut a);
        assert_eq!(lit, Some(PackedLiteral::new(1, true)));
        assert_eq!(trail.len(), 1);
        assert_eq!(a.var_value(0), Some(true));
        assert_eq!(a.var_value(1), None);
        assert_eq!(a.var_value(3), None);

        trail.push(&mut a, !PackedLiteral::new(1, true), Reason::Decision { flipped: true });
        assert_eq!(trail.backtrack(&mut a), None);
        assert!(trail.is_empty());
    }
}
