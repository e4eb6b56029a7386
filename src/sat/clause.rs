#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Disjunctions of named literals.

use crate::sat::literal::{Literal, Symbol};
use core::fmt::{self, Display};
use itertools::Itertools;
use smallvec::SmallVec;

/// Result of evaluating a clause under a partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseValue {
    /// Some literal matches the assignment.
    True,
    /// Every literal is assigned and none matches.
    False,
    /// Not yet decided.
    Undetermined,
}

/// A set of literals read as their disjunction.
///
/// Literals are kept sorted and deduplicated, so two clauses with the same
/// literals compare and hash equal regardless of construction order. The empty
/// clause is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: SmallVec<[Literal; 5]>,
}

impl Clause {
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        let mut literals: SmallVec<[Literal; 5]> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    /// A single-literal clause, i.e. a fact.
    #[must_use]
    pub fn unit(literal: Literal) -> Self {
        Self {
            literals: smallvec::smallvec![literal],
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// The only literal of a unit clause.
    #[must_use]
    pub fn as_unit(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.literals.binary_search(literal).is_ok()
    }

    /// Whether the clause holds both polarities of some symbol.
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.symbol == b.symbol && a.negated != b.negated)
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.literals.iter().map(|l| l.symbol).dedup()
    }

    /// Three-valued evaluation; `lookup` returns `None` for unassigned symbols.
    pub fn evaluate<F: Fn(Symbol) -> Option<bool>>(&self, lookup: F) -> ClauseValue {
        let mut undetermined = false;
        for lit in &self.literals {
            match lookup(lit.symbol) {
                Some(value) if lit.holds_when(value) => return ClauseValue::True,
                Some(_) => {}
                None => undetermined = true,
            }
        }
        if undetermined {
            ClauseValue::Undetermined
        } else {
            ClauseValue::False
        }
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Literal> for Clause {
    fn from(literal: Literal) -> Self {
        Self::unit(literal)
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literals.as_slice() {
            [] => f.write_str("⊥"),
            [only] => write!(f, "{only}"),
            many => write!(f, "({})", many.iter().join(" ∨ ")),
        }
    }
}
