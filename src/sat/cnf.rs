#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Compiled conjunctive normal form.
//!
//! The knowledge base stores clauses over named [`Symbol`]s. Before a query the
//! relevant clauses are interned into a [`Cnf`]: each distinct symbol gets a dense
//! [`Variable`] and every clause becomes a short vector of [`PackedLiteral`]s.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, PackedLiteral, Symbol, Variable};
use core::ops::Index;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

pub type PackedClause = SmallVec<[PackedLiteral; 8]>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<PackedClause>,
    pub num_vars: usize,
    symbols: Vec<Symbol>,
    index: FxHashMap<Symbol, Variable>,
}

impl Index<usize> for Cnf {
    type Output = PackedClause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl Cnf {
    /// Interns `clauses`, dropping tautologies.
    pub fn from_clauses<'a, I: IntoIterator<Item = &'a Clause>>(clauses: I) -> Self {
        let mut cnf = Self::default();
        for clause in clauses {
            cnf.push_clause(clause);
        }
        cnf
    }

    pub fn push_clause(&mut self, clause: &Clause) {
        if clause.is_tautology() {
            return;
        }
        let packed = clause.iter().map(|&lit| self.intern(lit)).collect();
        self.clauses.push(packed);
    }

    fn intern(&mut self, lit: Literal) -> PackedLiteral {
        let var = match self.index.get(&lit.symbol) {
            Some(&var) => var,
            None => {
                #[allow(clippy::cast_possible_truncation)]
                let var = self.symbols.len() as Variable;
                self.symbols.push(lit.symbol);
                self.index.insert(lit.symbol, var);
                self.num_vars += 1;
                var
            }
        };
        PackedLiteral::new(var, !lit.negated)
    }

    /// The variable of `symbol`, if it occurs in the formula.
    #[must_use]
    pub fn variable(&self, symbol: Symbol) -> Option<Variable> {
        self.index.get(&symbol).copied()
    }

    #[must_use]
    pub fn symbol(&self, var: Variable) -> Option<Symbol> {
        self.symbols.get(var as usize).copied()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackedClause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether a total assignment (indexed by variable) satisfies every clause.
    #[must_use]
    pub fn verify(&self, model: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| model.get(lit.index()).is_some_and(|&v| v == lit.polarity()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::components::Point;

    fn lit(x: i32, negated: bool) -> Literal {
        Literal::new(Symbol::Pit(Point::new(x, 0)), negated)
    }

    #[test]
    fn test_interning() {
        let clauses = [
            Clause::new([lit(0, false), lit(1, true)]),
            Clause::new([lit(1, false), lit(2, false)]),
        ];
        let cnf = Cnf::from_clauses(&clauses);
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.len(), 2);

        let v1 = cnf.variable(Symbol::Pit(Point::new(1, 0))).unwrap();
        assert_eq!(cnf.symbol(v1), Some(Symbol::Pit(Point::new(1, 0))));
        assert!(cnf[0].contains(&PackedLiteral::new(v1, false)));
        assert!(cnf[1].contains(&PackedLiteral::new(v1, true)));
    }

    #[test]
    fn test_tautologies_dropped() {
        let clauses = [Clause::new([lit(0, false), lit(0, true)])];
        let cnf = Cnf::from_clauses(&clauses);
        assert!(cnf.is_empty());
    }

    #[test]
    fn test_verify() {
        let clauses = [Clause::new([lit(0, false), lit(1, false)]), Clause::unit(lit(0, true))];
        let cnf = Cnf::from_clauses(&clauses);
        assert!(cnf.verify(&[false, true]));
        assert!(!cnf.verify(&[true, true]));
        assert!(!cnf.verify(&[false, false]));
    }
}
