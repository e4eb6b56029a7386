#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use crate::sat::cnf::Cnf;
use crate::sat::literal::{PackedLiteral, Symbol, Variable};
use core::ops::{Index, IndexMut};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }
}

/// A satisfying assignment, by symbol name.
pub type Model = BTreeMap<Symbol, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<usize> for Assignment {
    type Output = VarState;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Assignment {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Assignment {
    pub fn new(n: usize) -> Self {
        Self(vec![VarState::Unassigned; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: PackedLiteral) {
        self.0[lit.index()] = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.0.get(var as usize) {
            Some(VarState::Assigned(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn literal_value(&self, lit: PackedLiteral) -> Option<bool> {
        self.var_value(lit.variable()).map(|b| b == lit.polarity())
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn unassigned(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_unassigned())
            .map(|(i, _)| i as Variable)
    }

    /// Named model; unassigned variables are reported as `false`.
    pub fn to_model(&self, cnf: &Cnf) -> Model {
        cnf.symbols()
            .iter()
            .enumerate()
            .map(|(i, &symbol)| (symbol, matches!(self.0.get(i), Some(VarState::Assigned(true)))))
            .collect()
    }

    /// Dense boolean view, unassigned as `false`.
    pub fn to_vec(&self) -> Vec<bool> {
        self.0
            .iter()
            .map(|s| matches!(s, VarState::Assigned(true)))
            .collect()
    }
}
