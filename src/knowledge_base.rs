//! The agent's knowledge as two partitioned clause sets.
//!
//! Pit propositions and Wumpus propositions never share a clause, so they are kept
//! apart and each query only compiles the partition it needs. Every mutation is a
//! set operation; telling the same thing twice is a no-op.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Partition, Symbol};
use crate::world::components::{Percept, Percepts, Point};
use std::collections::BTreeSet;
use std::collections::btree_set;
use tracing::debug;

/// An ordered, duplicate-free conjunction of clauses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClauseSet(BTreeSet<Clause>);

impl ClauseSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the clause was not present.
    pub fn insert(&mut self, clause: Clause) -> bool {
        self.0.insert(clause)
    }

    pub fn remove(&mut self, clause: &Clause) -> bool {
        self.0.remove(clause)
    }

    pub fn contains(&self, clause: &Clause) -> bool {
        self.0.contains(clause)
    }

    pub fn retain<F: FnMut(&Clause) -> bool>(&mut self, f: F) {
        self.0.retain(f);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Clause> {
        self.0.iter()
    }

    /// Unit clauses, i.e. facts.
    pub fn facts(&self) -> impl Iterator<Item = Literal> + '_ {
        self.0.iter().filter_map(Clause::as_unit)
    }
}

impl Extend<Clause> for ClauseSet {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Clause> for ClauseSet {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ClauseSet {
    type Item = &'a Clause;
    type IntoIter = btree_set::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Encodes `left ⇔ (r1 ∨ … ∨ rn)` as `{¬left, r1, …, rn}` plus `{¬ri, left}` for
/// every `ri`.
///
/// With no right-hand literals the biconditional reduces to `¬left`.
pub fn conversion_to_cnf(left: Literal, right: &[Literal]) -> ClauseSet {
    let mut clauses = ClauseSet::new();
    clauses.insert(
        core::iter::once(left.negate())
            .chain(right.iter().copied())
            .collect(),
    );
    for &r in right {
        clauses.insert(Clause::new([r.negate(), left]));
    }
    clauses
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnowledgeBase {
    pit_rules: ClauseSet,
    wumpus_rules: ClauseSet,
}

impl KnowledgeBase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn pit_rules(&self) -> &ClauseSet {
        &self.pit_rules
    }

    pub const fn wumpus_rules(&self) -> &ClauseSet {
        &self.wumpus_rules
    }

    pub const fn rules(&self, partition: Partition) -> &ClauseSet {
        match partition {
            Partition::Pit => &self.pit_rules,
            Partition::Wumpus => &self.wumpus_rules,
        }
    }

    const fn rules_mut(&mut self, partition: Partition) -> &mut ClauseSet {
        match partition {
            Partition::Pit => &mut self.pit_rules,
            Partition::Wumpus => &mut self.wumpus_rules,
        }
    }

    /// Unions `clauses` into one partition.
    pub fn tell<I: IntoIterator<Item = Clause>>(&mut self, clauses: I, partition: Partition) {
        self.rules_mut(partition).extend(clauses);
    }

    /// Asserts a single literal in the partition its symbol belongs to.
    pub fn tell_fact(&mut self, fact: Literal) {
        if self.rules_mut(fact.symbol.partition()).insert(Clause::unit(fact)) {
            debug!(%fact, "told fact");
        }
    }

    /// Drops both polarities of a fact about `symbol`.
    pub fn retract(&mut self, symbol: Symbol) {
        let rules = self.rules_mut(symbol.partition());
        rules.remove(&Clause::unit(Literal::positive(symbol)));
        rules.remove(&Clause::unit(Literal::negative(symbol)));
    }

    /// Adds `Breeze(cell) ⇔ ∨ Pit(n)` and `Stench(cell) ⇔ ∨ Wumpus(n)` over the
    /// in-bounds neighbours of `cell`.
    pub fn tell_cell_rules(&mut self, cell: Point, size: usize) {
        let neighbours: Vec<Point> = cell.neighbours(size).map(|(n, _)| n).collect();
        if neighbours.is_empty() {
            return;
        }

        let pits: Vec<Literal> = neighbours
            .iter()
            .map(|&n| Literal::positive(Symbol::Pit(n)))
            .collect();
        let pit_rules = conversion_to_cnf(Literal::positive(Symbol::Breeze(cell)), &pits);
        self.tell(pit_rules.0, Partition::Pit);

        let wumpuses: Vec<Literal> = neighbours
            .iter()
            .map(|&n| Literal::positive(Symbol::Wumpus(n)))
            .collect();
        let wumpus_rules = conversion_to_cnf(Literal::positive(Symbol::Stench(cell)), &wumpuses);
        self.tell(wumpus_rules.0, Partition::Wumpus);
    }

    /// Replaces whatever breeze, stench and glitter facts were recorded for `cell`
    /// with the ones `percepts` implies.
    pub fn retract_and_tell_percept_facts(&mut self, cell: Point, percepts: Percepts) {
        let observed = [
            (Symbol::Breeze(cell), Percept::Breeze),
            (Symbol::Stench(cell), Percept::Stench),
            (Symbol::Glitter(cell), Percept::Glitter),
        ];
        for (symbol, percept) in observed {
            self.retract(symbol);
            self.tell_fact(Literal::new(symbol, !percepts.contains(percept)));
        }
    }

    /// Forgets every stench fact. A dead Wumpus may leave earlier stench
    /// observations unexplained; they are re-told when the cells are revisited.
    pub fn process_scream_event(&mut self) {
        let before = self.wumpus_rules.len();
        self.wumpus_rules.retain(|clause| {
            !matches!(clause.as_unit(), Some(Literal { symbol: Symbol::Stench(_), .. }))
        });
        debug!(removed = before - self.wumpus_rules.len(), "dropped stench facts");
    }

    /// Forgets every Wumpus and stench fact, keeping the structural rules.
    pub fn reset_wumpus_facts(&mut self) {
        self.wumpus_rules.retain(|clause| !clause.is_unit());
    }

    /// `(pit, wumpus)` clause counts.
    pub fn clause_counts(&self) -> (usize, usize) {
        (self.pit_rules.len(), self.wumpus_rules.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breeze(x: i32, y: i32) -> Literal {
        Literal::positive(Symbol::Breeze(Point::new(x, y)))
    }

    fn pit(x: i32, y: i32) -> Literal {
        Literal::positive(Symbol::Pit(Point::new(x, y)))
    }

    #[test]
    fn test_conversion_to_cnf() {
        let clauses = conversion_to_cnf(breeze(0, 0), &[pit(1, 0), pit(0, 1)]);
        assert_eq!(clauses.len(), 3);
        assert!(clauses.contains(&Clause::new([!breeze(0, 0), pit(1, 0), pit(0, 1)])));
        assert!(clauses.contains(&Clause::new([!pit(1, 0), breeze(0, 0)])));
        assert!(clauses.contains(&Clause::new([!pit(0, 1), breeze(0, 0)])));
    }

    #[test]
    fn test_conversion_with_no_right_side() {
        let clauses = conversion_to_cnf(breeze(0, 0), &[]);
        assert_eq!(clauses.facts().collect::<Vec<_>>(), vec![!breeze(0, 0)]);
    }

    #[test]
    fn test_tell_fact_routing() {
        let mut kb = KnowledgeBase::new();
        kb.tell_fact(!pit(1, 1));
        kb.tell_fact(Literal::positive(Symbol::Stench(Point::new(1, 1))));
        kb.tell_fact(Literal::negative(Symbol::Glitter(Point::new(1, 1))));
        kb.tell_fact(!pit(1, 1));
        assert_eq!(kb.clause_counts(), (2, 1));
    }

    #[test]
    fn test_retract_and_tell() {
        let mut kb = KnowledgeBase::new();
        let cell = Point::new(2, 2);
        kb.retract_and_tell_percept_facts(cell, [Percept::Stench].into_iter().collect());
        assert!(kb
            .wumpus_rules()
            .contains(&Clause::unit(Literal::positive(Symbol::Stench(cell)))));

        kb.retract_and_tell_percept_facts(cell, Percepts::empty());
        assert!(kb
            .wumpus_rules()
            .contains(&Clause::unit(Literal::negative(Symbol::Stench(cell)))));
        assert!(!kb
            .wumpus_rules()
            .contains(&Clause::unit(Literal::positive(Symbol::Stench(cell)))));
        assert_eq!(kb.clause_counts(), (2, 1));
    }

    #[test]
    fn test_scream_drops_stench_facts_only() {
        let mut kb = KnowledgeBase::new();
        kb.tell_cell_rules(Point::new(0, 0), 4);
        let rules = kb.wumpus_rules().len();
        kb.tell_fact(Literal::positive(Symbol::Stench(Point::new(0, 0))));
        kb.tell_fact(Literal::negative(Symbol::Wumpus(Point::new(0, 0))));

        kb.process_scream_event();
        assert_eq!(kb.wumpus_rules().len(), rules + 1);

        kb.reset_wumpus_facts();
        assert_eq!(kb.wumpus_rules().len(), rules);
    }

    #[test]
    fn test_cell_rules_corner() {
        let mut kb = KnowledgeBase::new();
        kb.tell_cell_rules(Point::new(0, 0), 4);
        assert_eq!(kb.clause_counts(), (3, 3));
    }
}
