//! Entailment queries over the knowledge base.
//!
//! `KB ⊨ α` is decided by refutation: the partition holding α's symbol is compiled
//! together with the unit clause `¬α`, and α is entailed exactly when that formula
//! is unsatisfiable. Each query is bounded by a DPLL decision budget; a query that
//! runs out is [`Entailment::Inconclusive`] and every caller reads it as "not
//! proven".

use crate::config::InferenceSettings;
use crate::knowledge_base::{ClauseSet, KnowledgeBase};
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::Dpll;
use crate::sat::literal::{Literal, Symbol};
use crate::sat::solver::{SolutionStats, SolveResult, Solver, SolverLimits};
use crate::world::components::Point;
use core::ops::AddAssign;
use serde::Serialize;
use tracing::{debug, warn};

/// Answer to a single entailment query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entailment {
    Proven,
    NotProven,
    /// The decision budget ran out.
    Inconclusive,
}

impl Entailment {
    pub const fn is_proven(self) -> bool {
        matches!(self, Self::Proven)
    }
}

/// What the knowledge base can say about a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellStatus {
    Safe,
    DangerousWumpus,
    DangerousPit,
    Uncertain,
}

/// Running totals across every query an engine has answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InferenceStats {
    pub queries: usize,
    pub proven: usize,
    pub inconclusive: usize,
    pub inconsistencies: usize,
    pub solver: SolutionStats,
}

impl AddAssign for InferenceStats {
    fn add_assign(&mut self, rhs: Self) {
        self.queries += rhs.queries;
        self.proven += rhs.proven;
        self.inconclusive += rhs.inconclusive;
        self.inconsistencies += rhs.inconsistencies;
        self.solver += rhs.solver;
    }
}

#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    limits: SolverLimits,
    stats: InferenceStats,
}

impl InferenceEngine {
    #[must_use]
    pub fn new(settings: InferenceSettings) -> Self {
        Self {
            limits: SolverLimits {
                max_decisions: settings.max_decisions,
            },
            stats: InferenceStats::default(),
        }
    }

    pub const fn stats(&self) -> InferenceStats {
        self.stats
    }

    /// Decides `rules ⊨ alpha`.
    pub fn entails(&mut self, rules: &ClauseSet, alpha: Literal) -> Entailment {
        let mut cnf = Cnf::from_clauses(rules);
        cnf.push_clause(&Clause::unit(alpha.negate()));

        let mut solver: Dpll = Dpll::new(cnf, self.limits);
        let result = solver.solve();

        self.stats.queries += 1;
        self.stats.solver += solver.stats();

        let answer = match result {
            SolveResult::Unsat => Entailment::Proven,
            SolveResult::Sat(_) => Entailment::NotProven,
            SolveResult::Unknown => Entailment::Inconclusive,
        };
        match answer {
            Entailment::Proven => self.stats.proven += 1,
            Entailment::Inconclusive => {
                self.stats.inconclusive += 1;
                debug!(%alpha, "entailment query exhausted its decision budget");
            }
            Entailment::NotProven => {}
        }
        answer
    }

    /// Whether the Wumpus partition entails `alpha`.
    pub fn ask_wumpus(&mut self, wumpus_rules: &ClauseSet, alpha: Literal) -> bool {
        self.entails(wumpus_rules, alpha).is_proven()
    }

    /// Whether the pit partition entails `alpha`.
    pub fn ask_pit(&mut self, pit_rules: &ClauseSet, alpha: Literal) -> bool {
        self.entails(pit_rules, alpha).is_proven()
    }

    /// A cell is safe when both `¬W` and `¬P` are proven and neither hazard is
    /// proven as well. A cell whose hazard is proven both ways is reported unsafe.
    pub fn ask_safe(&mut self, wumpus_rules: &ClauseSet, pit_rules: &ClauseSet, cell: Point) -> bool {
        let wumpus = Symbol::Wumpus(cell);
        let pit = Symbol::Pit(cell);

        if !self.ask_wumpus(wumpus_rules, Literal::negative(wumpus))
            || !self.ask_pit(pit_rules, Literal::negative(pit))
        {
            return false;
        }

        let wumpus_too = self.ask_wumpus(wumpus_rules, Literal::positive(wumpus));
        let pit_too = self.ask_pit(pit_rules, Literal::positive(pit));
        if wumpus_too || pit_too {
            self.stats.inconsistencies += 1;
            warn!(%cell, wumpus_too, pit_too, "knowledge base is contradictory for cell");
            return false;
        }
        true
    }

    /// Whether either hazard is positively proven at `cell`.
    pub fn ask_dangerous(&mut self, wumpus_rules: &ClauseSet, pit_rules: &ClauseSet, cell: Point) -> bool {
        self.ask_wumpus(wumpus_rules, Literal::positive(Symbol::Wumpus(cell)))
            || self.ask_pit(pit_rules, Literal::positive(Symbol::Pit(cell)))
    }

    pub fn classify(&mut self, kb: &KnowledgeBase, cell: Point) -> CellStatus {
        if self.ask_safe(kb.wumpus_rules(), kb.pit_rules(), cell) {
            CellStatus::Safe
        } else if self.ask_wumpus(kb.wumpus_rules(), Literal::positive(Symbol::Wumpus(cell))) {
            CellStatus::DangerousWumpus
        } else if self.ask_pit(kb.pit_rules(), Literal::positive(Symbol::Pit(cell))) {
            CellStatus::DangerousPit
        } else {
            CellStatus::Uncertain
        }
    }
}

/// A knowledge base together with the engine that answers questions about it.
#[derive(Debug, Clone, Default)]
pub struct Reasoner {
    pub kb: KnowledgeBase,
    pub engine: InferenceEngine,
}

impl Reasoner {
    #[must_use]
    pub fn new(settings: InferenceSettings) -> Self {
        Self {
            kb: KnowledgeBase::new(),
            engine: InferenceEngine::new(settings),
        }
    }

    pub fn ask_safe(&mut self, cell: Point) -> bool {
        self.engine
            .ask_safe(self.kb.wumpus_rules(), self.kb.pit_rules(), cell)
    }

    pub fn ask_dangerous(&mut self, cell: Point) -> bool {
        self.engine
            .ask_dangerous(self.kb.wumpus_rules(), self.kb.pit_rules(), cell)
    }

    /// `W(cell)` is proven.
    pub fn proves_wumpus(&mut self, cell: Point) -> bool {
        self.engine
            .ask_wumpus(self.kb.wumpus_rules(), Literal::positive(Symbol::Wumpus(cell)))
    }

    /// `¬W(cell)` is proven.
    pub fn proves_no_wumpus(&mut self, cell: Point) -> bool {
        self.engine
            .ask_wumpus(self.kb.wumpus_rules(), Literal::negative(Symbol::Wumpus(cell)))
    }

    /// `P(cell)` is proven.
    pub fn proves_pit(&mut self, cell: Point) -> bool {
        self.engine
            .ask_pit(self.kb.pit_rules(), Literal::positive(Symbol::Pit(cell)))
    }

    /// `¬P(cell)` is proven.
    pub fn proves_no_pit(&mut self, cell: Point) -> bool {
        self.engine
            .ask_pit(self.kb.pit_rules(), Literal::negative(Symbol::Pit(cell)))
    }

    pub fn classify(&mut self, cell: Point) -> CellStatus {
        self.engine.classify(&self.kb, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::components::{Percept, Percepts};

    fn reasoner() -> Reasoner {
        Reasoner::new(InferenceSettings::default())
    }

    fn visit(r: &mut Reasoner, cell: Point, percepts: Percepts) {
        r.kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
        r.kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
        r.kb.tell_cell_rules(cell, 4);
        r.kb.retract_and_tell_percept_facts(cell, percepts);
    }

    #[test]
    fn test_no_breeze_no_stench_makes_neighbours_safe() {
        let mut r = reasoner();
        visit(&mut r, Point::new(0, 0), Percepts::empty());
        assert!(r.ask_safe(Point::new(1, 0)));
        assert!(r.ask_safe(Point::new(0, 1)));
        assert!(!r.ask_safe(Point::new(1, 1)));
        assert_eq!(r.classify(Point::new(2, 2)), CellStatus::Uncertain);
    }

    #[test]
    fn test_breeze_leaves_neighbours_uncertain() {
        let mut r = reasoner();
        visit(&mut r, Point::new(0, 0), Percepts::empty());
        visit(&mut r, Point::new(1, 0), [Percept::Breeze].into_iter().collect());
        assert!(!r.ask_safe(Point::new(2, 0)));
        assert!(!r.ask_safe(Point::new(1, 1)));
        assert!(!r.proves_pit(Point::new(1, 1)));
        assert!(r.proves_no_wumpus(Point::new(2, 0)));
    }

    #[test]
    fn test_wumpus_pinned_by_stench() {
        let mut r = reasoner();
        // Stench at (1,0) with (0,0) and (1,1) cleared leaves only (2,0).
        visit(&mut r, Point::new(0, 0), Percepts::empty());
        visit(&mut r, Point::new(1, 0), [Percept::Stench].into_iter().collect());
        r.kb.tell_fact(Literal::negative(Symbol::Wumpus(Point::new(1, 1))));
        assert!(r.proves_wumpus(Point::new(2, 0)));
        assert_eq!(r.classify(Point::new(2, 0)), CellStatus::DangerousWumpus);
        assert!(r.ask_dangerous(Point::new(2, 0)));
    }

    #[test]
    fn test_contradiction_is_not_safe() {
        let mut r = reasoner();
        let cell = Point::new(3, 3);
        r.kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
        r.kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
        r.kb.tell_fact(Literal::positive(Symbol::Wumpus(cell)));
        assert!(!r.ask_safe(cell));
        assert_eq!(r.engine.stats().inconsistencies, 1);
    }

    #[test]
    fn test_exhausted_budget_is_inconclusive() {
        let a = Literal::positive(Symbol::Pit(Point::new(0, 1)));
        let b = Literal::positive(Symbol::Pit(Point::new(1, 0)));
        let rules: ClauseSet = [Clause::new([a, b]), Clause::new([!a, !b])]
            .into_iter()
            .collect();

        let mut starved = InferenceEngine::new(InferenceSettings { max_decisions: 0 });
        let alpha = Literal::positive(Symbol::Pit(Point::new(3, 3)));
        assert_eq!(starved.entails(&rules, alpha), Entailment::Inconclusive);
        assert_eq!(starved.stats().inconclusive, 1);

        let mut engine = InferenceEngine::new(InferenceSettings::default());
        assert_eq!(engine.entails(&rules, alpha), Entailment::NotProven);
        assert_eq!(engine.entails(&rules, !a), Entailment::NotProven);
    }
}
