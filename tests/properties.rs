use proptest::prelude::*;
use std::collections::BTreeSet;
use wumpus_world::agent::belief::WumpusBelief;
use wumpus_world::agent::planner::{SafeCells, plan, replay};
use wumpus_world::config::InferenceSettings;
use wumpus_world::inference::{Entailment, InferenceEngine, Reasoner};
use wumpus_world::knowledge_base::{ClauseSet, conversion_to_cnf};
use wumpus_world::sat::clause::{Clause, ClauseValue};
use wumpus_world::sat::literal::{Literal, Symbol};
use wumpus_world::world::components::{Action, Direction, Percept, Percepts, Point};

// ============================================================================
// Strategies
// ============================================================================

/// Variable `i` is the pit symbol of cell `(i, 0)`.
fn var(i: usize) -> Symbol {
    Symbol::Pit(Point::new(i32::try_from(i).unwrap_or(0), 0))
}

fn any_literal(vars: usize) -> impl Strategy<Value = Literal> {
    (0..vars, any::<bool>()).prop_map(|(i, negated)| Literal::new(var(i), negated))
}

fn any_formula(vars: usize) -> impl Strategy<Value = Vec<Clause>> {
    prop::collection::vec(
        prop::collection::vec(any_literal(vars), 1..4).prop_map(Clause::new),
        0..24,
    )
}

fn any_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn any_point(size: usize) -> impl Strategy<Value = Point> {
    let max = i32::try_from(size).unwrap_or(1);
    (0..max, 0..max).prop_map(|(x, y)| Point::new(x, y))
}

// ============================================================================
// Brute force
// ============================================================================

fn holds(clauses: &[Clause], bits: u32) -> bool {
    clauses.iter().all(|c| {
        c.evaluate(|s| match s {
            Symbol::Pit(p) => Some(bits >> p.x & 1 == 1),
            _ => None,
        }) == ClauseValue::True
    })
}

fn brute_force_entails(clauses: &[Clause], vars: usize, alpha: Literal) -> bool {
    let Symbol::Pit(p) = alpha.symbol else {
        return false;
    };
    (0u32..1 << vars)
        .filter(|&bits| holds(clauses, bits))
        .all(|bits| alpha.holds_when(bits >> p.x & 1 == 1))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn biconditional_cnf_matches_truth_table(n in 1usize..6) {
        let left = Literal::positive(var(0));
        let right: Vec<Literal> = (1..=n).map(|i| Literal::positive(var(i))).collect();
        let cnf: Vec<Clause> = conversion_to_cnf(left, &right).iter().cloned().collect();

        for bits in 0u32..1 << (n + 1) {
            let l = bits & 1 == 1;
            let any_right = (1..=n).any(|i| bits >> i & 1 == 1);
            prop_assert_eq!(holds(&cnf, bits), l == any_right, "assignment {:b}", bits);
        }
    }

    #[test]
    fn entailment_matches_brute_force(
        vars in 1usize..=15,
        formula in any_formula(15),
        target in 0usize..15,
        negated in any::<bool>(),
    ) {
        // Squash literals into the first `vars` variables.
        let clauses: Vec<Clause> = formula
            .into_iter()
            .map(|c| {
                Clause::new(c.iter().map(|l| match l.symbol {
                    Symbol::Pit(p) => Literal::new(var(usize::try_from(p.x).unwrap_or(0) % vars), l.negated),
                    _ => *l,
                }))
            })
            .collect();
        let alpha = Literal::new(var(target % vars), negated);
        let rules: ClauseSet = clauses.iter().cloned().collect();

        let mut engine = InferenceEngine::new(InferenceSettings { max_decisions: usize::MAX });
        let answer = engine.entails(&rules, alpha);
        prop_assert_ne!(answer, Entailment::Inconclusive);
        prop_assert_eq!(answer.is_proven(), brute_force_entails(&clauses, vars, alpha));
    }

    #[test]
    fn diffusion_conserves_mass(
        size in 2usize..7,
        probs in prop::collection::vec(0.0f64..1.0, 36),
        blocked in prop::collection::btree_set(any_point(6), 0..8),
    ) {
        let mut belief = WumpusBelief::new(size, Point::new(0, 0), 0);
        for i in 0..size * size {
            belief.set(Point::from_index(i, size), probs[i]);
        }
        let before = belief.total();
        belief.diffuse(|p| blocked.contains(&p));
        prop_assert!((belief.total() - before).abs() < 1e-6);
        belief.diffuse(|_| false);
        prop_assert!((belief.total() - before).abs() < 1e-6);
    }

    #[test]
    fn safe_plans_are_valid(
        size in 2usize..7,
        safe in prop::collection::btree_set(any_point(6), 0..30),
        goals in prop::collection::btree_set(any_point(6), 1..4),
        from in any_point(6),
        facing in any_direction(),
    ) {
        let in_grid = |p: &Point| p.in_bounds(size);
        let safe: BTreeSet<Point> = safe.into_iter().filter(in_grid).collect();
        let goals: BTreeSet<Point> = goals.into_iter().filter(in_grid).collect();
        prop_assume!(from.in_bounds(size) && !goals.is_empty());
        let visited = BTreeSet::from([from]);
        let rule = SafeCells { visited: &visited, safe: &safe };

        if let Some(actions) = plan(size, from, facing, &goals, &rule) {
            for (i, action) in actions.iter().enumerate() {
                prop_assert!(
                    matches!(action, Action::MoveForward | Action::TurnLeft | Action::TurnRight),
                    "unexpected {}", action
                );
                if *action == Action::MoveForward {
                    let step = replay(size, from, facing, &actions[..=i]);
                    prop_assert!(step.is_some(), "step {} leaves the grid", i);
                    if let Some((at, _)) = step {
                        prop_assert!(visited.contains(&at) || safe.contains(&at) || goals.contains(&at));
                    }
                }
            }
            let end = replay(size, from, facing, &actions);
            prop_assert!(end.is_some_and(|(at, _)| goals.contains(&at)));
        }
    }

    #[test]
    fn telling_a_fact_twice_changes_nothing(
        percepts in prop::collection::vec((any::<bool>(), any::<bool>()), 4),
        fact_cell in any_point(3),
        negated in any::<bool>(),
    ) {
        let size = 3;
        let mut once = Reasoner::new(InferenceSettings::default());
        let visited = [Point::new(0, 0), Point::new(1, 0), Point::new(0, 1), Point::new(1, 1)];
        for (&cell, &(breeze, stench)) in visited.iter().zip(&percepts) {
            let mut sensed = Percepts::empty();
            if breeze { sensed.insert(Percept::Breeze); }
            if stench { sensed.insert(Percept::Stench); }
            once.kb.tell_cell_rules(cell, size);
            once.kb.retract_and_tell_percept_facts(cell, sensed);
        }
        let fact = Literal::new(Symbol::Wumpus(fact_cell), negated);
        once.kb.tell_fact(fact);
        let mut twice = once.clone();
        twice.kb.tell_fact(fact);
        prop_assert_eq!(&once.kb, &twice.kb);

        for i in 0..size * size {
            let cell = Point::from_index(i, size);
            prop_assert_eq!(once.ask_safe(cell), twice.ask_safe(cell));
            prop_assert_eq!(once.classify(cell), twice.classify(cell));
        }
    }
}
