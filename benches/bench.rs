use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::Duration;
use wumpus_world::agent::planner::{RiskWeighted, SafeCells, plan};
use wumpus_world::config::{AgentKind, GameConfig, InferenceSettings};
use wumpus_world::game::GamePlay;
use wumpus_world::inference::Reasoner;
use wumpus_world::knowledge_base::ClauseSet;
use wumpus_world::sat::clause::Clause;
use wumpus_world::sat::cnf::Cnf;
use wumpus_world::sat::dpll::Dpll;
use wumpus_world::sat::literal::{Literal, Symbol};
use wumpus_world::sat::propagation::UnitPropagationWithPureLiterals;
use wumpus_world::sat::solver::{Solver, SolverLimits};
use wumpus_world::sat::variable_selection::{FixedOrder, Moms};
use wumpus_world::world::components::{Direction, Point};
use wumpus_world::world::grid::World;

/// A reasoner that has walked the whole top row of an 8x8 map.
fn explored_reasoner() -> (Reasoner, World) {
    let size = 8;
    let config = GameConfig {
        map_size: size,
        ..GameConfig::default()
    };
    let world = World::generate(&config, 17);
    let mut reasoner = Reasoner::new(InferenceSettings::default());
    for x in 0..8 {
        let cell = Point::new(x, 0);
        if world.has_pit(cell) || world.has_wumpus(cell) {
            break;
        }
        reasoner.kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
        reasoner.kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
        reasoner.kb.tell_cell_rules(cell, size);
        reasoner
            .kb
            .retract_and_tell_percept_facts(cell, world.get_percepts(cell));
    }
    (reasoner, world)
}

fn bench_entailment(c: &mut Criterion) {
    let (reasoner, _) = explored_reasoner();
    let frontier: Vec<Point> = (0..8).map(|x| Point::new(x, 1)).collect();

    c.bench_function("ask_safe - frontier row", |b| {
        b.iter(|| {
            let mut r = reasoner.clone();
            for &cell in &frontier {
                black_box(r.ask_safe(cell));
            }
        });
    });
}

fn refutation(rules: &ClauseSet, alpha: Literal) -> Cnf {
    let mut cnf = Cnf::from_clauses(rules);
    cnf.push_clause(&Clause::unit(alpha.negate()));
    cnf
}

fn bench_branching(c: &mut Criterion) {
    let (reasoner, _) = explored_reasoner();
    let cnfs: Vec<Cnf> = (0..8)
        .map(|x| {
            refutation(
                reasoner.kb.pit_rules(),
                Literal::negative(Symbol::Pit(Point::new(x, 1))),
            )
        })
        .collect();

    let mut group = c.benchmark_group("dpll - branching");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("MOMS", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let mut solver: Dpll<UnitPropagationWithPureLiterals, Moms> =
                    Dpll::new(cnf.clone(), SolverLimits::default());
                black_box(solver.solve());
            }
        });
    });
    group.bench_function("FixedOrder", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let mut solver: Dpll<UnitPropagationWithPureLiterals, FixedOrder> =
                    Dpll::new(cnf.clone(), SolverLimits::default());
                black_box(solver.solve());
            }
        });
    });
    group.finish();
}

fn bench_planner(c: &mut Criterion) {
    let size = 16;
    let all: BTreeSet<Point> = (0..size * size)
        .map(|i| Point::from_index(i, size))
        .collect();
    let goals = BTreeSet::from([Point::new(15, 15)]);
    let risk: Vec<f64> = (0..size * size)
        .map(|i| if i % 7 == 0 { 0.8 } else { 0.1 })
        .collect();
    let pits = BTreeSet::new();

    c.bench_function("a* - safe cells 16x16", |b| {
        let rule = SafeCells {
            visited: &all,
            safe: &all,
        };
        b.iter(|| black_box(plan(size, Point::new(0, 0), Direction::East, &goals, &rule)));
    });

    c.bench_function("a* - risk weighted 16x16", |b| {
        let rule = RiskWeighted {
            proven_pits: &pits,
            risk: &risk,
            size,
            weight: 20.0,
        };
        b.iter(|| black_box(plan(size, Point::new(0, 0), Direction::East, &goals, &rule)));
    });
}

fn bench_episodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("episodes");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    for agent in [AgentKind::Random, AgentKind::Hybrid, AgentKind::Advanced] {
        group.bench_function(format!("{agent:?} - 20 seeded 6x6 episodes"), |b| {
            b.iter(|| {
                for seed in 0..20 {
                    let config = GameConfig {
                        map_size: 6,
                        agent,
                        seed: Some(seed),
                        ..GameConfig::default()
                    };
                    if let Ok(mut game) = GamePlay::new(&config) {
                        black_box(game.run_to_completion());
                    }
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_entailment,
    bench_branching,
    bench_planner,
    bench_episodes
);
criterion_main!(benches);
