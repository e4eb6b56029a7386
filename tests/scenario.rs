//! 4x4 map, one pit at (1,1), agent starting at (0,0) facing east.

use wumpus_world::agent::Agent;
use wumpus_world::config::{AgentKind, GameConfig, InferenceSettings};
use wumpus_world::game::GamePlay;
use wumpus_world::inference::{CellStatus, Reasoner};
use wumpus_world::sat::literal::{Literal, Symbol};
use wumpus_world::world::components::{Direction, Percept, Point};
use wumpus_world::world::grid::World;

const SIZE: usize = 4;

fn world() -> World {
    let mut world = World::empty(SIZE, Point::new(0, 0));
    world.place_pit(Point::new(1, 1));
    world
}

/// Records a visit the way the orchestrator does.
fn visit(reasoner: &mut Reasoner, world: &World, cell: Point) {
    reasoner.kb.tell_fact(Literal::negative(Symbol::Pit(cell)));
    reasoner.kb.tell_fact(Literal::negative(Symbol::Wumpus(cell)));
    reasoner.kb.tell_cell_rules(cell, SIZE);
    reasoner
        .kb
        .retract_and_tell_percept_facts(cell, world.get_percepts(cell));
}

#[test]
fn start_cell_clears_both_neighbours() {
    let world = world();
    let mut reasoner = Reasoner::new(InferenceSettings::default());
    visit(&mut reasoner, &world, Point::new(0, 0));

    assert!(world.get_percepts(Point::new(0, 0)).is_empty());
    assert!(reasoner.ask_safe(Point::new(1, 0)));
    assert!(reasoner.ask_safe(Point::new(0, 1)));
}

#[test]
fn breeze_leaves_disjunction_open() {
    let world = world();
    let mut reasoner = Reasoner::new(InferenceSettings::default());
    visit(&mut reasoner, &world, Point::new(0, 0));
    visit(&mut reasoner, &world, Point::new(1, 0));

    assert!(world.get_percepts(Point::new(1, 0)).contains(Percept::Breeze));
    assert!(!reasoner.ask_safe(Point::new(2, 0)));
    assert!(!reasoner.ask_safe(Point::new(1, 1)));
    assert_eq!(reasoner.classify(Point::new(2, 0)), CellStatus::Uncertain);
    assert_eq!(reasoner.classify(Point::new(1, 1)), CellStatus::Uncertain);
}

#[test]
fn later_visits_resolve_the_pit() {
    let world = world();
    let mut reasoner = Reasoner::new(InferenceSettings::default());
    for cell in [Point::new(0, 0), Point::new(1, 0), Point::new(0, 1)] {
        visit(&mut reasoner, &world, cell);
    }
    assert!(!reasoner.proves_pit(Point::new(1, 1)));

    // (0,2) is breeze-free, so the breeze at (0,1) can only come from (1,1).
    visit(&mut reasoner, &world, Point::new(0, 2));
    assert!(reasoner.proves_pit(Point::new(1, 1)));
    assert_eq!(reasoner.classify(Point::new(1, 1)), CellStatus::DangerousPit);
    assert!(reasoner.ask_safe(Point::new(1, 2)));
    assert_eq!(reasoner.classify(Point::new(2, 0)), CellStatus::Uncertain);

    visit(&mut reasoner, &world, Point::new(3, 0));
    assert!(reasoner.ask_safe(Point::new(2, 0)));
}

#[test]
fn orchestrated_opening_moves() {
    let config = GameConfig {
        agent: AgentKind::Hybrid,
        ..GameConfig::default()
    };
    let mut game = GamePlay::with_world(config, world(), 1);
    assert_eq!(game.agent().core().direction, Direction::East);

    game.run_single_action();
    let core = game.agent().core();
    assert!(core.safe_cells.contains(&Point::new(1, 0)));
    assert!(core.safe_cells.contains(&Point::new(0, 1)));
    assert_eq!(core.location, Point::new(1, 0));
}

#[test]
fn hybrid_never_enters_the_pit() {
    let config = GameConfig {
        agent: AgentKind::Hybrid,
        ..GameConfig::default()
    };
    let mut game = GamePlay::with_world(config, world(), 1);
    let status = game.run_to_completion();
    assert!(status.is_terminal());
    assert!(!status.is_death());
    assert!(
        !game
            .agent()
            .core()
            .visited_cells
            .contains(&Point::new(1, 1))
    );
}
