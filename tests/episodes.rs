use wumpus_world::agent::Agent;
use wumpus_world::config::{AgentKind, GameConfig};
use wumpus_world::game::{GamePlay, GameStatus};
use wumpus_world::world::components::{Action, Point};
use wumpus_world::world::grid::World;

#[test]
fn every_agent_terminates() {
    for agent in [AgentKind::Random, AgentKind::Hybrid, AgentKind::Advanced] {
        for seed in 0..10 {
            let config = GameConfig {
                map_size: 5,
                agent,
                seed: Some(seed),
                max_actions: 400,
                ..GameConfig::default()
            };
            let mut game = GamePlay::new(&config).unwrap();
            let status = game.run_to_completion();
            assert!(status.is_terminal());
            assert!(game.action_count() <= config.max_actions);

            let state = game.get_game_state();
            assert!(state.stop_game);
            assert_eq!(state.status, status);
            assert_eq!(state.alive, !status.is_death());
        }
    }
}

#[test]
fn same_seed_same_episode() {
    for agent in [AgentKind::Random, AgentKind::Hybrid, AgentKind::Advanced] {
        let config = GameConfig {
            map_size: 5,
            agent,
            seed: Some(11),
            ..GameConfig::default()
        };
        let mut a = GamePlay::new(&config).unwrap();
        let mut b = GamePlay::new(&config).unwrap();
        a.run_to_completion();
        b.run_to_completion();
        assert_eq!(a.get_game_state(), b.get_game_state());
    }
}

#[test]
fn hybrid_shoots_its_way_out_of_a_stench() {
    // Stench at the start and nothing provable: the only move is a risky shot,
    // which kills the wumpus and clears the whole map.
    let mut world = World::empty(3, Point::new(0, 0));
    world.place_wumpus(Point::new(1, 0));
    world.place_gold(Point::new(2, 2));
    let config = GameConfig {
        map_size: 3,
        agent: AgentKind::Hybrid,
        ..GameConfig::default()
    };
    let mut game = GamePlay::with_world(config, world, 0);

    game.run_single_action();
    assert_eq!(game.agent().core().last_action, Some(Action::Shoot));
    assert!(game.world().wumpus_locations().is_empty());

    assert_eq!(game.run_to_completion(), GameStatus::ClimbSuccess);
    assert!(!game.agent().core().has_arrow);
}

#[test]
fn snapshot_serialises() {
    let config = GameConfig {
        agent: AgentKind::Advanced,
        seed: Some(4),
        ..GameConfig::default()
    };
    let mut game = GamePlay::new(&config).unwrap();
    game.run_single_action();
    let json = serde_json::to_value(game.get_game_state()).unwrap();
    assert_eq!(json["agent"], "advanced");
    assert_eq!(json["status"], "in_progress");
    assert!(json["wumpus_probabilities"].is_array());
    assert!(json["world"]["grid"].is_array());
}
