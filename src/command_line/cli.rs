#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::debug;
use wumpus_world::config::{AgentKind, GameConfig};
use wumpus_world::error::ConfigError;
use wumpus_world::game::{GamePlay, GameState, GameStatus};
use wumpus_world::inference::InferenceStats;

/// Defines the command-line interface for the wumpus application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "wumpus", version, about = "A logic agent for the Wumpus World")]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute (e.g. `run`, `batch`).
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable debug logging. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, default_value_t = false)]
    pub debug: bool,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Play a single episode.
    Run {
        /// Print a line per action and the map after every action.
        #[arg(short, long, default_value_t = false)]
        trace: bool,

        /// Print the final game state as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Play many seeded episodes and print aggregate statistics.
    Batch {
        /// Number of episodes. Seeds run consecutively from `--seed`.
        #[arg(short = 'n', long, default_value_t = 100)]
        episodes: u64,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Agent policy as spelled on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AgentArg {
    Random,
    Hybrid,
    Advanced,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Random => Self::Random,
            AgentArg::Hybrid => Self::Hybrid,
            AgentArg::Advanced => Self::Advanced,
        }
    }
}

/// Options shared by `run` and `batch`. Flags override values from `--config`.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// TOML file with a game configuration. Missing keys keep their defaults.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Seed for map generation and the agent's random choices.
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Side length of the square map.
    #[arg(long)]
    pub(crate) size: Option<usize>,

    #[arg(short, long, value_enum)]
    pub(crate) agent: Option<AgentArg>,

    #[arg(long)]
    pub(crate) pit_probability: Option<f64>,

    #[arg(long)]
    pub(crate) wumpuses: Option<usize>,

    /// Hard cap on executed actions per episode.
    #[arg(long)]
    pub(crate) max_actions: Option<usize>,
}

/// Reads `--config` if given and applies the flag overrides on top.
///
/// # Errors
///
/// Any [`ConfigError`] from reading, parsing or validating the result.
pub(crate) fn load_config(common: &CommonOptions) -> Result<GameConfig, ConfigError> {
    let mut config = match &common.config {
        Some(path) => GameConfig::from_toml_file(path)?,
        None => GameConfig::default(),
    };

    if let Some(seed) = common.seed {
        config.seed = Some(seed);
    }
    if let Some(size) = common.size {
        config.map_size = size;
    }
    if let Some(agent) = common.agent {
        config.agent = agent.into();
    }
    if let Some(p) = common.pit_probability {
        config.pit_probability = p;
    }
    if let Some(n) = common.wumpuses {
        config.wumpus_count = n;
    }
    if let Some(n) = common.max_actions {
        config.max_actions = n;
    }

    config.validate()?;
    Ok(config)
}

/// Plays one episode and reports it.
///
/// # Errors
///
/// If the configuration is invalid or the snapshot cannot be serialised.
pub(crate) fn run(common: &CommonOptions, trace: bool, json: bool) -> Result<(), String> {
    let config = load_config(common).map_err(|e| e.to_string())?;
    let mut game = GamePlay::new(&config).map_err(|e| e.to_string())?;

    if trace {
        println!("{}", render(&game.get_game_state()));
    }

    let time = Instant::now();
    while !game.is_finished() {
        game.run_single_action();
        if trace {
            let state = game.get_game_state();
            println!(
                "{:>4}  {:<12} {} {}  score {:>6}  {}",
                state.action_count,
                state.last_action.map_or_else(String::new, |a| a.to_string()),
                state.location,
                state.direction,
                state.score,
                state.message
            );
            println!("{}", render(&state));
        }
    }
    let elapsed = time.elapsed();

    let state = game.get_game_state();
    if json {
        let text = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    if !trace {
        println!("{}", render(&state));
    }
    let (allocated, resident) = memory_mib().unwrap_or_default();
    print_stats(&state, elapsed, allocated, resident);
    println!("\n{}", state.status.to_string().to_uppercase());
    Ok(())
}

/// Plays `episodes` seeded episodes and prints aggregate statistics.
///
/// # Errors
///
/// If the configuration is invalid.
pub(crate) fn batch(common: &CommonOptions, episodes: u64) -> Result<(), String> {
    let mut config = load_config(common).map_err(|e| e.to_string())?;
    let first_seed = config.seed.unwrap_or_else(|| fastrand::u64(..));

    let mut outcomes = BatchStats::default();
    let time = Instant::now();
    for i in 0..episodes {
        config.seed = Some(first_seed.wrapping_add(i));
        let mut game = GamePlay::new(&config).map_err(|e| e.to_string())?;
        let status = game.run_to_completion();
        outcomes.record(status, game.score(), game.action_count());
        outcomes.inference += game.reasoner().engine.stats();
        debug!(seed = game.seed(), %status, score = game.score(), "episode finished");
    }
    let elapsed = time.elapsed();

    let (allocated, resident) = memory_mib().unwrap_or_default();
    print_batch_stats(&config, first_seed, &outcomes, elapsed, allocated, resident);
    Ok(())
}

#[derive(Debug, Default)]
struct BatchStats {
    episodes: usize,
    climb_success: usize,
    climb_fail: usize,
    dead_by_wumpus: usize,
    dead_by_pit: usize,
    action_limit: usize,
    total_score: i64,
    best_score: Option<i64>,
    worst_score: Option<i64>,
    actions: usize,
    inference: InferenceStats,
}

impl BatchStats {
    fn record(&mut self, status: GameStatus, score: i64, actions: usize) {
        self.episodes += 1;
        match status {
            GameStatus::ClimbSuccess => self.climb_success += 1,
            GameStatus::ClimbFail => self.climb_fail += 1,
            GameStatus::DeadByWumpus => self.dead_by_wumpus += 1,
            GameStatus::DeadByPit => self.dead_by_pit += 1,
            GameStatus::ActionLimit | GameStatus::InProgress => self.action_limit += 1,
        }
        self.total_score += score;
        self.best_score = Some(self.best_score.map_or(score, |b| b.max(score)));
        self.worst_score = Some(self.worst_score.map_or(score, |w| w.min(score)));
        self.actions += actions;
    }
}

fn memory_mib() -> Option<(f64, f64)> {
    const MIB: f64 = 1024.0 * 1024.0;
    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((allocated as f64 / MIB, resident as f64 / MIB))
}

/// Text map, north at the top. The agent is drawn as an arrow in its cell.
pub(crate) fn render(state: &GameState) -> String {
    let mut out = String::new();
    for (y, row) in state.world.grid.iter().enumerate().rev() {
        for (x, cell) in row.iter().enumerate() {
            let here = usize::try_from(state.location.x).is_ok_and(|ax| ax == x)
                && usize::try_from(state.location.y).is_ok_and(|ay| ay == y);
            let mut text = cell.to_string();
            if here {
                text.insert(0, state.direction.glyph());
            }
            if text.is_empty() {
                text.push('.');
            }
            out.push_str(&format!("{text:^6}"));
        }
        out.push('\n');
    }
    out
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_inference(inference: &InferenceStats, elapsed_secs: f64) {
    println!("=======================[ Inference Statistics ]======================");
    stat_line_with_rate("Queries", inference.queries, elapsed_secs);
    stat_line("Proven", inference.proven);
    stat_line("Inconclusive", inference.inconclusive);
    stat_line("Inconsistencies", inference.inconsistencies);
    stat_line_with_rate("Decisions", inference.solver.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", inference.solver.propagations, elapsed_secs);
    stat_line("Pure literals", inference.solver.pure_literals);
    stat_line("Conflicts", inference.solver.conflicts);
}

/// Prints a summary of one finished episode.
fn print_stats(state: &GameState, elapsed: Duration, allocated: f64, resident: f64) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Episode Statistics ]========================");
    stat_line("Seed", state.seed);
    stat_line("Map size", state.world.size);
    stat_line("Pits", state.world.pit_locations.len());
    stat_line(
        "Wumpuses (alive / placed)",
        format!(
            "{} / {}",
            state.world.wumpus_locations.len(),
            state.world.number_of_wumpus
        ),
    );
    stat_line("Actions", state.action_count);
    stat_line("Score", state.score);
    stat_line("Cells visited", state.visited_cells.len());
    stat_line("Cells proven safe", state.safe_cells.len());
    stat_line("Proven wumpuses", state.proven_wumpuses.len());
    stat_line("Proven pits", state.proven_pits.len());
    stat_line(
        "Clauses (pit / wumpus)",
        format!("{} / {}", state.clauses.pit, state.clauses.wumpus),
    );
    print_inference(&state.inference, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

fn print_batch_stats(
    config: &GameConfig,
    first_seed: u64,
    s: &BatchStats,
    elapsed: Duration,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();
    let episodes = s.episodes.max(1) as f64;

    println!("\n========================[ Batch Statistics ]=========================");
    stat_line("Agent", format!("{:?}", config.agent).to_lowercase());
    stat_line("Map size", config.map_size);
    stat_line("First seed", first_seed);
    stat_line_with_rate("Episodes", s.episodes, elapsed_secs);
    stat_line("Climbed out with gold", s.climb_success);
    stat_line("Climbed out without gold", s.climb_fail);
    stat_line("Eaten by a wumpus", s.dead_by_wumpus);
    stat_line("Fell into a pit", s.dead_by_pit);
    stat_line("Hit the action limit", s.action_limit);
    stat_line(
        "Success rate (%)",
        format!("{:.1}", s.climb_success as f64 * 100.0 / episodes),
    );
    stat_line("Mean score", format!("{:.1}", s.total_score as f64 / episodes));
    stat_line("Best score", s.best_score.unwrap_or_default());
    stat_line("Worst score", s.worst_score.unwrap_or_default());
    stat_line_with_rate("Actions", s.actions, elapsed_secs);
    print_inference(&s.inference, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
