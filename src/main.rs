//! # wumpus
//!
//! `wumpus` is a command-line runner for the Wumpus World. An agent explores a
//! square cave it cannot see, sensing only stench, breeze and glitter in the cell
//! it stands on. It proves cells safe or dangerous with a DPLL entailment engine
//! over a propositional knowledge base and plans its moves with A*.
//!
//! ## Agents
//!
//! 1.  **random**: wanders, grabs gold it stumbles on and occasionally shoots.
//! 2.  **hybrid**: explores only proven-safe cells, shoots proven Wumpuses and
//!     climbs out once it holds the gold or has nothing safe left to try.
//! 3.  **advanced**: the hybrid ladder on a map where the Wumpuses wander, plus a
//!     per-cell Wumpus probability model and risk-weighted moves.
//!
//! ## Usage
//!
//! ```sh
//! wumpus [-d] <SUBCOMMAND>
//! ```
//!
//! ### Subcommands
//!
//! 1.  **`run`**: play one episode and print the map and statistics.
//!     ```sh
//!     wumpus run --seed 42 --agent hybrid --trace
//!     wumpus run --config game.toml --json
//!     ```
//!
//! 2.  **`batch`**: play many consecutively seeded episodes and print aggregate
//!     statistics.
//!     ```sh
//!     wumpus batch -n 500 --seed 1 --size 6 --agent advanced
//!     ```
//!
//! 3.  **`completions`**: print a shell completion script.
//!     ```sh
//!     wumpus completions zsh
//!     ```
//!
//! Logging goes through `tracing`. `RUST_LOG` selects the filter; without it the
//! level is `warn`, or `debug` with `--debug`.

use clap::{CommandFactory, Parser};
use command_line::cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod command_line;

/// Global allocator using `tikv-jemallocator` for memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Run {
            trace,
            json,
            common,
        } => command_line::cli::run(&common, trace, json),
        Commands::Batch { episodes, common } => command_line::cli::batch(&common, episodes),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_owned();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
