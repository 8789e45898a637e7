use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::{GameConfig, SimulationConfig};
use crate::display::{
    distribution_grid, print_error, print_section, print_success, strategy_list, tournament_grid,
    win_bar,
};
use crate::error::DuelResult;
use crate::strategy::{Copycat, HistoryStrategy, StrategyId};

#[derive(Parser)]
#[command(
    name = "duel",
    version = "1.0.0",
    about = "Exact and simulated win probabilities for the two-counter coin-flip duel."
)]
struct Cli {
    #[command(flatten)]
    game: GameArgs,

    /// Log solver and simulation details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GameArgs {
    /// Tokens each player starts with
    #[arg(short = 'B', long, global = true)]
    bound: Option<u8>,
    /// Probability a shot succeeds, as a fraction (e.g. 1/2)
    #[arg(long, global = true)]
    success_rate: Option<String>,
    /// JSON file with a game configuration; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in strategies
    Strategies,
    /// Exact P1 win probability for a strategy pairing
    Solve {
        /// Player 1 strategy
        p1: String,
        /// Player 2 strategy
        p2: String,
    },
    /// Monte Carlo estimate of the P1 win rate
    Simulate {
        /// Player 1 strategy (built-in name or `copycat`)
        p1: String,
        /// Player 2 strategy (built-in name or `copycat`)
        p2: String,
        /// Number of games
        #[arg(short = 'n', long, default_value = "100000")]
        games: usize,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Abandon a game after this many turns
        #[arg(long, default_value = "1000000")]
        max_turns: u64,
    },
    /// Every strategy against every other strategy
    Tournament {
        /// Simulate instead of solving exactly
        #[arg(long)]
        simulate: bool,
        /// Games per pairing when simulating
        #[arg(short = 'n', long, default_value = "10000")]
        games: usize,
        /// Seed for simulated tournaments
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Comma-separated subset of strategies
        #[arg(long)]
        only: Option<String>,
        /// Write the table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the table as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Exact state distribution after a number of turns
    Evolve {
        /// Player 1 strategy
        #[arg(default_value = "random")]
        p1: String,
        /// Player 2 strategy
        #[arg(default_value = "random")]
        p2: String,
        /// Turns to advance
        #[arg(short, long, default_value = "10")]
        turns: usize,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if dispatch(cli).is_err() {
        std::process::exit(1);
    }
}

/// Parse `args` and run the command. Errors are printed and also returned.
pub fn run_with_args(args: Vec<String>) -> DuelResult<()> {
    let cli = Cli::parse_from(args);
    dispatch(cli)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn game_config(args: &GameArgs) -> DuelResult<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(bound) = args.bound {
        config.bound = bound;
    }
    if let Some(rate) = &args.success_rate {
        config.success_rate = rate.parse()?;
    }
    config.validate()?;
    Ok(config)
}

fn dispatch(cli: Cli) -> DuelResult<()> {
    init_logging(cli.verbose);

    let config = match game_config(&cli.game) {
        Ok(c) => c,
        Err(e) => {
            print_error(&e.to_string());
            return Err(e);
        }
    };

    let result = match cli.command {
        Commands::Strategies => {
            println!();
            println!("{}", strategy_list());
            println!();
            Ok(())
        }
        Commands::Solve { p1, p2 } => cmd_solve(&p1, &p2, &config),
        Commands::Simulate {
            p1,
            p2,
            games,
            seed,
            max_turns,
        } => {
            let sim = SimulationConfig {
                games,
                seed,
                max_turns,
            };
            cmd_simulate(&p1, &p2, &config, &sim)
        }
        Commands::Tournament {
            simulate,
            games,
            seed,
            only,
            csv,
            json,
        } => cmd_tournament(simulate, games, seed, only, csv, json, &config),
        Commands::Evolve { p1, p2, turns } => cmd_evolve(&p1, &p2, turns, &config),
    };

    if let Err(e) = &result {
        print_error(&e.to_string());
    }
    result
}

fn game_header(config: &GameConfig) -> String {
    format!(
        "bound {} | success rate {}",
        config.bound, config.success_rate
    )
}

fn cmd_solve(p1: &str, p2: &str, config: &GameConfig) -> DuelResult<()> {
    use crate::solver::exact_win_probability;

    let s1 = StrategyId::from_name(p1)?;
    let s2 = StrategyId::from_name(p2)?;
    let p = exact_win_probability(&s1, &s2, config)?;

    println!();
    println!("{}", format!("{} vs {}", s1, s2).bold());
    println!("  {}", game_header(config).dimmed());
    println!();
    println!("  {}  {}", "P1 wins:".bold(), p);
    println!("  {}", win_bar(p.to_f64(), 30));
    println!();
    Ok(())
}

fn history_strategy(name: &str) -> DuelResult<Box<dyn HistoryStrategy>> {
    if name.trim().eq_ignore_ascii_case("copycat") {
        return Ok(Box::new(Copycat));
    }
    Ok(Box::new(StrategyId::from_name(name)?))
}

fn cmd_simulate(p1: &str, p2: &str, config: &GameConfig, sim: &SimulationConfig) -> DuelResult<()> {
    use crate::simulate::simulate_batch;
    use crate::solver::exact_win_probability;

    let s1 = history_strategy(p1)?;
    let s2 = history_strategy(p2)?;
    let tally = simulate_batch(s1.as_ref(), s2.as_ref(), config, sim)?;

    println!();
    println!("{}", format!("{} vs {}", p1, p2).bold());
    println!("  {}", game_header(config).dimmed());
    println!();
    println!("  {}", tally);
    println!("  {}", win_bar(tally.p1_rate(), 30));

    // Memoryless pairings can be checked against the exact value.
    if let (Ok(e1), Ok(e2)) = (StrategyId::from_name(p1), StrategyId::from_name(p2)) {
        let exact = exact_win_probability(&e1, &e2, config)?;
        let diff = tally.p1_rate() - exact.to_f64();
        let sigmas = if tally.standard_error() > 0.0 {
            diff.abs() / tally.standard_error()
        } else {
            0.0
        };
        print_section(
            "Exact",
            &format!(
                "{:.4}% (difference {:+.4}%, {:.1} standard errors)",
                exact.to_f64() * 100.0,
                diff * 100.0,
                sigmas
            ),
        );
    }
    println!();
    Ok(())
}

fn cmd_tournament(
    simulate: bool,
    games: usize,
    seed: u64,
    only: Option<String>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    config: &GameConfig,
) -> DuelResult<()> {
    use crate::tournament::{tournament, Mode};

    let strategies = match only {
        Some(list) => list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(StrategyId::from_name)
            .collect::<DuelResult<Vec<_>>>()?,
        None => StrategyId::ALL.to_vec(),
    };
    let mode = if simulate {
        Mode::Simulated { games, seed }
    } else {
        Mode::Exact
    };

    let table = tournament(&strategies, &mode, config)?;
    println!();
    println!("{}", tournament_grid(&table));
    println!();

    if let Some(path) = csv {
        table.save_csv(&path)?;
        print_success(&format!("Wrote {}", path.display()));
    }
    if let Some(path) = json {
        table.save_json(&path)?;
        print_success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

fn cmd_evolve(p1: &str, p2: &str, turns: usize, config: &GameConfig) -> DuelResult<()> {
    use crate::distribution::evolve;

    let s1 = StrategyId::from_name(p1)?;
    let s2 = StrategyId::from_name(p2)?;
    let dist = evolve(&s1, &s2, config, turns)?;

    println!();
    println!("{}", format!("{} vs {}", s1, s2).bold());
    println!("  {}", game_header(config).dimmed());
    println!();
    println!("{}", distribution_grid(&dist));
    println!(
        "  {} {:.4}  {} {:.4}",
        "P1 finished:".green().bold(),
        dist.p1_win_mass().to_f64(),
        "P2 finished:".red().bold(),
        dist.p2_win_mass().to_f64(),
    );
    println!();
    Ok(())
}
