use clap::Parser;
use match3_engine::config::{EngineConfig, DEFAULT_GRID_SIDE, DEFAULT_MAX_CASCADE_PASSES};
use match3_engine::engine::Tile;
use match3_engine::game::BoardEngine;
use match3_engine::hints::STRATEGIES;
use std::collections::BTreeMap;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare swap strategies on seeded games", long_about = None)]
struct Args {
    /// Number of seeded games per strategy
    #[clap(short, long, default_value_t = 20)]
    games: u64,

    /// Seed of the first game; game i uses start_seed + i
    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Stop a game after this many swaps
    #[clap(short, long, default_value_t = 50)]
    moves: u32,

    #[clap(long, default_value_t = DEFAULT_GRID_SIDE)]
    rows: usize,

    #[clap(long, default_value_t = DEFAULT_GRID_SIDE)]
    cols: usize,

    /// Number of tile kinds in play (2-5)
    #[clap(short, long, default_value_t = Tile::KINDS.len())]
    kinds: usize,

    /// Log engine activity to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = EngineConfig {
        rows: args.rows,
        cols: args.cols,
        tile_kinds: args.kinds,
        max_cascade_passes: DEFAULT_MAX_CASCADE_PASSES,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut all_scores: BTreeMap<&str, Vec<u32>> = BTreeMap::new();

    println!("Starting autoplay over {} games...", args.games);

    for game_idx in 0..args.games {
        let seed = args.start_seed + game_idx;
        println!("\nGame {} (Seed: {})", game_idx, seed);

        for (strategy_name, strategy_fn) in STRATEGIES {
            // Same seed for every strategy, so each starts from the same board.
            let mut engine = BoardEngine::with_seed(seed);
            if let Err(e) = engine.initialize(config) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }

            let mut swaps = 0;
            while swaps < args.moves {
                let Some((_, intent)) = engine.board().and_then(strategy_fn) else {
                    break;
                };
                match engine.request_swap(intent) {
                    Ok(outcome) if outcome.score_delta() > 0 => swaps += 1,
                    Ok(outcome) => {
                        eprintln!(
                            "Warning: strategy {} proposed {} on game {} which did not score ({:?}).",
                            strategy_name, intent, game_idx, outcome
                        );
                        break;
                    }
                    Err(e) => {
                        eprintln!("Error: strategy {} on game {}: {}", strategy_name, game_idx, e);
                        break;
                    }
                }
            }

            println!(
                "  Strategy: {:<8}, Score: {:<6}, Swaps: {}",
                strategy_name,
                engine.score(),
                swaps
            );
            all_scores.entry(strategy_name).or_default().push(engine.score());
        }
    }

    println!("\n--- Autoplay Complete ---");
    println!("\n--- Average Scores ---");

    let mut averages: Vec<(&str, f64)> = all_scores
        .iter()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(name, scores)| {
            let total: u32 = scores.iter().sum();
            (*name, total as f64 / scores.len() as f64)
        })
        .collect();
    averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (strategy_name, avg_score) in averages {
        println!("Strategy {:<8}: Average Score = {:.2}", strategy_name, avg_score);
    }

    ExitCode::SUCCESS
}
