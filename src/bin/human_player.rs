use clap::Parser;
use match3_engine::config::{EngineConfig, DEFAULT_GRID_SIDE, DEFAULT_MAX_CASCADE_PASSES};
use match3_engine::engine::{Position, SwapIntent, Tile};
use match3_engine::game::{BoardEngine, StepKind, Stepwise, SwapOutcome};
use match3_engine::hints::choose_swap_greedy;
use match3_engine::selection::Selector;
use match3_engine::utils::board_from_text;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play match-3 in the terminal", long_about = None)]
struct Args {
    /// Number of rows
    #[clap(long, default_value_t = DEFAULT_GRID_SIDE)]
    rows: usize,

    /// Number of columns
    #[clap(long, default_value_t = DEFAULT_GRID_SIDE)]
    cols: usize,

    /// Number of tile kinds in play (2-5)
    #[clap(short, long, default_value_t = Tile::KINDS.len())]
    kinds: usize,

    /// Give up on a cascade after this many passes
    #[clap(long, default_value_t = DEFAULT_MAX_CASCADE_PASSES)]
    max_cascade_passes: u32,

    /// Seed for reproducible games
    #[clap(short, long)]
    seed: Option<u64>,

    /// Start from a board file (one row per line, letters C L G W P)
    #[clap(short, long)]
    board: Option<PathBuf>,

    /// Print every clear, gravity and refill step of a cascade
    #[clap(long)]
    steps: bool,

    /// Log engine activity to stderr
    #[clap(short, long)]
    verbose: bool,
}

enum Command {
    Quit,
    NewGame,
    Hint,
    Click(Position),
    Swap(SwapIntent),
}

fn parse_command(input: &str) -> Result<Command, String> {
    match input {
        "q" => return Ok(Command::Quit),
        "n" => return Ok(Command::NewGame),
        "h" => return Ok(Command::Hint),
        _ => {}
    }

    let numbers = input
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| "Invalid input: please enter numbers (e.g. '3 4'), 'h', 'n' or 'q'.")?;

    match numbers[..] {
        [r, c] => Ok(Command::Click(Position::new(r, c))),
        [r1, c1, r2, c2] => Ok(Command::Swap(SwapIntent::new((r1, c1), (r2, c2)))),
        _ => Err("Invalid input format. Use 'row col', 'row col row col', 'h', 'n' or 'q'.".into()),
    }
}

fn play_swap(engine: &mut BoardEngine, intent: SwapIntent, show_steps: bool) -> Result<(), Box<dyn Error>> {
    let outcome = match engine.request_swap_stepwise(intent)? {
        Stepwise::Done(outcome) => outcome,
        Stepwise::Cascade(mut cascade) => {
            if show_steps {
                for step in cascade.by_ref() {
                    let step = step?;
                    let label = match &step.kind {
                        StepKind::Cleared(matches) => format!("cleared {}", matches.len()),
                        StepKind::Gravity => "gravity".to_string(),
                        StepKind::Refilled { filled } => format!("refilled {}", filled),
                    };
                    println!("-- pass {}: {}", step.pass, label);
                    println!("{}", step.board);
                }
            }
            cascade.finish()?
        }
    };

    match outcome {
        SwapOutcome::Rejected(reason) => println!("Invalid swap: {}.", reason),
        SwapOutcome::Reverted { .. } => println!("No match, tiles swapped back."),
        SwapOutcome::Resolved {
            score_delta,
            cascades,
            ..
        } => println!("Matched! +{} ({} cascade pass(es))", score_delta, cascades),
    }
    Ok(())
}

fn start_engine(args: &Args) -> Result<BoardEngine, Box<dyn Error>> {
    let mut engine = match args.seed {
        Some(seed) => BoardEngine::with_seed(seed),
        None => BoardEngine::new(),
    };
    let mut config = EngineConfig {
        rows: args.rows,
        cols: args.cols,
        tile_kinds: args.kinds,
        max_cascade_passes: args.max_cascade_passes,
    };

    match &args.board {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            let board = board_from_text(&content)?;
            config.rows = board.rows();
            config.cols = board.cols();
            engine.load_board(board, config)?;
            println!("Loaded board from {}", path.display());
        }
        None => {
            engine.initialize(config)?;
        }
    }
    Ok(engine)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut engine = start_engine(&args)?;
    let mut selector = Selector::new();
    println!("Welcome to Match-3!");
    let legend: Vec<String> = engine
        .config()
        .kinds()
        .iter()
        .map(|t| format!("{}={}", t.to_char(), t.symbol()))
        .collect();
    println!("Tiles: {}", legend.join(" "));

    loop {
        let board = engine.board().ok_or("engine lost its board")?;
        println!("---------------------");
        println!("Score: {}", engine.score());
        println!("{}", board.to_string_with_highlight(selector.selected()));

        if !engine.has_valid_swap() {
            println!("No moves left. Enter 'n' for a new game or 'q' to quit.");
        }

        print!("Enter 'row col' to select, 'row col row col' to swap, 'h' hint, 'n' new game, 'q' quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            println!("Final Score: {}", engine.score());
            return Ok(());
        }

        let command = match parse_command(input.trim()) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Quit => {
                println!("Final Score: {}", engine.score());
                println!("Thanks for playing!");
                return Ok(());
            }
            Command::NewGame => {
                selector.clear();
                engine.restart()?;
                println!("New game started.");
            }
            Command::Hint => match choose_swap_greedy(board) {
                Some((clears, intent)) => println!("Hint: swap {} (clears {})", intent, clears),
                None => println!("No valid swap on this board."),
            },
            Command::Click(pos) => {
                if let Some(intent) = selector.click(pos) {
                    play_swap(&mut engine, intent, args.steps)?;
                }
            }
            Command::Swap(intent) => {
                selector.clear();
                play_swap(&mut engine, intent, args.steps)?;
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
