mod catalog;
mod config;
mod output;
mod prompt;
mod session;
mod store;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tasteduel_core::constants::DEFAULT_K_FACTOR;
use tasteduel_core::{AppPhase, ItemId, RankingSession, SelectionOptions, SessionConfig, TracingReporter};

use crate::prompt::Choice;
use crate::session::{load_session, save_session};
use crate::store::{JsonFileStore, Store};

/// Rounds to play when the comparison target has already been reached.
const EXTRA_ROUNDS: usize = 10;
/// Print overall confidence after every this many comparisons.
const CONFIDENCE_EVERY: usize = 5;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "tasteduel", version, about = "Learn your food preferences through head-to-head duels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file (default: ~/.config/tasteduel/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where ratings and history are saved (default: ~/.local/share/tasteduel)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Compare items two at a time and update the ranking
    Duel(DuelArgs),
    /// Show the current ranking
    Results(ResultsArgs),
    /// Forget all ratings and comparison history
    Reset,
    /// Create a default config file at ~/.config/tasteduel/config.toml
    Init,
}

#[derive(Parser)]
struct DuelArgs {
    /// Number of duels to play (default: enough to reach the comparison target)
    #[arg(long)]
    rounds: Option<usize>,

    /// Output the final ranking as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Only duel items matching a category, e.g. cuisine=Italian (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// How far one duel moves ratings. Default: 32
    #[arg(long)]
    k_factor: Option<f64>,

    /// Prefer pairs the model is unsure about over pairs with close ratings
    #[arg(long)]
    explore: bool,

    /// Seed for pair selection, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file of items to rank instead of the built-in foods
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Parser)]
struct ResultsArgs {
    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// JSON file of items to rank instead of the built-in foods
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your catalog, filters, etc.");
        }
        Commands::Reset => {
            let cfg = config::load_config(&config_path);
            let store = open_store(cli.data_dir, &cfg);
            store
                .clear_all()
                .unwrap_or_else(|e| bail(format!("Failed to reset saved state: {e}")));
            println!("Cleared ratings and history in {}", store.dir().display());
        }
        Commands::Results(args) => {
            let cfg = config::load_config(&config_path);
            let store = open_store(cli.data_dir, &cfg);
            let catalog_path = args.catalog.or(cfg.catalog.clone());
            let session = load_session(&store, catalog_path.as_deref(), SessionConfig::default());
            print_results(&session, args.json);
        }
        Commands::Duel(args) => {
            let cfg = config::load_config(&config_path);
            let store = open_store(cli.data_dir, &cfg);
            run_duel(args, cfg, &store);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn open_store(data_dir: Option<PathBuf>, cfg: &config::TasteduelConfig) -> JsonFileStore {
    let dir = data_dir
        .or_else(|| cfg.data_dir.clone())
        .unwrap_or_else(config::default_data_dir);
    JsonFileStore::new(dir)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn games_by_id(session: &RankingSession) -> HashMap<ItemId, usize> {
    session.items().iter().map(|i| i.id).zip(session.games_played()).collect()
}

fn print_results(session: &RankingSession, json: bool) {
    let rankings = session.rankings();
    let games = games_by_id(session);
    let breakdown = session.confidence_breakdown();
    let completed = session.completed_comparison_count();
    if json {
        output::print_json(&rankings, &games, completed, breakdown.as_ref());
    } else {
        output::print_table(&rankings, &games, completed, breakdown.as_ref());
    }
}

fn run_duel(args: DuelArgs, cfg: config::TasteduelConfig, store: &JsonFileStore) {
    let k_factor = args.k_factor.or(cfg.k_factor).unwrap_or(DEFAULT_K_FACTOR);
    if !(k_factor > 0.0) {
        bail(format!("--k-factor must be positive, got {k_factor}"));
    }

    let selected_categories =
        config::selected_categories(&cfg.categories, &args.filters).unwrap_or_else(|e| bail(e));
    let session_config = SessionConfig {
        k_factor,
        selection: SelectionOptions {
            prioritize_close_ratings: !args.explore && cfg.prioritize_close_ratings.unwrap_or(true),
            selected_categories,
        },
    };

    if session_config.selection.has_active_filters() {
        tracing::info!("Category filters: {:?}", session_config.selection.selected_categories);
    }

    let catalog_path = args.catalog.or(cfg.catalog);
    let mut session = load_session(store, catalog_path.as_deref(), session_config);

    let completed = session.completed_comparison_count();
    let target = session.min_comparisons();
    let rounds = args.rounds.unwrap_or_else(|| match target.saturating_sub(completed) {
        0 => EXTRA_ROUNDS,
        remaining => remaining,
    });

    tracing::info!(
        "{} items, {} comparisons so far, target {}, playing {} rounds",
        session.items().len(),
        completed,
        target,
        rounds,
    );

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };

    let reporter = TracingReporter;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    // Prompts go to stderr so `--json` output on stdout stays clean.
    let mut screen = io::stderr();

    save_session(store, &session, AppPhase::Comparison);

    for round in 1..=rounds {
        let Some((item_a, item_b)) = session.next_pair(&mut rng, &reporter) else {
            bail("Could not pick a pair to compare");
        };

        let prediction = session.predict(item_a.id, item_b.id);
        prompt::render_pair(&mut screen, &item_a, &item_b, Some(&prediction), round, rounds)
            .unwrap_or_else(|e| bail(format!("Failed to write to terminal: {e}")));

        let choice = prompt::read_choice(&mut input, &mut screen)
            .unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
        let winner = match choice {
            Choice::First => item_a.id,
            Choice::Second => item_b.id,
            Choice::Quit => break,
        };

        if let Err(e) = session.record_choice(item_a.id, item_b.id, winner, now_millis()) {
            bail(format!("Failed to record choice: {e}"));
        }
        save_session(store, &session, AppPhase::Comparison);

        let done = session.completed_comparison_count();
        if done % CONFIDENCE_EVERY == 0 {
            prompt::render_progress(&mut screen, done, session.confidence())
                .unwrap_or_else(|e| bail(format!("Failed to write to terminal: {e}")));
        }
    }

    save_session(store, &session, AppPhase::Results);
    print_results(&session, args.json);
}
