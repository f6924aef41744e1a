use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use markovich::{generate, ingest, ChainStore, Chatter, Config, Tokenizer, DEFAULT_REPLY_LENGTH};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "markovich", version, about = "Markov chain chatter backed by SQLite")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the namespace databases
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Namespace (corpus) to use
    #[arg(long, short, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn from stdin line by line and answer each line
    Chat,
    /// Learn every line of a file, or of every file under a directory
    Learn { path: PathBuf },
    /// Walk the chain from a seed pair
    Generate {
        seed1: String,
        seed2: Option<String>,
        /// Maximum number of words
        #[arg(long, short = 'l', default_value_t = DEFAULT_REPLY_LENGTH)]
        max_length: usize,
        /// RNG seed for a reproducible walk
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show edge, word and weight counts
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "markovich=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }

    // Everything that can fail on bad config goes before the store is opened
    let chatter = config.chatter()?;

    let registry = config.registry();
    let store = registry
        .get_or_open(&config.namespace)
        .context(format!("Failed to open namespace: {}", config.namespace))?;

    let result = match cli.command {
        Command::Chat => run_chat(&store, &chatter),
        Command::Learn { path } => run_learn(&store, chatter.tokenizer(), &path),
        Command::Generate {
            seed1,
            seed2,
            max_length,
            seed,
        } => run_generate(&store, &seed1, seed2.as_deref(), max_length, seed),
        Command::Stats { json } => run_stats(&store, json),
    };

    drop(store);
    registry.close_all().context("Failed to close namespaces")?;
    result
}

fn run_chat(store: &ChainStore, chatter: &Chatter) -> Result<()> {
    let mut rng = ChaCha8Rng::from_entropy();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("<-- ");
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read stdin")? == 0 {
            break;
        }

        match chatter.reply(store, line.trim_end(), &mut rng) {
            Ok(Some(reply)) => println!("--> {}", reply),
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Failed to handle message"),
        }
    }

    Ok(())
}

fn run_learn(store: &ChainStore, tokenizer: &Tokenizer, path: &Path) -> Result<()> {
    let start = Instant::now();
    let mut files = 0usize;
    let mut lines = 0usize;
    let mut edges = 0usize;

    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.context(format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }

    for file in entries {
        let contents = match std::fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        files += 1;
        for line in contents.lines() {
            let words = tokenizer.split(line);
            if words.is_empty() {
                continue;
            }
            edges += ingest(store, &words)
                .context(format!("Failed to learn from {}", file.display()))?;
            lines += 1;
        }
    }

    let stats = store.stats()?;
    println!(
        "✓ Learned {} lines from {} files ({} edge updates) [{:.2}s]",
        lines,
        files,
        edges,
        start.elapsed().as_secs_f64()
    );
    println!(
        "  Chain now has {} edges over {} words",
        stats.edge_count, stats.node_count
    );
    Ok(())
}

fn run_generate(
    store: &ChainStore,
    seed1: &str,
    seed2: Option<&str>,
    max_length: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let words = generate(store, seed1, seed2, max_length, &mut rng)?;
    println!("{}", words.join(" "));
    Ok(())
}

fn run_stats(store: &ChainStore, json: bool) -> Result<()> {
    let stats = store.stats()?;

    if json {
        let out = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{}", out);
        return Ok(());
    }

    println!("=== Chain Statistics ===");
    println!("Edges:         {}", stats.edge_count);
    println!("Words:         {}", stats.node_count);
    println!("Total weight:  {}", stats.total_weight);
    Ok(())
}
