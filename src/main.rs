use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dining::{Config, Coordinator, LogObserver, Observer, Silent};

#[derive(Parser)]
#[command(name = "dining")]
#[command(version)]
#[command(about = "Dining philosophers with a global fork order")]
struct Cli {
    /// Number of actors (and forks) around the table
    #[arg(long, env = "DINING_ACTORS", default_value_t = 5)]
    actors: usize,

    /// Meals each actor eats before leaving
    #[arg(long, env = "DINING_CYCLES", default_value_t = 3)]
    cycles: usize,

    /// Time spent eating, in milliseconds
    #[arg(long, env = "DINING_EATING_MS", default_value_t = 2000)]
    eating_ms: u64,

    /// Pause after each meal so neighbours get a chance, in milliseconds
    #[arg(long, env = "DINING_IDLE_MS", default_value_t = 10)]
    idle_ms: u64,

    /// Upper bound of random extra eating time, in milliseconds
    #[arg(long, env = "DINING_JITTER_MS", default_value_t = 0)]
    jitter_ms: u64,

    /// Actor names (comma-separated, one per actor); defaults to the five musicians
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,

    /// Call actors by number instead of the default musicians
    #[arg(long)]
    anonymous: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Do not narrate fork events
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = Config::new(cli.actors, cli.cycles, Duration::from_millis(cli.eating_ms))
        .idle(Duration::from_millis(cli.idle_ms))
        .jitter(Duration::from_millis(cli.jitter_ms))
        .names(cli.names);
    if !cli.anonymous {
        config = config.cast();
    }

    // 人数などがおかしければここで終わる。スレッドは 1 本も起動しない
    let table = Coordinator::new(config)?;

    let log;
    let observer: &dyn Observer = if cli.quiet {
        &Silent
    } else {
        log = LogObserver::new(&table.config().names, table.config().cycles);
        &log
    };

    let report = table.run(observer)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "They all finished eating: {} meals by {} actors in {} ms",
            report.total_meals(),
            report.actors.len(),
            report.elapsed_ms
        );
    }

    Ok(())
}
