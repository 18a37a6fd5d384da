use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mingle::config::{load_config, AppConfig};
use mingle::dataset::{parse_timestamp, Dataset};
use mingle::engine::{build_graph, build_full_graph, cumulative_series, top_n};
use mingle::error::MingleError;
use mingle::server::run_http_server;

/// mingle: relationship analytics for timestamped photo-tagging data
#[derive(Parser)]
#[command(name = "mingle")]
#[command(
    about = "Visualize who met whom from tagged event photos: co-occurrence graphs, meeting races, and manito reveals."
)]
#[command(version)]
struct Cli {
    /// Optional configuration file (TOML); env vars use the MINGLE__ prefix
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard HTTP server
    Serve {
        /// Path to the tagged-photo CSV (overrides config)
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Path to the manito CSV (overrides config)
        #[arg(short, long)]
        manito: Option<PathBuf>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the co-occurrence graph at a cutoff
    Graph {
        /// Path to the tagged-photo CSV
        #[arg(short, long)]
        data: PathBuf,
        /// Cutoff timestamp (RFC 3339 or "YYYY-MM-DD HH:MM:SS"); default: latest
        #[arg(long)]
        cutoff: Option<String>,
    },
    /// Print the cumulative meeting series for a focal person
    Meetings {
        /// Path to the tagged-photo CSV
        #[arg(short, long)]
        data: PathBuf,
        /// The focal person
        #[arg(short, long)]
        person: String,
        /// How many people to rank
        #[arg(long, default_value = "3")]
        top: usize,
    },
    /// List the people in the dataset
    People {
        /// Path to the tagged-photo CSV
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Show dataset statistics
    Summary {
        /// Path to the tagged-photo CSV
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { data, manito, port } => {
            run_serve(cli.config.as_deref(), data, manito, port).await
        }
        Commands::Graph { data, cutoff } => run_graph(&data, cutoff.as_deref()),
        Commands::Meetings { data, person, top } => run_meetings(&data, &person, top),
        Commands::People { data } => run_people(&data),
        Commands::Summary { data } => run_summary(&data),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_serve(
    config_path: Option<&std::path::Path>,
    data: Option<PathBuf>,
    manito: Option<PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config: AppConfig = load_config(config_path)?;
    if let Some(data) = data {
        config.data.records_path = Some(data);
    }
    if let Some(manito) = manito {
        config.data.manito_path = Some(manito);
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    run_http_server(config).await.context("dashboard server exited")
}

fn run_graph(data: &PathBuf, cutoff: Option<&str>) -> anyhow::Result<()> {
    let dataset = Dataset::load(data)?;
    let graph = match cutoff {
        Some(raw) => {
            let cutoff = parse_timestamp(raw)
                .with_context(|| format!("invalid cutoff '{raw}'"))?;
            build_graph(dataset.records(), cutoff)
        }
        None => build_full_graph(dataset.records()),
    };

    println!(
        "{} people, {} relationships",
        graph.node_count(),
        graph.edge_count()
    );
    for (pair, weight) in graph.edges() {
        println!("  {} -- {}  (shared photos: {})", pair.first(), pair.second(), weight);
    }
    Ok(())
}

fn run_meetings(data: &PathBuf, person: &str, top: usize) -> anyhow::Result<()> {
    let dataset = Dataset::load(data)?;
    if !dataset.knows_person(person) {
        return Err(MingleError::PersonNotFound(person.to_string()).into());
    }

    let series = cumulative_series(dataset.records(), person);
    println!(
        "Cumulative meetings for {} over {} timestamps:",
        person,
        series.len()
    );
    for other in series.counts.keys() {
        println!("  {}: {}", other, series.final_count(other));
    }

    let last_index = series.len().saturating_sub(1);
    println!("Top {}:", top);
    for (rank, entry) in top_n(&series, last_index, top).iter().enumerate() {
        println!("  {}. {} ({})", rank + 1, entry.person, entry.count);
    }
    Ok(())
}

fn run_people(data: &PathBuf) -> anyhow::Result<()> {
    let dataset = Dataset::load(data)?;
    for person in dataset.people() {
        println!("{}", person);
    }
    Ok(())
}

fn run_summary(data: &PathBuf) -> anyhow::Result<()> {
    let dataset = Dataset::load(data)?;
    let graph = build_full_graph(dataset.records());

    println!("Dataset: {}", dataset.path().display());
    println!("  records:    {}", dataset.len());
    println!("  people:     {}", dataset.people().len());
    println!("  photos:     {}", dataset.photo_count());
    println!("  timestamps: {}", dataset.timestamps().len());
    if let Some((first, last)) = dataset.time_range() {
        println!("  range:      {} .. {}", first, last);
    }
    println!("  relationships: {}", graph.edge_count());
    Ok(())
}
