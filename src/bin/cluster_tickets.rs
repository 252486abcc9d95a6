//! Cluster a file of support tickets and write a JSON report.
//!
//! Input is either a JSON array of tickets or JSON lines, one ticket per
//! line: `{"id": "T1", "text": "printer jammed", "timestamp": "..."}`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use ticket_cluster::{ClusteringConfig, KRange, Ticket, TicketClusterer};

#[derive(Parser, Debug)]
#[command(name = "cluster-tickets")]
#[command(version)]
#[command(about = "Group support tickets into topics and summarize each group", long_about = None)]
struct Args {
    /// Tickets as a JSON array or JSON lines
    input: PathBuf,

    /// Report destination (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a ClusteringConfig; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Smallest cluster count to try
    #[arg(long, requires = "k_max")]
    k_min: Option<usize>,

    /// Largest cluster count to try
    #[arg(long, requires = "k_min")]
    k_max: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Terms per cluster summary
    #[arg(long)]
    top_n: Option<usize>,

    /// Sample tickets per cluster summary
    #[arg(long)]
    sample_size: Option<usize>,

    /// Drop terms appearing in fewer tickets
    #[arg(long)]
    min_doc_freq: Option<usize>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> Result<ClusteringConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ClusteringConfig::default(),
    };

    if let (Some(min), Some(max)) = (args.k_min, args.k_max) {
        config.k_range = Some(KRange::new(min, max));
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(min_doc_freq) = args.min_doc_freq {
        config.min_doc_freq = min_doc_freq;
    }
    Ok(config)
}

fn load_tickets(path: &Path) -> Result<Vec<Ticket>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading tickets {}", path.display()))?;
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .with_context(|| format!("parsing ticket array {}", path.display()));
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("parsing {} line {}", path.display(), i + 1))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let config = load_config(&args)?;
    let tickets = load_tickets(&args.input)?;
    if tickets.is_empty() {
        bail!("no tickets in {}", args.input.display());
    }
    info!("loaded {} tickets from {}", tickets.len(), args.input.display());

    let report = TicketClusterer::new(config)
        .run(&tickets)
        .context("clustering tickets")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
