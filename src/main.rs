//! trustwalk CLI - seed-personalized trust scoring from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Score every account against two known fraudsters, default alphas 0.15/0.50/0.85
//! trustwalk transactions.txt --seed acct-17 --seed acct-204 -o results/
//!
//! # One alpha, more walks, reproducible Monte Carlo
//! trustwalk transactions.txt --seeds-file seeds.txt --alpha 0.15 --walks 500000 --rng-seed 7
//!
//! # No seeds given on a terminal: prompts for them
//! trustwalk transactions.txt
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trustwalk::{
    load_edge_list_path, parse_seed_list, rank_results, resolve_seeds, results_file_name,
    run_sweep, top_k, write_performance_csv, write_results_csv, CsrGraph, ExportConfig, Method,
    NodeRegistry, SweepConfig, SweepRow,
};

#[derive(Parser)]
#[command(name = "trustwalk")]
#[command(about = "Personalized PageRank and Monte Carlo trust scores from seed nodes", long_about = None)]
struct Cli {
    /// Edge list: `source destination [weight]` per line
    edges: PathBuf,

    /// Seed node name (repeatable)
    #[arg(long = "seed")]
    seeds: Vec<String>,

    /// File of seed names, separated by commas or whitespace
    #[arg(long)]
    seeds_file: Option<PathBuf>,

    /// Teleport / stop probability (repeatable); defaults to 0.15, 0.50, 0.85
    #[arg(long = "alpha")]
    alphas: Vec<f64>,

    /// PPR convergence threshold on the L1 step size
    #[arg(long, default_value = "1e-6")]
    tolerance: f64,

    /// PPR iteration cap
    #[arg(long, default_value = "100")]
    max_iterations: usize,

    /// Monte Carlo walks per alpha
    #[arg(long, default_value = "100000")]
    walks: usize,

    /// Monte Carlo RNG seed (omit for a fresh one each run)
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Non-seed nodes scoring above this are labelled Suspicious
    #[arg(long, default_value = "0.001")]
    threshold: f64,

    /// Suspicious nodes to print per alpha
    #[arg(long, default_value = "10")]
    top: usize,

    /// Directory for the result CSVs
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustwalk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let list = load_edge_list_path(&cli.edges)
        .with_context(|| format!("failed to load edge list {}", cli.edges.display()))?;
    let (registry, graph) = list.into_graph().context("failed to build graph")?;
    info!(
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        sinks = graph.sinks().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "graph loaded"
    );

    let seed_names = collect_seed_names(&cli)?;
    let seeds = resolve_seeds(&registry, &seed_names).context("failed to resolve seeds")?;
    info!(seeds = seeds.len(), "seed set ready");

    let mut config = SweepConfig {
        tolerance: cli.tolerance,
        max_iterations: cli.max_iterations,
        total_walks: cli.walks,
        seed: cli.rng_seed,
        ..SweepConfig::default()
    };
    if !cli.alphas.is_empty() {
        config.alphas = cli.alphas.clone();
    }

    let rows = run_sweep(&graph, &seeds, &config).context("scoring failed")?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    let export = ExportConfig { threshold: cli.threshold };
    for row in &rows {
        write_ranked(&cli.output_dir, Method::Ppr, row.alpha, &row.ppr.scores, &seeds, &registry, export)?;
        write_ranked(
            &cli.output_dir,
            Method::MonteCarlo,
            row.alpha,
            &row.monte_carlo.scores,
            &seeds,
            &registry,
            export,
        )?;
    }
    let perf_path = cli.output_dir.join("performance.csv");
    let perf = File::create(&perf_path)
        .with_context(|| format!("failed to create {}", perf_path.display()))?;
    write_performance_csv(BufWriter::new(perf), &rows)
        .with_context(|| format!("failed to write {}", perf_path.display()))?;

    print_summary(&rows, &graph, &registry, &seeds, cli.top);
    Ok(())
}

fn collect_seed_names(cli: &Cli) -> Result<Vec<String>> {
    let mut names = cli.seeds.clone();
    if let Some(path) = &cli.seeds_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read seeds file {}", path.display()))?;
        names.extend(parse_seed_list(&text));
    }
    if names.is_empty() {
        if io::stdin().is_terminal() {
            names = prompt_for_seeds()?;
        } else {
            warn!("no seeds given; all scores will be zero");
        }
    }
    Ok(names)
}

fn prompt_for_seeds() -> Result<Vec<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "Seed node names (comma or space separated): ")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("failed to read seeds from stdin")?;
    Ok(parse_seed_list(&line))
}

fn write_ranked(
    dir: &Path,
    method: Method,
    alpha: f64,
    scores: &[f64],
    seeds: &[usize],
    registry: &NodeRegistry,
    export: ExportConfig,
) -> Result<()> {
    let path = dir.join(results_file_name(method, alpha));
    let ranked = rank_results(scores, seeds, export);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_results_csv(BufWriter::new(file), registry, &ranked)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "results written");
    Ok(())
}

fn print_summary(
    rows: &[SweepRow],
    graph: &CsrGraph,
    registry: &NodeRegistry,
    seeds: &[usize],
    top: usize,
) {
    println!("graph: n={}, m={}, seeds={}", graph.num_nodes(), graph.num_edges(), seeds.len());
    for row in rows {
        println!();
        println!(
            "alpha={:.2}  ppr: {} iters{} in {} us  |  mc: {} walks in {} us",
            row.alpha,
            row.ppr.iterations,
            if row.ppr.converged { "" } else { " (cap hit)" },
            row.ppr.elapsed.as_micros(),
            row.monte_carlo.walks,
            row.monte_carlo.elapsed.as_micros(),
        );

        // Seeds would always top the list; skip them.
        let mut non_seed = row.ppr.scores.clone();
        for &s in seeds {
            non_seed[s] = 0.0;
        }
        for (node, score) in top_k(&non_seed, top) {
            let name = registry.name(node).unwrap_or("?");
            println!("  {name:>20}  ppr={score:.6e}  mc={:.6e}", row.monte_carlo.scores[node]);
        }
    }
}
