//! DefectForge: sewer inspection defect clustering and association rule mining
//!
//! This is the main entrypoint that loads a PACP condition database, runs the
//! requested analysis pass, and prints its report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use defectforge::{
    analyze_clusters, cluster_size_histogram, interesting_rules, load_inspections,
    mine_defect_rules, retain_vocabulary, AnalysisConfig, Args, Command, DefectCatalog,
    Granularity, Inspection, PacpCatalog, RulesTable,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Config and category problems surface before any data is read
    let config = args.resolve_config()?;
    let catalog = PacpCatalog;
    let vocabulary = catalog.codes(config.active_category);

    let start_time = Instant::now();
    let inspections = load_inspections(&args.input)?;
    let inspections = retain_vocabulary(inspections, &vocabulary);

    match &args.command {
        Command::Clusters { .. } => run_clusters(&args, &config, &catalog, &inspections)?,
        Command::Rules { .. } => run_rules(&args, &config, &catalog, &inspections)?,
    }

    info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "Analysis finished"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Identify, filter and summarise clusters
fn run_clusters(
    args: &Args,
    config: &AnalysisConfig,
    catalog: &PacpCatalog,
    inspections: &[Inspection],
) -> Result<()> {
    let analysis = analyze_clusters(inspections, config, catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis.retained)?);
        return Ok(());
    }

    println!("=== Cluster Analysis ({}) ===", config.active_category);
    println!(
        "Clusters identified: {} (gap threshold {})",
        analysis.clusters.len(),
        config.gap_threshold
    );
    println!(
        "Clusters retained: {} (>= {} defects, severity > {})\n",
        analysis.retained.len(),
        config.min_cluster_members,
        config.min_severity
    );
    print!("{}", cluster_size_histogram(&analysis.retained));
    Ok(())
}

/// Mine rules and print the interesting ones
fn run_rules(
    args: &Args,
    config: &AnalysisConfig,
    catalog: &PacpCatalog,
    inspections: &[Inspection],
) -> Result<()> {
    let mining = mine_defect_rules(inspections, config, catalog)?;
    let interesting = interesting_rules(&mining.rules, config.min_lift);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&interesting)?);
        return Ok(());
    }

    println!("=== Association Rules ({}) ===", config.active_category);
    if config.granularity == Granularity::Cluster {
        println!("Rules gap threshold: {}", config.rules_gap_threshold);
    }
    println!(
        "Transactions: {}, rules passing support > {} and confidence > {}: {}\n",
        mining.matrix.n_rows(),
        config.min_support,
        config.min_confidence,
        mining.rules.len()
    );
    print!("{}", RulesTable::new(&interesting, config.min_lift));
    Ok(())
}
