//! POS Tracker - Entry Point
//!
//! Loads reference data and a sample set, reconciles every structure and
//! prints a report for each at the requested time.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pos_tracker::catalog::StaticCatalog;
use pos_tracker::core::error::Result;
use pos_tracker::core::{TrackerConfig, TrackerContext};
use pos_tracker::importer::Tracker;
use pos_tracker::sample::SampleSet;
use pos_tracker::structure::{LoggingObserver, StructureReport};

/// Track fuel and silo levels of player-owned structures
#[derive(Parser, Debug)]
#[command(name = "pos-tracker")]
#[command(about = "Reconcile starbase samples and report fuel levels")]
struct Args {
    /// Reference data (structure types, fuel requirements, systems)
    #[arg(long)]
    catalog: PathBuf,

    /// Starbase listings and detail samples
    #[arg(long)]
    samples: PathBuf,

    /// Tracker configuration, defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report time (unix seconds); defaults to the latest sample
    #[arg(long)]
    at: Option<i64>,

    /// Only print one buffer group: fuels or silos
    #[arg(long)]
    group: Option<String>,

    /// Output reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pos_tracker=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrackerConfig::load_from_toml(path)?,
        None => TrackerConfig::default(),
    };
    let catalog = Arc::new(StaticCatalog::load_from_toml(&args.catalog)?);
    let samples = SampleSet::load_from_toml(&args.samples)?;

    let context = TrackerContext::from_catalog(config, catalog, Arc::new(LoggingObserver));
    let mut tracker = Tracker::new(Arc::new(context));
    let applied = tracker.import_all(&samples);
    tracing::info!("{} samples applied to {} structures", applied, tracker.len());

    let at = args
        .at
        .or_else(|| samples.details.iter().map(|d| d.sampled_at).max())
        .unwrap_or(0);

    if let Some(group) = &args.group {
        let group = group.parse()?;
        for structure in tracker.structures() {
            let levels = structure.levels(group, at);
            if args.json {
                println!("{}", serde_json::to_string(&levels)?);
            } else {
                println!("{} ({})", structure.item_id(), structure.celestial_name());
                for (type_id, value) in levels {
                    println!("  {:>8}  {}", type_id.0, value);
                }
            }
        }
        return Ok(());
    }

    let reports = tracker.reports(at);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(())
}

fn print_report(report: &StructureReport) {
    println!("\n=== {} ({}) ===", report.celestial_name, report.type_name);
    println!("{} / {}", report.solar_system_name, report.region_name);
    println!("State: {} at {}", report.state_name, report.timestamp);
    if report.offline_timestamp >= 0 {
        println!(
            "Offline at {} ({}h remaining)",
            report.offline_timestamp,
            report.time_remaining / 3600
        );
    } else {
        println!("Offline at: unknown");
    }
    println!("Reinforcement: {}h", report.reinforcement_length / 3600);

    println!("Fuel:");
    for (type_id, value) in &report.resources {
        let add = report.ideal_fueling_amount.get(type_id).copied().unwrap_or(0);
        println!("  {:>8}  {:>8}  (add {})", type_id.0, value, add);
    }
    if !report.silo_levels.is_empty() {
        println!("Silos:");
        for (type_id, value) in &report.silo_levels {
            println!("  {:>8}  {:>8}", type_id.0, value);
        }
    }
}
