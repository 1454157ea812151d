#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for LTN before/after distance analysis.
//!
//! With no subcommand, enriches the street data file (postcodes →
//! coordinates → before/after route distances) and then plots the result.
//! API results are cached in the data file, so re-running only calls the
//! APIs for columns that are still missing.
//!
//! Uses `indicatif-log-bridge` (via [`ltn_distance_cli_utils::init_logger`])
//! so log lines and progress bars share the terminal cleanly.

mod config;
mod pipeline;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ltn_distance_enrich::destination_registry::all_destinations;
use ltn_distance_enrich::find_destination;
use ltn_distance_reconcile::DEFAULT_NOISE_THRESHOLD_METERS;
use ltn_distance_store::CsvStore;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "ltn_distance_cli",
    about = "Driving distance before and after a Low Traffic Neighbourhood"
)]
struct Cli {
    /// Street data CSV; also caches geocoding and routing results
    #[arg(long, global = true, default_value = "data/street_data.csv")]
    data: PathBuf,

    /// Where to write the bar chart PNG
    #[arg(long, global = true, default_value = "distances_barchart.png")]
    output: PathBuf,

    /// Destination ID (see `destinations`)
    #[arg(long, global = true, default_value = "templars")]
    destination: String,

    /// Increases at or below this many meters are treated as routing noise
    #[arg(long, global = true, default_value_t = DEFAULT_NOISE_THRESHOLD_METERS)]
    threshold: f64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich the data file, then plot (default)
    Run,
    /// Geocode postcodes and fetch before/after distances
    Enrich,
    /// Plot cached distances without calling any API
    Plot,
    /// Fetch the driving distance from each street to an LTN filter
    FilterDistance {
        /// Filter destination ID
        #[arg(long, default_value = "ltn")]
        filter: String,
    },
    /// List registered destinations
    Destinations,
}

fn open_store(path: &Path) -> Result<CsvStore, Box<dyn std::error::Error>> {
    let store = CsvStore::new(path);
    if !store.exists() {
        return Err(format!("Data file not found: {}", path.display()).into());
    }
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = ltn_distance_cli_utils::init_logger();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    let config = Config::from_env();

    match command {
        Commands::Destinations => {
            println!("{:<12} {:<30} ORIGIN AREA", "ID", "NAME");
            println!("{}", "-".repeat(64));
            for destination in &all_destinations() {
                println!(
                    "{:<12} {:<30} {}",
                    destination.id, destination.name, destination.origin_area
                );
            }
        }
        Commands::Run => {
            let store = open_store(&cli.data)?;
            let destination = find_destination(&cli.destination)?;
            pipeline::enrich(&store, &destination, &config, &multi).await?;
            pipeline::plot(&store, &destination, cli.threshold, &cli.output)?;
        }
        Commands::Enrich => {
            let store = open_store(&cli.data)?;
            let destination = find_destination(&cli.destination)?;
            pipeline::enrich(&store, &destination, &config, &multi).await?;
        }
        Commands::Plot => {
            let store = open_store(&cli.data)?;
            let destination = find_destination(&cli.destination)?;
            pipeline::plot(&store, &destination, cli.threshold, &cli.output)?;
        }
        Commands::FilterDistance { filter } => {
            let store = open_store(&cli.data)?;
            let filter = find_destination(&filter)?;
            pipeline::filter_distance(&store, &filter, &config, &multi).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run_with_standard_paths() {
        let cli = Cli::try_parse_from(["ltn_distance_cli"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data, PathBuf::from("data/street_data.csv"));
        assert_eq!(cli.output, PathBuf::from("distances_barchart.png"));
        assert_eq!(cli.destination, "templars");
        assert!((cli.threshold - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "ltn_distance_cli",
            "plot",
            "--threshold",
            "100",
            "--output",
            "out.png",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Plot)));
        assert!((cli.threshold - 100.0).abs() < f64::EPSILON);
        assert_eq!(cli.output, PathBuf::from("out.png"));
    }

    #[test]
    fn missing_data_file_is_an_error() {
        let path = std::env::temp_dir().join("ltn_distance_cli_no_such_street_data.csv");
        let err = open_store(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Data file not found: {}", path.display())
        );
    }

    #[test]
    fn existing_data_file_opens() {
        let path = std::env::temp_dir().join(format!(
            "ltn_distance_cli_{}_open.csv",
            std::process::id()
        ));
        std::fs::write(&path, "street\nBeauchamp Lane\n").unwrap();

        let store = open_store(&path).unwrap();
        assert_eq!(store.path(), path.as_path());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn filter_distance_defaults_to_ltn() {
        let cli = Cli::try_parse_from(["ltn_distance_cli", "filter-distance"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::FilterDistance { ref filter }) if filter == "ltn"
        ));
    }
}
