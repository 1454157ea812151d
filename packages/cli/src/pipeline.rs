//! Enrich → analyze → plot, over the street data file.
//!
//! The data file is rewritten after each step that adds columns, so an
//! interrupted run keeps whatever it has already paid for in API calls.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ltn_distance_chart::{ChartLabels, render_stacked_distances};
use ltn_distance_cli_utils::{IndicatifProgress, MultiProgress};
use ltn_distance_enrich::{
    EnrichOutcome, ProgressCallback, analyze_table, coordinates_cached, distances_cached,
    enrich_coordinates, enrich_distances, enrich_filter_distance, filter_distance_cached,
};
use ltn_distance_geocoder::Geocoder;
use ltn_distance_geocoder::chain::ChainGeocoder;
use ltn_distance_geocoder::service_registry::enabled_services;
use ltn_distance_reconcile::meters_to_miles;
use ltn_distance_routing::service_registry::router_for_phase;
use ltn_distance_routing::{Phase, Router};
use ltn_distance_store::{CsvStore, STREET_COLUMN, StoreError, Table};
use ltn_distance_street_models::Destination;

use crate::config::Config;

/// Saves `table` if `outcome` says the step added columns.
fn save_if_changed(
    store: &CsvStore,
    table: &Table,
    outcome: EnrichOutcome,
) -> Result<EnrichOutcome, StoreError> {
    if outcome.is_changed() {
        store.save(table)?;
    }
    Ok(outcome)
}

async fn geocode_and_save(
    store: &CsvStore,
    table: &mut Table,
    geocoder: &dyn Geocoder,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, Box<dyn Error>> {
    let outcome = enrich_coordinates(table, geocoder, progress).await?;
    Ok(save_if_changed(store, table, outcome)?)
}

async fn route_and_save(
    store: &CsvStore,
    table: &mut Table,
    destination: &Destination,
    before: &dyn Router,
    after: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, Box<dyn Error>> {
    let outcome = enrich_distances(table, destination, before, after, progress).await?;
    Ok(save_if_changed(store, table, outcome)?)
}

async fn route_filter_and_save(
    store: &CsvStore,
    table: &mut Table,
    filter: &Destination,
    router: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, Box<dyn Error>> {
    let outcome = enrich_filter_distance(table, filter, router, progress).await?;
    Ok(save_if_changed(store, table, outcome)?)
}

/// Geocodes postcodes unless the table already has coordinates.
async fn ensure_coordinates(
    store: &CsvStore,
    table: &mut Table,
    config: &Config,
    multi: &MultiProgress,
) -> Result<(), Box<dyn Error>> {
    if coordinates_cached(table) {
        return Ok(());
    }

    let geocoder = ChainGeocoder::from_services(&enabled_services(), config.user_agent()?)?;
    let progress = IndicatifProgress::streets_bar(multi, "Geocoding postcodes");
    geocode_and_save(store, table, &geocoder, &progress).await?;
    Ok(())
}

/// Adds coordinates and before/after distances to `destination`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, a credential is
/// missing, or any API call fails.
pub async fn enrich(
    store: &CsvStore,
    destination: &Destination,
    config: &Config,
    multi: &MultiProgress,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let mut table = store.load()?;
    table.require_column(STREET_COLUMN)?;

    ensure_coordinates(store, &mut table, config, multi).await?;

    if distances_cached(&table, destination) {
        return Ok(());
    }

    let credentials = config.router_credentials();
    let before = router_for_phase(Phase::Before, &credentials)?;
    let after = router_for_phase(Phase::After, &credentials)?;
    let progress = IndicatifProgress::streets_bar(multi, "Routing");
    route_and_save(
        store,
        &mut table,
        destination,
        before.as_ref(),
        after.as_ref(),
        &progress,
    )
    .await?;

    log::info!(
        "Enrichment complete in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Adds the single-router distance to a filter-style destination.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or any API call
/// fails.
pub async fn filter_distance(
    store: &CsvStore,
    filter: &Destination,
    config: &Config,
    multi: &MultiProgress,
) -> Result<(), Box<dyn Error>> {
    let mut table = store.load()?;
    table.require_column(STREET_COLUMN)?;

    ensure_coordinates(store, &mut table, config, multi).await?;

    if filter_distance_cached(&table, filter) {
        return Ok(());
    }

    let router = router_for_phase(Phase::After, &config.router_credentials())?;
    let progress = IndicatifProgress::streets_bar(multi, "Routing to filter");
    route_filter_and_save(store, &mut table, filter, router.as_ref(), &progress).await?;
    Ok(())
}

/// Analyzes cached distances and renders the chart to `output`.
///
/// # Errors
///
/// Returns an error if distance columns are missing or incomplete, or the
/// chart cannot be written.
pub fn plot(
    store: &CsvStore,
    destination: &Destination,
    noise_threshold_meters: f64,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let table = store.load()?;
    let analysis = analyze_table(&table, destination, noise_threshold_meters)?;

    let normalized = analysis.records.iter().filter(|r| r.is_normalized()).count();
    log::info!(
        "{} streets, {normalized} within {noise_threshold_meters}m noise threshold",
        analysis.records.len()
    );
    if let Some(longest) = analysis
        .records
        .iter()
        .max_by(|a, b| a.delta.total_cmp(&b.delta))
    {
        log::info!(
            "Largest increase: {} (+{:.2} miles)",
            longest.street_name,
            meters_to_miles(longest.delta)
        );
    }

    render_stacked_distances(output, &analysis, &ChartLabels::for_destination(destination))?;

    println!(
        "Average distance increase: {:.2} miles",
        analysis.mean_delta_miles()
    );
    println!("Plot written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use ltn_distance_enrich::destination_registry::destination;
    use ltn_distance_enrich::fakes::{FakeGeocoder, FakeRouter};
    use ltn_distance_enrich::null_progress;
    use ltn_distance_street_models::Coordinate;

    use super::*;

    fn scratch_store(name: &str, contents: &str) -> CsvStore {
        let path = std::env::temp_dir().join(format!(
            "ltn_distance_cli_{}_{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        CsvStore::new(path)
    }

    fn geocoder() -> FakeGeocoder {
        FakeGeocoder::new(&[
            ("OX4 3LF", Coordinate::new(51.7229, -1.2136)),
            ("OX4 4PU", Coordinate::new(51.7198, -1.2231)),
        ])
    }

    #[tokio::test]
    async fn geocoded_columns_are_written_to_disk() {
        let store = scratch_store(
            "geocode.csv",
            "street,postcode\nBeauchamp Lane,OX4 3LF\nKenville Road,OX4 4PU\n",
        );
        let mut table = store.load().unwrap();

        let outcome = geocode_and_save(&store, &mut table, &geocoder(), &null_progress())
            .await
            .unwrap();

        assert!(outcome.is_changed());
        let on_disk = store.load().unwrap();
        assert_eq!(
            on_disk.f64_column("latitude").unwrap(),
            vec![Some(51.7229), Some(51.7198)]
        );
        assert_eq!(on_disk.column("street").unwrap(), ["Beauchamp Lane", "Kenville Road"]);

        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn cached_coordinates_leave_file_untouched() {
        let contents = "street,postcode,latitude,longitude\nBeauchamp Lane, OX4 3LF ,51.72290,-1.2136\n";
        let store = scratch_store("geocode_cached.csv", contents);
        let mut table = store.load().unwrap();
        let geocoder = geocoder();

        let outcome = geocode_and_save(&store, &mut table, &geocoder, &null_progress())
            .await
            .unwrap();

        assert_eq!(outcome, EnrichOutcome::AlreadyEnriched);
        assert_eq!(geocoder.calls(), 0);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), contents);

        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn routed_distances_are_written_to_disk() {
        let templars = destination("templars").unwrap();
        let store = scratch_store(
            "route.csv",
            "street,latitude,longitude\nBeauchamp Lane,51.7229,-1.2136\n",
        );
        let mut table = store.load().unwrap();
        let router = FakeRouter::new(100_000.0);

        let outcome = route_and_save(
            &store,
            &mut table,
            &templars,
            &router,
            &router,
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, EnrichOutcome::Enriched { rows: 1 });
        let on_disk = store.load().unwrap();
        assert!(on_disk.has_columns(&[
            "driving_distance_to_templars_before",
            "driving_distance_to_templars_after",
        ]));

        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn cached_distances_leave_file_untouched() {
        let templars = destination("templars").unwrap();
        let contents = "street,latitude,longitude,driving_distance_to_templars_before,driving_distance_to_templars_after\n\
                        Beauchamp Lane,51.7229,-1.2136,1830.0,3121.40\n";
        let store = scratch_store("route_cached.csv", contents);
        let mut table = store.load().unwrap();
        let router = FakeRouter::new(1.0);

        let outcome = route_and_save(
            &store,
            &mut table,
            &templars,
            &router,
            &router,
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, EnrichOutcome::AlreadyEnriched);
        assert_eq!(router.calls(), 0);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), contents);

        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn failed_step_does_not_rewrite_file() {
        let filter = destination("ltn").unwrap();
        let contents = "street,postcode,latitude,longitude\nBeauchamp Lane,OX4 3LF,51.7229,-1.2136\n";
        let store = scratch_store("filter_failed.csv", contents);
        let mut table = store.load().unwrap();
        let router = FakeRouter::failing_after(1.0, 0);

        assert!(
            route_filter_and_save(&store, &mut table, &filter, &router, &null_progress())
                .await
                .is_err()
        );
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), contents);

        std::fs::remove_file(store.path()).ok();
    }

    #[tokio::test]
    async fn filter_distance_is_written_to_disk() {
        let filter = destination("ltn").unwrap();
        let store = scratch_store(
            "filter.csv",
            "street,postcode,latitude,longitude\nLittlemore Road,OX4 3ST,51.7300,-1.2190\n",
        );
        let mut table = store.load().unwrap();
        let router = FakeRouter::new(1.0);

        route_filter_and_save(&store, &mut table, &filter, &router, &null_progress())
            .await
            .unwrap();

        assert_eq!(
            store
                .load()
                .unwrap()
                .f64_column("driving_distance_to_ltn_meters")
                .unwrap(),
            vec![Some(0.0)]
        );
        assert_eq!(router.calls(), 0);

        std::fs::remove_file(store.path()).ok();
    }
}
