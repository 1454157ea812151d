//! Route distance enrichment.

use std::sync::Arc;

use ltn_distance_routing::Router;
use ltn_distance_store::{LATITUDE_COLUMN, LONGITUDE_COLUMN, POSTCODE_COLUMN, Table};
use ltn_distance_street_models::{Coordinate, Destination};

use crate::progress::ProgressCallback;
use crate::{EnrichError, EnrichOutcome};

/// Reads each row's origin from the `latitude` / `longitude` columns.
fn origins(table: &Table) -> Result<Vec<Coordinate>, EnrichError> {
    table.require_column(LATITUDE_COLUMN)?;
    table.require_column(LONGITUDE_COLUMN)?;
    let latitudes = table.f64_column(LATITUDE_COLUMN.name)?;
    let longitudes = table.f64_column(LONGITUDE_COLUMN.name)?;

    latitudes
        .into_iter()
        .zip(longitudes)
        .enumerate()
        .map(|(i, pair)| match pair {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            (None, _) => Err(EnrichError::MissingValue {
                row: i + 1,
                column: LATITUDE_COLUMN.name.to_string(),
            }),
            (_, None) => Err(EnrichError::MissingValue {
                row: i + 1,
                column: LONGITUDE_COLUMN.name.to_string(),
            }),
        })
        .collect()
}

/// Whether both distance columns for `destination` are already cached.
///
/// Logs when they are, so callers can skip building routers.
#[must_use]
pub fn distances_cached(table: &Table, destination: &Destination) -> bool {
    let before_column = destination.before_column();
    let after_column = destination.after_column();
    let cached = table.has_columns(&[before_column.as_str(), after_column.as_str()]);
    if cached {
        log::info!("Columns {before_column} and {after_column} already exist, no action taken");
    }
    cached
}

/// Whether the single distance column for `destination` is already cached.
#[must_use]
pub fn filter_distance_cached(table: &Table, destination: &Destination) -> bool {
    let column = destination.meters_column();
    let cached = table.has_column(&column);
    if cached {
        log::info!("Column {column} already exists, no action taken");
    }
    cached
}

/// Adds before/after distance columns for `destination`.
///
/// Skipped, with no API calls, when both columns already exist. Otherwise
/// every row is routed with `before` and then `after`, one request at a
/// time. On failure `progress` is cleared and `table` is left unchanged.
///
/// # Errors
///
/// * [`EnrichError::Store`] if coordinate columns are missing or malformed.
/// * [`EnrichError::MissingValue`] if a row has no coordinates.
/// * [`EnrichError::Route`] if either router fails for any row.
pub async fn enrich_distances(
    table: &mut Table,
    destination: &Destination,
    before: &dyn Router,
    after: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, EnrichError> {
    if distances_cached(table, destination) {
        return Ok(EnrichOutcome::AlreadyEnriched);
    }

    let origins = origins(table)?;
    progress.set_total(origins.len() as u64);
    let (before_distances, after_distances) =
        route_pairs(&origins, destination, before, after, progress)
            .await
            .inspect_err(|_| progress.finish_and_clear())?;

    table.set_f64_column(&destination.before_column(), &before_distances)?;
    table.set_f64_column(&destination.after_column(), &after_distances)?;

    progress.finish(format!(
        "Routed {} streets to {}",
        origins.len(),
        destination.name
    ));
    Ok(EnrichOutcome::Enriched {
        rows: origins.len(),
    })
}

type DistanceColumns = (Vec<Option<f64>>, Vec<Option<f64>>);

async fn route_pairs(
    origins: &[Coordinate],
    destination: &Destination,
    before: &dyn Router,
    after: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DistanceColumns, EnrichError> {
    let target = destination.coordinate();
    let mut before_distances = Vec::with_capacity(origins.len());
    let mut after_distances = Vec::with_capacity(origins.len());

    for (i, origin) in origins.iter().enumerate() {
        progress.set_message(format!("Routing row {} to {}", i + 1, destination.name));

        let before_meters = before.estimate(*origin, target).await?;
        let after_meters = after.estimate(*origin, target).await?;
        log::debug!(
            "Row {}: {} {before_meters:.0}m, {} {after_meters:.0}m",
            i + 1,
            before.id(),
            after.id()
        );

        before_distances.push(Some(before_meters));
        after_distances.push(Some(after_meters));
        progress.inc(1);
    }

    Ok((before_distances, after_distances))
}

/// Adds a single distance column for `destination` using one router.
///
/// Rows whose postcode is in the destination's `zero_distance_postcodes`
/// get `0` without a request. Skipped when the column already exists.
///
/// # Errors
///
/// Same as [`enrich_distances`].
pub async fn enrich_filter_distance(
    table: &mut Table,
    destination: &Destination,
    router: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, EnrichError> {
    if filter_distance_cached(table, destination) {
        return Ok(EnrichOutcome::AlreadyEnriched);
    }

    let origins = origins(table)?;
    let postcodes: Vec<String> = table
        .column(POSTCODE_COLUMN.name)
        .map(|cells| cells.into_iter().map(str::to_string).collect())
        .unwrap_or_else(|| vec![String::new(); origins.len()]);
    progress.set_total(origins.len() as u64);
    let distances = route_to_filter(&origins, &postcodes, destination, router, progress)
        .await
        .inspect_err(|_| progress.finish_and_clear())?;

    table.set_f64_column(&destination.meters_column(), &distances)?;

    progress.finish(format!("Routed {} streets to {}", origins.len(), destination.name));
    Ok(EnrichOutcome::Enriched {
        rows: origins.len(),
    })
}

async fn route_to_filter(
    origins: &[Coordinate],
    postcodes: &[String],
    destination: &Destination,
    router: &dyn Router,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Option<f64>>, EnrichError> {
    let target = destination.coordinate();
    let mut distances = Vec::with_capacity(origins.len());

    for (origin, postcode) in origins.iter().zip(postcodes) {
        let meters = if destination.is_zero_distance(postcode) {
            log::debug!("{postcode} is pinned to zero distance from {}", destination.name);
            0.0
        } else {
            router.estimate(*origin, target).await?
        };
        distances.push(Some(meters));
        progress.inc(1);
    }

    Ok(distances)
}
