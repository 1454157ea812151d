//! Postcode → coordinate enrichment.

use std::sync::Arc;

use ltn_distance_geocoder::Geocoder;
use ltn_distance_store::{LATITUDE_COLUMN, LONGITUDE_COLUMN, POSTCODE_COLUMN, Table};

use crate::progress::ProgressCallback;
use crate::{EnrichError, EnrichOutcome};

/// Whether `latitude` and `longitude` are already cached in `table`.
///
/// Logs when they are, so callers can skip building a geocoder.
#[must_use]
pub fn coordinates_cached(table: &Table) -> bool {
    let cached = table.has_columns(&[LATITUDE_COLUMN.name, LONGITUDE_COLUMN.name]);
    if cached {
        log::info!(
            "Columns {} and {} already exist, no action taken",
            LATITUDE_COLUMN.name,
            LONGITUDE_COLUMN.name
        );
    }
    cached
}

/// Adds `latitude` and `longitude` columns by geocoding each row's postcode.
///
/// Skipped when both columns already exist. Rows are geocoded one at a time
/// in file order; the first failure aborts the step, clears `progress`, and
/// leaves `table` unchanged.
///
/// # Errors
///
/// * [`EnrichError::Store`] if there is no `postcode` column.
/// * [`EnrichError::MissingValue`] if a row has no postcode.
/// * [`EnrichError::Geocode`] if a postcode cannot be resolved.
pub async fn enrich_coordinates(
    table: &mut Table,
    geocoder: &dyn Geocoder,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<EnrichOutcome, EnrichError> {
    if coordinates_cached(table) {
        return Ok(EnrichOutcome::AlreadyEnriched);
    }

    let postcodes: Vec<String> = table
        .require_column(POSTCODE_COLUMN)?
        .into_iter()
        .map(str::to_string)
        .collect();

    progress.set_total(postcodes.len() as u64);
    let (latitudes, longitudes) = geocode_rows(&postcodes, geocoder, progress)
        .await
        .inspect_err(|_| progress.finish_and_clear())?;

    table.set_f64_column(LATITUDE_COLUMN.name, &latitudes)?;
    table.set_f64_column(LONGITUDE_COLUMN.name, &longitudes)?;

    progress.finish(format!("Geocoded {} postcodes", postcodes.len()));
    Ok(EnrichOutcome::Enriched {
        rows: postcodes.len(),
    })
}

type CoordinateColumns = (Vec<Option<f64>>, Vec<Option<f64>>);

async fn geocode_rows(
    postcodes: &[String],
    geocoder: &dyn Geocoder,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<CoordinateColumns, EnrichError> {
    let mut latitudes = Vec::with_capacity(postcodes.len());
    let mut longitudes = Vec::with_capacity(postcodes.len());

    for (i, postcode) in postcodes.iter().enumerate() {
        if postcode.is_empty() {
            return Err(EnrichError::MissingValue {
                row: i + 1,
                column: POSTCODE_COLUMN.name.to_string(),
            });
        }

        progress.set_message(format!("Geocoding {postcode}"));
        log::debug!("Processing: {postcode}");

        let coordinate = geocoder.lookup(postcode).await?;
        latitudes.push(Some(coordinate.latitude));
        longitudes.push(Some(coordinate.longitude));
        progress.inc(1);
    }

    Ok((latitudes, longitudes))
}
