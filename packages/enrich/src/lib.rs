#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street data enrichment pipeline.
//!
//! Each step reads a [`Table`], calls an external service once per row, and
//! appends the results as new columns. A step whose output columns already
//! exist is skipped without touching the network: the street data file is
//! the cache.
//!
//! 1. [`enrich_coordinates`]: `postcode` → `latitude`, `longitude`.
//! 2. [`enrich_distances`]: coordinates → before/after route lengths to a
//!    [`Destination`].
//! 3. [`enrich_filter_distance`]: coordinates → a single route length,
//!    used for the distance to the LTN filter itself.
//!
//! [`analyze_table`] then hands the enriched table to the reconciliation
//! core.

pub mod coordinates;
pub mod destination_registry;
pub mod distances;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;
pub mod progress;

use ltn_distance_geocoder::GeocodeError;
use ltn_distance_reconcile::{Analysis, ReconcileError, analyze};
use ltn_distance_routing::RouteError;
use ltn_distance_store::{StoreError, Table, street_records};
use ltn_distance_street_models::Destination;
use thiserror::Error;

pub use coordinates::{coordinates_cached, enrich_coordinates};
pub use distances::{
    distances_cached, enrich_distances, enrich_filter_distance, filter_distance_cached,
};
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Errors from enrichment and analysis.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// A row has an empty cell in a column the step needs.
    #[error("Row {row}: '{column}' is empty")]
    MissingValue {
        /// One-based data row number.
        row: usize,
        /// Column with the empty cell.
        column: String,
    },

    /// No destination is registered under this id.
    #[error("Unknown destination '{id}'")]
    UnknownDestination {
        /// Requested id.
        id: String,
    },
}

/// What an enrichment step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The output columns were already present; nothing was fetched.
    AlreadyEnriched,
    /// New columns were added for this many rows.
    Enriched {
        /// Rows processed.
        rows: usize,
    },
}

impl EnrichOutcome {
    /// Whether the table changed and should be saved.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Enriched { .. })
    }
}

/// Looks up a registered destination.
///
/// # Errors
///
/// Returns [`EnrichError::UnknownDestination`] if `id` is not registered.
pub fn find_destination(id: &str) -> Result<Destination, EnrichError> {
    destination_registry::destination(id).ok_or_else(|| EnrichError::UnknownDestination {
        id: id.to_string(),
    })
}

/// Runs the reconciliation core over a table enriched for `destination`.
///
/// # Errors
///
/// * [`EnrichError::Store`] if required columns are missing or malformed.
/// * [`EnrichError::Reconcile`] if distances are missing, the threshold is
///   invalid, or the table has no rows.
pub fn analyze_table(
    table: &Table,
    destination: &Destination,
    noise_threshold_meters: f64,
) -> Result<Analysis, EnrichError> {
    let dataset = street_records(table, destination)?;
    Ok(analyze(&dataset, noise_threshold_meters)?)
}
