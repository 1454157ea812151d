//! Noise thresholding for before/after distance pairs.

use ltn_distance_street_models::{Coordinate, StreetDistanceRecord};
use serde::Serialize;

use crate::{Dataset, DistanceField, ReconcileError};

/// Default noise threshold in meters. Increases at or below this are treated
/// as routing imprecision.
pub const DEFAULT_NOISE_THRESHOLD_METERS: f64 = 50.0;

/// A street with its distances reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    pub street_name: String,
    pub origin: Option<Coordinate>,
    /// Raw "before" distance in meters.
    pub distance_before: f64,
    /// Raw "after" distance in meters, as measured.
    pub distance_after: f64,
    /// `distance_after - distance_before`, or zero when that is within the
    /// noise threshold.
    pub delta: f64,
    /// `distance_after`, or `distance_before` when the delta was collapsed.
    pub normalized_after: f64,
}

impl ReconciledRecord {
    /// Whether the measured increase was collapsed to zero.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        // Kept deltas are strictly above a non-negative threshold.
        self.delta <= 0.0
    }

    /// Re-expresses this record as a raw measurement whose "after" distance
    /// is the normalized one.
    #[must_use]
    pub fn as_measured(&self) -> StreetDistanceRecord {
        StreetDistanceRecord {
            street_name: self.street_name.clone(),
            postcode: None,
            origin: self.origin,
            distance_before: Some(self.distance_before),
            distance_after: Some(self.normalized_after),
        }
    }
}

/// Applies the noise threshold to every record in `dataset`.
///
/// For each street, `delta = after - before`. When `delta <= threshold` the
/// street is treated as unaffected: `delta` becomes `0` and the normalized
/// "after" distance equals "before". There is no lower bound on the test, so
/// a shorter "after" route is collapsed the same way.
///
/// # Errors
///
/// * [`ReconcileError::InvalidThreshold`] if `noise_threshold_meters` is
///   negative or not finite.
/// * [`ReconcileError::MissingField`] if any record lacks a distance.
/// * [`ReconcileError::InvalidDistance`] if any distance is negative, NaN,
///   or infinite.
pub fn reconcile(
    dataset: &Dataset,
    noise_threshold_meters: f64,
) -> Result<Vec<ReconciledRecord>, ReconcileError> {
    if !noise_threshold_meters.is_finite() || noise_threshold_meters < 0.0 {
        return Err(ReconcileError::InvalidThreshold {
            value: noise_threshold_meters,
        });
    }

    let reconciled = dataset
        .into_iter()
        .map(|record| reconcile_one(record, noise_threshold_meters))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Reconciled {} streets, {} within {noise_threshold_meters}m noise threshold",
        reconciled.len(),
        reconciled.iter().filter(|r| r.is_normalized()).count()
    );

    Ok(reconciled)
}

fn reconcile_one(
    record: &StreetDistanceRecord,
    noise_threshold_meters: f64,
) -> Result<ReconciledRecord, ReconcileError> {
    let distance = |value: Option<f64>, field| match value {
        None => Err(ReconcileError::MissingField {
            street: record.street_name.clone(),
            field,
        }),
        Some(meters) if !meters.is_finite() || meters < 0.0 => {
            Err(ReconcileError::InvalidDistance {
                street: record.street_name.clone(),
                field,
                value: meters,
            })
        }
        Some(meters) => Ok(meters),
    };
    let before = distance(record.distance_before, DistanceField::Before)?;
    let after = distance(record.distance_after, DistanceField::After)?;

    let raw_delta = after - before;
    let (delta, normalized_after) = if raw_delta <= noise_threshold_meters {
        (0.0, before)
    } else {
        (raw_delta, after)
    };

    Ok(ReconciledRecord {
        street_name: record.street_name.clone(),
        origin: record.origin,
        distance_before: before,
        distance_after: after,
        delta,
        normalized_after,
    })
}
