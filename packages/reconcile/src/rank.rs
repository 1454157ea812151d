//! Display ordering for reconciled streets.
//!
//! Streets are shown from shortest to longest "before" distance so the
//! stacked chart reads as a rising staircase.

use std::cmp::Ordering;

use ltn_distance_street_models::StreetDistanceRecord;

use crate::{Dataset, DistanceField, ReconcileError, ReconciledRecord};

/// Sorts reconciled records ascending by `distance_before`.
///
/// Ties are broken by street name; the sort is stable, so any remaining ties
/// keep their input order. The output is a permutation of the input.
#[must_use]
pub fn rank(records: &[ReconciledRecord]) -> Vec<ReconciledRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        by_baseline(
            a.distance_before,
            &a.street_name,
            b.distance_before,
            &b.street_name,
        )
    });
    ranked
}

/// Sorts raw records by `distance_before` using the same ordering as
/// [`rank()`].
///
/// # Errors
///
/// Returns [`ReconcileError::MissingField`] if any record has no "before"
/// distance.
pub fn rank_dataset(dataset: &Dataset) -> Result<Vec<StreetDistanceRecord>, ReconcileError> {
    let mut keyed = dataset
        .into_iter()
        .map(|record| {
            record
                .distance_before
                .map(|before| (before, record))
                .ok_or_else(|| ReconcileError::MissingField {
                    street: record.street_name.clone(),
                    field: DistanceField::Before,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a_before, a), (b_before, b)| {
        by_baseline(*a_before, &a.street_name, *b_before, &b.street_name)
    });

    Ok(keyed.into_iter().map(|(_, record)| record.clone()).collect())
}

fn by_baseline(a_before: f64, a_name: &str, b_before: f64, b_name: &str) -> Ordering {
    a_before
        .total_cmp(&b_before)
        .then_with(|| a_name.cmp(b_name))
}
