//! Headline statistic for the chart.

use crate::{ReconcileError, ReconciledRecord};

/// Mean of the reconciled deltas, in meters.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptyDataset`] if `records` is empty.
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[ReconciledRecord]) -> Result<f64, ReconcileError> {
    if records.is_empty() {
        return Err(ReconcileError::EmptyDataset);
    }
    let total: f64 = records.iter().map(|r| r.delta).sum();
    Ok(total / records.len() as f64)
}

#[cfg(test)]
mod tests {
    use ltn_distance_street_models::StreetDistanceRecord;

    use super::*;
    use crate::{Dataset, reconcile};

    fn reconciled(records: &[(&str, f64, f64)]) -> Vec<ReconciledRecord> {
        let dataset = Dataset::new(
            records
                .iter()
                .map(|&(name, before, after)| StreetDistanceRecord::measured(name, before, after))
                .collect(),
        )
        .unwrap();
        reconcile(&dataset, 50.0).unwrap()
    }

    #[test]
    fn empty_dataset_is_an_error() {
        assert_eq!(summarize(&[]), Err(ReconcileError::EmptyDataset));
    }

    #[test]
    fn single_record_returns_its_delta() {
        let records = reconciled(&[("Only", 1200.0, 1900.0)]);
        assert_eq!(summarize(&records), Ok(700.0));
    }

    #[test]
    fn averages_over_all_streets_including_unaffected() {
        let records = reconciled(&[
            ("A", 1000.0, 1020.0),
            ("B", 500.0, 2000.0),
            ("C", 2000.0, 1990.0),
        ]);
        let mean = summarize(&records).unwrap();
        assert!((mean - 500.0).abs() < 1e-9);
    }
}
