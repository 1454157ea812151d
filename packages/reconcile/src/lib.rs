#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Before/after distance reconciliation.
//!
//! The two routing providers used for "before" and "after" distances run on
//! different road graphs, so small measured increases are noise rather than
//! real detours. This crate turns raw distance pairs into a display-ready
//! view:
//!
//! 1. [`reconcile()`] collapses any delta at or below a noise threshold to
//!    zero and pins the "after" distance to the "before" distance.
//! 2. [`rank()`] orders streets by ascending "before" distance so the chart
//!    forms a staircase.
//! 3. [`summarize()`] computes the mean delta across all streets.
//!
//! Everything here is pure: no I/O, no shared state.

pub mod dataset;
pub mod rank;
pub mod reconcile;
pub mod summary;
pub mod units;

use serde::Serialize;
use thiserror::Error;

pub use dataset::Dataset;
pub use rank::{rank, rank_dataset};
pub use reconcile::{DEFAULT_NOISE_THRESHOLD_METERS, ReconciledRecord, reconcile};
pub use summary::summarize;
pub use units::{METERS_TO_MILES, meters_to_miles, miles_to_meters};

/// Which distance field a record is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceField {
    Before,
    After,
}

impl std::fmt::Display for DistanceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Before => "distance_before",
            Self::After => "distance_after",
        })
    }
}

/// Errors from reconciliation, ranking, and summary operations.
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// The mean of an empty dataset is undefined.
    #[error("Cannot summarize an empty dataset")]
    EmptyDataset,

    /// A record is missing one of its distance measurements.
    #[error("Street '{street}' is missing {field}")]
    MissingField {
        /// Street whose record is incomplete.
        street: String,
        /// The absent measurement.
        field: DistanceField,
    },

    /// Two records share a street name.
    #[error("Duplicate street '{street}' in dataset")]
    DuplicateStreet {
        /// The repeated street name.
        street: String,
    },

    /// A record has a blank street name.
    #[error("Street name must not be empty")]
    EmptyStreetName,

    /// A distance is negative or not a finite number.
    #[error("Street '{street}' has invalid {field} {value}")]
    InvalidDistance {
        /// Street whose record holds the value.
        street: String,
        /// The rejected measurement.
        field: DistanceField,
        /// The rejected value, in meters.
        value: f64,
    },

    /// The noise threshold is negative, NaN, or infinite.
    #[error("Noise threshold must be a non-negative finite number of meters, got {value}")]
    InvalidThreshold {
        /// The rejected threshold.
        value: f64,
    },
}

/// Output of the full reconcile → rank → summarize pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Reconciled records in display order.
    pub records: Vec<ReconciledRecord>,
    /// Mean of the reconciled deltas, in meters.
    pub mean_delta_meters: f64,
    /// Threshold the records were reconciled with.
    pub noise_threshold_meters: f64,
}

impl Analysis {
    /// Mean distance increase in miles.
    #[must_use]
    pub fn mean_delta_miles(&self) -> f64 {
        meters_to_miles(self.mean_delta_meters)
    }
}

/// Reconciles, ranks, and summarizes a dataset in one pass.
///
/// # Errors
///
/// * [`ReconcileError::InvalidThreshold`] if the threshold is unusable.
/// * [`ReconcileError::MissingField`] if any record lacks a distance.
/// * [`ReconcileError::EmptyDataset`] if the dataset has no records.
pub fn analyze(dataset: &Dataset, noise_threshold_meters: f64) -> Result<Analysis, ReconcileError> {
    let reconciled = reconcile(dataset, noise_threshold_meters)?;
    let mean_delta_meters = summarize(&reconciled)?;
    let records = rank(&reconciled);

    log::debug!(
        "Analyzed {} streets: mean delta {mean_delta_meters:.1}m (threshold {noise_threshold_meters}m)",
        records.len()
    );

    Ok(Analysis {
        records,
        mean_delta_meters,
        noise_threshold_meters,
    })
}
