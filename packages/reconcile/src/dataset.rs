//! Street-keyed collection of raw distance records.

use std::collections::BTreeSet;

use ltn_distance_street_models::StreetDistanceRecord;

use crate::ReconcileError;

/// An ordered set of [`StreetDistanceRecord`]s with unique street names.
///
/// Input order is preserved; it is the final tie-breaker when ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<StreetDistanceRecord>,
}

impl Dataset {
    /// Builds a dataset, validating street names.
    ///
    /// # Errors
    ///
    /// * [`ReconcileError::EmptyStreetName`] if any name is blank.
    /// * [`ReconcileError::DuplicateStreet`] if a name appears twice.
    pub fn new(records: Vec<StreetDistanceRecord>) -> Result<Self, ReconcileError> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if record.street_name.trim().is_empty() {
                return Err(ReconcileError::EmptyStreetName);
            }
            if !seen.insert(record.street_name.as_str()) {
                return Err(ReconcileError::DuplicateStreet {
                    street: record.street_name.clone(),
                });
            }
        }
        Ok(Self { records })
    }

    #[must_use]
    pub fn records(&self) -> &[StreetDistanceRecord] {
        &self.records
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by street name.
    #[must_use]
    pub fn get(&self, street_name: &str) -> Option<&StreetDistanceRecord> {
        self.records.iter().find(|r| r.street_name == street_name)
    }

    #[must_use]
    pub fn into_records(self) -> Vec<StreetDistanceRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a StreetDistanceRecord;
    type IntoIter = std::slice::Iter<'a, StreetDistanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
