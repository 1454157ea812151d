#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street, coordinate, and destination types.
//!
//! A [`StreetDistanceRecord`] is one row of the street data file: a street
//! name plus whatever has been resolved for it so far (origin coordinates,
//! route lengths to a [`Destination`] before and after the LTN went in).
//! Fields that enrichment has not populated yet are `None`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Raw per-street measurements as read from the street data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetDistanceRecord {
    /// Street name, used as the chart label. Unique within a dataset.
    pub street_name: String,
    /// Postcode used to geocode the street, if known.
    pub postcode: Option<String>,
    /// Geocoded position of the street.
    pub origin: Option<Coordinate>,
    /// Route length in meters before the intervention.
    pub distance_before: Option<f64>,
    /// Route length in meters after the intervention.
    pub distance_after: Option<f64>,
}

impl StreetDistanceRecord {
    /// Creates a fully-measured record with no postcode or origin attached.
    #[must_use]
    pub fn measured(street_name: impl Into<String>, before: f64, after: f64) -> Self {
        Self {
            street_name: street_name.into(),
            postcode: None,
            origin: None,
            distance_before: Some(before),
            distance_after: Some(after),
        }
    }
}

/// A routing target, e.g. a shopping park or the LTN filter itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Short identifier used in column names (e.g. `templars`).
    pub id: String,
    /// Full name used in chart titles (e.g. "Templars Shopping Park").
    pub name: String,
    /// Description of where trips start (e.g. "Littlemore streets").
    pub origin_area: String,
    /// Latitude of the destination.
    pub latitude: f64,
    /// Longitude of the destination.
    pub longitude: f64,
    /// Postcodes whose distance to this destination is forced to zero,
    /// e.g. the street the filter sits on, which routers place on the
    /// wrong side of it.
    #[serde(default)]
    pub zero_distance_postcodes: Vec<String>,
}

impl Destination {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Column holding the pre-intervention distance to this destination.
    #[must_use]
    pub fn before_column(&self) -> String {
        format!("driving_distance_to_{}_before", self.id)
    }

    /// Column holding the post-intervention distance to this destination.
    #[must_use]
    pub fn after_column(&self) -> String {
        format!("driving_distance_to_{}_after", self.id)
    }

    /// Column holding a single-router distance to this destination.
    #[must_use]
    pub fn meters_column(&self) -> String {
        format!("driving_distance_to_{}_meters", self.id)
    }

    /// Whether `postcode` is pinned to a zero distance for this destination.
    /// Comparison ignores case and whitespace.
    #[must_use]
    pub fn is_zero_distance(&self, postcode: &str) -> bool {
        let wanted = squash_postcode(postcode);
        self.zero_distance_postcodes
            .iter()
            .any(|p| squash_postcode(p) == wanted)
    }
}

fn squash_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Google Directions travel modes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}
