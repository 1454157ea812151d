//! Meter/mile conversion for presentation.

/// Miles per meter.
pub const METERS_TO_MILES: f64 = 0.000_621_371;

#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * METERS_TO_MILES
}

#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles / METERS_TO_MILES
}
