//! Compile-time registry of routing destinations.
//!
//! Each destination is a TOML file under `destinations/` deserialized into a
//! [`Destination`].

use ltn_distance_street_models::Destination;

const DESTINATION_TOMLS: &[(&str, &str)] = &[
    ("templars", include_str!("../destinations/templars.toml")),
    (
        "littlemore_ltn_filter",
        include_str!("../destinations/littlemore_ltn_filter.toml"),
    ),
];

/// Returns every registered destination, in registry order.
///
/// # Panics
///
/// Panics if any embedded TOML file is malformed.
#[must_use]
pub fn all_destinations() -> Vec<Destination> {
    DESTINATION_TOMLS
        .iter()
        .map(|(file, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse destination '{file}': {e}"))
        })
        .collect()
}

/// Looks up a destination by its `id`.
#[must_use]
pub fn destination(id: &str) -> Option<Destination> {
    all_destinations().into_iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn all_destinations_parse() {
        assert_eq!(all_destinations().len(), DESTINATION_TOMLS.len());
    }

    #[test]
    fn ids_are_unique() {
        let mut seen = BTreeSet::new();
        for d in all_destinations() {
            assert!(seen.insert(d.id.clone()), "Duplicate destination ID: {}", d.id);
        }
    }

    #[test]
    fn templars_has_expected_columns() {
        let templars = destination("templars").unwrap();
        assert_eq!(templars.name, "Templars Shopping Park");
        assert_eq!(templars.before_column(), "driving_distance_to_templars_before");
        assert_eq!(templars.after_column(), "driving_distance_to_templars_after");
        assert!(templars.zero_distance_postcodes.is_empty());
    }

    #[test]
    fn ltn_filter_pins_littlemore_road() {
        let filter = destination("ltn").unwrap();
        assert_eq!(filter.meters_column(), "driving_distance_to_ltn_meters");
        assert!(filter.is_zero_distance("ox4 3st"));
        assert!(!filter.is_zero_distance("OX4 4PU"));
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(destination("westgate").is_none());
    }
}
