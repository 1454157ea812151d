//! Row → [`StreetDistanceRecord`] conversion.

use ltn_distance_reconcile::Dataset;
use ltn_distance_street_models::{Coordinate, Destination, StreetDistanceRecord};

use crate::{
    LATITUDE_COLUMN, LONGITUDE_COLUMN, POSTCODE_COLUMN, STREET_COLUMN, StoreError, Table,
};

const DISTANCE_HINT: &str = "run distance lookup first";

/// Builds a dataset of distances to `destination` from `table`.
///
/// `street` and both distance columns must exist. `postcode`, `latitude` and
/// `longitude` are picked up when present. Empty cells become `None`.
///
/// # Errors
///
/// * [`StoreError::MissingColumn`] if a required column is absent.
/// * [`StoreError::Parse`] if a numeric cell is malformed.
/// * [`StoreError::Dataset`] if street names are blank or repeated.
pub fn street_records(table: &Table, destination: &Destination) -> Result<Dataset, StoreError> {
    let streets = table.require_column(STREET_COLUMN)?;
    let before = distance_column(table, &destination.before_column())?;
    let after = distance_column(table, &destination.after_column())?;

    let postcodes = table.column(POSTCODE_COLUMN.name);
    let origins = origins(table)?;

    let records = streets
        .iter()
        .enumerate()
        .map(|(i, street)| StreetDistanceRecord {
            street_name: (*street).to_string(),
            postcode: postcodes
                .as_ref()
                .map(|p| p[i])
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            origin: origins.as_ref().and_then(|o| o[i]),
            distance_before: before[i],
            distance_after: after[i],
        })
        .collect();

    Ok(Dataset::new(records)?)
}

fn distance_column(table: &Table, name: &str) -> Result<Vec<Option<f64>>, StoreError> {
    if !table.has_column(name) {
        return Err(StoreError::MissingColumn {
            column: name.to_string(),
            hint: DISTANCE_HINT.to_string(),
        });
    }
    table.f64_column(name)
}

fn origins(table: &Table) -> Result<Option<Vec<Option<Coordinate>>>, StoreError> {
    if !table.has_columns(&[LATITUDE_COLUMN.name, LONGITUDE_COLUMN.name]) {
        return Ok(None);
    }
    let latitudes = table.f64_column(LATITUDE_COLUMN.name)?;
    let longitudes = table.f64_column(LONGITUDE_COLUMN.name)?;

    Ok(Some(
        latitudes
            .into_iter()
            .zip(longitudes)
            .map(|pair| match pair {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use ltn_distance_reconcile::ReconcileError;

    use super::*;

    fn templars() -> Destination {
        Destination {
            id: "templars".to_string(),
            name: "Templars Shopping Park".to_string(),
            origin_area: "Littlemore streets".to_string(),
            latitude: 51.732_612,
            longitude: -1.218_179,
            zero_distance_postcodes: Vec::new(),
        }
    }

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn converts_rows_with_origins() {
        let data = table(
            "street,postcode,latitude,longitude,driving_distance_to_templars_before,driving_distance_to_templars_after\n\
             Beauchamp Lane,OX4 3LF,51.7229,-1.2136,1830,3121.4\n\
             Cavell Road,,,,2200,\n",
        );
        let dataset = street_records(&data, &templars()).unwrap();
        assert_eq!(dataset.len(), 2);

        let beauchamp = dataset.get("Beauchamp Lane").unwrap();
        assert_eq!(beauchamp.postcode.as_deref(), Some("OX4 3LF"));
        assert_eq!(beauchamp.origin, Some(Coordinate::new(51.7229, -1.2136)));
        assert_eq!(beauchamp.distance_after, Some(3121.4));

        let cavell = dataset.get("Cavell Road").unwrap();
        assert_eq!(cavell.postcode, None);
        assert_eq!(cavell.origin, None);
        assert_eq!(cavell.distance_before, Some(2200.0));
        assert_eq!(cavell.distance_after, None);
    }

    #[test]
    fn coordinates_are_optional() {
        let data = table(
            "street,driving_distance_to_templars_before,driving_distance_to_templars_after\n\
             Iffley Turn,500,2000\n",
        );
        let dataset = street_records(&data, &templars()).unwrap();
        assert_eq!(dataset.records()[0].origin, None);
    }

    #[test]
    fn street_column_is_required() {
        let data = table(
            "postcode,driving_distance_to_templars_before,driving_distance_to_templars_after\n\
             OX4 3LF,1,2\n",
        );
        assert!(matches!(
            street_records(&data, &templars()),
            Err(StoreError::MissingColumn { column, hint })
                if column == "street" && hint == "required for graph label"
        ));
    }

    #[test]
    fn distance_columns_are_required() {
        let data = table("street,driving_distance_to_templars_before\nA,1\n");
        assert!(matches!(
            street_records(&data, &templars()),
            Err(StoreError::MissingColumn { column, .. })
                if column == "driving_distance_to_templars_after"
        ));
    }

    #[test]
    fn duplicate_streets_are_rejected() {
        let data = table(
            "street,driving_distance_to_templars_before,driving_distance_to_templars_after\n\
             A,1,2\nA,3,4\n",
        );
        assert!(matches!(
            street_records(&data, &templars()),
            Err(StoreError::Dataset(ReconcileError::DuplicateStreet { street })) if street == "A"
        ));
    }
}
