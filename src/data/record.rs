use crate::{core::geo::LatLng, MapError, Result};
use serde::Serialize;

/// A named location with validated coordinates.
///
/// Fields are private so a record can only come out of [`GeoRecord::new`]
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRecord {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl GeoRecord {
    /// Validates and builds a record. The name is trimmed; coordinates are
    /// rejected, never clamped, when out of range or not finite.
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MapError::InvalidCoordinates(
                "record name must not be empty".to_string(),
            ));
        }
        if !LatLng::new(latitude, longitude).is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "({}, {}) is outside latitude [-90, 90] / longitude [-180, 180]",
                latitude, longitude
            )));
        }

        Ok(Self {
            name: name.to_string(),
            latitude,
            longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Records in source order. Duplicate names are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<GeoRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: GeoRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[GeoRecord] {
        &self.records
    }

    /// Coordinates of every record, in order
    pub fn positions(&self) -> Vec<LatLng> {
        self.records.iter().map(GeoRecord::position).collect()
    }
}

impl FromIterator<GeoRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = GeoRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = GeoRecord;
    type IntoIter = std::vec::IntoIter<GeoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a GeoRecord;
    type IntoIter = std::slice::Iter<'a, GeoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
