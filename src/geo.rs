use std::collections::HashMap;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::capture::Capture;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Turns free-form location text into coordinates.
pub trait GeocodeResolver {
    fn resolve(&self, location: &str) -> Result<GeoPoint>;
}

/// Resolves the `"<city>, <country_code>,"` text of hop rows from the latitude
/// and longitude columns recorded next to them.
#[derive(Clone, Debug, Default)]
pub struct TableGeocoder {
    locations: HashMap<String, GeoPoint>,
}

impl TableGeocoder {
    pub fn from_captures(captures: &[Capture]) -> Self {
        let mut locations = HashMap::new();
        for record in captures.iter().flat_map(|capture| capture.table.iter()) {
            if let Some((lat, lng)) = record.coordinates() {
                locations
                    .entry(record.location_text())
                    .or_insert(GeoPoint::new(lat, lng));
            }
        }
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl GeocodeResolver for TableGeocoder {
    fn resolve(&self, location: &str) -> Result<GeoPoint> {
        self.locations
            .get(location)
            .copied()
            .ok_or_else(|| anyhow!("no coordinates recorded for {location:?}"))
    }
}

/// Initial great-circle bearing from `from` to `to`, degrees in `[-180, 180]`,
/// clockwise from north.
pub fn compute_heading(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    y.atan2(x).to_degrees()
}

/// Maps a signed heading onto `[0, 360)`; no heading means angle 0.
pub fn heading_angle(heading: Option<f64>) -> f64 {
    match heading {
        Some(value) if value > 0.0 => value,
        Some(value) if value < 0.0 => 360.0 + value,
        _ => 0.0,
    }
}
