//! District resolution for query points.

use geo::Coord;
use tracing::debug;

use super::geometry::ray_crosses_segment;
use crate::models::{District, DistrictCollection};

/// Ray-casting containment test for a single ring.
///
/// Edges are the consecutive pairs `ring[i]`-`ring[i + 1]`; the ring is not
/// closed implicitly, so a closed ring must repeat its first coordinate.
pub fn point_in_polygon(px: f64, py: f64, ring: &[Coord<f64>]) -> bool {
    let crossings = ring
        .windows(2)
        .filter(|edge| ray_crosses_segment(px, py, edge[0].x, edge[0].y, edge[1].x, edge[1].y))
        .count();

    crossings % 2 != 0
}

/// Whether any ring of the district contains the point
pub fn district_contains(district: &District, lon: f64, lat: f64) -> bool {
    district
        .rings()
        .iter()
        .any(|ring| point_in_polygon(lon, lat, &ring.0))
}

/// Name of the first district (in collection order) containing the point,
/// or `default` if none does.
pub fn resolve_district<'a>(
    districts: &'a DistrictCollection,
    lon: f64,
    lat: f64,
    default: &'a str,
) -> &'a str {
    districts
        .iter()
        .find(|d| district_contains(d, lon, lat))
        .map_or(default, District::name)
}

/// District lookup service with a fixed fallback district.
///
/// The collection is immutable once built, so a resolver can be shared
/// freely between readers.
#[derive(Debug, Clone)]
pub struct DistrictResolver {
    districts: DistrictCollection,
    default_district: String,
}

impl DistrictResolver {
    pub fn new(districts: DistrictCollection, default_district: impl Into<String>) -> Self {
        Self {
            districts,
            default_district: default_district.into(),
        }
    }

    /// Resolve a point to a district name
    pub fn lookup(&self, lon: f64, lat: f64) -> &str {
        let name = resolve_district(&self.districts, lon, lat, &self.default_district);
        debug!("District lookup at ({}, {}): {}", lon, lat, name);
        name
    }

    pub fn is_default(&self, name: &str) -> bool {
        name == self.default_district
    }

    pub fn default_district(&self) -> &str {
        &self.default_district
    }

    pub fn districts(&self) -> &DistrictCollection {
        &self.districts
    }
}
