//! District boundary extraction from GeoJSON.

use anyhow::{Context, Result};
use geo::{Coord, LineString};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::DistrictError;
use crate::models::{District, DistrictCollection};

/// Default property holding the district name (`STADTTLNAM`, "Stadtteilname")
pub const DEFAULT_NAME_PROPERTY: &str = "STADTTLNAM";

type Position = Vec<f64>;
type RawRing = Vec<Position>;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    geo_type: String,
    #[serde(default)]
    coordinates: Value,
}

impl Geometry {
    /// Normalize to a list of polygons, each a list of rings
    fn into_polygons(self, district: &str) -> Result<Vec<Vec<RawRing>>> {
        match self.geo_type.as_str() {
            "Polygon" => {
                let rings: Vec<RawRing> = serde_json::from_value(self.coordinates)
                    .with_context(|| format!("Invalid Polygon coordinates for '{}'", district))?;
                Ok(vec![rings])
            }
            "MultiPolygon" => serde_json::from_value(self.coordinates)
                .with_context(|| format!("Invalid MultiPolygon coordinates for '{}'", district)),
            _ => Err(DistrictError::UnsupportedGeometry {
                district: district.to_string(),
                kind: self.geo_type,
            }
            .into()),
        }
    }
}

/// Load districts from a GeoJSON file
pub fn load_districts(path: &Path, name_property: &str) -> Result<DistrictCollection> {
    info!("Loading districts from {}", path.display());
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {}", path.display()))?;
    extract_districts(BufReader::new(file), name_property)
        .with_context(|| format!("Failed to load districts from {}", path.display()))
}

/// Extract districts from a GeoJSON FeatureCollection.
///
/// The name is read from the string property `name_property`; features
/// without a name are skipped. Each polygon contributes its exterior ring
/// only, closed if the source left it open. Later features replace earlier
/// ones of the same name.
pub fn extract_districts<R: Read>(reader: R, name_property: &str) -> Result<DistrictCollection> {
    let collection: FeatureCollection =
        serde_json::from_reader(reader).context("Invalid GeoJSON FeatureCollection")?;

    let mut districts = DistrictCollection::new();

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let name = match feature
            .properties
            .as_ref()
            .and_then(|p| p.get(name_property))
        {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                debug!("Skipping feature {} without '{}'", idx, name_property);
                continue;
            }
            Some(other) => {
                warn!(
                    "Skipping feature {}: '{}' is not a string ({})",
                    idx, name_property, other
                );
                continue;
            }
        };

        let polygons = match feature.geometry {
            Some(geometry) => geometry.into_polygons(&name)?,
            None => {
                warn!("Skipping district '{}' without geometry", name);
                continue;
            }
        };

        let mut rings = Vec::with_capacity(polygons.len());
        for mut polygon in polygons {
            if polygon.len() > 1 {
                debug!(
                    "District '{}': ignoring {} interior ring(s)",
                    name,
                    polygon.len() - 1
                );
            }
            if polygon.is_empty() {
                continue;
            }
            let exterior = polygon.swap_remove(0);
            rings.push(to_ring(&name, exterior)?);
        }

        let district = District::new(name, rings)?;
        if let Some(rect) = district.bbox() {
            debug!(
                "District '{}': {} polygon(s), bbox ({}, {}) - ({}, {})",
                district.name(),
                district.rings().len(),
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            );
        }

        if let Some(previous) = districts.insert(district) {
            warn!("District '{}' defined more than once, keeping the last", previous.name());
        }
    }

    info!("Found {} districts", districts.len());
    Ok(districts)
}

fn to_ring(district: &str, positions: RawRing) -> Result<LineString<f64>, DistrictError> {
    let coords = positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(DistrictError::ShortPosition {
                district: district.to_string(),
                len: p.len(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut ring = LineString::new(coords);
    if !ring.is_closed() {
        debug!("District '{}': closing open ring", district);
        ring.close();
    }
    Ok(ring)
}
