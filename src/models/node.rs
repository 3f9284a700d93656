//! Node records from a Freifunk-style nodes.json and the outsider collection.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

use crate::error::NodesError;

/// Geographic location of a node (lon/lat)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub lon: f64,
    pub lat: f64,
}

/// A parsed nodes.json document.
///
/// Only `nodes.<id>.nodeinfo.location` is interpreted; every other field is
/// carried through untouched when the document is written back.
#[derive(Debug, Clone)]
pub struct NodesFile {
    root: Map<String, Value>,
}

impl NodesFile {
    pub fn from_value(value: Value) -> Result<Self, NodesError> {
        let Value::Object(root) = value else {
            return Err(NodesError::MissingNodes);
        };
        if !root.get("nodes").map_or(false, Value::is_object) {
            return Err(NodesError::MissingNodes);
        }
        Ok(Self { root })
    }

    /// Load from a JSON file, transparently gunzipping `.gz` paths.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading nodes from {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open nodes file: {}", path.display()))?;
        let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let value: Value = serde_json::from_reader(BufReader::new(reader))
            .with_context(|| format!("Failed to parse nodes file: {}", path.display()))?;
        let nodes = Self::from_value(value)
            .with_context(|| format!("Invalid nodes file: {}", path.display()))?;

        info!("Loaded {} nodes", nodes.len());
        Ok(nodes)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json(path, &self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = NodeRecord<'_>> {
        self.root
            .get_mut("nodes")
            .and_then(Value::as_object_mut)
            .into_iter()
            .flat_map(|nodes| nodes.iter_mut())
            .map(|(id, value)| NodeRecord {
                id: id.as_str(),
                value,
            })
    }

    pub fn get(&self, node_id: &str) -> Option<&Value> {
        self.nodes()?.get(node_id)
    }

    fn nodes(&self) -> Option<&Map<String, Value>> {
        self.root.get("nodes").and_then(Value::as_object)
    }
}

/// Mutable view of a single node entry
pub struct NodeRecord<'a> {
    id: &'a str,
    value: &'a mut Value,
}

impl<'a> NodeRecord<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Read the node's location.
    ///
    /// Creates an empty `location` object when absent. Returns `None` when
    /// latitude or longitude is missing or not a number.
    pub fn location(&mut self) -> Result<Option<NodeLocation>, NodesError> {
        let location = self.location_mut()?;
        let lat = location.get("latitude").and_then(Value::as_f64);
        let lon = location.get("longitude").and_then(Value::as_f64);
        Ok(match (lon, lat) {
            (Some(lon), Some(lat)) => Some(NodeLocation { lon, lat }),
            _ => None,
        })
    }

    pub fn set_district(&mut self, district: &str) -> Result<(), NodesError> {
        self.location_mut()?
            .insert("district".to_string(), Value::String(district.to_string()));
        Ok(())
    }

    fn location_mut(&mut self) -> Result<&mut Map<String, Value>, NodesError> {
        let id = self.id;
        let nodeinfo = self
            .value
            .get_mut("nodeinfo")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| NodesError::MissingNodeInfo(id.to_string()))?;

        nodeinfo
            .entry("location")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| NodesError::InvalidLocation(id.to_string()))
    }
}

/// GeoJSON FeatureCollection of nodes that matched no district
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsiderCollection {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub features: Vec<OutsiderFeature>,
}

impl Default for OutsiderCollection {
    fn default() -> Self {
        Self {
            geo_type: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }
}

impl OutsiderCollection {
    pub fn push(&mut self, node_id: &str, location: NodeLocation) {
        self.features.push(OutsiderFeature::new(node_id, location));
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsiderFeature {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub properties: OutsiderProperties,
    pub geometry: PointGeometry,
}

impl OutsiderFeature {
    pub fn new(node_id: &str, location: NodeLocation) -> Self {
        Self {
            geo_type: "Feature".to_string(),
            properties: OutsiderProperties {
                name: node_id.to_string(),
            },
            geometry: PointGeometry {
                geo_type: "Point".to_string(),
                coordinates: [location.lon, location.lat],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsiderProperties {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub coordinates: [f64; 2], // [lon, lat]
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NodesFile {
        NodesFile::from_value(json!({
            "version": 1,
            "nodes": {
                "aa": {
                    "nodeinfo": {
                        "hostname": "router-a",
                        "location": { "latitude": 52.4, "longitude": 9.7 }
                    }
                },
                "bb": { "nodeinfo": { "hostname": "router-b" } },
                "cc": { "nodeinfo": { "location": { "latitude": "n/a" } } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_rejects_missing_nodes() {
        assert_eq!(
            NodesFile::from_value(json!({ "meta": {} })).unwrap_err(),
            NodesError::MissingNodes
        );
        assert_eq!(
            NodesFile::from_value(json!([])).unwrap_err(),
            NodesError::MissingNodes
        );
    }

    #[test]
    fn test_location_parsing() {
        let mut nodes = sample();
        let mut found = Vec::new();
        for mut record in nodes.iter_mut() {
            found.push((record.id().to_string(), record.location().unwrap()));
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(found[0].1, Some(NodeLocation { lon: 9.7, lat: 52.4 }));
        assert_eq!(found[1].1, None);
        assert_eq!(found[2].1, None);

        // Missing location object was created
        assert_eq!(nodes.get("bb").unwrap()["nodeinfo"]["location"], json!({}));
    }

    #[test]
    fn test_set_district_preserves_fields() {
        let mut nodes = sample();
        for mut record in nodes.iter_mut() {
            record.set_district("mitte").unwrap();
        }
        let a = nodes.get("aa").unwrap();
        assert_eq!(a["nodeinfo"]["hostname"], "router-a");
        assert_eq!(a["nodeinfo"]["location"]["district"], "mitte");
        assert_eq!(a["nodeinfo"]["location"]["latitude"], 52.4);
    }

    #[test]
    fn test_missing_nodeinfo_is_error() {
        let mut nodes = NodesFile::from_value(json!({ "nodes": { "x": {} } })).unwrap();
        let mut record = nodes.iter_mut().next().unwrap();
        assert_eq!(
            record.location().unwrap_err(),
            NodesError::MissingNodeInfo("x".to_string())
        );
    }

    #[test]
    fn test_outsider_feature_shape() {
        let mut outsiders = OutsiderCollection::default();
        outsiders.push("aa", NodeLocation { lon: 1.5, lat: 2.5 });
        let value = serde_json::to_value(&outsiders).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": { "name": "aa" },
                    "geometry": { "type": "Point", "coordinates": [1.5, 2.5] }
                }]
            })
        );
    }

    #[test]
    fn test_load_gzip_roundtrip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(br#"{"nodes":{"aa":{"nodeinfo":{}}}}"#)
            .unwrap();
        encoder.finish().unwrap();

        let nodes = NodesFile::load(&path).unwrap();
        assert_eq!(nodes.len(), 1);
    }
}
