//! District definitions used by the PIP engine.

use geo::{BoundingRect, Coord, LineString, Rect};
use hashbrown::HashMap;

use crate::error::DistrictError;

/// A named region made of one or more rings.
///
/// Each ring is an independent polygon; containment in any ring means
/// containment in the district.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    name: String,
    rings: Vec<LineString<f64>>,
}

impl District {
    /// Build a district, rejecting rings the engine cannot test.
    pub fn new(
        name: impl Into<String>,
        rings: Vec<LineString<f64>>,
    ) -> Result<Self, DistrictError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DistrictError::EmptyName);
        }
        if rings.is_empty() {
            return Err(DistrictError::NoPolygons { district: name });
        }

        for (i, ring) in rings.iter().enumerate() {
            if ring.0.len() < 2 {
                return Err(DistrictError::DegenerateRing {
                    district: name,
                    ring: i,
                    len: ring.0.len(),
                });
            }
            if let Some(c) = ring.0.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(DistrictError::NonFiniteCoordinate {
                    district: name,
                    x: c.x,
                    y: c.y,
                });
            }
        }

        Ok(Self { name, rings })
    }

    /// Convenience constructor from raw `[lon, lat]` pairs, one list per ring.
    pub fn from_pairs(
        name: impl Into<String>,
        rings: Vec<Vec<[f64; 2]>>,
    ) -> Result<Self, DistrictError> {
        let rings = rings
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|[x, y]| Coord { x, y })
                    .collect::<LineString<f64>>()
            })
            .collect();
        Self::new(name, rings)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rings(&self) -> &[LineString<f64>] {
        &self.rings
    }

    /// Bounding box over all rings
    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.rings
            .iter()
            .filter_map(|r| r.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

/// Districts in insertion order.
///
/// Order is the tie-break priority for overlapping districts. Inserting a name
/// that already exists replaces its rings but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct DistrictCollection {
    districts: Vec<District>,
    positions: HashMap<String, usize>,
}

impl DistrictCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a district, returning the one it replaced (if any).
    pub fn insert(&mut self, district: District) -> Option<District> {
        match self.positions.get(district.name()) {
            Some(&idx) => Some(std::mem::replace(&mut self.districts[idx], district)),
            None => {
                self.positions
                    .insert(district.name().to_string(), self.districts.len());
                self.districts.push(district);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&District> {
        self.positions.get(name).map(|&idx| &self.districts[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &District> {
        self.districts.iter()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

impl FromIterator<District> for DistrictCollection {
    fn from_iter<I: IntoIterator<Item = District>>(iter: I) -> Self {
        let mut collection = Self::new();
        for district in iter {
            collection.insert(district);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64) -> Vec<[f64; 2]> {
        vec![
            [x0, y0],
            [x0, y0 + 1.0],
            [x0 + 1.0, y0 + 1.0],
            [x0 + 1.0, y0],
            [x0, y0],
        ]
    }

    #[test]
    fn test_rejects_short_ring() {
        let err = District::from_pairs("A", vec![vec![[0.0, 0.0]]]).unwrap_err();
        assert_eq!(
            err,
            DistrictError::DegenerateRing {
                district: "A".to_string(),
                ring: 0,
                len: 1
            }
        );
    }

    #[test]
    fn test_rejects_empty_name_and_no_rings() {
        assert_eq!(
            District::from_pairs("", vec![square(0.0, 0.0)]).unwrap_err(),
            DistrictError::EmptyName
        );
        assert!(matches!(
            District::new("A", vec![]),
            Err(DistrictError::NoPolygons { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = District::from_pairs("A", vec![vec![[0.0, 0.0], [f64::NAN, 1.0]]]).unwrap_err();
        assert!(matches!(err, DistrictError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut collection = DistrictCollection::new();
        collection.insert(District::from_pairs("A", vec![square(0.0, 0.0)]).unwrap());
        collection.insert(District::from_pairs("B", vec![square(5.0, 5.0)]).unwrap());
        let replaced =
            collection.insert(District::from_pairs("A", vec![square(10.0, 10.0)]).unwrap());

        assert!(replaced.is_some());
        assert_eq!(collection.len(), 2);
        let names: Vec<&str> = collection.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(collection.get("A").unwrap().rings()[0].0[0], Coord { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_bbox_spans_all_rings() {
        let district =
            District::from_pairs("A", vec![square(0.0, 0.0), square(10.0, 10.0)]).unwrap();
        let bbox = district.bbox().unwrap();
        assert_eq!(bbox.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bbox.max(), Coord { x: 11.0, y: 11.0 });
    }
}
