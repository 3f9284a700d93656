//! Point-in-Polygon (PIP) district lookup.
//!
//! Loads district boundaries from GeoJSON and resolves node locations to the
//! first district whose polygons contain them, using a tolerance-aware
//! ray-casting test.

mod boundary;
pub mod geometry;
mod resolver;

pub use boundary::{extract_districts, load_districts, DEFAULT_NAME_PROPERTY};
pub use geometry::{point_on_segment, ray_crosses_segment};
pub use resolver::{district_contains, point_in_polygon, resolve_district, DistrictResolver};
