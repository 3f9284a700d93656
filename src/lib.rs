//! nodedistricts - assigns network node locations to named districts
//!
//! This library provides the point-in-polygon engine, the district and node
//! data models, and the assignment pipeline used by the `assign` binary.

pub mod assignment;
pub mod error;
pub mod models;
pub mod naming;
pub mod pip;

pub use assignment::{AssignOptions, AssignReport, Assigner};
pub use error::{DistrictError, NodesError};
pub use models::{District, DistrictCollection, NodesFile};
pub use pip::{point_in_polygon, resolve_district, DistrictResolver};
