//! Core data models for district assignment.

pub mod district;
pub mod node;

pub use district::{District, DistrictCollection};
pub use node::{NodeLocation, NodeRecord, NodesFile, OutsiderCollection, OutsiderFeature};
