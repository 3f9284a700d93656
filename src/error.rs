//! Typed input errors for district definitions and node records.

use thiserror::Error;

/// Malformed region data that cannot be turned into a [`crate::District`].
#[derive(Debug, Error, PartialEq)]
pub enum DistrictError {
    #[error("district name must not be empty")]
    EmptyName,

    #[error("district '{district}' has no polygons")]
    NoPolygons { district: String },

    #[error("ring {ring} of district '{district}' has {len} coordinates, need at least 2")]
    DegenerateRing {
        district: String,
        ring: usize,
        len: usize,
    },

    #[error("district '{district}' contains a non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { district: String, x: f64, y: f64 },

    #[error("district '{district}' has a position with {len} values, need longitude and latitude")]
    ShortPosition { district: String, len: usize },

    #[error("district '{district}' has unsupported geometry type '{kind}'")]
    UnsupportedGeometry { district: String, kind: String },
}

/// Structural problems in a nodes.json document.
#[derive(Debug, Error, PartialEq)]
pub enum NodesError {
    #[error("nodes file has no 'nodes' object")]
    MissingNodes,

    #[error("node '{0}' has no 'nodeinfo' object")]
    MissingNodeInfo(String),

    #[error("node '{0}' has a 'location' that is not an object")]
    InvalidLocation(String),
}
