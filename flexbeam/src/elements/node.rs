//! Element end nodes

use serde::{Deserialize, Serialize};

/// Position of an element end and the freedoms it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    /// Zero for planar nodes
    pub z: f64,
    /// Nodal freedoms, 3 planar or 6 spatial
    pub ndf: usize,
}

impl Node {
    pub fn new(x: f64, y: f64, z: f64, ndf: usize) -> Self {
        Self { x, y, z, ndf }
    }

    /// Planar frame node `[ux, uy, rz]`
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 3)
    }

    /// Spatial frame node `[ux, uy, uz, rx, ry, rz]`
    pub fn spatial(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 6)
    }

    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}
