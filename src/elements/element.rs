//! Element - two-node 3D beam element (connectivity only)

use serde::{Deserialize, Serialize};

/// A two-node beam element.
///
/// Holds 1-based node numbers and the id of its material/section record.
/// Geometry and properties are resolved during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Start node (1-based)
    pub node_i: usize,
    /// End node (1-based)
    pub node_j: usize,
    /// Material/section id
    pub material: u32,
}

impl Element {
    pub fn new(node_i: usize, node_j: usize, material: u32) -> Self {
        Self {
            node_i,
            node_j,
            material,
        }
    }

    /// Both end nodes as `[i, j]`
    pub fn nodes(&self) -> [usize; 2] {
        [self.node_i, self.node_j]
    }
}

impl From<(usize, usize, u32)> for Element {
    fn from((node_i, node_j, material): (usize, usize, u32)) -> Self {
        Self::new(node_i, node_j, material)
    }
}
