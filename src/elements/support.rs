//! Nodal degrees of freedom, boundary constraints, springs and lumped masses

use serde::{Deserialize, Serialize};

use crate::error::{VibError, VibResult};

/// Number of degrees of freedom per node
pub const DOFS_PER_NODE: usize = 6;

/// Local degree of freedom at a node.
///
/// Serialized as its 1-based number (DX = 1 ... RZ = 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Dof {
    /// Translation in X
    DX,
    /// Translation in Y
    DY,
    /// Translation in Z
    DZ,
    /// Rotation about X
    RX,
    /// Rotation about Y
    RY,
    /// Rotation about Z
    RZ,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::DX, Dof::DY, Dof::DZ, Dof::RX, Dof::RY, Dof::RZ];
    pub const TRANSLATIONS: [Dof; 3] = [Dof::DX, Dof::DY, Dof::DZ];

    /// Parse a 1-based local DOF number
    pub fn from_number(number: usize) -> VibResult<Self> {
        match number {
            1..=6 => Ok(Self::ALL[number - 1]),
            _ => Err(VibError::InvalidDof(number)),
        }
    }

    /// 1-based local DOF number
    pub fn number(self) -> usize {
        self.offset() + 1
    }

    /// 0-based offset inside the node's DOF block
    pub fn offset(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Dof {
    type Error = VibError;

    fn try_from(number: usize) -> VibResult<Self> {
        Self::from_number(number)
    }
}

impl From<Dof> for usize {
    fn from(dof: Dof) -> usize {
        dof.number()
    }
}

/// 0-based global DOF index of a (1-based node, local DOF) pair.
///
/// Fails when the node lies outside `1..=node_count`.
pub fn global_dof(node: usize, dof: Dof, node_count: usize, context: &str) -> VibResult<usize> {
    if node == 0 || node > node_count {
        return Err(VibError::NodeOutOfRange {
            node,
            node_count,
            context: context.to_string(),
        });
    }
    Ok(DOFS_PER_NODE * (node - 1) + dof.offset())
}

/// A removed degree of freedom.
///
/// `displacement` is carried for input compatibility only. Modal analysis
/// eliminates the DOF as if the prescribed value were zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConstraint {
    pub node: usize,
    pub dof: Dof,
    #[serde(default)]
    pub displacement: f64,
}

impl BoundaryConstraint {
    pub fn new(node: usize, dof: Dof) -> Self {
        Self {
            node,
            dof,
            displacement: 0.0,
        }
    }

    /// Constraint with a prescribed value (not applied by modal analysis)
    pub fn with_displacement(mut self, value: f64) -> Self {
        self.displacement = value;
        self
    }

    /// All six DOFs of a node removed
    pub fn fixed(node: usize) -> Vec<Self> {
        Dof::ALL.iter().map(|&dof| Self::new(node, dof)).collect()
    }

    /// Translations removed, rotations free
    pub fn pinned(node: usize) -> Vec<Self> {
        Dof::TRANSLATIONS
            .iter()
            .map(|&dof| Self::new(node, dof))
            .collect()
    }
}

/// Grounded linear spring on one nodal DOF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringSupport {
    pub node: usize,
    pub dof: Dof,
    /// Spring stiffness (N/m or Nm/rad)
    pub stiffness: f64,
}

impl SpringSupport {
    pub fn new(node: usize, dof: Dof, stiffness: f64) -> Self {
        Self {
            node,
            dof,
            stiffness,
        }
    }
}

/// Concentrated mass or rotary inertia added to one nodal DOF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpedMass {
    pub node: usize,
    pub dof: Dof,
    /// Added mass (kg) or rotary inertia (kg m²)
    pub value: f64,
}

impl LumpedMass {
    pub fn new(node: usize, dof: Dof, value: f64) -> Self {
        Self { node, dof, value }
    }

    /// The same translational mass on DX, DY and DZ of a node
    pub fn point_mass(node: usize, mass: f64) -> Vec<Self> {
        Dof::TRANSLATIONS
            .iter()
            .map(|&dof| Self::new(node, dof, mass))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dof_numbering() {
        assert_eq!(Dof::from_number(1).unwrap(), Dof::DX);
        assert_eq!(Dof::from_number(6).unwrap(), Dof::RZ);
        assert_eq!(Dof::RY.number(), 5);
        assert!(matches!(Dof::from_number(0), Err(VibError::InvalidDof(0))));
        assert!(matches!(Dof::from_number(7), Err(VibError::InvalidDof(7))));
    }

    #[test]
    fn test_global_dof_index() {
        assert_eq!(global_dof(1, Dof::DX, 3, "test").unwrap(), 0);
        assert_eq!(global_dof(2, Dof::DZ, 3, "test").unwrap(), 8);
        assert_eq!(global_dof(3, Dof::RZ, 3, "test").unwrap(), 17);
        assert!(global_dof(0, Dof::DX, 3, "test").is_err());
        assert!(global_dof(4, Dof::DX, 3, "test").is_err());
    }

    #[test]
    fn test_fixed_and_pinned() {
        assert_eq!(BoundaryConstraint::fixed(2).len(), 6);
        let pinned = BoundaryConstraint::pinned(2);
        assert_eq!(pinned.len(), 3);
        assert!(pinned.iter().all(|c| c.dof.offset() < 3 && c.node == 2));
    }

    #[test]
    fn test_dof_serializes_as_number() {
        let c = BoundaryConstraint::new(4, Dof::RX).with_displacement(0.01);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"node":4,"dof":4,"displacement":0.01}"#);

        let parsed: SpringSupport = serde_json::from_str(r#"{"node":1,"dof":3,"stiffness":1.5e6}"#).unwrap();
        assert_eq!(parsed.dof, Dof::DZ);
        assert!(serde_json::from_str::<SpringSupport>(r#"{"node":1,"dof":9,"stiffness":1.0}"#).is_err());
    }
}
