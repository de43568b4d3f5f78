//! Structural model data: nodes, elements, sections and nodal conditions

mod element;
mod material;
mod node;
mod support;

pub use element::Element;
pub use material::{LevelSpec, MaterialSection, MaterialTable, TubeDimensions};
pub use node::Node;
pub use support::{
    global_dof, BoundaryConstraint, Dof, LumpedMass, SpringSupport, DOFS_PER_NODE,
};
