//! vib-frame - Free vibration analysis of 3D frames
//!
//! Two-node Euler-Bernoulli frame elements with six DOFs per node, integrated
//! with Gauss-Legendre quadrature, assembled into global stiffness and
//! consistent mass matrices and solved for natural frequencies and mode
//! shapes:
//! - Element stiffness/mass from Hermite interpolation (`math`)
//! - Global assembly with springs and lumped masses (`assembly`)
//! - Constrained generalized eigenproblem with mode subsets (`modal`)
//! - JSON model input and frequency reports (`model`, `results`)
//!
//! ## Example
//! ```rust
//! use vib_frame::prelude::*;
//!
//! let steel = MaterialSection::new(200e9, 0.01, 7850.0, 1e-5, 1e-5, 2e-5, 77e9, "bar");
//!
//! // 10 m cantilever along x, fixed at node 1
//! let mut model = FrameModel::new(
//!     vec![Node::new(0.0, 0.0, 0.0), Node::new(10.0, 0.0, 0.0)],
//!     vec![Element::new(1, 2, 1)],
//!     MaterialTable::new().with(1, steel),
//! )
//! .with_constraints(BoundaryConstraint::fixed(1));
//!
//! let result = model.analyze(&AnalysisOptions::modal().with_modes(4)).unwrap();
//! assert_eq!(result.num_modes(), 4);
//! println!("{}", result.report());
//! ```

pub mod analysis;
pub mod assembly;
pub mod elements;
pub mod error;
pub mod math;
pub mod mesh;
pub mod modal;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, ModeRange};
    pub use crate::assembly::{GlobalAssembler, MatrixAccumulator};
    pub use crate::elements::{
        BoundaryConstraint, Dof, Element, LevelSpec, LumpedMass, MaterialSection, MaterialTable,
        Node, SpringSupport, TubeDimensions,
    };
    pub use crate::error::{VibError, VibResult};
    pub use crate::modal::{DofPartition, ModalSolver};
    pub use crate::model::{FrameModel, ModelDefinition};
    pub use crate::results::{FrequencyReport, GlobalSystem, ModalResult, ModeDisplacement};
}
