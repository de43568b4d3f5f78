//! Error types for frame vibration analysis

use thiserror::Error;

/// Main error type for assembly and modal analysis
#[derive(Error, Debug)]
pub enum VibError {
    #[error("Node {node} referenced by {context} is outside the model (1..={node_count})")]
    NodeOutOfRange {
        node: usize,
        node_count: usize,
        context: String,
    },

    #[error("Material/section id {0} not found in material table")]
    UnknownMaterial(u32),

    #[error("Local DOF {0} is invalid, expected 1..=6")]
    InvalidDof(usize),

    #[error("Degenerate element {element}: {reason}")]
    DegenerateElement { element: String, reason: String },

    #[error("Quadrature for polynomial degree {0} is not supported (max 9)")]
    UnsupportedQuadratureDegree(usize),

    #[error("Declared {levels} levels but got {braces} brace and {legs} leg dimensions")]
    LevelCountMismatch {
        levels: usize,
        braces: usize,
        legs: usize,
    },

    #[error("Mode range [{start}, {end}) is outside the {available} available eigenvalues")]
    SubsetOutOfRange {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("Mass matrix is not positive definite - check for nodes without elements or zero density")]
    MassNotPositiveDefinite,

    #[error("Eigenvalue {value:e} at index {index} is negative - stiffness matrix is indefinite")]
    NegativeEigenvalue { index: usize, value: f64 },

    #[error("Non-finite value in {0}")]
    NonFiniteValue(String),

    #[error("No free degrees of freedom left after applying constraints")]
    NoFreeDofs,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not analyzed - run analyze() first")]
    NotAnalyzed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for vibration analysis operations
pub type VibResult<T> = Result<T, VibError>;
