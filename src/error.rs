//! Error types for the stablex solver

use thiserror::Error;

use crate::elements::{DofId, ElementId, NodeId};

/// Main error type for structural analysis operations
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Node {0} not found in structure")]
    NodeNotFound(NodeId),

    #[error("Element {0} not found in structure")]
    ElementNotFound(ElementId),

    #[error("Degree of freedom {0} not found in structure")]
    DofNotFound(DofId),

    #[error("Degree of freedom {0} is not part of any element")]
    DofNotInStructure(DofId),

    #[error("Singular stiffness matrix - structure may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Rotational stiffness must be a positive value, got {0}")]
    InvalidRotationalStiffness(f64),

    #[error("Mode shape {requested} out of range (1..={available})")]
    ModeShapeOutOfRange { requested: usize, available: usize },

    #[error("Number of load steps must be at least 1")]
    InvalidStepCount,

    #[error("Structure has no free degrees of freedom")]
    NoFreeDegreesOfFreedom,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Math error: {0}")]
    MathError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for structural analysis operations
pub type FEAResult<T> = Result<T, FEAError>;
