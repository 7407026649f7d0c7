//! stablex - 2D frame stability analysis in Rust
//!
//! This library assembles and solves the stiffness equations of skeletal plane structures
//! built from:
//! - Frame elements (beam-columns)
//! - Truss elements (pin-ended bars)
//! - Linear rotational springs
//!
//! and supports:
//! - First-order linear static analysis
//! - Linear buckling (eigenvalue) analysis
//! - Incremental geometrically nonlinear analysis
//!
//! ## Example
//! ```rust
//! use stablex::prelude::*;
//!
//! let mut structure = Structure::new();
//! let base = structure.add_node(0.0, 0.0);
//! let tip = structure.add_node(0.0, 3000.0);
//!
//! let section = Section::rectangle(100.0, 150.0);
//! structure
//!     .add_element(Element::frame(base, tip, section).with_geometric_nonlinearity(true))
//!     .unwrap();
//!
//! structure.fix(base).unwrap();
//! structure.set_force(tip, Direction::Y, -1.0).unwrap();
//!
//! let mut solver = EigenSolver::new(&mut structure).unwrap();
//! let mode = solver.solve(1).unwrap();
//! assert!(mode.critical_load_factor() > 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod input;
pub mod math;
pub mod results;
pub mod solver;
pub mod structure;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{run_analysis, AnalysisOptions, AnalysisOutcome, AnalysisType, DofSelector};
    pub use crate::elements::{
        DegreeOfFreedom, Direction, DofId, Element, ElementId, ElementKind, Node, NodeId, Section,
    };
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::input::StructureDefinition;
    pub use crate::results::{
        BucklingMode, BucklingResult, ElementForces, LoadDisplacementHistory, NodeDisplacement,
        Reactions,
    };
    pub use crate::solver::{EigenSolver, NonlinearSolver, Solver};
    pub use crate::structure::Structure;
}
