//! Solvers: first-order linear, buckling eigenvalue and incremental nonlinear
//!
//! Every solver borrows the [`Structure`](crate::structure::Structure) mutably for its
//! lifetime, reassembles from the current element state on each solve and writes its results
//! back into the degrees of freedom.

mod eigen;
mod linear;
mod nonlinear;

pub use eigen::{EigenSolver, DEFAULT_ZERO_TOLERANCE};
pub use linear::{PartitionedStiffness, Solver};
pub use nonlinear::NonlinearSolver;
