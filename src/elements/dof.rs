//! Degree of freedom - one scalar unknown at a node

use serde::{Deserialize, Serialize};

use super::DofId;

/// A single translational or rotational degree of freedom
///
/// Nodes refer to degrees of freedom by [`DofId`], so two nodes holding the same id share
/// the state below and are locked together in that direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeOfFreedom {
    id: DofId,
    /// Boundary condition in this direction
    pub restrained: bool,
    /// Applied force, or the reaction once a restrained DOF has been solved
    pub force: f64,
    /// Computed displacement, or the prescribed value for a restrained DOF
    pub displacement: f64,
}

impl DegreeOfFreedom {
    pub(crate) fn new(id: DofId) -> Self {
        Self {
            id,
            restrained: false,
            force: 0.0,
            displacement: 0.0,
        }
    }

    pub fn id(&self) -> DofId {
        self.id
    }
}
