//! Result types for structural analysis

use nalgebra::Complex;
use serde::{Deserialize, Serialize};

use crate::elements::{Direction, ElementId, NodeId};
use crate::error::FEAResult;
use crate::math::CVec;
use crate::structure::Structure;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, RZ]
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            rz: arr[2],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2)).sqrt()
    }
}

/// Reaction forces at a node; unrestrained directions report zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, MZ]
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            mz: arr[2],
        }
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2)).sqrt()
    }
}

/// Coordinates, displacement and reactions of one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub node: NodeId,
    /// Coordinates the node was created with
    pub x: f64,
    pub y: f64,
    pub displacement: NodeDisplacement,
    pub reactions: Reactions,
}

/// End forces of one element, in local and global axes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementForces {
    pub element: ElementId,
    pub local: Vec<f64>,
    pub global: Vec<f64>,
}

/// Load against displacement recorded at each increment of a nonlinear run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadDisplacementHistory {
    pub load: Vec<f64>,
    pub displacement: Vec<f64>,
}

impl LoadDisplacementHistory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            load: Vec::with_capacity(capacity),
            displacement: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn record(&mut self, load: f64, displacement: f64) {
        self.load.push(load);
        self.displacement.push(displacement);
    }

    /// Number of recorded points, including the unloaded origin
    pub fn len(&self) -> usize {
        self.load.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty()
    }
}

/// A buckling mode selected from the sorted eigen-solution
#[derive(Debug, Clone)]
pub struct BucklingMode {
    /// One-based mode number
    pub mode: usize,
    /// Load factor, possibly complex for a non-symmetric problem
    pub load_factor: Complex<f64>,
    /// Mode shape over the free DOFs, in free-DOF order
    pub eigenvector: CVec,
}

impl BucklingMode {
    /// Real part of the load factor
    pub fn critical_load_factor(&self) -> f64 {
        self.load_factor.re
    }

    /// Real part of the mode shape
    pub fn mode_shape(&self) -> Vec<f64> {
        self.eigenvector.iter().map(|v| v.re).collect()
    }
}

/// Serializable summary of a [`BucklingMode`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucklingResult {
    pub mode: usize,
    pub load_factor: f64,
    pub load_factor_imaginary: f64,
    pub mode_shape: Vec<f64>,
}

impl From<&BucklingMode> for BucklingResult {
    fn from(mode: &BucklingMode) -> Self {
        Self {
            mode: mode.mode,
            load_factor: mode.load_factor.re,
            load_factor_imaginary: mode.load_factor.im,
            mode_shape: mode.mode_shape(),
        }
    }
}

/// Displacements and reactions of every connected node, read from the DOF state
pub fn node_results(structure: &Structure) -> FEAResult<Vec<NodeResult>> {
    let mut results = Vec::new();
    for id in structure.nodes() {
        let node = structure.node(id)?;
        let mut displacement = [0.0; 3];
        let mut reactions = [0.0; 3];
        for (i, direction) in Direction::ALL.into_iter().enumerate() {
            let dof = structure.dof(node.dof(direction))?;
            displacement[i] = dof.displacement;
            if dof.restrained {
                reactions[i] = dof.force;
            }
        }
        let [x, y] = node.original_coordinates();
        results.push(NodeResult {
            node: id,
            x,
            y,
            displacement: NodeDisplacement::from_array(displacement),
            reactions: Reactions::from_array(reactions),
        });
    }
    Ok(results)
}

/// End forces of every element from its current stiffness matrix
pub fn element_forces(structure: &Structure) -> FEAResult<Vec<ElementForces>> {
    let mut results = Vec::new();
    for (id, element) in structure.element_ids().zip(structure.elements()) {
        results.push(ElementForces {
            element: id,
            local: element.local_end_forces(structure)?.iter().copied().collect(),
            global: element.global_end_forces(structure)?.iter().copied().collect(),
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitudes() {
        let d = NodeDisplacement::from_array([3.0, 4.0, 0.1]);
        assert_eq!(d.translation_magnitude(), 5.0);
        let r = Reactions::from_array([-6.0, 8.0, 2.0]);
        assert_eq!(r.force_magnitude(), 10.0);
    }

    #[test]
    fn test_history_record() {
        let mut history = LoadDisplacementHistory::with_capacity(2);
        assert!(history.is_empty());
        history.record(0.0, 0.0);
        history.record(1.5, 0.2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.load, vec![0.0, 1.5]);
    }

    #[test]
    fn test_buckling_result_from_mode() {
        let mode = BucklingMode {
            mode: 1,
            load_factor: Complex::new(2.5, 0.0),
            eigenvector: CVec::from_vec(vec![Complex::new(1.0, 0.0), Complex::new(-0.5, 0.0)]),
        };
        let result = BucklingResult::from(&mode);
        assert_eq!(result.load_factor, 2.5);
        assert_eq!(result.mode_shape, vec![1.0, -0.5]);
    }
}
