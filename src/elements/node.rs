//! Node element - represents a point in 2D space

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DofId, NodeId};

/// Nodal directions of a 2D frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Translation along global X
    X,
    /// Translation along global Y
    Y,
    /// Rotation about global Z
    Rz,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Rz];
}

/// A 2D node owning references to three degrees of freedom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    /// Current X coordinate
    pub x: f64,
    /// Current Y coordinate
    pub y: f64,
    x_original: f64,
    y_original: f64,
    x_dof: DofId,
    y_dof: DofId,
    rz_dof: DofId,
}

impl Node {
    pub(crate) fn new(id: NodeId, x: f64, y: f64, dofs: [DofId; 3]) -> Self {
        Self {
            id,
            x,
            y,
            x_original: x,
            y_original: y,
            x_dof: dofs[0],
            y_dof: dofs[1],
            rz_dof: dofs[2],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Current coordinates
    pub fn coordinates(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Coordinates the node was created with
    pub fn original_coordinates(&self) -> [f64; 2] {
        [self.x_original, self.y_original]
    }

    pub fn x_dof(&self) -> DofId {
        self.x_dof
    }

    pub fn y_dof(&self) -> DofId {
        self.y_dof
    }

    pub fn rz_dof(&self) -> DofId {
        self.rz_dof
    }

    /// Degree of freedom in the given direction
    pub fn dof(&self, direction: Direction) -> DofId {
        match direction {
            Direction::X => self.x_dof,
            Direction::Y => self.y_dof,
            Direction::Rz => self.rz_dof,
        }
    }

    pub(crate) fn set_dof(&mut self, direction: Direction, dof: DofId) {
        match direction {
            Direction::X => self.x_dof = dof,
            Direction::Y => self.y_dof = dof,
            Direction::Rz => self.rz_dof = dof,
        }
    }

    /// Move the node back to the coordinates it was created with
    pub fn reset_coordinates(&mut self) {
        self.x = self.x_original;
        self.y = self.y_original;
    }

    /// Distance to another node using current coordinates
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {} at <x={}, y={}>", self.id, self.x, self.y)
    }
}
