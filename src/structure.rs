//! Structure - the container that owns nodes, degrees of freedom and elements
//!
//! Nodes, DOFs and elements live in arenas indexed by [`NodeId`], [`DofId`] and [`ElementId`].
//! Two nodes share a DOF by holding the same [`DofId`], which is how rigid couplings are
//! expressed. The node set and the DOF catalogue are derived from the elements on every call.

use std::collections::HashMap;

use crate::elements::{DegreeOfFreedom, Direction, DofId, Element, ElementId, Node, NodeId};
use crate::error::{FEAError, FEAResult};
use crate::math;

/// A 2D skeletal structure
#[derive(Debug, Clone, Default)]
pub struct Structure {
    dofs: Vec<DegreeOfFreedom>,
    nodes: Vec<Node>,
    elements: Vec<Element>,
}

impl Structure {
    /// Create an empty structure
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Allocate a free, unloaded degree of freedom
    pub fn add_dof(&mut self) -> DofId {
        let id = DofId(self.dofs.len());
        self.dofs.push(DegreeOfFreedom::new(id));
        id
    }

    /// Add a node with three fresh degrees of freedom
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        let dofs = [self.add_dof(), self.add_dof(), self.add_dof()];
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, x, y, dofs));
        id
    }

    /// Add an element; both of its nodes must belong to this structure
    pub fn add_element(&mut self, element: Element) -> FEAResult<ElementId> {
        for node in element.nodes() {
            self.node(node)?;
        }
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        Ok(id)
    }

    /// Restrain a node in one direction
    pub fn restrain(&mut self, node: NodeId, direction: Direction) -> FEAResult<()> {
        let dof = self.node(node)?.dof(direction);
        self.dof_mut(dof)?.restrained = true;
        Ok(())
    }

    /// Restrain a node in every direction
    pub fn fix(&mut self, node: NodeId) -> FEAResult<()> {
        for direction in Direction::ALL {
            self.restrain(node, direction)?;
        }
        Ok(())
    }

    /// Apply a force (or moment, for `Rz`) to a node
    pub fn set_force(&mut self, node: NodeId, direction: Direction, force: f64) -> FEAResult<()> {
        let dof = self.node(node)?.dof(direction);
        self.dof_mut(dof)?.force = force;
        Ok(())
    }

    /// Prescribe the displacement of a node in one direction
    pub fn set_displacement(
        &mut self,
        node: NodeId,
        direction: Direction,
        displacement: f64,
    ) -> FEAResult<()> {
        let dof = self.node(node)?.dof(direction);
        self.dof_mut(dof)?.displacement = displacement;
        Ok(())
    }

    /// Point a node's DOF in `direction` at an existing degree of freedom
    pub fn set_node_dof(&mut self, node: NodeId, direction: Direction, dof: DofId) -> FEAResult<()> {
        self.dof(dof)?;
        self.node_mut(node)?.set_dof(direction, dof);
        Ok(())
    }

    /// Lock `node` to `master` in `direction` so both share the master's DOF
    pub fn couple(&mut self, node: NodeId, master: NodeId, direction: Direction) -> FEAResult<()> {
        let dof = self.node(master)?.dof(direction);
        self.set_node_dof(node, direction, dof)
    }

    // ========================
    // Lookup
    // ========================

    pub fn node(&self, id: NodeId) -> FEAResult<&Node> {
        self.nodes.get(id.0).ok_or(FEAError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> FEAResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(FEAError::NodeNotFound(id))
    }

    pub fn dof(&self, id: DofId) -> FEAResult<&DegreeOfFreedom> {
        self.dofs.get(id.0).ok_or(FEAError::DofNotFound(id))
    }

    pub fn dof_mut(&mut self, id: DofId) -> FEAResult<&mut DegreeOfFreedom> {
        self.dofs.get_mut(id.0).ok_or(FEAError::DofNotFound(id))
    }

    pub fn element(&self, id: ElementId) -> FEAResult<&Element> {
        self.elements.get(id.0).ok_or(FEAError::ElementNotFound(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> FEAResult<&mut Element> {
        self.elements.get_mut(id.0).ok_or(FEAError::ElementNotFound(id))
    }

    /// Elements in insertion order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> {
        (0..self.elements.len()).map(ElementId)
    }

    /// Every node created in this structure, connected or not
    pub fn all_nodes(&self) -> &[Node] {
        &self.nodes
    }

    // ========================
    // Derived sets
    // ========================

    /// Nodes referenced by at least one element, sorted by id
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.elements.iter().flat_map(Element::nodes).collect();
        nodes.sort();
        nodes.dedup();
        nodes
    }

    fn element_dofs(&self) -> FEAResult<Vec<DofId>> {
        let mut dofs = Vec::new();
        for element in &self.elements {
            dofs.extend(element.stiffness_matrix_dofs(self)?);
        }
        dofs.sort();
        dofs.dedup();
        Ok(dofs)
    }

    /// DOFs contributing to any element, free ones first, each block sorted by id
    pub fn degrees_of_freedom(&self) -> FEAResult<Vec<DofId>> {
        let mut keyed = Vec::new();
        for id in self.element_dofs()? {
            keyed.push((self.dof(id)?.restrained, id));
        }
        keyed.sort();
        Ok(keyed.into_iter().map(|(_, id)| id).collect())
    }

    /// Unrestrained DOFs sorted by id
    pub fn free_degrees_of_freedom(&self) -> FEAResult<Vec<DofId>> {
        self.filter_dofs(false)
    }

    /// Restrained DOFs sorted by id
    pub fn restrained_degrees_of_freedom(&self) -> FEAResult<Vec<DofId>> {
        self.filter_dofs(true)
    }

    fn filter_dofs(&self, restrained: bool) -> FEAResult<Vec<DofId>> {
        let mut dofs = Vec::new();
        for id in self.element_dofs()? {
            if self.dof(id)?.restrained == restrained {
                dofs.push(id);
            }
        }
        Ok(dofs)
    }

    /// Row/column of each DOF in the global matrix
    pub(crate) fn dof_positions(&self) -> FEAResult<HashMap<DofId, usize>> {
        Ok(self
            .degrees_of_freedom()?
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect())
    }

    /// Position of a DOF in the global ordering
    pub fn dof_index(&self, id: DofId) -> FEAResult<usize> {
        self.dof(id)?;
        self.degrees_of_freedom()?
            .iter()
            .position(|&d| d == id)
            .ok_or(FEAError::DofNotInStructure(id))
    }

    // ========================
    // State
    // ========================

    /// Move every node back to its original coordinates
    pub fn reset_coordinates(&mut self) {
        for node in &mut self.nodes {
            node.reset_coordinates();
        }
    }

    /// Zero the displacement of every degree of freedom
    pub fn reset_displacements(&mut self) {
        for dof in &mut self.dofs {
            dof.displacement = 0.0;
        }
    }

    /// Sample the displaced centreline of an element in global coordinates
    ///
    /// Returns `segments + 1` points from the start node to the end node, with local
    /// displacements from the shape functions multiplied by `scale`.
    pub fn deformed_shape(
        &self,
        element: ElementId,
        scale: f64,
        segments: usize,
    ) -> FEAResult<Vec<[f64; 2]>> {
        if segments == 0 {
            return Err(FEAError::InvalidInput(
                "deformed shape needs at least one segment".to_string(),
            ));
        }

        let element = self.element(element)?;
        let start = self.node(element.start_node())?;
        let end = self.node(element.end_node())?;
        let length = element.length(self)?;
        let (c, s) = math::direction_cosines(start.coordinates(), end.coordinates());

        let mut points = Vec::with_capacity(segments + 1);
        for k in 0..=segments {
            let x = length * k as f64 / segments as f64;
            let local = element.get_local_displacement(self, x)?;
            let (u, v) = (local[0] * scale, local[1] * scale);
            points.push([start.x + (x + u) * c - v * s, start.y + (x + u) * s + v * c]);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Section;
    use approx::assert_relative_eq;

    fn portal() -> (Structure, [NodeId; 4]) {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(0.0, 3000.0);
        let c = structure.add_node(4000.0, 3000.0);
        let d = structure.add_node(4000.0, 0.0);
        let section = Section::rectangle(100.0, 200.0);
        structure.add_element(Element::frame(a, b, section)).unwrap();
        structure.add_element(Element::frame(b, c, section)).unwrap();
        structure.add_element(Element::frame(c, d, section)).unwrap();
        structure.fix(a).unwrap();
        structure.fix(d).unwrap();
        (structure, [a, b, c, d])
    }

    #[test]
    fn test_add_element_checks_nodes() {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let missing = NodeId(7);
        let result = structure.add_element(Element::truss(a, missing, Section::rectangle(1.0, 1.0)));
        assert!(matches!(result, Err(FEAError::NodeNotFound(id)) if id == missing));
    }

    #[test]
    fn test_free_dofs_precede_restrained() {
        let (structure, _) = portal();
        let all = structure.degrees_of_freedom().unwrap();
        let free = structure.free_degrees_of_freedom().unwrap();
        let restrained = structure.restrained_degrees_of_freedom().unwrap();

        assert_eq!(all.len(), 12);
        assert_eq!(free.len(), 6);
        assert_eq!(restrained.len(), 6);
        assert_eq!(all[..6], free[..]);
        assert_eq!(all[6..], restrained[..]);
        assert!(free.windows(2).all(|w| w[0] < w[1]));
        assert!(restrained.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unconnected_nodes_are_ignored() {
        let (mut structure, _) = portal();
        structure.add_node(10.0, 10.0);
        assert_eq!(structure.nodes().len(), 4);
        assert_eq!(structure.degrees_of_freedom().unwrap().len(), 12);
    }

    #[test]
    fn test_coupled_dof_listed_once() {
        let (mut structure, [_, b, c, _]) = portal();
        structure.couple(c, b, Direction::X).unwrap();

        let shared = structure.node(b).unwrap().x_dof();
        assert_eq!(structure.node(c).unwrap().x_dof(), shared);
        assert_eq!(structure.degrees_of_freedom().unwrap().len(), 11);

        structure.set_force(c, Direction::X, 5.0).unwrap();
        assert_eq!(structure.dof(shared).unwrap().force, 5.0);
    }

    #[test]
    fn test_dof_index_of_unused_dof() {
        let (mut structure, _) = portal();
        let orphan = structure.add_dof();
        assert!(matches!(
            structure.dof_index(orphan),
            Err(FEAError::DofNotInStructure(_))
        ));
    }

    #[test]
    fn test_undeformed_shape_is_straight() {
        let (structure, _) = portal();
        let points = structure.deformed_shape(ElementId(1), 10.0, 4).unwrap();
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[2][0], 2000.0, epsilon = 1e-9);
        assert_relative_eq!(points[2][1], 3000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_deformed_shape_follows_end_displacement() {
        let (mut structure, [_, b, _, _]) = portal();
        structure.set_displacement(b, Direction::X, 2.0).unwrap();

        // column a-b: local y axis points along global -x, so a global x shift of the top
        // is a transverse displacement of the element
        let points = structure.deformed_shape(ElementId(0), 1.0, 2).unwrap();
        assert_relative_eq!(points[0][0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(points[2][0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(points[2][1], 3000.0, epsilon = 1e-9);
    }
}
