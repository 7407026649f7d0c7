//! Element - a stiffness contributor connecting two nodes
//!
//! Elements form a closed set of variants sharing one contract: a first-order elastic
//! stiffness, a geometric stiffness driven by the axial end force, a local-to-global
//! transformation and an ordered list of the degrees of freedom they contribute to. Node
//! geometry and DOF state live in the [`Structure`], so every geometric query takes it as an
//! argument and always sees the current coordinates.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{Direction, DofId, Node, NodeId, Section};
use crate::error::{FEAError, FEAResult};
use crate::math::{self, stability, Mat, Vec as FEVec};
use crate::structure::Structure;

/// Elasticity modulus used when none is given (N/mm²)
pub const DEFAULT_ELASTICITY_MODULUS: f64 = 200_000.0;

/// Elements shorter than this are rejected when a direction is required
const MIN_LENGTH: f64 = 1e-10;

/// Properties shared by line elements with a cross-section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniDimensional {
    pub section: Section,
    pub elasticity_modulus: f64,
}

/// The element variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    /// Beam-column resisting axial force, shear and bending (x, y, rz at each end)
    Frame(UniDimensional),
    /// Pin-ended bar resisting axial force only (x, y at each end)
    Truss(UniDimensional),
    /// Rotational coupling between the rz DOFs of its two nodes
    LinearRotationalSpring { rotational_stiffness: f64 },
}

/// A structural element
#[derive(Debug, Clone)]
pub struct Element {
    start_node: NodeId,
    end_node: NodeId,
    /// Whether the axial force contributes geometric stiffness
    pub geometric_nonlinearity: bool,
    kind: ElementKind,
    stiffness_matrix: Mat,
}

impl Element {
    fn new(start_node: NodeId, end_node: NodeId, kind: ElementKind) -> Self {
        let n = Self::dof_count(&kind);
        Self {
            start_node,
            end_node,
            geometric_nonlinearity: false,
            kind,
            stiffness_matrix: Mat::zeros(n, n),
        }
    }

    /// Create a frame element with the default elasticity modulus
    pub fn frame(start_node: NodeId, end_node: NodeId, section: Section) -> Self {
        Self::new(
            start_node,
            end_node,
            ElementKind::Frame(UniDimensional {
                section,
                elasticity_modulus: DEFAULT_ELASTICITY_MODULUS,
            }),
        )
    }

    /// Create a truss element with the default elasticity modulus
    pub fn truss(start_node: NodeId, end_node: NodeId, section: Section) -> Self {
        Self::new(
            start_node,
            end_node,
            ElementKind::Truss(UniDimensional {
                section,
                elasticity_modulus: DEFAULT_ELASTICITY_MODULUS,
            }),
        )
    }

    /// Create a linear rotational spring; the stiffness must be positive
    pub fn rotational_spring(
        start_node: NodeId,
        end_node: NodeId,
        rotational_stiffness: f64,
    ) -> FEAResult<Self> {
        validate_rotational_stiffness(rotational_stiffness)?;
        Ok(Self::new(
            start_node,
            end_node,
            ElementKind::LinearRotationalSpring {
                rotational_stiffness,
            },
        ))
    }

    /// Enable or disable geometric nonlinearity
    pub fn with_geometric_nonlinearity(mut self, enabled: bool) -> Self {
        self.geometric_nonlinearity = enabled;
        self
    }

    /// Set the elasticity modulus of a frame or truss element
    pub fn with_elasticity_modulus(mut self, elasticity_modulus: f64) -> Self {
        if let ElementKind::Frame(props) | ElementKind::Truss(props) = &mut self.kind {
            props.elasticity_modulus = elasticity_modulus;
        }
        self
    }

    fn dof_count(kind: &ElementKind) -> usize {
        match kind {
            ElementKind::Frame(_) => 6,
            ElementKind::Truss(_) => 4,
            ElementKind::LinearRotationalSpring { .. } => 2,
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Short name of the variant, used in messages
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Frame(_) => "frame",
            ElementKind::Truss(_) => "truss",
            ElementKind::LinearRotationalSpring { .. } => "rotational spring",
        }
    }

    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    pub fn set_start_node(&mut self, node: NodeId) {
        self.start_node = node;
    }

    pub fn set_end_node(&mut self, node: NodeId) {
        self.end_node = node;
    }

    /// The distinct nodes of the element (one node for a self-connected element)
    pub fn nodes(&self) -> Vec<NodeId> {
        if self.start_node == self.end_node {
            vec![self.start_node]
        } else {
            vec![self.start_node, self.end_node]
        }
    }

    /// Number of local degrees of freedom
    pub fn local_dof_count(&self) -> usize {
        Self::dof_count(&self.kind)
    }

    /// Section of a frame or truss element
    pub fn section(&self) -> Option<Section> {
        self.uni_dimensional().map(|props| props.section)
    }

    /// Elasticity modulus of a frame or truss element
    pub fn elasticity_modulus(&self) -> Option<f64> {
        self.uni_dimensional().map(|props| props.elasticity_modulus)
    }

    fn uni_dimensional(&self) -> Option<&UniDimensional> {
        match &self.kind {
            ElementKind::Frame(props) | ElementKind::Truss(props) => Some(props),
            ElementKind::LinearRotationalSpring { .. } => None,
        }
    }

    fn require_uni_dimensional(&self) -> FEAResult<&UniDimensional> {
        self.uni_dimensional().ok_or_else(|| {
            FEAError::InvalidInput(format!(
                "{} elements have no section or length",
                self.type_name()
            ))
        })
    }

    /// Stiffness of a rotational spring
    pub fn rotational_stiffness(&self) -> Option<f64> {
        match self.kind {
            ElementKind::LinearRotationalSpring {
                rotational_stiffness,
            } => Some(rotational_stiffness),
            _ => None,
        }
    }

    /// Change the stiffness of a rotational spring, rejecting non-positive values
    pub fn set_rotational_stiffness(&mut self, value: f64) -> FEAResult<()> {
        match &mut self.kind {
            ElementKind::LinearRotationalSpring {
                rotational_stiffness,
            } => {
                validate_rotational_stiffness(value)?;
                *rotational_stiffness = value;
                Ok(())
            }
            _ => Err(FEAError::InvalidInput(
                "only rotational springs have a rotational stiffness".to_string(),
            )),
        }
    }

    /// The current (tangent) stiffness matrix in local coordinates
    pub fn stiffness_matrix(&self) -> &Mat {
        &self.stiffness_matrix
    }

    /// Replace the current stiffness matrix; it is not recomputed when nodes move
    pub fn set_stiffness_matrix(&mut self, matrix: Mat) -> FEAResult<()> {
        let n = self.local_dof_count();
        if matrix.shape() != (n, n) {
            return Err(FEAError::InvalidInput(format!(
                "{} stiffness matrix must be {n}x{n}, got {}x{}",
                self.type_name(),
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        self.stiffness_matrix = matrix;
        Ok(())
    }

    fn end_nodes<'a>(&self, structure: &'a Structure) -> FEAResult<(&'a Node, &'a Node)> {
        Ok((
            structure.node(self.start_node)?,
            structure.node(self.end_node)?,
        ))
    }

    /// Degrees of freedom in local matrix order, read from the nodes at call time
    pub fn stiffness_matrix_dofs(&self, structure: &Structure) -> FEAResult<Vec<DofId>> {
        let (start, end) = self.end_nodes(structure)?;
        let directions: &[Direction] = match self.kind {
            ElementKind::Frame(_) => &Direction::ALL,
            ElementKind::Truss(_) => &[Direction::X, Direction::Y],
            ElementKind::LinearRotationalSpring { .. } => &[Direction::Rz],
        };

        let mut dofs: Vec<DofId> = directions.iter().map(|&d| start.dof(d)).collect();
        dofs.extend(directions.iter().map(|&d| end.dof(d)));
        Ok(dofs)
    }

    /// Length from the current node coordinates
    pub fn length(&self, structure: &Structure) -> FEAResult<f64> {
        let (start, end) = self.end_nodes(structure)?;
        Ok(start.distance_to(end))
    }

    fn checked_length(&self, structure: &Structure) -> FEAResult<f64> {
        let length = self.length(structure)?;
        if length < MIN_LENGTH {
            return Err(FEAError::InvalidGeometry(format!(
                "{} element between {} and {} has zero length",
                self.type_name(),
                self.start_node,
                self.end_node
            )));
        }
        Ok(length)
    }

    /// Euler buckling load π²EI/L² of a pin-ended member with this element's properties
    pub fn euler_load(&self, structure: &Structure) -> FEAResult<f64> {
        let props = self.require_uni_dimensional()?;
        let length = self.checked_length(structure)?;
        Ok(PI * PI * props.elasticity_modulus * props.section.inertia() / (length * length))
    }

    /// Linear-elastic stiffness matrix in local coordinates
    pub fn first_order_elastic_stiffness_matrix(&self, structure: &Structure) -> FEAResult<Mat> {
        match self.kind {
            ElementKind::Frame(props) => Ok(math::frame_local_stiffness(
                props.elasticity_modulus,
                props.section.area(),
                props.section.inertia(),
                self.checked_length(structure)?,
            )),
            ElementKind::Truss(props) => Ok(math::truss_local_stiffness(
                props.elasticity_modulus,
                props.section.area(),
                self.checked_length(structure)?,
            )),
            ElementKind::LinearRotationalSpring {
                rotational_stiffness,
            } => Ok(math::rotational_spring_stiffness(rotational_stiffness)),
        }
    }

    /// Geometric stiffness matrix for the given local end forces
    ///
    /// The axial force is read from the far-end axial slot: index 3 for frames, index 2 for
    /// trusses. Springs have no geometric stiffness.
    pub fn geometric_stiffness_matrix(
        &self,
        structure: &Structure,
        end_forces: &FEVec,
    ) -> FEAResult<Mat> {
        let n = self.local_dof_count();
        if end_forces.len() != n {
            return Err(FEAError::InvalidInput(format!(
                "{} end force vector must have {n} entries, got {}",
                self.type_name(),
                end_forces.len()
            )));
        }

        match self.kind {
            ElementKind::Frame(_) => Ok(math::frame_geometric_stiffness(
                end_forces[3],
                self.checked_length(structure)?,
            )),
            ElementKind::Truss(_) => Ok(math::truss_geometric_stiffness(
                end_forces[2],
                self.checked_length(structure)?,
            )),
            ElementKind::LinearRotationalSpring { .. } => Ok(Mat::zeros(n, n)),
        }
    }

    /// Exact frame stiffness from stability functions, axial load positive in compression
    pub fn stability_stiffness_matrix(
        &self,
        structure: &Structure,
        axial_load: f64,
    ) -> FEAResult<Mat> {
        let ElementKind::Frame(props) = self.kind else {
            return Err(FEAError::InvalidInput(format!(
                "stability functions are defined for frame elements, not {}",
                self.type_name()
            )));
        };
        Ok(stability::frame_stability_stiffness(
            props.elasticity_modulus,
            props.section.area(),
            props.section.inertia(),
            self.checked_length(structure)?,
            axial_load,
        ))
    }

    /// Elastic stiffness integrated with two-point Gauss quadrature of BᵀB
    pub fn quadrature_stiffness_matrix(&self, structure: &Structure) -> FEAResult<Mat> {
        match self.kind {
            ElementKind::Frame(props) => Ok(math::frame_quadrature_stiffness(
                props.elasticity_modulus,
                props.section.area(),
                props.section.inertia(),
                self.checked_length(structure)?,
            )),
            ElementKind::Truss(props) => Ok(math::truss_quadrature_stiffness(
                props.elasticity_modulus,
                props.section.area(),
                self.checked_length(structure)?,
            )),
            ElementKind::LinearRotationalSpring { .. } => Err(FEAError::InvalidInput(
                "rotational springs have no strain-displacement matrix".to_string(),
            )),
        }
    }

    /// Rotation from global to local axes for the current geometry
    pub fn transformation_matrix(&self, structure: &Structure) -> FEAResult<Mat> {
        match self.kind {
            ElementKind::LinearRotationalSpring { .. } => Ok(Mat::identity(2, 2)),
            ElementKind::Frame(_) | ElementKind::Truss(_) => {
                self.checked_length(structure)?;
                let (start, end) = self.end_nodes(structure)?;
                let (c, s) = math::direction_cosines(start.coordinates(), end.coordinates());
                let with_rotation = matches!(self.kind, ElementKind::Frame(_));
                Ok(math::transformation_matrix(c, s, 2, with_rotation))
            }
        }
    }

    /// Current stiffness matrix rotated to global axes: Tᵀ·K·T
    pub fn global_stiffness_matrix(&self, structure: &Structure) -> FEAResult<Mat> {
        let t = self.transformation_matrix(structure)?;
        Ok(t.transpose() * &self.stiffness_matrix * t)
    }

    /// Displacements of the element's DOFs in global axes
    pub fn global_end_displacements(&self, structure: &Structure) -> FEAResult<FEVec> {
        let dofs = self.stiffness_matrix_dofs(structure)?;
        let mut displacements = FEVec::zeros(dofs.len());
        for (i, id) in dofs.into_iter().enumerate() {
            displacements[i] = structure.dof(id)?.displacement;
        }
        Ok(displacements)
    }

    pub fn local_end_displacements(&self, structure: &Structure) -> FEAResult<FEVec> {
        Ok(self.transformation_matrix(structure)? * self.global_end_displacements(structure)?)
    }

    /// End forces in local axes from the current stiffness matrix
    pub fn local_end_forces(&self, structure: &Structure) -> FEAResult<FEVec> {
        Ok(&self.stiffness_matrix * self.local_end_displacements(structure)?)
    }

    pub fn global_end_forces(&self, structure: &Structure) -> FEAResult<FEVec> {
        Ok(self.transformation_matrix(structure)?.transpose() * self.local_end_forces(structure)?)
    }

    /// Interpolation matrix at local coordinate `x` measured from the start node
    pub fn shape_function(&self, structure: &Structure, x: f64) -> FEAResult<Mat> {
        match self.kind {
            ElementKind::Frame(_) => Ok(math::frame_shape_function(x, self.checked_length(structure)?)),
            ElementKind::Truss(_) => Ok(math::truss_shape_function(x, self.checked_length(structure)?)),
            ElementKind::LinearRotationalSpring { .. } => Err(FEAError::InvalidInput(
                "rotational spring elements have no shape function".to_string(),
            )),
        }
    }

    /// Local (axial, transverse) displacement at local coordinate `x`
    pub fn get_local_displacement(&self, structure: &Structure, x: f64) -> FEAResult<FEVec> {
        Ok(self.shape_function(structure, x)? * self.local_end_displacements(structure)?)
    }
}

fn validate_rotational_stiffness(value: f64) -> FEAResult<()> {
    if value <= 0.0 || value.is_nan() {
        return Err(FEAError::InvalidRotationalStiffness(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_node_structure(x2: f64, y2: f64) -> (Structure, NodeId, NodeId) {
        let mut structure = Structure::new();
        let n1 = structure.add_node(1.0, 1.0);
        let n2 = structure.add_node(x2, y2);
        (structure, n1, n2)
    }

    #[test]
    fn test_length_uses_current_coordinates() {
        let (mut structure, n1, n2) = two_node_structure(2.0, 2.0);
        let element = Element::frame(n1, n2, Section::rectangle(100.0, 200.0));
        assert_relative_eq!(element.length(&structure).unwrap(), 2.0_f64.sqrt());

        structure.node_mut(n2).unwrap().x = 4.0;
        assert_relative_eq!(element.length(&structure).unwrap(), 10.0_f64.sqrt());
    }

    #[test]
    fn test_spring_rejects_non_positive_stiffness() {
        let (_, n1, n2) = two_node_structure(1.0, 1.0);
        assert!(matches!(
            Element::rotational_spring(n1, n2, 0.0),
            Err(FEAError::InvalidRotationalStiffness(_))
        ));

        let mut spring = Element::rotational_spring(n1, n2, 1e6).unwrap();
        assert!(spring.set_rotational_stiffness(-5.0).is_err());
        assert_eq!(spring.rotational_stiffness(), Some(1e6));
        spring.set_rotational_stiffness(2e6).unwrap();
        assert_eq!(spring.rotational_stiffness(), Some(2e6));
    }

    #[test]
    fn test_self_loop_has_one_node() {
        let (_, n1, _) = two_node_structure(1.0, 1.0);
        let spring = Element::rotational_spring(n1, n1, 10.0).unwrap();
        assert_eq!(spring.nodes(), vec![n1]);
    }

    #[test]
    fn test_dof_order_matches_local_matrix() {
        let (structure, n1, n2) = two_node_structure(4.0, 5.0);
        let a = structure.node(n1).unwrap().clone();
        let b = structure.node(n2).unwrap().clone();

        let frame = Element::frame(n1, n2, Section::rectangle(10.0, 10.0));
        assert_eq!(
            frame.stiffness_matrix_dofs(&structure).unwrap(),
            vec![a.x_dof(), a.y_dof(), a.rz_dof(), b.x_dof(), b.y_dof(), b.rz_dof()]
        );

        let truss = Element::truss(n1, n2, Section::rectangle(10.0, 10.0));
        assert_eq!(
            truss.stiffness_matrix_dofs(&structure).unwrap(),
            vec![a.x_dof(), a.y_dof(), b.x_dof(), b.y_dof()]
        );
    }

    #[test]
    fn test_truss_global_stiffness_inclined() {
        let (structure, n1, n2) = two_node_structure(4.0, 5.0);
        let mut truss = Element::truss(n1, n2, Section::user_defined(100.0, 1.0));
        let k = truss.first_order_elastic_stiffness_matrix(&structure).unwrap();
        truss.set_stiffness_matrix(k).unwrap();

        // 3-4-5 triangle: c = 0.6, s = 0.8, EA/L = 200000 * 100 / 5
        let k_global = truss.global_stiffness_matrix(&structure).unwrap();
        let ea_l = 200_000.0 * 100.0 / 5.0;
        assert_relative_eq!(k_global[(0, 0)], ea_l * 0.36, max_relative = 1e-12);
        assert_relative_eq!(k_global[(0, 1)], ea_l * 0.48, max_relative = 1e-12);
        assert_relative_eq!(k_global[(1, 1)], ea_l * 0.64, max_relative = 1e-12);
        assert_relative_eq!(k_global[(0, 2)], -ea_l * 0.36, max_relative = 1e-12);
    }

    #[test]
    fn test_spring_geometric_stiffness_is_zero() {
        let (structure, n1, n2) = two_node_structure(1.0, 1.0);
        let spring = Element::rotational_spring(n1, n2, 5.0).unwrap();
        let kg = spring
            .geometric_stiffness_matrix(&structure, &FEVec::from_vec(vec![3.0, -3.0]))
            .unwrap();
        assert_eq!(kg, Mat::zeros(2, 2));
        assert_eq!(spring.transformation_matrix(&structure).unwrap(), Mat::identity(2, 2));
    }

    #[test]
    fn test_truss_quadrature_stiffness_matches_elastic() {
        let (structure, n1, n2) = two_node_structure(4.0, 5.0);
        let truss = Element::truss(n1, n2, Section::user_defined(100.0, 1.0));
        let elastic = truss.first_order_elastic_stiffness_matrix(&structure).unwrap();
        let quadrature = truss.quadrature_stiffness_matrix(&structure).unwrap();
        assert_relative_eq!(quadrature, elastic, max_relative = 1e-12);

        let spring = Element::rotational_spring(n1, n2, 5.0).unwrap();
        assert!(matches!(
            spring.quadrature_stiffness_matrix(&structure),
            Err(FEAError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_stiffness_matrix_shape_is_checked() {
        let (_, n1, n2) = two_node_structure(1.0, 1.0);
        let mut frame = Element::frame(n1, n2, Section::rectangle(1.0, 1.0));
        assert!(frame.set_stiffness_matrix(Mat::zeros(4, 4)).is_err());
        assert!(frame.set_stiffness_matrix(Mat::zeros(6, 6)).is_ok());
    }

    #[test]
    fn test_zero_length_element_is_rejected() {
        let (structure, n1, _) = two_node_structure(1.0, 1.0);
        let frame = Element::frame(n1, n1, Section::rectangle(1.0, 1.0));
        assert!(matches!(
            frame.first_order_elastic_stiffness_matrix(&structure),
            Err(FEAError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_euler_load() {
        let (structure, n1, n2) = two_node_structure(1.0, 3001.0);
        let section = Section::rectangle(100.0, 100.0);
        let frame = Element::frame(n1, n2, section);
        let expected = PI * PI * 200_000.0 * section.inertia() / (3000.0 * 3000.0);
        assert_relative_eq!(frame.euler_load(&structure).unwrap(), expected, max_relative = 1e-12);
    }
}
