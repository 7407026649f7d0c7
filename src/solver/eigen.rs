//! Linear buckling (eigenvalue) solver

use crate::error::{FEAError, FEAResult};
use crate::math::{self, BucklingSpectrum, EigenPair, Vec as FEVec};
use crate::results::BucklingMode;
use crate::structure::Structure;

use super::Solver;

/// Default relative size below which a raw eigenvalue is treated as zero
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-12;

/// Buckling analysis around a first-order reference state
///
/// Critical load factors are the reciprocals of the eigenvalues of `(−Kff)⁻¹·Kffg`, sorted
/// ascending by real part and then imaginary part.
pub struct EigenSolver<'a> {
    solver: Solver<'a>,
    zero_tolerance: f64,
    spectrum: BucklingSpectrum,
}

impl<'a> EigenSolver<'a> {
    pub fn new(structure: &'a mut Structure) -> FEAResult<Self> {
        Ok(Self {
            solver: Solver::new(structure)?,
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
            spectrum: BucklingSpectrum::default(),
        })
    }

    /// Set the relative tolerance that maps near-zero eigenvalues to an infinite load factor
    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    pub fn solver(&self) -> &Solver<'a> {
        &self.solver
    }

    pub fn structure(&self) -> &Structure {
        self.solver.structure()
    }

    /// Sorted eigenpairs from the last call to [`EigenSolver::solve`]
    pub fn eigenpairs(&self) -> &[EigenPair] {
        &self.spectrum.pairs
    }

    /// All critical load factors from the last solve, ascending
    pub fn load_factors(&self) -> Vec<f64> {
        self.spectrum.pairs.iter().map(|p| p.load_factor.re).collect()
    }

    /// Solve the buckling problem and return the `mode_shape`-th mode (one-based)
    ///
    /// The real part of the mode's eigenvector is written into the free-DOF displacements.
    pub fn solve(&mut self, mode_shape: usize) -> FEAResult<BucklingMode> {
        let structure = self.solver.structure_mut();
        let available = structure.free_degrees_of_freedom()?.len();
        if available == 0 {
            return Err(FEAError::NoFreeDegreesOfFreedom);
        }
        if mode_shape == 0 || mode_shape > available {
            return Err(FEAError::ModeShapeOutOfRange {
                requested: mode_shape,
                available,
            });
        }

        structure.reset_displacements();
        structure.reset_coordinates();

        self.solver.set_elastic_stiffness_matrices()?;
        self.solver.solve_first_order_elastic()?;
        let kff = self.solver.free_free_stiffness_matrix()?;

        self.solver.structure_mut().reset_coordinates();
        self.set_geometric_stiffness_matrices()?;
        let kffg = self.solver.free_free_stiffness_matrix()?;

        self.spectrum = math::buckling_spectrum(&kff, &kffg, self.zero_tolerance)?;

        let pair = self.spectrum.pairs[mode_shape - 1];
        if pair.load_factor.re.is_infinite() {
            log::warn!("Buckling mode {mode_shape} has no geometric stiffness (infinite load factor)");
        }

        let eigenvector = self.spectrum.mode_shapes[mode_shape - 1].clone();
        let shape = FEVec::from_iterator(eigenvector.len(), eigenvector.iter().map(|v| v.re));
        self.solver.set_displacement_vector(shape)?;

        log::info!(
            "Buckling mode {} of {}: load factor {}",
            mode_shape,
            available,
            pair.load_factor
        );

        Ok(BucklingMode {
            mode: mode_shape,
            load_factor: pair.load_factor,
            eigenvector,
        })
    }

    /// Set each element's stiffness to its geometric stiffness at the current end forces;
    /// elements without geometric nonlinearity get the zero-force matrix
    fn set_geometric_stiffness_matrices(&mut self) -> FEAResult<()> {
        let structure = self.solver.structure();
        let mut matrices = Vec::with_capacity(structure.elements().len());
        for element in structure.elements() {
            let forces = if element.geometric_nonlinearity {
                element.local_end_forces(structure)?
            } else {
                FEVec::zeros(element.local_dof_count())
            };
            matrices.push(element.geometric_stiffness_matrix(structure, &forces)?);
        }
        self.solver.set_stiffness_matrices(matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Direction, Element, Section};
    use approx::assert_relative_eq;

    #[test]
    fn test_mode_zero_is_out_of_range() {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(0.0, 1000.0);
        structure
            .add_element(
                Element::frame(a, b, Section::rectangle(50.0, 50.0)).with_geometric_nonlinearity(true),
            )
            .unwrap();
        structure.fix(a).unwrap();
        structure.set_force(b, Direction::Y, -1.0).unwrap();

        let mut solver = EigenSolver::new(&mut structure).unwrap();
        assert!(matches!(
            solver.solve(0),
            Err(FEAError::ModeShapeOutOfRange { requested: 0, available: 3 })
        ));
        assert!(matches!(
            solver.solve(4),
            Err(FEAError::ModeShapeOutOfRange { requested: 4, available: 3 })
        ));
    }

    #[test]
    fn test_cantilever_column_single_element() {
        // one consistent frame element overestimates π²EI/4L² by under 1%
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(0.0, 1000.0);
        let section = Section::rectangle(50.0, 50.0);
        structure
            .add_element(Element::frame(a, b, section).with_geometric_nonlinearity(true))
            .unwrap();
        structure.fix(a).unwrap();
        structure.set_force(b, Direction::Y, -1.0).unwrap();

        let mut solver = EigenSolver::new(&mut structure).unwrap();
        let mode = solver.solve(1).unwrap();
        let expected = std::f64::consts::PI.powi(2) * 200_000.0 * section.inertia() / (4.0 * 1e6);
        assert_relative_eq!(mode.critical_load_factor(), expected, max_relative = 0.01);
        assert!(mode.critical_load_factor() >= expected);
    }

    #[test]
    fn test_without_geometric_nonlinearity_all_factors_infinite() {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(0.0, 1000.0);
        structure
            .add_element(Element::frame(a, b, Section::rectangle(50.0, 50.0)))
            .unwrap();
        structure.fix(a).unwrap();
        structure.set_force(b, Direction::Y, -1.0).unwrap();

        let mut solver = EigenSolver::new(&mut structure).unwrap();
        let mode = solver.solve(1).unwrap();
        assert!(mode.critical_load_factor().is_infinite());
        assert!(solver.load_factors().iter().all(|f| f.is_infinite()));
    }
}
