//! Incremental geometrically nonlinear solver
//!
//! The load is applied in equal increments without equilibrium iterations. Each increment:
//!
//! 1. sets the tangent stiffness of every geometrically nonlinear element to its elastic
//!    stiffness plus the geometric stiffness at the cumulative end forces of the previous
//!    increments, both evaluated on the current geometry; other elements get their elastic
//!    stiffness on the current geometry
//! 2. solves for the displacement increment
//! 3. adds the increment to the cumulative displacements, element end forces and reactions
//! 4. records a load-displacement point
//! 5. moves the nodes by the displacement increment
//!
//! Node coordinates, loads and prescribed displacements are restored once the increments
//! finish, whether or not they all succeed.

use crate::elements::{DofId, Element};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vec as FEVec};
use crate::results::LoadDisplacementHistory;
use crate::structure::Structure;

use super::Solver;

pub struct NonlinearSolver<'a> {
    solver: Solver<'a>,
    /// Total free-DOF load, applied in increments
    total_force_vector: FEVec,
    cumulative_displacement: FEVec,
    cumulative_end_forces: Vec<FEVec>,
    history: LoadDisplacementHistory,
}

impl<'a> NonlinearSolver<'a> {
    pub fn new(structure: &'a mut Structure) -> FEAResult<Self> {
        let solver = Solver::new(structure)?;
        let total_force_vector = solver.force_vector().clone();
        let free = total_force_vector.len();
        let cumulative_end_forces = zero_end_forces(solver.structure().elements());
        Ok(Self {
            solver,
            total_force_vector,
            cumulative_displacement: FEVec::zeros(free),
            cumulative_end_forces,
            history: LoadDisplacementHistory::default(),
        })
    }

    pub fn structure(&self) -> &Structure {
        self.solver.structure()
    }

    pub fn solver(&self) -> &Solver<'a> {
        &self.solver
    }

    /// Cumulative free-DOF displacements from the last run
    pub fn displacement_vector(&self) -> &FEVec {
        &self.cumulative_displacement
    }

    /// Cumulative local end forces of each element from the last run
    pub fn end_forces(&self) -> &[FEVec] {
        &self.cumulative_end_forces
    }

    pub fn history(&self) -> &LoadDisplacementHistory {
        &self.history
    }

    /// Apply the load in `number_of_steps` equal increments
    ///
    /// The history records the load at `recorded_dof_load` and the accumulated absolute
    /// displacement increments at `recorded_dof`, starting from the unloaded state, so both
    /// series hold `number_of_steps + 1` points.
    pub fn solve_incrementally(
        &mut self,
        number_of_steps: usize,
        recorded_dof_load: DofId,
        recorded_dof: DofId,
    ) -> FEAResult<LoadDisplacementHistory> {
        if number_of_steps == 0 {
            return Err(FEAError::InvalidStepCount);
        }

        let structure = self.solver.structure_mut();
        structure.dof_index(recorded_dof_load)?;
        structure.dof_index(recorded_dof)?;
        structure.reset_coordinates();

        let free = structure.free_degrees_of_freedom()?;
        let restrained = structure.restrained_degrees_of_freedom()?;
        let recorded_position = free.iter().position(|&id| id == recorded_dof);
        let load_increment = structure.dof(recorded_dof_load)?.force / number_of_steps as f64;

        let steps = number_of_steps as f64;
        let mut prescribed = Vec::with_capacity(restrained.len());
        for &id in &restrained {
            let dof = structure.dof_mut(id)?;
            prescribed.push(dof.displacement);
            dof.displacement /= steps;
        }

        let force_increment = &self.total_force_vector / steps;
        let applied = self
            .solver
            .set_force_vector(force_increment)
            .and_then(|_| self.apply_increments(number_of_steps, load_increment, recorded_position));

        // loads, settlements and geometry go back to their totals even when an increment fails
        let structure = self.solver.structure_mut();
        for (&id, value) in restrained.iter().zip(prescribed) {
            structure.dof_mut(id)?.displacement = value;
        }
        structure.reset_coordinates();
        self.solver.set_force_vector(self.total_force_vector.clone())?;
        let cumulative_reactions = applied?;

        self.solver
            .set_displacement_vector(self.cumulative_displacement.clone())?;
        self.solver.set_reactions_vector(cumulative_reactions)?;

        let unbalanced = self.out_of_balance_force()?;
        log::info!(
            "Applied {} increments, out-of-balance force norm {:.6e}",
            number_of_steps,
            unbalanced.norm()
        );

        Ok(self.history.clone())
    }

    /// Run the increments on the scaled loads, returning the cumulative reactions
    fn apply_increments(
        &mut self,
        number_of_steps: usize,
        load_increment: f64,
        recorded_position: Option<usize>,
    ) -> FEAResult<FEVec> {
        let restrained_count = self.solver.structure().restrained_degrees_of_freedom()?.len();
        self.cumulative_displacement = FEVec::zeros(self.total_force_vector.len());
        self.cumulative_end_forces = zero_end_forces(self.solver.structure().elements());
        let mut cumulative_reactions = FEVec::zeros(restrained_count);
        let mut recorded_displacement = 0.0;

        self.history = LoadDisplacementHistory::with_capacity(number_of_steps + 1);
        self.history.record(0.0, 0.0);

        for step in 1..=number_of_steps {
            self.update_tangent_stiffness()?;
            self.solver.solve_first_order_elastic()?;

            let structure = self.solver.structure();
            for (element, forces) in structure
                .elements()
                .iter()
                .zip(self.cumulative_end_forces.iter_mut())
            {
                *forces += element.local_end_forces(structure)?;
            }
            let increment = self.solver.displacement_vector().clone();
            self.cumulative_displacement += &increment;
            cumulative_reactions += self.solver.reactions_vector();

            if let Some(i) = recorded_position {
                recorded_displacement += increment[i].abs();
            }
            let load = (load_increment * step as f64).abs();
            self.history.record(load, recorded_displacement);

            log::debug!(
                "Increment {}/{}: load {:.6e}, displacement {:.6e}",
                step,
                number_of_steps,
                load,
                recorded_displacement
            );

            self.move_nodes()?;
        }

        Ok(cumulative_reactions)
    }

    /// Tangent stiffness of every element on the current geometry
    fn update_tangent_stiffness(&mut self) -> FEAResult<()> {
        let structure = self.solver.structure();
        let mut matrices: Vec<Mat> = Vec::with_capacity(structure.elements().len());
        for (element, forces) in structure.elements().iter().zip(&self.cumulative_end_forces) {
            if element.geometric_nonlinearity {
                matrices.push(
                    element.first_order_elastic_stiffness_matrix(structure)?
                        + element.geometric_stiffness_matrix(structure, forces)?,
                );
            } else {
                matrices.push(element.first_order_elastic_stiffness_matrix(structure)?);
            }
        }
        self.solver.set_stiffness_matrices(matrices)
    }

    /// Shift every connected node by the displacement increment held in its DOFs
    fn move_nodes(&mut self) -> FEAResult<()> {
        let structure = self.solver.structure_mut();
        for id in structure.nodes() {
            let node = structure.node(id)?;
            let dx = structure.dof(node.x_dof())?.displacement;
            let dy = structure.dof(node.y_dof())?.displacement;
            let node = structure.node_mut(id)?;
            node.x += dx;
            node.y += dy;
        }
        Ok(())
    }

    /// Cumulative global end forces of all elements gathered at the free DOFs
    ///
    /// Uses the current node coordinates for the transformation, so call it once the
    /// geometry has been reset.
    pub fn internal_force_vector(&self) -> FEAResult<FEVec> {
        let structure = self.solver.structure();
        let positions = structure.dof_positions()?;
        let free = structure.free_degrees_of_freedom()?.len();
        let mut internal = FEVec::zeros(positions.len());

        for (element, forces) in structure.elements().iter().zip(&self.cumulative_end_forces) {
            let global = element.transformation_matrix(structure)?.transpose() * forces;
            for (value, id) in global.iter().zip(element.stiffness_matrix_dofs(structure)?) {
                internal[positions[&id]] += value;
            }
        }

        Ok(internal.rows(0, free).into_owned())
    }

    /// Applied load minus the internal force vector at the free DOFs
    pub fn out_of_balance_force(&self) -> FEAResult<FEVec> {
        Ok(&self.total_force_vector - self.internal_force_vector()?)
    }
}

fn zero_end_forces(elements: &[Element]) -> Vec<FEVec> {
    elements
        .iter()
        .map(|e| FEVec::zeros(e.local_dof_count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Direction, Section};
    use approx::assert_relative_eq;

    fn tie(steps: usize) -> (Structure, DofId) {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(1000.0, 0.0);
        structure
            .add_element(
                Element::truss(a, b, Section::user_defined(100.0, 1.0)).with_geometric_nonlinearity(true),
            )
            .unwrap();
        structure.restrain(a, Direction::X).unwrap();
        structure.restrain(a, Direction::Y).unwrap();
        structure.restrain(b, Direction::Y).unwrap();
        structure.set_force(b, Direction::X, 1000.0 * steps as f64).unwrap();
        let dof = structure.node(b).unwrap().x_dof();
        (structure, dof)
    }

    #[test]
    fn test_zero_steps_rejected() {
        let (mut structure, dof) = tie(1);
        let mut solver = NonlinearSolver::new(&mut structure).unwrap();
        assert!(matches!(
            solver.solve_incrementally(0, dof, dof),
            Err(FEAError::InvalidStepCount)
        ));
    }

    #[test]
    fn test_axial_tie_history() {
        let (mut structure, dof) = tie(4);
        let mut solver = NonlinearSolver::new(&mut structure).unwrap();
        let history = solver.solve_incrementally(4, dof, dof).unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history.load, vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0]);

        // the axial geometric term grows with the tension at the same rate as the length
        let per_step = 1000.0 * 1000.0 / (200_000.0 * 100.0);
        assert_relative_eq!(history.displacement[4], 4.0 * per_step, max_relative = 1e-6);
        assert_relative_eq!(
            solver.structure().dof(dof).unwrap().displacement,
            4.0 * per_step,
            max_relative = 1e-6
        );
        assert_relative_eq!(solver.structure().dof(dof).unwrap().force, 4000.0);
    }

    #[test]
    fn test_coordinates_restored() {
        let (mut structure, dof) = tie(2);
        let mut solver = NonlinearSolver::new(&mut structure).unwrap();
        solver.solve_incrementally(2, dof, dof).unwrap();
        for node in solver.structure().all_nodes() {
            assert_eq!(node.coordinates(), node.original_coordinates());
        }
    }

    #[test]
    fn test_out_of_balance_vanishes_for_axial_tie() {
        let (mut structure, dof) = tie(3);
        let mut solver = NonlinearSolver::new(&mut structure).unwrap();
        solver.solve_incrementally(3, dof, dof).unwrap();
        let unbalanced = solver.out_of_balance_force().unwrap();
        assert!(unbalanced.norm() < 1e-6);
    }

    #[test]
    fn test_elastic_elements_follow_moved_geometry() {
        let mut structure = Structure::new();
        let a = structure.add_node(0.0, 0.0);
        let b = structure.add_node(0.0, 1000.0);
        structure
            .add_element(Element::frame(a, b, Section::rectangle(50.0, 50.0)))
            .unwrap();
        structure.fix(a).unwrap();
        structure.set_force(b, Direction::X, 10_000.0).unwrap();

        // the first increment is a linear solve under half the load
        let mut first_step = structure.clone();
        first_step.set_force(b, Direction::X, 5_000.0).unwrap();
        let mut linear = Solver::new(&mut first_step).unwrap();
        linear.solve_first_order_elastic().unwrap();
        let tip = first_step.node(b).unwrap().clone();
        let dx = first_step.dof(tip.x_dof()).unwrap().displacement;
        let dy = first_step.dof(tip.y_dof()).unwrap().displacement;
        first_step.node_mut(b).unwrap().x += dx;
        first_step.node_mut(b).unwrap().y += dy;
        let moved = first_step.elements()[0]
            .first_order_elastic_stiffness_matrix(&first_step)
            .unwrap();
        let original = structure.elements()[0]
            .first_order_elastic_stiffness_matrix(&structure)
            .unwrap();

        let sway = structure.node(b).unwrap().x_dof();
        NonlinearSolver::new(&mut structure)
            .unwrap()
            .solve_incrementally(2, sway, sway)
            .unwrap();

        let k = structure.elements()[0].stiffness_matrix();
        assert_relative_eq!(*k, moved, max_relative = 1e-9);
        assert!((k[(0, 0)] - original[(0, 0)]).abs() > 1e-6 * original[(0, 0)]);
    }
}
