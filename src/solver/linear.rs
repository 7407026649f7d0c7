//! First-order linear-elastic solver

use crate::elements::DofId;
use crate::error::{FEAError, FEAResult};
use crate::math::{self, Mat, Vec as FEVec};
use crate::structure::Structure;

/// Global stiffness split at the free/restrained boundary
pub struct PartitionedStiffness {
    pub free_free: Mat,
    pub free_restrained: Mat,
    pub restrained_restrained: Mat,
}

/// Assembles the global stiffness from the elements' current matrices and solves for the
/// free-DOF displacements and the restrained-DOF reactions
pub struct Solver<'a> {
    structure: &'a mut Structure,
    degrees_of_freedom_count: usize,
    force_vector: FEVec,
    displacement_vector: FEVec,
    reactions_vector: FEVec,
}

impl<'a> Solver<'a> {
    /// Capture the free-DOF forces and set every element to its first-order elastic stiffness
    pub fn new(structure: &'a mut Structure) -> FEAResult<Self> {
        let dofs = structure.degrees_of_freedom()?;
        let free = structure.free_degrees_of_freedom()?;
        let restrained = dofs.len() - free.len();

        let mut force_vector = FEVec::zeros(free.len());
        for (i, &id) in free.iter().enumerate() {
            force_vector[i] = structure.dof(id)?.force;
        }

        let mut solver = Self {
            structure,
            degrees_of_freedom_count: dofs.len(),
            force_vector,
            displacement_vector: FEVec::zeros(free.len()),
            reactions_vector: FEVec::zeros(restrained),
        };
        solver.set_elastic_stiffness_matrices()?;
        Ok(solver)
    }

    pub fn structure(&self) -> &Structure {
        &*self.structure
    }

    pub fn structure_mut(&mut self) -> &mut Structure {
        &mut *self.structure
    }

    pub fn degrees_of_freedom_count(&self) -> usize {
        self.degrees_of_freedom_count
    }

    /// Set every element's stiffness matrix to its first-order elastic form
    pub fn set_elastic_stiffness_matrices(&mut self) -> FEAResult<()> {
        let mut matrices = Vec::with_capacity(self.structure.elements().len());
        for element in self.structure.elements() {
            matrices.push(element.first_order_elastic_stiffness_matrix(self.structure)?);
        }
        self.set_stiffness_matrices(matrices)
    }

    pub(crate) fn set_stiffness_matrices(&mut self, matrices: Vec<Mat>) -> FEAResult<()> {
        let ids: Vec<_> = self.structure.element_ids().collect();
        for (id, matrix) in ids.into_iter().zip(matrices) {
            self.structure.element_mut(id)?.set_stiffness_matrix(matrix)?;
        }
        Ok(())
    }

    /// Forces applied at the free DOFs, in free-DOF order
    pub fn force_vector(&self) -> &FEVec {
        &self.force_vector
    }

    /// Replace the free-DOF force vector and push the values into the DOFs
    pub fn set_force_vector(&mut self, forces: FEVec) -> FEAResult<()> {
        let free = self.free_dofs(forces.len())?;
        for (&id, &value) in free.iter().zip(forces.iter()) {
            self.structure.dof_mut(id)?.force = value;
        }
        self.force_vector = forces;
        Ok(())
    }

    pub fn displacement_vector(&self) -> &FEVec {
        &self.displacement_vector
    }

    /// Replace the free-DOF displacements and push the values into the DOFs
    pub fn set_displacement_vector(&mut self, displacements: FEVec) -> FEAResult<()> {
        let free = self.free_dofs(displacements.len())?;
        for (&id, &value) in free.iter().zip(displacements.iter()) {
            self.structure.dof_mut(id)?.displacement = value;
        }
        self.displacement_vector = displacements;
        Ok(())
    }

    pub fn reactions_vector(&self) -> &FEVec {
        &self.reactions_vector
    }

    /// Replace the reactions and push them into the restrained DOFs' force
    pub fn set_reactions_vector(&mut self, reactions: FEVec) -> FEAResult<()> {
        let restrained = self.structure.restrained_degrees_of_freedom()?;
        if restrained.len() != reactions.len() {
            return Err(FEAError::InvalidInput(format!(
                "expected {} reactions, got {}",
                restrained.len(),
                reactions.len()
            )));
        }
        for (&id, &value) in restrained.iter().zip(reactions.iter()) {
            self.structure.dof_mut(id)?.force = value;
        }
        self.reactions_vector = reactions;
        Ok(())
    }

    fn free_dofs(&self, expected: usize) -> FEAResult<Vec<DofId>> {
        let free = self.structure.free_degrees_of_freedom()?;
        if free.len() != expected {
            return Err(FEAError::InvalidInput(format!(
                "structure has {} free degrees of freedom, vector has {expected} entries",
                free.len()
            )));
        }
        Ok(free)
    }

    /// Scatter-add every element's global stiffness into the N×N matrix
    pub fn global_stiffness_matrix(&self) -> FEAResult<Mat> {
        let positions = self.structure.dof_positions()?;
        let n = positions.len();
        let mut k_global = Mat::zeros(n, n);

        for element in self.structure.elements() {
            let k = element.global_stiffness_matrix(self.structure)?;
            let indices: Vec<usize> = element
                .stiffness_matrix_dofs(self.structure)?
                .iter()
                .map(|id| positions[id])
                .collect();
            math::scatter_add(&mut k_global, &k, &indices);
        }

        log::debug!(
            "Assembled {}x{} global stiffness from {} elements",
            n,
            n,
            self.structure.elements().len()
        );
        Ok(k_global)
    }

    /// Global stiffness partitioned into free-free, free-restrained and restrained-restrained
    pub fn partitioned_stiffness(&self) -> FEAResult<PartitionedStiffness> {
        let k = self.global_stiffness_matrix()?;
        let n = k.nrows();
        let f = self.structure.free_degrees_of_freedom()?.len();
        let s = n - f;

        Ok(PartitionedStiffness {
            free_free: k.view((0, 0), (f, f)).into_owned(),
            free_restrained: k.view((0, f), (f, s)).into_owned(),
            restrained_restrained: k.view((f, f), (s, s)).into_owned(),
        })
    }

    pub fn free_free_stiffness_matrix(&self) -> FEAResult<Mat> {
        Ok(self.partitioned_stiffness()?.free_free)
    }

    pub fn free_restrained_stiffness_matrix(&self) -> FEAResult<Mat> {
        Ok(self.partitioned_stiffness()?.free_restrained)
    }

    pub fn restrained_restrained_stiffness_matrix(&self) -> FEAResult<Mat> {
        Ok(self.partitioned_stiffness()?.restrained_restrained)
    }

    /// Prescribed displacements of the restrained DOFs, in restrained order
    fn restrained_displacements(&self) -> FEAResult<FEVec> {
        let restrained = self.structure.restrained_degrees_of_freedom()?;
        let mut u = FEVec::zeros(restrained.len());
        for (i, &id) in restrained.iter().enumerate() {
            u[i] = self.structure.dof(id)?.displacement;
        }
        Ok(u)
    }

    /// Solve `Kff·u = F − Kfs·us`, then `R = Kfsᵀ·u + Kss·us`, using the elements'
    /// current stiffness matrices
    pub fn solve_first_order_elastic(&mut self) -> FEAResult<()> {
        let k = self.partitioned_stiffness()?;
        let f = k.free_free.nrows();
        if f != self.force_vector.len() {
            return Err(FEAError::InvalidInput(format!(
                "structure has {f} free degrees of freedom but the solver was created with {}",
                self.force_vector.len()
            )));
        }

        let us = self.restrained_displacements()?;
        let u = if f == 0 {
            FEVec::zeros(0)
        } else {
            let rhs = &self.force_vector - &k.free_restrained * &us;
            math::solve_linear_system(&k.free_free, &rhs).ok_or(FEAError::SingularMatrix)?
        };
        let reactions = k.free_restrained.transpose() * &u + &k.restrained_restrained * &us;

        self.set_displacement_vector(u)?;
        self.set_reactions_vector(reactions)?;
        Ok(())
    }
}
