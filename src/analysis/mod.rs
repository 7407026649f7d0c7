//! Analysis types and options

use serde::{Deserialize, Serialize};

use crate::elements::{Direction, DofId, NodeId};
use crate::error::{FEAError, FEAResult};
use crate::results::{
    self, BucklingResult, ElementForces, LoadDisplacementHistory, NodeResult,
};
use crate::solver::{EigenSolver, NonlinearSolver, Solver, DEFAULT_ZERO_TOLERANCE};
use crate::structure::Structure;

/// Type of structural analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// First-order linear static analysis
    #[default]
    FirstOrderElastic,
    /// Linear buckling (eigenvalue) analysis
    Buckling,
    /// Incremental geometrically nonlinear analysis
    IncrementalNonlinear,
}

/// A node and direction identifying one degree of freedom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofSelector {
    pub node: NodeId,
    pub direction: Direction,
}

impl DofSelector {
    pub fn new(node: NodeId, direction: Direction) -> Self {
        Self { node, direction }
    }

    /// The DOF currently held by the node in this direction
    pub fn resolve(&self, structure: &Structure) -> FEAResult<DofId> {
        Ok(structure.node(self.node)?.dof(self.direction))
    }
}

/// Options for structural analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Type of analysis
    pub analysis_type: AnalysisType,
    /// One-based buckling mode to return
    pub mode_shape: usize,
    /// Number of equal load increments for nonlinear analysis
    pub number_of_steps: usize,
    /// DOF whose load is recorded in the nonlinear history
    pub recorded_load: Option<DofSelector>,
    /// DOF whose displacement is recorded in the nonlinear history
    pub recorded_displacement: Option<DofSelector>,
    /// Raw eigenvalues below this fraction of the spectral radius give infinite load factors
    pub zero_eigenvalue_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::FirstOrderElastic,
            mode_shape: 1,
            number_of_steps: 10,
            recorded_load: None,
            recorded_displacement: None,
            zero_eigenvalue_tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }
}

impl AnalysisOptions {
    /// Create options for first-order elastic analysis
    pub fn first_order() -> Self {
        Self::default()
    }

    /// Create options for buckling analysis returning the given mode
    pub fn buckling(mode_shape: usize) -> Self {
        Self {
            analysis_type: AnalysisType::Buckling,
            mode_shape,
            ..Self::default()
        }
    }

    /// Create options for incremental nonlinear analysis recording `load` against `displacement`
    pub fn incremental(number_of_steps: usize, load: DofSelector, displacement: DofSelector) -> Self {
        Self {
            analysis_type: AnalysisType::IncrementalNonlinear,
            number_of_steps,
            recorded_load: Some(load),
            recorded_displacement: Some(displacement),
            ..Self::default()
        }
    }

    /// Set the number of load increments
    pub fn with_steps(mut self, number_of_steps: usize) -> Self {
        self.number_of_steps = number_of_steps;
        self
    }

    /// Set the zero-eigenvalue tolerance
    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_eigenvalue_tolerance = tolerance;
        self
    }
}

/// Everything an analysis produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis_type: AnalysisType,
    pub nodes: Vec<NodeResult>,
    pub elements: Vec<ElementForces>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buckling: Option<BucklingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<LoadDisplacementHistory>,
    /// Norm of the applied load minus the internal forces after a nonlinear run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_balance: Option<f64>,
}

/// Run the analysis selected by `options` and collect its results
///
/// For buckling the node displacements hold the mode shape and no element forces are
/// reported.
pub fn run_analysis(structure: &mut Structure, options: &AnalysisOptions) -> FEAResult<AnalysisOutcome> {
    log::info!(
        "Running {:?} analysis on {} elements",
        options.analysis_type,
        structure.elements().len()
    );

    let mut outcome = AnalysisOutcome {
        analysis_type: options.analysis_type,
        nodes: Vec::new(),
        elements: Vec::new(),
        buckling: None,
        history: None,
        out_of_balance: None,
    };

    match options.analysis_type {
        AnalysisType::FirstOrderElastic => {
            let mut solver = Solver::new(structure)?;
            solver.solve_first_order_elastic()?;
            outcome.elements = results::element_forces(solver.structure())?;
        }
        AnalysisType::Buckling => {
            let mut solver =
                EigenSolver::new(structure)?.with_zero_tolerance(options.zero_eigenvalue_tolerance);
            let mode = solver.solve(options.mode_shape)?;
            outcome.buckling = Some(BucklingResult::from(&mode));
        }
        AnalysisType::IncrementalNonlinear => {
            let missing = || {
                FEAError::InvalidInput(
                    "incremental analysis needs a recorded load and displacement".to_string(),
                )
            };
            let load = options.recorded_load.ok_or_else(missing)?.resolve(structure)?;
            let displacement = options
                .recorded_displacement
                .ok_or_else(missing)?
                .resolve(structure)?;

            let mut solver = NonlinearSolver::new(structure)?;
            let history = solver.solve_incrementally(options.number_of_steps, load, displacement)?;
            outcome.out_of_balance = Some(solver.out_of_balance_force()?.norm());
            outcome.history = Some(history);
            let structure = solver.structure();
            for (id, local) in structure.element_ids().zip(solver.end_forces()) {
                let element = structure.element(id)?;
                let global = element.transformation_matrix(structure)?.transpose() * local;
                outcome.elements.push(ElementForces {
                    element: id,
                    local: local.iter().copied().collect(),
                    global: global.iter().copied().collect(),
                });
            }
        }
    }

    outcome.nodes = results::node_results(structure)?;
    Ok(outcome)
}
