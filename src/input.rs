//! JSON model definitions
//!
//! A [`StructureDefinition`] names nodes and sections with strings and refers to them from
//! elements, supports, loads and couplings. [`StructureDefinition::build`] turns it into a
//! [`Structure`] together with the [`AnalysisOptions`] to run on it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, AnalysisType, DofSelector};
use crate::elements::{Direction, Element, NodeId, Section};
use crate::error::{FEAError, FEAResult};
use crate::solver::DEFAULT_ZERO_TOLERANCE;
use crate::structure::Structure;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementDefinition {
    Frame {
        start: String,
        end: String,
        section: String,
        #[serde(default)]
        elasticity_modulus: Option<f64>,
        #[serde(default)]
        geometric_nonlinearity: bool,
    },
    Truss {
        start: String,
        end: String,
        section: String,
        #[serde(default)]
        elasticity_modulus: Option<f64>,
        #[serde(default)]
        geometric_nonlinearity: bool,
    },
    RotationalSpring {
        start: String,
        end: String,
        rotational_stiffness: f64,
    },
}

/// Restrained directions of a node, with optional prescribed displacements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportDefinition {
    pub node: String,
    pub directions: Vec<Direction>,
    #[serde(default)]
    pub displacements: HashMap<Direction, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadDefinition {
    pub node: String,
    pub direction: Direction,
    pub value: f64,
}

/// `node` shares `master`'s DOF in `direction`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingDefinition {
    pub node: String,
    pub master: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefinition {
    pub node: String,
    pub direction: Direction,
}

/// Analysis settings with nodes referenced by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDefinition {
    #[serde(rename = "type")]
    pub analysis_type: AnalysisType,
    pub mode_shape: usize,
    pub number_of_steps: usize,
    pub recorded_load: Option<RecordDefinition>,
    pub recorded_displacement: Option<RecordDefinition>,
    pub zero_eigenvalue_tolerance: f64,
}

impl Default for AnalysisDefinition {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        Self {
            analysis_type: options.analysis_type,
            mode_shape: options.mode_shape,
            number_of_steps: options.number_of_steps,
            recorded_load: None,
            recorded_displacement: None,
            zero_eigenvalue_tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }
}

/// A complete model as read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureDefinition {
    pub nodes: Vec<NodeDefinition>,
    pub sections: HashMap<String, Section>,
    pub elements: Vec<ElementDefinition>,
    #[serde(default)]
    pub supports: Vec<SupportDefinition>,
    #[serde(default)]
    pub loads: Vec<LoadDefinition>,
    #[serde(default)]
    pub couplings: Vec<CouplingDefinition>,
    #[serde(default)]
    pub analysis: AnalysisDefinition,
}

/// A built structure, its node names and the analysis to run
pub struct Model {
    pub structure: Structure,
    pub node_names: HashMap<NodeId, String>,
    pub options: AnalysisOptions,
}

impl StructureDefinition {
    pub fn from_json(json: &str) -> FEAResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> FEAResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build the structure; couplings are applied before supports and loads
    pub fn build(&self) -> FEAResult<Model> {
        let mut structure = Structure::new();
        let mut ids: HashMap<&str, NodeId> = HashMap::new();
        for node in &self.nodes {
            if ids.contains_key(node.name.as_str()) {
                return Err(FEAError::InvalidInput(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
            ids.insert(&node.name, structure.add_node(node.x, node.y));
        }

        let node = |name: &str| lookup(&ids, name, "node");
        let section = |name: &str| lookup(&self.sections, name, "section");

        for definition in &self.elements {
            let element = match definition {
                ElementDefinition::Frame {
                    start,
                    end,
                    section: name,
                    elasticity_modulus,
                    geometric_nonlinearity,
                } => {
                    let element = Element::frame(
                        node(start.as_str())?,
                        node(end.as_str())?,
                        section(name.as_str())?,
                    )
                    .with_geometric_nonlinearity(*geometric_nonlinearity);
                    match elasticity_modulus {
                        Some(e) => element.with_elasticity_modulus(*e),
                        None => element,
                    }
                }
                ElementDefinition::Truss {
                    start,
                    end,
                    section: name,
                    elasticity_modulus,
                    geometric_nonlinearity,
                } => {
                    let element = Element::truss(
                        node(start.as_str())?,
                        node(end.as_str())?,
                        section(name.as_str())?,
                    )
                    .with_geometric_nonlinearity(*geometric_nonlinearity);
                    match elasticity_modulus {
                        Some(e) => element.with_elasticity_modulus(*e),
                        None => element,
                    }
                }
                ElementDefinition::RotationalSpring {
                    start,
                    end,
                    rotational_stiffness,
                } => Element::rotational_spring(
                    node(start.as_str())?,
                    node(end.as_str())?,
                    *rotational_stiffness,
                )?,
            };
            structure.add_element(element)?;
        }

        for coupling in &self.couplings {
            structure.couple(
                node(coupling.node.as_str())?,
                node(coupling.master.as_str())?,
                coupling.direction,
            )?;
        }

        for support in &self.supports {
            let id = node(support.node.as_str())?;
            for &direction in &support.directions {
                structure.restrain(id, direction)?;
            }
            for (&direction, &value) in &support.displacements {
                structure.set_displacement(id, direction, value)?;
            }
        }

        for load in &self.loads {
            structure.set_force(node(load.node.as_str())?, load.direction, load.value)?;
        }

        let selector = |record: &Option<RecordDefinition>| -> FEAResult<Option<DofSelector>> {
            match record {
                Some(r) => Ok(Some(DofSelector::new(node(r.node.as_str())?, r.direction))),
                None => Ok(None),
            }
        };
        let analysis = &self.analysis;
        let options = AnalysisOptions {
            analysis_type: analysis.analysis_type,
            mode_shape: analysis.mode_shape,
            number_of_steps: analysis.number_of_steps,
            recorded_load: selector(&analysis.recorded_load)?,
            recorded_displacement: selector(&analysis.recorded_displacement)?,
            zero_eigenvalue_tolerance: analysis.zero_eigenvalue_tolerance,
        };

        let node_names = ids.into_iter().map(|(name, id)| (id, name.to_string())).collect();

        log::info!(
            "Built structure with {} nodes and {} elements",
            self.nodes.len(),
            self.elements.len()
        );

        Ok(Model {
            structure,
            node_names,
            options,
        })
    }
}

fn lookup<K, V>(map: &HashMap<K, V>, name: &str, kind: &str) -> FEAResult<V>
where
    K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
    V: Copy,
{
    map.get(name)
        .copied()
        .ok_or_else(|| FEAError::InvalidInput(format!("unknown {kind} '{name}'")))
}
