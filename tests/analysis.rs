use std::f64::consts::PI;
use std::path::PathBuf;

use approx::assert_relative_eq;
use stablex::elements::DEFAULT_ELASTICITY_MODULUS;
use stablex::prelude::*;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn test_pinned_column_demo() {
    let mut model = StructureDefinition::from_file(demo("pinned_column.json"))
        .unwrap()
        .build()
        .unwrap();
    let outcome = run_analysis(&mut model.structure, &model.options).unwrap();

    let euler = PI * PI * DEFAULT_ELASTICITY_MODULUS * Section::rectangle(100.0, 150.0).inertia()
        / (3000.0 * 3000.0);
    let buckling = outcome.buckling.expect("buckling result");
    assert_eq!(buckling.mode, 1);
    assert_relative_eq!(buckling.load_factor, euler, max_relative = 0.01);
    assert_eq!(outcome.nodes.len(), 5);
    assert!(outcome.history.is_none());
}

#[test]
fn test_cantilever_nonlinear_demo() {
    let mut model = StructureDefinition::from_file(demo("cantilever_nonlinear.json"))
        .unwrap()
        .build()
        .unwrap();
    let outcome = run_analysis(&mut model.structure, &model.options).unwrap();

    let history = outcome.history.as_ref().expect("history");
    assert_eq!(history.len(), 21);
    assert_relative_eq!(history.load[20], 200_000.0, max_relative = 1e-12);
    assert!(outcome.out_of_balance.is_some());
    assert_eq!(outcome.elements.len(), 2);

    let json = serde_json::to_string(&outcome).unwrap();
    assert!(json.contains("\"history\""));
    assert!(!json.contains("\"buckling\""));
}

#[test]
fn test_first_order_outcome_reports_reactions() {
    let mut structure = Structure::new();
    let base = structure.add_node(0.0, 0.0);
    let tip = structure.add_node(2000.0, 0.0);
    structure
        .add_element(Element::frame(base, tip, Section::rectangle(100.0, 150.0)))
        .unwrap();
    structure.fix(base).unwrap();
    structure.set_force(tip, Direction::Y, -500.0).unwrap();

    let outcome = run_analysis(&mut structure, &AnalysisOptions::first_order()).unwrap();
    let base_result = outcome.nodes.iter().find(|n| n.node == base).unwrap();
    assert_relative_eq!(base_result.reactions.fy, 500.0, max_relative = 1e-9);
    assert_relative_eq!(base_result.reactions.mz, 1_000_000.0, max_relative = 1e-9);

    let tip_result = outcome.nodes.iter().find(|n| n.node == tip).unwrap();
    assert_eq!(tip_result.reactions, Reactions::default());
    assert!(tip_result.displacement.dy < 0.0);

    let forces = &outcome.elements[0];
    assert_relative_eq!(forces.local[4], -500.0, max_relative = 1e-9);
}

#[test]
fn test_buckling_options_validate_mode() {
    let mut model = StructureDefinition::from_file(demo("pinned_column.json"))
        .unwrap()
        .build()
        .unwrap();
    let options = AnalysisOptions::buckling(100);
    assert!(matches!(
        run_analysis(&mut model.structure, &options),
        Err(FEAError::ModeShapeOutOfRange { requested: 100, .. })
    ));
}
