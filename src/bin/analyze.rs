//! Run the analysis described by a JSON model file and print the results as JSON

use anyhow::Context;
use stablex::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let model_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("demos/pinned_column.json");

    let definition = StructureDefinition::from_file(model_path)
        .with_context(|| format!("failed to read model from {model_path}"))?;
    let mut model = definition.build()?;

    let outcome = run_analysis(&mut model.structure, &model.options)
        .with_context(|| format!("{:?} analysis failed", model.options.analysis_type))?;

    if let Some(buckling) = &outcome.buckling {
        log::info!("Critical load factor {}", buckling.load_factor);
    }
    for node in &outcome.nodes {
        if let Some(name) = model.node_names.get(&node.node) {
            log::debug!("{name}: {:?}", node.displacement);
        }
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
