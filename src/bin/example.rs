//! stablex example - cantilever and pinned column

use stablex::elements::DEFAULT_ELASTICITY_MODULUS;
use stablex::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== stablex Example: Cantilever ===\n");

    //     tip  -> P
    //      |
    //      |   L = 3000 mm
    //      |
    //     base (fixed)
    let length = 3000.0;
    let load = 10_000.0;
    let section = Section::rectangle(100.0, 150.0);

    let mut structure = Structure::new();
    let base = structure.add_node(0.0, 0.0);
    let tip = structure.add_node(0.0, length);
    structure.add_element(Element::frame(base, tip, section))?;
    structure.fix(base)?;
    structure.set_force(tip, Direction::X, load)?;

    let mut solver = Solver::new(&mut structure)?;
    solver.solve_first_order_elastic()?;

    let structure = solver.structure();
    let dx = structure.dof(structure.node(tip)?.x_dof())?.displacement;
    let ei = DEFAULT_ELASTICITY_MODULUS * section.inertia();
    println!("Tip displacement:      {:.4} mm", dx);
    println!("PL³/3EI:               {:.4} mm", load * length.powi(3) / (3.0 * ei));

    let moment = structure.dof(structure.node(base)?.rz_dof())?.force;
    println!("Base moment reaction:  {:.1} N·mm\n", moment);

    println!("=== stablex Example: Pinned Column Buckling ===\n");

    let segments = 8;
    let mut structure = Structure::new();
    let nodes: Vec<NodeId> = (0..=segments)
        .map(|i| structure.add_node(0.0, length * i as f64 / segments as f64))
        .collect();
    for pair in nodes.windows(2) {
        let element = Element::frame(pair[0], pair[1], section).with_geometric_nonlinearity(true);
        structure.add_element(element)?;
    }
    structure.restrain(nodes[0], Direction::X)?;
    structure.restrain(nodes[0], Direction::Y)?;
    structure.restrain(nodes[segments], Direction::X)?;
    structure.set_force(nodes[segments], Direction::Y, -1.0)?;

    let mut solver = EigenSolver::new(&mut structure)?;
    let mode = solver.solve(1)?;
    let euler = std::f64::consts::PI.powi(2) * ei / length.powi(2);

    println!("Critical load factor:  {:.1} N", mode.critical_load_factor());
    println!("Euler load π²EI/L²:    {:.1} N", euler);
    println!(
        "Difference:            {:.3} %",
        100.0 * (mode.critical_load_factor() - euler) / euler
    );

    println!("\nFirst five load factors:");
    for (i, factor) in solver.load_factors().iter().take(5).enumerate() {
        println!("  Mode {}: {:.1}", i + 1, factor);
    }

    Ok(())
}
