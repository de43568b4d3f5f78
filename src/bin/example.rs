//! vib-frame example - cantilever and braced tower

use anyhow::Context;
use vib_frame::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Cantilever: 10 m steel bar, fixed at the base ===\n");
    let bar = MaterialSection::new(200e9, 0.01, 7850.0, 1e-5, 1e-5, 2e-5, 77e9, "steel bar");
    let mut cantilever = FrameModel::new(
        vec![Node::new(0.0, 0.0, 0.0), Node::new(10.0, 0.0, 0.0)],
        vec![Element::new(1, 2, 1)],
        MaterialTable::new().with(1, bar.clone()),
    )
    .with_constraints(BoundaryConstraint::fixed(1))
    .refined(10)
    .context("refining cantilever")?;

    let result = cantilever
        .analyze(&AnalysisOptions::modal().with_modes(6))
        .context("cantilever modal analysis")?;
    print!("{}", result.report());

    let exact = (1.875104_f64 / 10.0).powi(2) * (bar.e * bar.iz / (bar.rho * bar.a)).sqrt();
    println!("\nClosed-form first bending frequency: {:.3} rad/s\n", exact);

    println!("=== Three-level tubular tower with a head mass ===\n");
    let levels = LevelSpec {
        levels: 3,
        braces: vec![
            TubeDimensions::new(0.060, 0.004),
            TubeDimensions::new(0.050, 0.004),
            TubeDimensions::new(0.040, 0.003),
        ],
        legs: vec![
            TubeDimensions::new(0.200, 0.010),
            TubeDimensions::new(0.180, 0.010),
            TubeDimensions::new(0.160, 0.008),
        ],
        brace_modulus: 210e9,
        leg_modulus: 210e9,
        shear_modulus: 81e9,
        density: 7850.0,
    };
    let materials = MaterialTable::from_levels(&levels).context("building level table")?;

    let (nodes, elements) = tower(&levels);
    let top = nodes.len() - 3;
    let mut constraints = Vec::new();
    for base in 1..=4 {
        constraints.extend(BoundaryConstraint::fixed(base));
    }
    let mut masses = Vec::new();
    for node in top..=nodes.len() {
        masses.extend(LumpedMass::point_mass(node, 500.0));
    }

    let mut model = FrameModel::new(nodes, elements, materials)
        .with_constraints(constraints)
        .with_lumped_masses(masses);
    let result = model
        .analyze(&AnalysisOptions::modal().with_modes(8))
        .context("tower modal analysis")?;
    print!("{}", result.report());

    let first = result.node_displacement(0, top)?;
    println!(
        "\nMode 1 at node {}: |u| = {:.3}, |θ| = {:.3e}",
        top,
        first.translation_magnitude(),
        first.rotation_magnitude()
    );

    Ok(())
}

/// Square four-legged tower: legs on the corners, one X-brace per face per level
fn tower(levels: &LevelSpec) -> (Vec<Node>, Vec<Element>) {
    let half = 1.5;
    let height = 4.0;
    let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
    let n = levels.levels;

    let mut nodes = Vec::new();
    for level in 0..=n {
        let z = level as f64 * height;
        for &(x, y) in &corners {
            nodes.push(Node::new(x, y, z));
        }
    }

    let id = |level: usize, corner: usize| level * 4 + corner + 1;
    let mut elements = Vec::new();
    for level in 0..n {
        let brace = (level + 1) as u32;
        let leg = (n + level + 1) as u32;
        for c in 0..4 {
            let next = (c + 1) % 4;
            elements.push(Element::new(id(level, c), id(level + 1, c), leg));
            elements.push(Element::new(id(level, c), id(level + 1, next), brace));
            elements.push(Element::new(id(level, next), id(level + 1, c), brace));
            elements.push(Element::new(id(level + 1, c), id(level + 1, next), brace));
        }
    }
    (nodes, elements)
}
