//! flexbeam example - displacement-controlled pushover of a cantilever
//!
//! A 3 m vertical steel cantilever with bilinear sections is pushed
//! laterally at its tip. The vertical force and moment at the tip are kept
//! at zero with a small Newton loop on the free degrees of freedom. The
//! pushover curve is printed as JSON.
//!
//! Run with `RUST_LOG=debug` to see the element iteration.

use anyhow::{anyhow, Context, Result};
use log::info;
use serde::Serialize;

use flexbeam::math::{solve_linear_system, Mat, Vec};
use flexbeam::prelude::*;

const LENGTH: f64 = 3.0;
const STEPS: usize = 30;
const TIP_DRIFT: f64 = 0.06;
const EQUILIBRIUM_TOL: f64 = 1e-6;
const MAX_GLOBAL_ITERATIONS: usize = 25;

/// Free nodal freedoms of node j: vertical displacement and rotation
const FREE: [usize; 2] = [4, 5];
/// Controlled freedom: horizontal displacement of node j
const CONTROL: usize = 3;

#[derive(Debug, Serialize)]
struct PushoverPoint {
    step: usize,
    tip_displacement: f64,
    tip_force: f64,
    base_moment: f64,
    substeps: usize,
    max_subdivision_level: usize,
}

fn build_element() -> Result<ForceBeamColumn> {
    let material = Material::steel();
    let props = SectionProperties::rectangular(0.2, 0.4);

    let ea = props.rigidity(&material, ResponseCode::Axial).context("axial rigidity")?;
    let ei = props.rigidity(&material, ResponseCode::MomentZ).context("flexural rigidity")?;
    let np = props.plastic_capacity(&material, ResponseCode::Axial).context("axial capacity")?;
    let mp = props
        .plastic_capacity(&material, ResponseCode::MomentZ)
        .context("moment capacity")?;

    let section = BilinearSection::new()
        .with_component(ResponseCode::Axial, ea, np, 0.01)?
        .with_component(ResponseCode::MomentZ, ei, mp, 0.02)?;
    info!("section EA = {:.3e}, EI = {:.3e}, Mp = {:.3e}", ea, ei, mp);

    let transf = LinearTransformation::planar(&Node::planar(0.0, 0.0), &Node::planar(0.0, LENGTH))?;
    let sections: std::vec::Vec<Box<dyn SectionResponse>> = (0..5)
        .map(|_| Box::new(section.clone()) as Box<dyn SectionResponse>)
        .collect();

    let element = ForceBeamColumn::new(
        1,
        Box::new(transf),
        Box::new(Lobatto),
        sections,
        IterationOptions::default().with_tolerance(1e-10),
    )?;
    Ok(element)
}

/// Drive the free freedoms to equilibrium at the current control value
fn equilibrate(element: &mut ForceBeamColumn, u: &mut Vec) -> Result<usize> {
    for iteration in 0..MAX_GLOBAL_ITERATIONS {
        element.update(u)?;
        let force = element.resisting_force();
        let unbalance = Vec::from_iterator(FREE.len(), FREE.iter().map(|&i| -force[i]));
        if unbalance.norm() < EQUILIBRIUM_TOL {
            return Ok(iteration);
        }

        let k = element.tangent_stiff();
        let k_ff = Mat::from_fn(FREE.len(), FREE.len(), |r, c| k[(FREE[r], FREE[c])]);
        let du = solve_linear_system(&k_ff, &unbalance).ok_or_else(|| anyhow!("singular free stiffness"))?;
        for (d, &i) in du.iter().zip(&FREE) {
            u[i] += d;
        }
    }
    Err(anyhow!("no equilibrium after {} iterations", MAX_GLOBAL_ITERATIONS))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut element = build_element()?;
    let mut u = Vec::zeros(6);
    let mut curve = std::vec::Vec::with_capacity(STEPS);

    for step in 1..=STEPS {
        u[CONTROL] = TIP_DRIFT * step as f64 / STEPS as f64;
        let iterations = equilibrate(&mut element, &mut u).with_context(|| format!("step {}", step))?;
        element.commit_state()?;

        let force = element.resisting_force();
        let report = element.last_report().cloned().unwrap_or_default();
        info!(
            "step {}: {} global iterations, element substeps {}",
            step, iterations, report.substeps
        );

        curve.push(PushoverPoint {
            step,
            tip_displacement: u[CONTROL],
            tip_force: force[CONTROL],
            base_moment: force[2],
            substeps: report.substeps,
            max_subdivision_level: report.max_subdivision_level,
        });
    }

    println!("{}", serde_json::to_string_pretty(&curve)?);
    Ok(())
}
