use std::time::Instant;

use log::info;

use crate::simulation::engine::Engine;
use crate::simulation::error::SimulationError;
use crate::simulation::integrator::Integrator;
use crate::simulation::scenario::Scenario;

/// One (integrator, step size) measurement
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRow {
    pub integrator: Integrator,
    pub h: f64,
    pub steps: usize,
    pub seconds: f64, // wall time of the full run
    pub energy_drift: f64, // |E_end - E_0| / |E_0|
}

/// Run the scenario's system with every integrator at every step size,
/// timing each run and measuring how far the total energy drifts
pub fn bench_integrators(scenario: &Scenario, step_sizes: &[f64]) -> Result<Vec<BenchRow>, SimulationError> {
    let tf = scenario.parameters.t_end;
    let model = scenario.engine.function.model;
    let initial = scenario.engine.initial();
    let e0 = model.total_energy(initial.bodies());

    let mut rows = Vec::new();
    for integrator in [Integrator::Euler, Integrator::Kutta, Integrator::Verlet] {
        let engine = Engine::new(integrator, scenario.engine.function, initial.clone());

        for &h in step_sizes {
            // Warm up
            engine.perform_step(0.0, h)?;

            let t0 = Instant::now();
            let states = engine.run(tf, h)?;
            let seconds = t0.elapsed().as_secs_f64();

            let e_end = states
                .last()
                .map_or(e0, |s| model.total_energy(s.bodies()));
            let energy_drift = if e0 == 0.0 {
                (e_end - e0).abs()
            } else {
                ((e_end - e0) / e0).abs()
            };

            info!("{} h = {}: {:.6} s, drift {:e}", integrator.name(), h, seconds, energy_drift);
            rows.push(BenchRow {
                integrator,
                h,
                steps: states.len() - 1,
                seconds,
                energy_drift,
            });
        }
    }
    Ok(rows)
}

/// Paste output directly into a spreadsheet to graph
pub fn print_bench(rows: &[BenchRow]) {
    println!("integrator,h,steps,seconds,energy_drift");
    for r in rows {
        println!(
            "{},{},{},{:.6},{:e}",
            r.integrator.name(),
            r.h,
            r.steps,
            r.seconds,
            r.energy_drift
        );
    }
}
