use probesim::{ScenarioConfig, Scenario};
use probesim::{bench_integrators, print_bench};

use clap::{Parser, ValueEnum};
use anyhow::{Context, Result, bail};
use env_logger::Env;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    /// Run the system and print states
    Simulate,
    /// Solve for the probe launch velocity
    Shoot,
    /// Time every integrator and measure energy drift
    Bench,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "solar_system.yaml")]
    file_name: String,

    #[arg(long, value_enum, default_value = "simulate")]
    mode: Mode,

    /// Print every n-th state when simulating
    #[arg(long, default_value_t = 30)]
    every: usize,
}

// load here to keep main clean
fn load_scenario_from_yaml(args: &Args) -> Result<Scenario> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let config_path = dir.join(&args.file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Scenario::build_scenario(scenario_cfg, &dir)
}

fn simulate(scenario: &Scenario, every: usize) -> Result<()> {
    let p = scenario.parameters;
    let states = scenario.engine.run(p.t_end, p.h0)?;
    let every = every.max(1);
    let last = states.len() - 1;

    for (i, state) in states.iter().enumerate() {
        if i % every == 0 || i == last {
            println!("{}", state.with_net_forces(&scenario.engine.function.model));
        }
    }
    Ok(())
}

fn shoot(scenario: &Scenario) -> Result<()> {
    let Some(shot) = &scenario.shot else {
        bail!("scenario has no `shooting` section");
    };

    let outcome = shot.solve(&scenario.parameters)?;
    let v = outcome.velocity;
    println!("launch velocity: vx={:e}, vy={:e}, vz={:e}", v.x, v.y, v.z);
    println!("miss distance: {:e} m after {} iterations", outcome.miss.norm(), outcome.iterations);

    if let Some(burn) = shot.burn_for(v) {
        let rocket = burn?;
        println!("fuel left: {:e} kg, total mass {:e} kg", rocket.fuel_mass, rocket.mass());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario = load_scenario_from_yaml(&args)?;

    match args.mode {
        Mode::Simulate => simulate(&scenario, args.every)?,
        Mode::Shoot => shoot(&scenario)?,
        Mode::Bench => {
            let h = scenario.parameters.h0;
            let rows = bench_integrators(&scenario, &[4.0 * h, 2.0 * h, h])?;
            print_bench(&rows);
        }
    }

    Ok(())
}
