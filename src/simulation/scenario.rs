//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - numerical parameters (`Parameters`)
//! - the engine (`Engine`) holding the integrator, gravity derivative and
//!   the initial state (catalog bodies first, then inline bodies)
//! - an optional probe launch (`Shot`) ready for the shooting solver, its
//!   first guess optionally seeded by a two-body Lambert transfer

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::configuration::catalog::parse_catalog;
use crate::configuration::config::{ScenarioConfig, ShootingConfig};
use crate::simulation::derivative::Derivative;
use crate::simulation::engine::Engine;
use crate::simulation::error::{ManeuverError, ShootingError};
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::Integrator;
use crate::simulation::lambert::solve_lambert;
use crate::simulation::params::Parameters;
use crate::simulation::rocket::Rocket;
use crate::simulation::shooting::{ShootingOutcome, ShootingSolver};
use crate::simulation::states::{Body, NVec3, State};

pub type Gravity = Derivative<NewtonianGravity>;

/// Fully-initialized simulation scenario
pub struct Scenario {
    pub parameters: Parameters,
    pub engine: Engine<Gravity>,
    pub shot: Option<Shot>,
}

/// A probe launch: the solver, the first velocity guess and the acceptance radius
pub struct Shot {
    pub solver: ShootingSolver<Gravity>,
    pub guess: NVec3, // absolute launch velocity guess
    pub tolerance: f64,
    pub launch_velocity: NVec3, // velocity of the launch body, zero without one
    pub rocket: Option<Rocket>,
}

impl Shot {
    /// Run the Newton iteration over the scenario's full time span
    pub fn solve(&self, parameters: &Parameters) -> Result<ShootingOutcome, ShootingError> {
        self.solver
            .solve(self.guess, parameters.t_end, parameters.h0, self.tolerance)
    }

    /// Rocket after the launch burn taking it to `velocity`, `None` without a fuel budget
    pub fn burn_for(&self, velocity: NVec3) -> Option<Result<Rocket, ManeuverError>> {
        let delta_v = (velocity - self.launch_velocity).norm();
        self.rocket.map(|r| r.burn(delta_v))
    }
}

impl Scenario {
    /// `base_dir` is where the catalog path is resolved from, normally the
    /// directory of the scenario file
    pub fn build_scenario(cfg: ScenarioConfig, base_dir: &Path) -> Result<Self> {
        // Bodies: catalog first, then inline configs
        let mut bodies: Vec<Body> = match &cfg.catalog {
            Some(file) => {
                let path = base_dir.join(file);
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read catalog {}", path.display()))?;
                parse_catalog(&text).with_context(|| format!("bad catalog {}", path.display()))?
            }
            None => Vec::new(),
        };
        bodies.extend(cfg.bodies.iter().map(|bc| bc.to_body()));

        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            t_end: p_cfg.t_end,
            h0: p_cfg.h0,
            G: p_cfg.G,
        };

        let integrator = Integrator::from(cfg.engine.integrator);
        let gravity = Derivative::new(NewtonianGravity { G: parameters.G });

        info!(
            "scenario: {} bodies, {}, t_end = {}, h0 = {}",
            bodies.len(),
            integrator.name(),
            parameters.t_end,
            parameters.h0
        );
        let engine = Engine::new(integrator, gravity, State::new(bodies)?);

        let shot = match &cfg.shooting {
            Some(s_cfg) => Some(build_shot(s_cfg, &engine, &parameters)?),
            None => None,
        };

        Ok(Self {
            parameters,
            engine,
            shot,
        })
    }
}

fn find_body(bodies: &[Body], name: &str) -> Result<usize> {
    bodies
        .iter()
        .position(|b| &*b.name == name)
        .ok_or_else(|| anyhow!("no body named `{}` in scenario", name))
}

fn build_shot(cfg: &ShootingConfig, engine: &Engine<Gravity>, parameters: &Parameters) -> Result<Shot> {
    let bodies = engine.initial().bodies();
    let target = find_body(bodies, &cfg.target)?;

    let (origin, launch_velocity) = match &cfg.launch_from {
        Some(name) => {
            let from = &bodies[find_body(bodies, name)?];
            (from.x, from.v)
        }
        None => (NVec3::zeros(), NVec3::zeros()),
    };

    let x = origin + NVec3::from(cfg.object.x);
    let guess = match &cfg.lambert_about {
        Some(name) => lambert_guess(engine, parameters, find_body(bodies, name)?, target, x)?,
        None => launch_velocity + NVec3::from(cfg.object.v),
    };

    let rocket = cfg.fuel.map(Rocket::new);
    let object = match &rocket {
        Some(r) => r.body(&cfg.object.name, x, guess),
        None => cfg.object.to_body().update(x, guess),
    };

    let solver = ShootingSolver::new(engine.function, engine.integrator, bodies.to_vec(), object, target)?
        .with_params(cfg.params());

    Ok(Shot {
        solver,
        guess,
        tolerance: cfg.tolerance,
        launch_velocity,
        rocket,
    })
}

/// Two-body transfer from `x` to where the target will be at `t_end`, about
/// the `central` body. The fixed bodies are run once without the object to
/// find the arrival point.
fn lambert_guess(
    engine: &Engine<Gravity>,
    parameters: &Parameters,
    central: usize,
    target: usize,
    x: NVec3,
) -> Result<NVec3> {
    let start = engine.initial();
    let end = engine.propagate(parameters.t_end, parameters.h0)?;

    let c0 = start.body(central)?;
    let c1 = end.body(central)?;
    let r1 = x - c0.x;
    let r2 = end.body(target)?.x - c1.x;
    let mu = parameters.G * c0.m;

    let v = solve_lambert(r1, r2, parameters.t_end, mu)
        .with_context(|| format!("no transfer about `{}` to seed the shot", c0.name))?;
    info!("lambert guess about {}: {:?}", c0.name, (c0.v + v).as_slice());
    Ok(c0.v + v)
}
