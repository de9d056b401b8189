//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice
//! - [`ParametersConfig`] – end time, step size and gravitational constant
//! - [`BodyConfig`]       – initial state for each body
//! - [`ShootingConfig`]   – optional probe launch solved by Newton–Raphson
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"       # "euler", "rk4" or "verlet"
//!
//! parameters:
//!   t_end: 31536000.0       # total simulation time, s
//!   h0: 86400.0             # fixed step size, s
//!   G: 6.67430e-11          # optional, SI value by default
//!
//! catalog: "solar_system_2020.txt"   # optional, relative to the scenario file
//!
//! bodies:                   # appended after the catalog bodies
//!   - name: "Moonlet"
//!     m: 1.0e15
//!     x: [ 1.5e11, 0.0, 0.0 ]
//!     v: [ 0.0, 3.0e4, 0.0 ]
//!
//! shooting:
//!   object:
//!     name: "Probe"
//!     m: 1.5e5
//!     x: [ 6371e3, 0.0, 0.0 ]   # offset from `launch_from`
//!     v: [ 0.0, 0.0, 0.0 ]      # initial guess, relative to `launch_from`
//!   launch_from: "Earth"
//!   target: "Titan"
//!   lambert_about: "Sun"    # optional, replaces the `v` guess
//!   tolerance: 1.0e5
//!   max_iterations: 30
//! ```

use serde::Deserialize;

use crate::simulation::forces::G;
use crate::simulation::integrator::Integrator;
use crate::simulation::shooting::ShootingParams;
use crate::simulation::states::{Body, NVec3};

/// Which integrator method used by the engine
/// `integrator: "euler"`, `"rk4"` or `"verlet"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Explicit Euler, first order
    Euler,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta
    Rk4,

    #[serde(rename = "verlet")] // Two-step position Verlet, bootstrapped with Euler
    Verlet,
}

impl From<IntegratorConfig> for Integrator {
    fn from(cfg: IntegratorConfig) -> Self {
        match cfg {
            IntegratorConfig::Euler => Integrator::Euler,
            IntegratorConfig::Rk4 => Integrator::Kutta,
            IntegratorConfig::Verlet => Integrator::Verlet,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the system state
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64, // time step size
    #[serde(default = "default_gravity")]
    pub G: f64, // gravitational constant
}

fn default_gravity() -> f64 {
    G
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub m: f64, // Mass of the body
    #[serde(default)]
    pub radius: f64, // Radius of the body, 0 if unknown
    pub x: [f64; 3], // Initial position
    pub v: [f64; 3], // Initial velocity
}

impl BodyConfig {
    pub fn to_body(&self) -> Body {
        Body::new(
            &self.name,
            self.m,
            self.radius,
            NVec3::from(self.x),
            NVec3::from(self.v),
        )
    }
}

/// Probe launch to be refined by the shooting solver
#[derive(Deserialize, Debug, Clone)]
pub struct ShootingConfig {
    pub object: BodyConfig, // maneuvering object, `v` is the initial guess
    pub launch_from: Option<String>, // object x / v are offsets from this body
    pub target: String, // name of the body to hit
    pub lambert_about: Option<String>, // seed the guess with a two-body transfer about this body, ignoring `object.v`
    pub tolerance: f64, // acceptable miss distance
    pub max_iterations: Option<usize>,
    pub divergence_factor: Option<f64>,
    pub perturbation: Option<f64>, // finite-difference step, defaults to h0
    #[serde(default)]
    pub parallel: bool,
    pub fuel: Option<f64>, // fuel mass for the launch burn budget, kg
}

impl ShootingConfig {
    pub fn params(&self) -> ShootingParams {
        ShootingParams {
            max_iterations: self.max_iterations,
            divergence_factor: self.divergence_factor,
            perturbation: self.perturbation,
            parallel: self.parallel,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub catalog: Option<String>, // body catalog file, relative to the scenario directory
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // bodies after the catalog ones
    pub shooting: Option<ShootingConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_scenario() {
        let yaml = r#"
engine:
  integrator: "rk4"
parameters:
  t_end: 10.0
  h0: 0.5
  G: 1.0
bodies:
  - name: "A"
    m: 1.0
    radius: 0.1
    x: [ -0.5, 0.0, 0.0 ]
    v: [ 0.0, 1.0, 0.0 ]
  - name: "B"
    m: 2.0
    x: [ 0.5, 0.0, 0.0 ]
    v: [ 0.0, -1.0, 0.0 ]
shooting:
  object: { name: "Probe", m: 0.0, x: [0.0, 0.0, 1.0], v: [0.0, 0.0, 0.0] }
  target: "B"
  tolerance: 1.0e-3
  max_iterations: 12
  parallel: true
"#;
        let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(Integrator::from(cfg.engine.integrator), Integrator::Kutta);
        assert_eq!(cfg.parameters.G, 1.0);
        assert!(cfg.catalog.is_none());

        assert_eq!(cfg.bodies.len(), 2);
        let b = cfg.bodies[1].to_body();
        assert_eq!(&*b.name, "B");
        assert_eq!(b.radius, 0.0);
        assert_eq!(b.x, NVec3::new(0.5, 0.0, 0.0));

        let shooting = cfg.shooting.unwrap();
        assert_eq!(shooting.target, "B");
        assert!(shooting.launch_from.is_none());
        assert!(shooting.lambert_about.is_none());
        let params = shooting.params();
        assert_eq!(params.max_iterations, Some(12));
        assert!(params.parallel);
        assert!(params.perturbation.is_none());
    }

    #[test]
    fn gravity_defaults_to_si() {
        let yaml = r#"
engine: { integrator: "euler" }
parameters: { t_end: 1.0, h0: 0.1 }
catalog: "bodies.txt"
"#;
        let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.parameters.G, G);
        assert_eq!(cfg.catalog.as_deref(), Some("bodies.txt"));
        assert!(cfg.bodies.is_empty());
        assert!(cfg.shooting.is_none());
    }

    #[test]
    fn rejects_unknown_integrator() {
        let yaml = "engine: { integrator: \"leapfrog\" }\nparameters: { t_end: 1.0, h0: 0.1 }\n";
        assert!(serde_yaml::from_str::<ScenarioConfig>(yaml).is_err());
    }
}
