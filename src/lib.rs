pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, State, Rate, NVec3, VectorExt};
pub use simulation::error::{SimulationError, LinAlgError, ShootingError, ManeuverError};
pub use simulation::forces::{Acceleration, NewtonianGravity, G};
pub use simulation::derivative::{OdeFunction, Derivative};
pub use simulation::integrator::Integrator;
pub use simulation::engine::Engine;
pub use simulation::lambert::{solve_lambert, LambertError};
pub use simulation::shooting::{ShootingSolver, ShootingParams, ShootingOutcome};
pub use simulation::rocket::Rocket;
pub use simulation::scenario::{Scenario, Shot};

pub use configuration::config::{IntegratorConfig, EngineConfig, ParametersConfig, BodyConfig, ShootingConfig, ScenarioConfig};
pub use configuration::catalog::{parse_catalog, CatalogError};

pub use benchmark::benchmark::{bench_integrators, print_bench, BenchRow};
