pub mod states;
pub mod error;
pub mod params;
pub mod engine;
pub mod forces;
pub mod derivative;
pub mod integrator;
pub mod linalg;
pub mod lambert;
pub mod shooting;
pub mod rocket;
pub mod scenario;
