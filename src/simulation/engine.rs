//! High-level runtime engine
//!
//! Binds an integrator, a right-hand side and an initial state, and runs
//! whole simulations from them. Runs never modify the initial state, so
//! one engine can be run many times (the shooting solver does exactly that).

use log::info;

use super::derivative::OdeFunction;
use super::error::SimulationError;
use super::integrator::Integrator;
use super::states::{NVec3, State};

#[derive(Debug, Clone)]
pub struct Engine<F> {
    pub integrator: Integrator, // euler, rk4 or verlet
    pub function: F, // dy/dt = f(t, y)
    initial: State, // state at t = 0
}

impl<F: OdeFunction> Engine<F> {
    pub fn new(integrator: Integrator, function: F, initial: State) -> Self {
        Self {
            integrator,
            function,
            initial,
        }
    }

    pub fn initial(&self) -> &State {
        &self.initial
    }

    /// Every state from t = 0 to `tf` in steps of `h`
    pub fn run(&self, tf: f64, h: f64) -> Result<Vec<State>, SimulationError> {
        info!(
            "running {} bodies with {} up to t = {} (h = {})",
            self.initial.len(),
            self.integrator.name(),
            tf,
            h
        );
        self.integrator.solve(&self.function, &self.initial, tf, h)
    }

    /// One state per entry of `ts`, `ts[0]` being the initial time
    pub fn run_at(&self, ts: &[f64]) -> Result<Vec<State>, SimulationError> {
        self.integrator.solve_at(&self.function, &self.initial, ts)
    }

    /// Single step of `h` from the initial state, evaluated at time `t`
    pub fn perform_step(&self, t: f64, h: f64) -> Result<State, SimulationError> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SimulationError::InvalidStepSize { h });
        }
        Ok(self.integrator.step(&self.function, t, &self.initial, h))
    }

    /// Final state at `tf`, intermediate states are dropped as they go
    pub fn propagate(&self, tf: f64, h: f64) -> Result<State, SimulationError> {
        self.integrator.propagate(&self.function, &self.initial, tf, h)
    }

    /// Positions of body `index` along a run
    pub fn trajectory(&self, index: usize, tf: f64, h: f64) -> Result<Vec<NVec3>, SimulationError> {
        self.initial.body(index)?;
        let states = self.run(tf, h)?;
        states.iter().map(|s| s.body(index).map(|b| b.x)).collect()
    }
}
