//! Right-hand side `dy/dt = f(t, y)` consumed by the integrators

use crate::simulation::forces::Acceleration;
use crate::simulation::states::{Rate, State};

/// Function defining the differential equation `dy/dt = f(t, y)` over whole states.
/// Must be a pure function of `(t, y)`.
pub trait OdeFunction {
    fn call(&self, t: f64, y: &State) -> Rate;
}

// lets tests and one-off experiments pass closures straight to an integrator
impl<F> OdeFunction for F
where
    F: Fn(f64, &State) -> Rate,
{
    fn call(&self, t: f64, y: &State) -> Rate {
        self(t, y)
    }
}

/// Equations of motion under an acceleration model:
/// dx_i/dt = v_i, dv_i/dt = a_i(bodies)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Derivative<A> {
    pub model: A,
}

impl<A: Acceleration> Derivative<A> {
    pub fn new(model: A) -> Self {
        Self { model }
    }
}

impl<A: Acceleration> OdeFunction for Derivative<A> {
    // t unused: gravity does not depend on time
    fn call(&self, _t: f64, y: &State) -> Rate {
        let bodies = y.bodies();
        let velocity = bodies.iter().map(|b| b.v).collect();
        let acceleration = (0..bodies.len())
            .map(|i| self.model.acceleration(bodies, i))
            .collect();
        Rate::new(velocity, acceleration)
    }
}
