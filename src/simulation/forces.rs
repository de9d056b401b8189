//! Force / acceleration contributors for the n-body engine
//!
//! Defines the `Acceleration` trait and direct pairwise Newtonian gravity

use crate::simulation::states::{Body, State, NVec3};

/// Universal gravitational constant in m^3 kg^-1 s^-2
pub const G: f64 = 6.67430e-11;

/// Trait for acceleration sources operating on an ordered body list.
/// Returns the acceleration body `i` experiences from the rest of `bodies`.
///
/// `i` must be a valid index into `bodies`, implementations may panic otherwise.
/// Callers holding a `State` get a checked index from `State::body`.
pub trait Acceleration {
    fn acceleration(&self, bodies: &[Body], i: usize) -> NVec3;
}

/// Direct (all-pairs) inverse-square Newtonian gravity, no softening
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
}

impl Default for NewtonianGravity {
    fn default() -> Self {
        Self { G }
    }
}

impl NewtonianGravity {
    /// Force `victim` experiences from `exhibitor`:
    /// along the unit vector victim -> exhibitor, magnitude G m_v m_e / d^2
    pub fn gravity(&self, victim: &Body, exhibitor: &Body) -> NVec3 {
        // r points from victim to exhibitor, so the pull is along +r
        let r = victim.distance3d(exhibitor);
        let d = r.norm();

        // coincident bodies: no direction to pull along
        if d == 0.0 {
            return NVec3::zeros();
        }

        // G m_v m_e / d^3 * r == G m_v m_e / d^2 * r_hat
        let coef = self.G * victim.m * exhibitor.m / (d * d * d);
        coef * r
    }

    /// Sum of the forces every other body exerts on body `i`.
    /// Panics if `i` is out of range.
    pub fn net_force(&self, bodies: &[Body], i: usize) -> NVec3 {
        let victim = &bodies[i];
        bodies
            .iter()
            .enumerate()
            .filter(|(n, _)| *n != i)
            .fold(NVec3::zeros(), |acc, (_, exhibitor)| acc + self.gravity(victim, exhibitor))
    }

    /// Kinetic plus pairwise potential energy of the system
    pub fn total_energy(&self, bodies: &[Body]) -> f64 {
        let n = bodies.len();
        let mut kinetic = 0.0;
        let mut potential = 0.0;

        for i in 0..n {
            let bi = &bodies[i];
            kinetic += 0.5 * bi.m * bi.v.norm_squared();

            // each unordered pair once
            for bj in &bodies[(i + 1)..n] {
                let d = bi.distance(bj);
                if d > 0.0 {
                    potential -= self.G * bi.m * bj.m / d;
                }
            }
        }

        kinetic + potential
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, bodies: &[Body], i: usize) -> NVec3 {
        let m = bodies[i].m;
        // massless bodies: skip the sum, and 0/0 would be NaN anyway
        if m == 0.0 {
            return NVec3::zeros();
        }
        self.net_force(bodies, i) / m
    }
}

impl State {
    /// Copy of this state whose bodies carry their current net force in `Body::gravity`.
    /// For inspection only, force evaluations never read the cached value.
    pub fn with_net_forces(&self, model: &NewtonianGravity) -> State {
        let bodies = self.bodies();
        let annotated = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| Body {
                gravity: model.net_force(bodies, i),
                ..b.clone()
            })
            .collect();
        self.replaced(annotated)
    }
}
