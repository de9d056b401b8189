//! Core state types for the N-body simulation.
//!
//! - `Body`  : a named point mass, replaced (never mutated) on every step
//! - `State` : ordered snapshot of all bodies at one simulation time
//! - `Rate`  : time-derivative of a `State` (velocities and accelerations)
//!
//! Body order inside a `State` is the body's identity for the whole run.

use std::fmt;
use std::sync::Arc;

use nalgebra::Vector3;

use super::error::SimulationError;

pub type NVec3 = Vector3<f64>;

/// Extra vector operations used throughout the engine
pub trait VectorExt {
    /// `self + scalar * other`
    fn add_mul(&self, scalar: f64, other: &NVec3) -> NVec3;

    /// Euclidean distance between two points
    fn dist(&self, other: &NVec3) -> f64;
}

impl VectorExt for NVec3 {
    fn add_mul(&self, scalar: f64, other: &NVec3) -> NVec3 {
        self + other * scalar
    }

    fn dist(&self, other: &NVec3) -> f64 {
        (other - self).norm()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: Arc<str>, // identifier, shared between all snapshots of this body
    pub m: f64, // mass, 0 = exerts no gravity
    pub radius: f64, // radius, 0 = unspecified
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub gravity: NVec3, // last inspected net force, see `State::with_net_forces`
}

impl Body {
    pub fn new(name: &str, m: f64, radius: f64, x: NVec3, v: NVec3) -> Self {
        Self {
            name: Arc::from(name),
            m,
            radius,
            x,
            v,
            gravity: NVec3::zeros(),
        }
    }

    /// Copy of this body at a new position and velocity.
    /// Name, mass and radius carry over, the cached force does not.
    pub fn update(&self, x: NVec3, v: NVec3) -> Self {
        Self {
            name: Arc::clone(&self.name),
            m: self.m,
            radius: self.radius,
            x,
            v,
            gravity: NVec3::zeros(),
        }
    }

    /// Vector from this body to `other`
    pub fn distance3d(&self, other: &Body) -> NVec3 {
        other.x - self.x
    }

    pub fn distance(&self, other: &Body) -> f64 {
        self.x.dist(&other.x)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {{ mass={:e}, r={:e}, x={:e}, y={:e}, z={:e}, vx={:e}, vy={:e}, vz={:e} }}",
            self.name, self.m, self.radius, self.x.x, self.x.y, self.x.z, self.v.x, self.v.y, self.v.z
        )
    }
}

/// Derivative of a `State`: one (velocity, acceleration) pair per body,
/// in the same order as the state's bodies
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    pub velocity: Vec<NVec3>, // dx/dt
    pub acceleration: Vec<NVec3>, // dv/dt
}

impl Rate {
    pub fn new(velocity: Vec<NVec3>, acceleration: Vec<NVec3>) -> Self {
        debug_assert_eq!(velocity.len(), acceleration.len());
        Self { velocity, acceleration }
    }

    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    pub fn add(&self, other: &Rate) -> Rate {
        self.add_mul(1.0, other)
    }

    pub fn mul(&self, scalar: f64) -> Rate {
        Rate {
            velocity: self.velocity.iter().map(|v| v * scalar).collect(),
            acceleration: self.acceleration.iter().map(|a| a * scalar).collect(),
        }
    }

    /// `self + scalar * other`, component-wise per body
    pub fn add_mul(&self, scalar: f64, other: &Rate) -> Rate {
        Rate {
            velocity: self
                .velocity
                .iter()
                .zip(&other.velocity)
                .map(|(a, b)| a.add_mul(scalar, b))
                .collect(),
            acceleration: self
                .acceleration
                .iter()
                .zip(&other.acceleration)
                .map(|(a, b)| a.add_mul(scalar, b))
                .collect(),
        }
    }
}

/// Immutable snapshot of every body at one simulation time.
///
/// A state only remembers the bodies of the state it was derived from and
/// the step that led here (one level deep), which is all the two-step
/// Verlet scheme needs.
/// Cloning is cheap: body lists are shared.
#[derive(Debug, Clone)]
pub struct State {
    bodies: Arc<[Body]>,
    previous: Option<(Arc<[Body]>, f64)>, // predecessor's bodies and the step taken from it
    t: f64, // elapsed simulation time
}

impl State {
    /// Initial state of a run: no predecessor, elapsed time 0
    pub fn new(bodies: Vec<Body>) -> Result<Self, SimulationError> {
        if bodies.is_empty() {
            return Err(SimulationError::EmptySystem);
        }
        Ok(Self {
            bodies: bodies.into(),
            previous: None,
            t: 0.0,
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, i: usize) -> Result<&Body, SimulationError> {
        self.bodies.get(i).ok_or(SimulationError::IndexOutOfRange {
            index: i,
            len: self.bodies.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    /// Bodies of the state this one was derived from, `None` for an initial state
    pub fn previous(&self) -> Option<&[Body]> {
        self.previous.as_ref().map(|(bodies, _)| &**bodies)
    }

    /// Step size that produced this state from its predecessor
    pub fn previous_step(&self) -> Option<f64> {
        self.previous.as_ref().map(|(_, h)| *h)
    }

    /// Successor state holding `bodies`, `h` later than this one
    pub fn successor(&self, bodies: Vec<Body>, h: f64) -> State {
        debug_assert_eq!(bodies.len(), self.bodies.len());
        State {
            bodies: bodies.into(),
            previous: Some((Arc::clone(&self.bodies), h)),
            t: self.t + h,
        }
    }

    /// `self + step * rate` as the successor state:
    /// every position moves by `step * velocity`, every velocity by `step * acceleration`
    pub fn add_mul(&self, step: f64, rate: &Rate) -> State {
        self.successor(self.displaced(step, rate), step)
    }

    /// `self + scale * rate` as a throw-away stage state (Runge-Kutta stages).
    /// Keeps this state's time tag and predecessor.
    pub fn stage(&self, scale: f64, rate: &Rate) -> State {
        self.replaced(self.displaced(scale, rate))
    }

    /// Same state with body `i` replaced by `body`
    pub fn with_body(&self, i: usize, body: Body) -> Result<State, SimulationError> {
        let mut bodies = self.bodies.to_vec();
        let len = bodies.len();
        let slot = bodies
            .get_mut(i)
            .ok_or(SimulationError::IndexOutOfRange { index: i, len })?;
        *slot = body;
        Ok(self.replaced(bodies))
    }

    /// Same time tag and predecessor, new body snapshots in the same order
    pub fn replaced(&self, bodies: Vec<Body>) -> State {
        debug_assert_eq!(bodies.len(), self.bodies.len());
        State {
            bodies: bodies.into(),
            previous: self.previous.clone(),
            t: self.t,
        }
    }

    fn displaced(&self, scale: f64, rate: &Rate) -> Vec<Body> {
        debug_assert_eq!(rate.len(), self.bodies.len());
        self.bodies
            .iter()
            .zip(rate.velocity.iter().zip(&rate.acceleration))
            .map(|(b, (dx, dv))| b.update(b.x.add_mul(scale, dx), b.v.add_mul(scale, dv)))
            .collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t = {}", self.t)?;
        for b in self.bodies.iter() {
            writeln!(f, "{b}")?;
        }
        Ok(())
    }
}
