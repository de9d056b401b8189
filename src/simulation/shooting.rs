//! Multivariate Newton–Raphson shooting method
//!
//! Finds the launch velocity `v` of a maneuvering object such that, after a
//! full simulation up to `tf`, the object sits within `tolerance` of a target
//! body. The miss vector `g(v) = x_target(tf) - x_object(tf)` is driven to
//! zero with
//!
//! ```text
//! v_n+1 = v_n - J^-1 g(v_n),   J_ij = (g_i(v + d e_j) - g_i(v - d e_j)) / 2d
//! ```
//!
//! Every evaluation of `g` is a whole simulation run, so one Newton iteration
//! costs seven runs (one for `g`, six for the central differences). The six
//! perturbation runs share nothing and can run on the rayon pool.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::derivative::OdeFunction;
use super::error::{ShootingError, SimulationError};
use super::integrator::Integrator;
use super::linalg;
use super::states::{Body, State, NVec3};

/// Knobs of the Newton iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShootingParams {
    /// Newton iterations allowed before `NonConvergence`, `None` = unbounded
    pub max_iterations: Option<usize>,

    /// A miss growing past `factor * initial miss` is reported as `Diverged`
    pub divergence_factor: Option<f64>,

    /// Velocity offset for the finite differences, `None` = integration step `h`
    pub perturbation: Option<f64>,

    /// Run the six perturbation simulations in parallel
    pub parallel: bool,
}

/// Result of a converged shot
#[derive(Debug, Clone)]
pub struct ShootingOutcome {
    pub velocity: NVec3, // refined launch velocity
    pub miss: NVec3, // g(velocity)
    pub iterations: usize, // Newton updates applied
    pub history: Vec<f64>, // |g| seen at every iteration, last one included
}

/// Shooting solver for one maneuvering object aimed at one target body.
///
/// The object is appended after the fixed bodies, so its index in every
/// simulated state is `bodies.len()`.
#[derive(Debug, Clone)]
pub struct ShootingSolver<F> {
    function: F,
    integrator: Integrator,
    system: State, // fixed bodies followed by the object at its initial guess
    object: Body, // maneuvering object, its velocity is the unknown
    target: usize, // index of the target among the fixed bodies
    params: ShootingParams,
}

impl<F> ShootingSolver<F>
where
    F: OdeFunction + Sync,
{
    pub fn new(
        function: F,
        integrator: Integrator,
        bodies: Vec<Body>,
        object: Body,
        target: usize,
    ) -> Result<Self, ShootingError> {
        if target >= bodies.len() {
            return Err(SimulationError::IndexOutOfRange {
                index: target,
                len: bodies.len(),
            }
            .into());
        }
        let mut all = bodies;
        all.push(object.clone());
        let system = State::new(all)?;

        if integrator == Integrator::Verlet {
            warn!("verlet is a visualization-grade integrator, shooting results will be rough");
        }
        Ok(Self {
            function,
            integrator,
            system,
            object,
            target,
            params: ShootingParams::default(),
        })
    }

    pub fn with_params(mut self, params: ShootingParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &ShootingParams {
        &self.params
    }

    /// Index of the maneuvering object in simulated states
    pub fn object_index(&self) -> usize {
        self.system.len() - 1
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Initial state with `v` assigned to the maneuvering object
    pub fn initial_state(&self, v: NVec3) -> Result<State, SimulationError> {
        self.system
            .with_body(self.object_index(), self.object.update(self.object.x, v))
    }

    /// Miss vector g(v): target position minus object position at `tf`
    pub fn miss(&self, v: NVec3, tf: f64, h: f64) -> Result<NVec3, SimulationError> {
        let y0 = self.initial_state(v)?;
        let last = self.integrator.propagate(&self.function, &y0, tf, h)?;
        let object = last.body(self.object_index())?;
        let target = last.body(self.target)?;
        Ok(object.distance3d(target))
    }

    /// Central finite-difference Jacobian of g at `v`, step `d` per velocity component
    pub fn jacobian(&self, v: NVec3, tf: f64, h: f64, d: f64) -> Result<DMatrix<f64>, SimulationError> {
        let column = |j: usize| -> Result<NVec3, SimulationError> {
            let mut offset = NVec3::zeros();
            offset[j] = d;
            let plus = self.miss(v + offset, tf, h)?;
            let minus = self.miss(v - offset, tf, h)?;
            Ok((plus - minus) / (2.0 * d))
        };

        let columns: Vec<NVec3> = if self.params.parallel {
            (0..3)
                .into_par_iter()
                .map(&column)
                .collect::<Result<Vec<_>, SimulationError>>()?
        } else {
            (0..3)
                .map(&column)
                .collect::<Result<Vec<_>, SimulationError>>()?
        };

        Ok(DMatrix::from_fn(3, 3, |row, col| columns[col][row]))
    }

    /// Refine `v0` until the object ends within `tolerance` of the target at `tf`
    pub fn solve(&self, v0: NVec3, tf: f64, h: f64, tolerance: f64) -> Result<ShootingOutcome, ShootingError> {
        let d = self.params.perturbation.unwrap_or(h);
        if !(d.is_finite() && d > 0.0) {
            return Err(SimulationError::InvalidStepSize { h: d }.into());
        }

        let mut v = v0;
        let mut history = Vec::new();
        let mut iterations = 0;

        loop {
            let g = self.miss(v, tf, h)?;
            let dist = g.norm();
            history.push(dist);
            debug!("newton iteration {}: |g| = {:e}, v = {:?}", iterations, dist, v.as_slice());

            if !dist.is_finite() {
                return Err(ShootingError::Diverged { iteration: iterations, miss: dist });
            }
            if dist <= tolerance {
                info!("shot converged after {} iterations, miss {:e}", iterations, dist);
                return Ok(ShootingOutcome {
                    velocity: v,
                    miss: g,
                    iterations,
                    history,
                });
            }
            if let Some(factor) = self.params.divergence_factor {
                if dist > factor * history[0] {
                    return Err(ShootingError::Diverged { iteration: iterations, miss: dist });
                }
            }
            if let Some(max) = self.params.max_iterations {
                if iterations >= max {
                    return Err(ShootingError::NonConvergence { iterations, miss: dist });
                }
            }

            // v_n+1 = v_n - J^-1 g(v_n)
            let jacobian = self.jacobian(v, tf, h, d)?;
            let inverse = linalg::inverse(&jacobian)?;
            let correction = linalg::multiply(&inverse, &DVector::from_column_slice(g.as_slice()))?;
            v -= NVec3::new(correction[0], correction[1], correction[2]);
            iterations += 1;
        }
    }
}
