//! Fixed-step time integrators for the N-body system
//!
//! Provides explicit Euler, classical 4th-order Runge–Kutta and two-step
//! position Verlet behind one `Integrator` enum. Every integrator is driven
//! by an `OdeFunction`. A step never modifies its input: it returns a new
//! `State` linked to the one it came from, with the elapsed time advanced.

use log::debug;

use super::derivative::OdeFunction;
use super::error::SimulationError;
use super::states::{State, VectorExt};

/// Closed set of stepping schemes sharing `step` / `solve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrator {
    /// y_n+1 = y_n + h f(t_n, y_n). First order, needs no history
    Euler,

    /// Classical Runge–Kutta, four stage evaluations per step
    Kutta,

    /// x_n+1 = 2 x_n - x_n-1 + a h^2 (variable-step form when h changes),
    /// bootstrapped by one Euler step.
    /// Good long-run energy behaviour, only fit for visualization-grade runs
    Verlet,
}

impl Integrator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euler => "euler",
            Self::Kutta => "rk4",
            Self::Verlet => "verlet",
        }
    }

    /// Advance `y` by one increment `h`, evaluating `f` from time `t`
    pub fn step<F>(&self, f: &F, t: f64, y: &State, h: f64) -> State
    where
        F: OdeFunction + ?Sized,
    {
        match self {
            Self::Euler => euler_step(f, t, y, h),
            Self::Kutta => kutta_step(f, t, y, h),
            Self::Verlet => verlet_step(f, t, y, h),
        }
    }

    /// Equal steps of size `h` from `y0` up to `tf`, the last step shortened
    /// to land exactly on `tf` if `h` does not divide it.
    /// Returns every state along the path, `states[0]` being `y0`.
    pub fn solve<F>(&self, f: &F, y0: &State, tf: f64, h: f64) -> Result<Vec<State>, SimulationError>
    where
        F: OdeFunction + ?Sized,
    {
        let grid = TimeGrid::new(tf, h)?;
        debug!(
            "{}: {} steps of h = {}, remainder {}",
            self.name(),
            grid.full_steps,
            grid.h,
            grid.remainder
        );

        let mut states = Vec::with_capacity(grid.len());
        states.push(y0.clone());

        let mut current = y0.clone();
        for (t, dt) in grid.steps(y0.t()) {
            current = self.step(f, t, &current, dt);
            states.push(current.clone());
        }
        Ok(states)
    }

    /// Same walk as [`Integrator::solve`] but only the final state is kept
    pub fn propagate<F>(&self, f: &F, y0: &State, tf: f64, h: f64) -> Result<State, SimulationError>
    where
        F: OdeFunction + ?Sized,
    {
        let grid = TimeGrid::new(tf, h)?;
        let mut current = y0.clone();
        for (t, dt) in grid.steps(y0.t()) {
            current = self.step(f, t, &current, dt);
        }
        Ok(current)
    }

    /// Steps through an explicit output grid, `ts[0]` being the time of `y0`.
    /// Returns one state per entry of `ts`.
    pub fn solve_at<F>(&self, f: &F, y0: &State, ts: &[f64]) -> Result<Vec<State>, SimulationError>
    where
        F: OdeFunction + ?Sized,
    {
        validate_grid(ts)?;

        let mut states = Vec::with_capacity(ts.len());
        states.push(y0.clone());

        let mut current = y0.clone();
        for w in ts.windows(2) {
            current = self.step(f, w[0], &current, w[1] - w[0]);
            states.push(current.clone());
        }
        Ok(states)
    }
}

/// Euler: every position moves by h * velocity, every velocity by h * acceleration
fn euler_step<F>(f: &F, t: f64, y: &State, h: f64) -> State
where
    F: OdeFunction + ?Sized,
{
    y.add_mul(h, &f.call(t, y))
}

/// Classical Runge–Kutta:
/// k1 = f(t, y)
/// k2 = f(t + h/2, y + h/2 k1)
/// k3 = f(t + h/2, y + h/2 k2)
/// k4 = f(t + h, y + h k3)
/// y_n+1 = y_n + h/6 (k1 + 2 k2 + 2 k3 + k4)
fn kutta_step<F>(f: &F, t: f64, y: &State, h: f64) -> State
where
    F: OdeFunction + ?Sized,
{
    let half = 0.5 * h;

    let k1 = f.call(t, y);
    let k2 = f.call(t + half, &y.stage(half, &k1));
    let k3 = f.call(t + half, &y.stage(half, &k2));
    let k4 = f.call(t + h, &y.stage(h, &k3));

    // weighted slope (k1 + 2 k2 + 2 k3 + k4) / 6
    let slope = k1
        .add_mul(2.0, &k2)
        .add_mul(2.0, &k3)
        .add(&k4)
        .mul(1.0 / 6.0);

    y.add_mul(h, &slope)
}

/// Position Verlet. Needs the positions of the previous state, so the first
/// step of a run (no predecessor) is an Euler step.
///
/// Steps of unequal size (remainder steps, explicit grids) use the
/// variable-step form
/// x_n+1 = x_n + (x_n - x_n-1) h / h_prev + a_n h (h + h_prev) / 2
/// which is 2 x_n - x_n-1 + a_n h^2 when h == h_prev.
fn verlet_step<F>(f: &F, t: f64, y: &State, h: f64) -> State
where
    F: OdeFunction + ?Sized,
{
    let (Some(before), Some(h_prev)) = (y.previous(), y.previous_step()) else {
        return euler_step(f, t, y, h);
    };

    // a_n from x_n
    let rate = f.call(t, y);
    let ratio = h / h_prev;
    let kick = 0.5 * h * (h + h_prev);

    let bodies = y
        .bodies()
        .iter()
        .zip(before)
        .zip(&rate.acceleration)
        .map(|((b, old), a)| {
            let x = (b.x + (b.x - old.x) * ratio).add_mul(kick, a);
            // v_n+1 = v_n + a_n h
            let v = b.v.add_mul(h, a);
            b.update(x, v)
        })
        .collect();

    y.successor(bodies, h)
}

/// Uniform time grid over [t0, t0 + tf] with an optional shorter last step
#[derive(Debug, Clone, Copy)]
struct TimeGrid {
    h: f64,
    full_steps: usize,
    remainder: f64,
}

impl TimeGrid {
    // relative slack when deciding whether h divides tf
    const SNAP: f64 = 1e-9;

    fn new(tf: f64, h: f64) -> Result<Self, SimulationError> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SimulationError::InvalidStepSize { h });
        }
        if !(tf.is_finite() && tf >= 0.0) {
            return Err(SimulationError::InvalidTimeGrid {
                reason: format!("final time must be finite and non-negative, got {}", tf),
            });
        }

        // tf / h is rarely an exact integer in floating point (0.3 / 0.1),
        // snap to the nearest one when it is close enough
        let ratio = tf / h;
        let nearest = ratio.round();
        let full = if (ratio - nearest).abs() <= Self::SNAP * nearest.max(1.0) {
            nearest
        } else {
            ratio.floor()
        };

        let remainder = tf - full * h;
        let remainder = if remainder > Self::SNAP * h { remainder } else { 0.0 };

        Ok(Self {
            h,
            full_steps: full as usize,
            remainder,
        })
    }

    /// Number of states a solve over this grid produces, initial state included
    fn len(&self) -> usize {
        self.full_steps + 1 + usize::from(self.remainder > 0.0)
    }

    /// (start time, step size) of every step
    fn steps(&self, t0: f64) -> impl Iterator<Item = (f64, f64)> {
        let Self { h, full_steps, remainder } = *self;
        let last = (remainder > 0.0).then_some((t0 + full_steps as f64 * h, remainder));
        (0..full_steps)
            .map(move |i| (t0 + i as f64 * h, h))
            .chain(last)
    }
}

fn validate_grid(ts: &[f64]) -> Result<(), SimulationError> {
    if ts.is_empty() {
        return Err(SimulationError::InvalidTimeGrid {
            reason: "output grid is empty".to_string(),
        });
    }
    if ts.iter().any(|t| !t.is_finite()) {
        return Err(SimulationError::InvalidTimeGrid {
            reason: "output grid contains non-finite times".to_string(),
        });
    }
    if let Some(w) = ts.windows(2).find(|w| w[1] <= w[0]) {
        return Err(SimulationError::InvalidTimeGrid {
            reason: format!("times must be strictly increasing ({} then {})", w[0], w[1]),
        });
    }
    Ok(())
}
