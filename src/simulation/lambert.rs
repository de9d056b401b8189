//! Two-body Lambert solver used to seed the shooting method
//!
//! Universal-variable formulation with bisection on psi (zero revolutions,
//! prograde transfer about +z). Given two positions relative to a central
//! mass and a time of flight, returns the departure velocity of the
//! connecting conic. It ignores every other body, so it is a first guess for
//! the N-body Newton iteration, not a replacement for it.

use std::f64::consts::PI;
use std::fmt;

use super::states::NVec3;

const MAX_ITERATIONS: usize = 200;
// relative time-of-flight tolerance
const TOF_RTOL: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub enum LambertError {
    /// Time of flight must be finite and positive
    InvalidTimeOfFlight(f64),

    /// Positions collinear through the origin (0 or 180 degree transfer), the
    /// transfer plane is undefined
    DegenerateGeometry,

    /// Bisection ran out of iterations
    ConvergenceFailed { iterations: usize, residual: f64 },
}

impl fmt::Display for LambertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeOfFlight(tof) => {
                write!(f, "Time of flight must be finite and positive, got {}", tof)
            }
            Self::DegenerateGeometry => write!(f, "Transfer plane undefined for collinear positions"),
            Self::ConvergenceFailed { iterations, residual } => write!(
                f,
                "Lambert solver did not converge after {} iterations (residual {:e} s)",
                iterations, residual
            ),
        }
    }
}

impl std::error::Error for LambertError {}

/// Departure velocity taking a body from `r1` to `r2` in `tof` about a
/// central mass with gravitational parameter `mu`
pub fn solve_lambert(r1: NVec3, r2: NVec3, tof: f64, mu: f64) -> Result<NVec3, LambertError> {
    if !(tof.is_finite() && tof > 0.0) {
        return Err(LambertError::InvalidTimeOfFlight(tof));
    }

    let n1 = r1.norm();
    let n2 = r2.norm();
    let cos_dnu = (r1.dot(&r2) / (n1 * n2)).clamp(-1.0, 1.0);

    // short way when the transfer runs counter-clockwise about +z
    let tm = if r1.cross(&r2).z >= 0.0 { 1.0 } else { -1.0 };
    let a = tm * (n1 * n2 * (1.0 + cos_dnu)).sqrt();
    if !a.is_finite() || a.abs() <= 1e-12 * (n1 * n2).sqrt() || (1.0 - cos_dnu).abs() < 1e-14 {
        return Err(LambertError::DegenerateGeometry);
    }

    let sqrt_mu = mu.sqrt();
    let mut psi_low = -4.0 * PI * PI;
    let mut psi_up = 4.0 * PI * PI;
    let mut psi = 0.0;
    let mut residual = f64::INFINITY;

    for _ in 0..MAX_ITERATIONS {
        let (c2, c3) = stumpff(psi);
        let y = n1 + n2 + a * (psi * c3 - 1.0) / c2.sqrt();

        // y grows with psi, negative y means psi is still too small
        if y < 0.0 {
            psi_low = psi;
            psi = 0.5 * (psi_low + psi_up);
            continue;
        }

        let chi = (y / c2).sqrt();
        let dt = (chi.powi(3) * c3 + a * y.sqrt()) / sqrt_mu;
        residual = dt - tof;

        if residual.abs() <= TOF_RTOL * tof {
            // Lagrange coefficients
            let f = 1.0 - y / n1;
            let g = a * (y / mu).sqrt();
            return Ok((r2 - r1 * f) / g);
        }

        if dt < tof {
            psi_low = psi;
        } else {
            psi_up = psi;
        }
        psi = 0.5 * (psi_low + psi_up);
    }

    Err(LambertError::ConvergenceFailed {
        iterations: MAX_ITERATIONS,
        residual,
    })
}

// Stumpff functions c2(psi), c3(psi)
fn stumpff(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let s = psi.sqrt();
        ((1.0 - s.cos()) / psi, (s - s.sin()) / (s * psi))
    } else if psi < -1e-6 {
        let s = (-psi).sqrt();
        ((1.0 - s.cosh()) / psi, (s.sinh() - s) / (s * -psi))
    } else {
        (0.5, 1.0 / 6.0)
    }
}
