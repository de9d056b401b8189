//! Error types for the simulation core
//!
//! Each failure class of the core gets its own enum so callers can match
//! on exactly what went wrong (e.g. retry a shot with a new guess on
//! `NonConvergence`, but not on `InvalidStepSize`).

use std::fmt;

/// Invalid input handed to states, integrators or the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A state needs at least one body
    EmptySystem,

    /// Step size must be finite and strictly positive
    InvalidStepSize { h: f64 },

    /// Final time or output grid is unusable
    InvalidTimeGrid { reason: String },

    /// Body index outside the state
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySystem => write!(f, "Simulation state contains no bodies"),
            Self::InvalidStepSize { h } => {
                write!(f, "Step size must be finite and positive, got {}", h)
            }
            Self::InvalidTimeGrid { reason } => write!(f, "Invalid time grid: {}", reason),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "Body index {} out of range for {} bodies", index, len)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

/// Failures of the dense linear-algebra kernel
#[derive(Debug, Clone, PartialEq)]
pub enum LinAlgError {
    /// 0 x 0 matrix
    Empty,

    /// Determinant and inverse are only defined for square matrices
    NotSquare { rows: usize, cols: usize },

    /// Determinant is zero or numerically indistinguishable from zero
    SingularMatrix { determinant: f64 },

    /// Matrix column count does not match the vector length
    DimensionMismatch { expected: usize, found: usize },
}

impl fmt::Display for LinAlgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Matrix is empty"),
            Self::NotSquare { rows, cols } => {
                write!(f, "Matrix is not square ({} x {})", rows, cols)
            }
            Self::SingularMatrix { determinant } => {
                write!(f, "Matrix is singular (determinant {:e})", determinant)
            }
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "Dimension mismatch: matrix has {} columns, vector has {} entries",
                expected, found
            ),
        }
    }
}

impl std::error::Error for LinAlgError {}

/// Failures of the Newton-Raphson shooting solver
#[derive(Debug, Clone, PartialEq)]
pub enum ShootingError {
    /// Invalid simulation input (step size, indices, ...)
    Simulation(SimulationError),

    /// Jacobian could not be inverted
    LinearAlgebra(LinAlgError),

    /// Iteration budget spent without reaching the tolerance
    NonConvergence { iterations: usize, miss: f64 },

    /// Miss distance became non-finite or grew past the divergence bound
    Diverged { iteration: usize, miss: f64 },
}

impl fmt::Display for ShootingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulation(e) => write!(f, "Simulation failed: {}", e),
            Self::LinearAlgebra(e) => write!(f, "Newton step failed: {}", e),
            Self::NonConvergence { iterations, miss } => write!(
                f,
                "No convergence after {} iterations (miss distance {:e})",
                iterations, miss
            ),
            Self::Diverged { iteration, miss } => write!(
                f,
                "Newton iteration diverged at iteration {} (miss distance {:e})",
                iteration, miss
            ),
        }
    }
}

impl std::error::Error for ShootingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Simulation(e) => Some(e),
            Self::LinearAlgebra(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SimulationError> for ShootingError {
    fn from(e: SimulationError) -> Self {
        Self::Simulation(e)
    }
}

impl From<LinAlgError> for ShootingError {
    fn from(e: LinAlgError) -> Self {
        Self::LinearAlgebra(e)
    }
}

/// Failures of a rocket maneuver
#[derive(Debug, Clone, PartialEq)]
pub enum ManeuverError {
    /// The burn needs more fuel than the rocket carries
    MassBalanceViolation { required: f64, available: f64 },
}

impl fmt::Display for ManeuverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MassBalanceViolation { required, available } => write!(
                f,
                "Burn needs {:e} kg of fuel but only {:e} kg are available",
                required, available
            ),
        }
    }
}

impl std::error::Error for ManeuverError {}
