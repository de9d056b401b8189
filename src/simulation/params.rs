//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size and end time,
//! - gravitational constant (`G`)

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub t_end: f64, // time end, s
    pub h0: f64, // step size, s
    pub G: f64, // gravitational constant
}
