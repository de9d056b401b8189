//! Rocket mass budget for launch burns (Tsiolkovsky rocket equation)

use super::error::ManeuverError;
use super::states::{Body, NVec3};

/// A rocket with a fixed dry mass, a lander and a fuel reserve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rocket {
    pub dry_mass: f64, // kg
    pub lander_mass: f64, // kg
    pub fuel_mass: f64, // kg
    pub exhaust_velocity: f64, // effective exhaust velocity, m/s
    pub max_thrust: f64, // N
}

impl Rocket {
    /// Dry mass of the Space Shuttle
    pub const SHUTTLE_DRY_MASS: f64 = 7.8e4;
    /// Roughly an Apollo lander
    pub const LANDER_MASS: f64 = 6e3;
    /// Combustion engine effective exhaust velocity
    pub const COMBUSTION_EXHAUST: f64 = 4e3;
    /// Full-burn Space Shuttle engine
    pub const MAX_THRUST: f64 = 3e7;

    pub fn new(fuel_mass: f64) -> Self {
        Self {
            dry_mass: Self::SHUTTLE_DRY_MASS,
            lander_mass: Self::LANDER_MASS,
            fuel_mass,
            exhaust_velocity: Self::COMBUSTION_EXHAUST,
            max_thrust: Self::MAX_THRUST,
        }
    }

    /// Total mass: dry + lander + remaining fuel
    pub fn mass(&self) -> f64 {
        self.dry_mass + self.lander_mass + self.fuel_mass
    }

    /// Fuel burnt to go from `v0` to `v_final` starting at mass `m0`:
    /// v_final - v0 = v_e ln(m0 / m_final)  =>  dm = m0 - m0 / e^((v_final - v0) / v_e)
    pub fn mass_loss(v_final: f64, v0: f64, v_exhaust: f64, m0: f64) -> f64 {
        let m_final = m0 / ((v_final - v0) / v_exhaust).exp();
        m0 - m_final
    }

    /// Rocket after a burn of `delta_v`, or `MassBalanceViolation` if the
    /// fuel does not cover it. Never clamps.
    pub fn burn(&self, delta_v: f64) -> Result<Rocket, ManeuverError> {
        let required = Self::mass_loss(delta_v.abs(), 0.0, self.exhaust_velocity, self.mass());
        if required > self.fuel_mass {
            return Err(ManeuverError::MassBalanceViolation {
                required,
                available: self.fuel_mass,
            });
        }
        Ok(Rocket {
            fuel_mass: self.fuel_mass - required,
            ..*self
        })
    }

    /// Point mass standing in for this rocket in a simulation
    pub fn body(&self, name: &str, x: NVec3, v: NVec3) -> Body {
        Body::new(name, self.mass(), 0.0, x, v)
    }
}
