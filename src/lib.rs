pub mod catalog;
pub mod config;
pub mod coords;
pub mod render;
pub mod scene;
pub mod tail;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Offset in kpc: x towards east, y towards north, z away from Earth.
pub type Position = Vector3<f64>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GalaxyRecord {
    pub name: String,
    /// Right ascension in hours (1h = 15 degrees)
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    /// Recession velocity in km/s
    pub redshift_velocity: f64,
}

impl GalaxyRecord {
    pub fn new(name: impl Into<String>, ra: f64, dec: f64, redshift_velocity: f64) -> Self {
        GalaxyRecord {
            name: name.into(),
            ra,
            dec,
            redshift_velocity,
        }
    }

    /// Builds a record from catalogue notation: `ra` as (h, m, s) and `dec` as (d, ′, ″).
    pub fn from_sexagesimal(
        name: impl Into<String>,
        ra: (f64, f64, f64),
        dec: (f64, f64, f64),
        redshift_velocity: f64,
    ) -> Self {
        let ra_hours = ra.0 + ra.1 / 60.0 + ra.2 / 3600.0;
        let dec_magnitude = dec.0.abs() + dec.1 / 60.0 + dec.2 / 3600.0;
        let dec_degrees = if dec.0.is_sign_negative() {
            -dec_magnitude
        } else {
            dec_magnitude
        };
        GalaxyRecord::new(name, ra_hours, dec_degrees, redshift_velocity)
    }

    pub fn ra_degrees(&self) -> f64 {
        self.ra * 15.0
    }
}

pub fn distance(a: &Position, b: &Position) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn sexagesimal_conversion() {
        let g = GalaxyRecord::from_sexagesimal("M66", (11.0, 20.0, 15.0), (12.0, 59.0, 30.0), 727.0);
        assert_approx_eq!(g.ra, 11.3375, 1e-9);
        assert_approx_eq!(g.dec, 12.991_666_666, 1e-6);
        assert_approx_eq!(g.ra_degrees(), 170.0625, 1e-9);

        let south = GalaxyRecord::from_sexagesimal("S", (0.0, 0.0, 0.0), (-5.0, 30.0, 0.0), 0.0);
        assert_approx_eq!(south.dec, -5.5, 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(0.0, 3.0, 0.0);
        let b = Position::new(4.0, 0.0, 0.0);
        assert_approx_eq!(distance(&a, &b), 5.0, 1e-12);
        assert_approx_eq!(distance(&b, &a), 5.0, 1e-12);
    }
}
