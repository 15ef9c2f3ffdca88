//! # Keplerian orbital elements
//!
//! This module defines [`OrbitalElements`], the **classical orbital element
//! representation** used to place a body on a heliocentric two-body orbit.
//!
//! ## Elements
//!
//! 1. **a** – Semi-major axis (AU)
//! 2. **e** – Eccentricity (unitless, `0 ≤ e < 1`)
//! 3. **i** – Inclination (radians)
//! 4. **Ω** – Longitude of ascending node (radians)
//! 5. **ω** – Argument of periapsis (radians)
//! 6. **M** – Mean anomaly at epoch (radians)
//!
//! Angles are referred to the **mean ecliptic and equinox of J2000**; the states produced
//! by [`OrbitalElements::heliocentric_state`] are rotated to the **equatorial J2000**
//! frame used by every position provider of the crate.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **radians**
//! - Time: **days** (epoch as a TDB Julian Date)

use nalgebra::{Matrix3, Vector3};

use crate::{
    constants::{JulianDate, Radian, GAUSS_GRAV, J2000},
    earth_orientation::obleq,
    ephemeris::StateVector,
    kepler::eccentric_anomaly,
    ref_system::rotmt,
    sight_errors::SightError,
};

/// Classical Keplerian elements of a heliocentric orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Epoch of the elements (Julian Date, TDB).
    pub reference_epoch: JulianDate,
    /// Semi-major axis (AU).
    pub semi_major_axis: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination on the J2000 ecliptic (radians).
    pub inclination: Radian,
    /// Longitude of the ascending node (radians).
    pub ascending_node_longitude: Radian,
    /// Argument of periapsis (radians).
    pub periapsis_argument: Radian,
    /// Mean anomaly at `reference_epoch` (radians).
    pub mean_anomaly: Radian,
}

impl OrbitalElements {
    /// Two-body mean motion `n = k / a^{3/2}` in radians per day.
    pub fn mean_motion(&self) -> f64 {
        GAUSS_GRAV / self.semi_major_axis.powf(1.5)
    }

    /// Position and velocity on the **J2000 ecliptic** at the reference epoch, for a given
    /// mean motion (radians/day).
    ///
    /// The state is first computed in the perifocal frame from the eccentric anomaly, then
    /// rotated by `Rz(Ω)·Rx(i)·Rz(ω)`.
    pub fn ecliptic_state(&self, mean_motion: f64) -> Result<StateVector, SightError> {
        let a = self.semi_major_axis;
        let e = self.eccentricity;

        let ecc_anom = eccentric_anomaly(self.mean_anomaly, e)?;
        let (sin_e, cos_e) = ecc_anom.sin_cos();
        let sqrt_1me2 = (1.0 - e * e).sqrt();

        let perifocal_pos = Vector3::new(a * (cos_e - e), a * sqrt_1me2 * sin_e, 0.0);

        let edot = mean_motion / (1.0 - e * cos_e);
        let perifocal_vel = Vector3::new(-a * sin_e * edot, a * sqrt_1me2 * cos_e * edot, 0.0);

        let orientation = self.orientation();

        Ok(StateVector::new(
            orientation * perifocal_pos,
            orientation * perifocal_vel,
        ))
    }

    /// Propagate the elements to `jd` on an unperturbed orbit and return the heliocentric
    /// state in the **equatorial J2000** frame.
    pub fn heliocentric_state(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        let n = self.mean_motion();
        let propagated = OrbitalElements {
            reference_epoch: jd,
            mean_anomaly: self.mean_anomaly + n * (jd - self.reference_epoch),
            ..*self
        };
        Ok(propagated.ecliptic_state(n)?.rotated(&ecliptic_to_equatorial()))
    }

    fn orientation(&self) -> Matrix3<f64> {
        rotmt(self.ascending_node_longitude, 2)
            * rotmt(self.inclination, 0)
            * rotmt(self.periapsis_argument, 2)
    }
}

/// Rotation from the mean ecliptic of J2000 to the mean equator of J2000.
pub fn ecliptic_to_equatorial() -> Matrix3<f64> {
    rotmt(obleq(J2000), 0)
}

#[cfg(test)]
mod orbit_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::constants::GAUSS_GRAV_SQUARED;

    fn earth_like() -> OrbitalElements {
        OrbitalElements {
            reference_epoch: J2000,
            semi_major_axis: 1.0,
            eccentricity: 0.0167,
            inclination: 0.0,
            ascending_node_longitude: 0.0,
            periapsis_argument: 102.9f64.to_radians(),
            mean_anomaly: 0.3,
        }
    }

    #[test]
    fn test_energy_is_conserved() {
        let orbit = earth_like();
        let energy = |s: &StateVector| {
            0.5 * s.velocity.norm_squared() - GAUSS_GRAV_SQUARED / s.position.norm()
        };
        let e0 = energy(&orbit.heliocentric_state(J2000).unwrap());
        let e1 = energy(&orbit.heliocentric_state(J2000 + 123.4).unwrap());
        assert_abs_diff_eq!(e0, e1, epsilon = 1e-12);
        assert_abs_diff_eq!(e0, -GAUSS_GRAV_SQUARED / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_period_returns_to_start() {
        let orbit = earth_like();
        let period = std::f64::consts::TAU / orbit.mean_motion();
        let s0 = orbit.heliocentric_state(J2000).unwrap();
        let s1 = orbit.heliocentric_state(J2000 + period).unwrap();
        assert_abs_diff_eq!(s0.position, s1.position, epsilon = 1e-10);
    }

    #[test]
    fn test_ecliptic_orbit_is_tilted_in_equatorial_frame() {
        // An orbit in the ecliptic plane has z/y = tan(ε) in equatorial coordinates
        let state = earth_like().heliocentric_state(J2000 + 40.0).unwrap();
        let p = state.position;
        assert_abs_diff_eq!(p.z / p.y, obleq(J2000).tan(), epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_matches_finite_difference() {
        let orbit = OrbitalElements {
            eccentricity: 0.4,
            inclination: 0.3,
            ascending_node_longitude: 1.1,
            ..earth_like()
        };
        let h = 1e-3;
        let t = J2000 + 17.0;
        let before = orbit.heliocentric_state(t - h).unwrap().position;
        let after = orbit.heliocentric_state(t + h).unwrap().position;
        let velocity = orbit.heliocentric_state(t).unwrap().velocity;
        assert_abs_diff_eq!((after - before) / (2.0 * h), velocity, epsilon = 1e-9);
    }
}
