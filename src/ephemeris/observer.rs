use std::sync::Arc;

use nalgebra::Vector3;

use crate::constants::{JulianDate, DPI, SIDEREAL_RATIO};
use crate::earth_orientation::EarthOrientation;
use crate::ref_system::rotmt;
use crate::sight_errors::SightError;
use crate::visibility::Place;

use super::{Body, EarthCentre, PositionProvider, StateVector};

/// An observer standing at a [`Place`] on the rotating Earth.
///
/// The barycentric state is the Earth centre plus the geocentric site vector, so apparent
/// places computed from here are **topocentric**: the diurnal parallax and the diurnal
/// aberration are part of the result.
#[derive(Clone)]
pub struct TerrestrialObserver {
    earth: EarthCentre,
    place: Place,
    orientation: Arc<dyn EarthOrientation>,
}

impl TerrestrialObserver {
    pub fn new(earth: EarthCentre, place: Place, orientation: Arc<dyn EarthOrientation>) -> Self {
        TerrestrialObserver {
            earth,
            place,
            orientation,
        }
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    /// Geocentric position and velocity of the site, equatorial frame of
    /// [`PositionProvider::epoch`], AU and AU/day.
    ///
    /// Arguments
    /// ---------
    /// * `jd`: Julian Date (TDB).
    ///
    /// Remarks
    /// -------
    /// 1. The body-fixed site vector is rotated by the Greenwich apparent sidereal time to
    ///    the true equator and equinox of date.
    /// 2. The site velocity is `ω × r` with the sidereal rotation rate of the Earth.
    /// 3. Nutation and precession are undone to reach the mean equator of the epoch.
    pub fn geocentric_state(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        let omega = Vector3::new(0.0, 0.0, DPI * SIDEREAL_RATIO);

        let dxbf = self.place.body_fixed_position();
        let dvbf = omega.cross(&dxbf);

        let jd_ut = jd - self.orientation.delta_t(jd);
        let gast = self.orientation.sidereal_time(jd_ut);

        let to_epoch = self.orientation.precession_matrix(jd, self.epoch())
            * self.orientation.nutation_matrix(jd).transpose()
            * rotmt(gast, 2);

        Ok(StateVector::new(to_epoch * dxbf, to_epoch * dvbf))
    }
}

impl PositionProvider for TerrestrialObserver {
    fn body(&self) -> Body {
        Body::Earth
    }

    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        Ok(self.earth.state_vector(jd)? + self.geocentric_state(jd)?)
    }

    fn earliest(&self) -> JulianDate {
        self.earth.earliest()
    }

    fn latest(&self) -> JulianDate {
        self.earth.latest()
    }

    fn epoch(&self) -> JulianDate {
        self.earth.epoch()
    }

    fn is_topocentric(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod observer_test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::constants::{EARTH_MAJOR_AXIS, ERAU, J2000, RADEG};
    use crate::earth_orientation::{DeltaT, Iau1980};
    use crate::ephemeris::{MeanElementsEphemeris, SharedEphemeris};
    use crate::ref_system::equatorial_angles;

    fn observer(lat: f64, lon: f64) -> TerrestrialObserver {
        let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
        TerrestrialObserver::new(
            EarthCentre::new(eph),
            Place::new(lat, lon, 0.0, 0.0).unwrap(),
            Arc::new(Iau1980::new(DeltaT::Fixed(0.0))),
        )
    }

    #[test]
    fn test_site_distance_and_speed() {
        let obs = observer(0.0, 0.0);
        let state = obs.geocentric_state(J2000 + 10.25).unwrap();
        assert_abs_diff_eq!(state.position.norm(), ERAU, epsilon = 1e-12);

        // equatorial rotation speed ≈ 465 m/s
        let speed = state.velocity.norm() * EARTH_MAJOR_AXIS / ERAU / 86_400.0;
        assert_abs_diff_eq!(speed, 465.1, epsilon = 0.5);
    }

    #[test]
    fn test_site_meridian_follows_sidereal_time() {
        // at the equator the site points at RA = GAST + λ, Dec = 0 (up to precession)
        let orientation = Iau1980::new(DeltaT::Fixed(0.0));
        let jd = J2000 + 0.3;
        let obs = observer(0.0, 45.0);
        let (ra, dec) = equatorial_angles(&obs.geocentric_state(jd).unwrap().position);
        let expected = (orientation.sidereal_time(jd) + 45.0 * RADEG).rem_euclid(DPI);
        assert_abs_diff_eq!(ra, expected, epsilon = 2e-4);
        assert_abs_diff_eq!(dec, 0.0, epsilon = 2e-4);
    }

    #[test]
    fn test_observer_is_topocentric() {
        let obs = observer(48.0, 2.0);
        assert!(obs.is_topocentric());
        assert_eq!(obs.body(), Body::Earth);
        assert!(!obs.earth.is_topocentric());
    }
}
