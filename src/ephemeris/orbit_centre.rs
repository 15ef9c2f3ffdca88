use crate::constants::JulianDate;
use crate::orbit::OrbitalElements;
use crate::sight_errors::SightError;

use super::{Body, PositionProvider, StateVector};

/// A minor body propagated on an unperturbed heliocentric orbit.
///
/// The heliocentric two-body state is added to the barycentric state of the Sun taken from
/// `sun`, so the result lives in the same barycentric frame as every other provider.
#[derive(Clone)]
pub struct OrbitCentre<S: PositionProvider> {
    elements: OrbitalElements,
    sun: S,
}

impl<S: PositionProvider> OrbitCentre<S> {
    pub fn new(elements: OrbitalElements, sun: S) -> Self {
        OrbitCentre { elements, sun }
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }
}

impl<S: PositionProvider> PositionProvider for OrbitCentre<S> {
    fn body(&self) -> Body {
        Body::MinorBody
    }

    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        let sun = self.sun.state_vector(jd)?;
        Ok(sun + self.elements.heliocentric_state(jd)?)
    }

    fn earliest(&self) -> JulianDate {
        self.sun.earliest()
    }

    fn latest(&self) -> JulianDate {
        self.sun.latest()
    }

    fn epoch(&self) -> JulianDate {
        self.sun.epoch()
    }
}

#[cfg(test)]
mod orbit_centre_test {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::constants::J2000;
    use crate::ephemeris::{MeanElementsEphemeris, PlanetCentre, SharedEphemeris};

    #[test]
    fn test_state_is_sun_relative() {
        let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
        let sun = PlanetCentre::sun(eph);
        let elements = OrbitalElements {
            reference_epoch: J2000,
            semi_major_axis: 2.77,
            eccentricity: 0.0785,
            inclination: 10.59f64.to_radians(),
            ascending_node_longitude: 80.3f64.to_radians(),
            periapsis_argument: 73.6f64.to_radians(),
            mean_anomaly: 6.0f64.to_radians(),
        };
        let body = OrbitCentre::new(elements, sun.clone());
        let jd = J2000 + 321.0;

        let helio = body.position(jd).unwrap() - sun.position(jd).unwrap();
        let expected = elements.heliocentric_state(jd).unwrap().position;
        assert_abs_diff_eq!(helio, expected, epsilon = 1e-14);
        assert_eq!(body.body(), Body::MinorBody);
    }
}
