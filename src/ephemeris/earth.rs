use crate::constants::JulianDate;
use crate::sight_errors::SightError;

use super::{Body, Component, PositionProvider, SharedEphemeris, StateVector};

/// Barycentric centre of the Earth.
///
/// The ephemeris tabulates the Earth–Moon barycentre and the geocentric Moon; the Earth
/// sits on the opposite side of the barycentre at `Moon / (1 + EMRAT)`.
#[derive(Clone)]
pub struct EarthCentre {
    ephemeris: SharedEphemeris,
}

impl EarthCentre {
    pub fn new(ephemeris: SharedEphemeris) -> Self {
        EarthCentre { ephemeris }
    }

    /// Barycentric Earth state together with the geocentric Moon state, both at `jd`.
    pub(crate) fn with_geocentric_moon(
        &self,
        jd: JulianDate,
    ) -> Result<(StateVector, StateVector), SightError> {
        let emb = self.ephemeris.state(Component::EarthMoonBarycentre, jd)?;
        let moon = self.ephemeris.state(Component::MoonGeocentric, jd)?;
        let emrat = self.ephemeris.earth_moon_mass_ratio();
        Ok((emb - moon.scaled(1.0 / (1.0 + emrat)), moon))
    }
}

impl PositionProvider for EarthCentre {
    fn body(&self) -> Body {
        Body::Earth
    }

    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        Ok(self.with_geocentric_moon(jd)?.0)
    }

    fn earliest(&self) -> JulianDate {
        self.ephemeris.earliest()
    }

    fn latest(&self) -> JulianDate {
        self.ephemeris.latest()
    }

    fn epoch(&self) -> JulianDate {
        self.ephemeris.epoch()
    }
}

/// Barycentric centre of the Moon.
#[derive(Clone)]
pub struct MoonCentre {
    earth: EarthCentre,
}

impl MoonCentre {
    pub fn new(ephemeris: SharedEphemeris) -> Self {
        MoonCentre {
            earth: EarthCentre::new(ephemeris),
        }
    }
}

impl PositionProvider for MoonCentre {
    fn body(&self) -> Body {
        Body::Moon
    }

    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        let (earth, moon) = self.earth.with_geocentric_moon(jd)?;
        Ok(earth + moon)
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
}
