use crate::constants::JulianDate;
use crate::sight_errors::SightError;

use super::{Body, Component, PositionProvider, SharedEphemeris, StateVector};

/// Centre of the Sun, a planet or Pluto, read directly from the ephemeris.
#[derive(Clone)]
pub struct PlanetCentre {
    ephemeris: SharedEphemeris,
    body: Body,
    component: Component,
}

impl PlanetCentre {
    /// # Errors
    /// [`SightError::UnsupportedBody`] for the Earth, the Moon and minor bodies, which have
    /// their own providers.
    pub fn new(ephemeris: SharedEphemeris, body: Body) -> Result<Self, SightError> {
        let component = Component::for_body(body).ok_or(SightError::UnsupportedBody(body))?;
        Ok(PlanetCentre {
            ephemeris,
            body,
            component,
        })
    }

    pub fn sun(ephemeris: SharedEphemeris) -> Self {
        PlanetCentre {
            ephemeris,
            body: Body::Sun,
            component: Component::Sun,
        }
    }
}

impl PositionProvider for PlanetCentre {
    fn body(&self) -> Body {
        self.body
    }

    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError> {
        self.ephemeris.state(self.component, jd)
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
