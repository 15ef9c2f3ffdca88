//! # Position providers
//!
//! Everything the apparent-place solver knows about where a body is comes through the
//! [`PositionProvider`] trait: a barycentric position and velocity (AU, AU/day) in the
//! **equatorial J2000** frame, over a validity range of Julian Dates (TDB).
//!
//! Providers are assembled from a raw [`Ephemeris`] source (a planetary theory or a binary
//! ephemeris reader), which is shared between them through an [`Arc`]:
//!
//! | Provider | Body | Built from |
//! |---|---|---|
//! | [`PlanetCentre`] | Sun, planets, Pluto | one ephemeris component |
//! | [`EarthCentre`] | Earth | Earth–Moon barycentre minus the Moon's share |
//! | [`MoonCentre`] | Moon | Earth centre plus the geocentric Moon |
//! | [`TerrestrialObserver`] | Earth | Earth centre plus a rotating site vector |
//! | [`OrbitCentre`] | minor body | two-body orbit around the Sun |
//!
//! [`MeanElementsEphemeris`] is a self-contained low-precision source that makes the
//! whole chain usable without an external ephemeris file.

use std::fmt;
use std::ops::{Add, Sub};
use std::sync::Arc;

use nalgebra::{Matrix3, Vector3};

use crate::constants::{JulianDate, J2000};
use crate::sight_errors::SightError;

pub mod analytic;
pub mod earth;
pub mod observer;
pub mod orbit_centre;
pub mod planet;

pub use analytic::MeanElementsEphemeris;
pub use earth::{EarthCentre, MoonCentre};
pub use observer::TerrestrialObserver;
pub use orbit_centre::OrbitCentre;
pub use planet::PlanetCentre;

/// Shared handle on a raw ephemeris source.
pub type SharedEphemeris = Arc<dyn Ephemeris>;

/// Position (AU) and velocity (AU/day) of one body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    /// Apply the same rotation to position and velocity.
    pub fn rotated(&self, rotation: &Matrix3<f64>) -> Self {
        StateVector {
            position: rotation * self.position,
            velocity: rotation * self.velocity,
        }
    }

    /// Multiply position and velocity by a scalar.
    pub fn scaled(&self, factor: f64) -> Self {
        StateVector {
            position: self.position * factor,
            velocity: self.velocity * factor,
        }
    }
}

impl Add for StateVector {
    type Output = StateVector;

    fn add(self, rhs: StateVector) -> StateVector {
        StateVector::new(self.position + rhs.position, self.velocity + rhs.velocity)
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: StateVector) -> StateVector {
        StateVector::new(self.position - rhs.position, self.velocity - rhs.velocity)
    }
}

/// Solar-system body a provider stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    /// Asteroid or comet followed on its own orbit.
    MinorBody,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Body::Sun => "Sun",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Moon => "Moon",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::MinorBody => "minor body",
        };
        write!(f, "{name}")
    }
}

/// Quantities tabulated by a raw [`Ephemeris`].
///
/// All components are barycentric except [`Component::MoonGeocentric`], which is the
/// position of the Moon relative to the centre of the Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Sun,
    Mercury,
    Venus,
    EarthMoonBarycentre,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MoonGeocentric,
}

impl Component {
    /// The component holding the centre of `body`, for bodies read directly from the file.
    pub fn for_body(body: Body) -> Option<Component> {
        match body {
            Body::Sun => Some(Component::Sun),
            Body::Mercury => Some(Component::Mercury),
            Body::Venus => Some(Component::Venus),
            Body::Mars => Some(Component::Mars),
            Body::Jupiter => Some(Component::Jupiter),
            Body::Saturn => Some(Component::Saturn),
            Body::Uranus => Some(Component::Uranus),
            Body::Neptune => Some(Component::Neptune),
            Body::Pluto => Some(Component::Pluto),
            Body::Earth | Body::Moon | Body::MinorBody => None,
        }
    }
}

/// Raw ephemeris source: the seam behind which a binary file reader or an analytic
/// theory sits.
pub trait Ephemeris: Send + Sync {
    /// State of `component` at `jd` (TDB), equatorial J2000, AU and AU/day.
    ///
    /// # Errors
    /// [`SightError::EphemerisRange`] outside `[earliest, latest]`,
    /// [`SightError::EphemerisFormat`] when the source data cannot be used.
    fn state(&self, component: Component, jd: JulianDate) -> Result<StateVector, SightError>;

    /// Earth/Moon mass ratio (EMRAT).
    fn earth_moon_mass_ratio(&self) -> f64;

    fn earliest(&self) -> JulianDate;

    fn latest(&self) -> JulianDate;

    /// Epoch of the reference frame of the tabulated states.
    fn epoch(&self) -> JulianDate {
        J2000
    }

    /// Fail with [`SightError::EphemerisRange`] when `jd` is outside the covered span.
    fn check_range(&self, jd: JulianDate) -> Result<(), SightError> {
        let (earliest, latest) = (self.earliest(), self.latest());
        if jd < earliest || jd > latest || jd.is_nan() {
            return Err(SightError::EphemerisRange {
                jd,
                earliest,
                latest,
            });
        }
        Ok(())
    }
}

/// Barycentric position and velocity of one body, as consumed by the apparent-place solver.
pub trait PositionProvider: Send + Sync {
    fn body(&self) -> Body;

    /// Barycentric state at `jd` (TDB), equatorial J2000.
    fn state_vector(&self, jd: JulianDate) -> Result<StateVector, SightError>;

    fn position(&self, jd: JulianDate) -> Result<Vector3<f64>, SightError> {
        Ok(self.state_vector(jd)?.position)
    }

    fn earliest(&self) -> JulianDate;

    fn latest(&self) -> JulianDate;

    fn is_valid(&self, jd: JulianDate) -> bool {
        jd >= self.earliest() && jd <= self.latest()
    }

    /// Epoch of the mean equator and equinox the states are referred to.
    fn epoch(&self) -> JulianDate;

    /// `true` when the provider describes a point on the Earth's surface rather than a
    /// body centre, so that the diurnal parallax is already part of the apparent place.
    fn is_topocentric(&self) -> bool {
        false
    }
}
