#![allow(dead_code)]

use std::sync::Arc;

use nalgebra::Vector3;

use sightline::apparent::ApparentPlaceSolver;
use sightline::constants::{JulianDate, Radian};
use sightline::earth_orientation::{DeltaT, EarthOrientation, Iau1980};
use sightline::ephemeris::{
    Body, EarthCentre, MeanElementsEphemeris, MoonCentre, PlanetCentre, PositionProvider,
    SharedEphemeris, StateVector, TerrestrialObserver,
};
use sightline::visibility::{LocalVisibility, Place};
use sightline::SightError;

/// 2024-03-20 0h UT
pub const EQUINOX_2024: JulianDate = 2_460_389.5;

pub fn ephemeris() -> SharedEphemeris {
    Arc::new(MeanElementsEphemeris::new())
}

pub fn orientation() -> Arc<dyn EarthOrientation> {
    Arc::new(Iau1980::new(DeltaT::LeapSeconds))
}

pub fn greenwich() -> Place {
    Place::new(51.4769, 0.0, 46.0, 0.0).unwrap()
}

pub fn body_provider(eph: &SharedEphemeris, body: Body) -> Arc<dyn PositionProvider> {
    match body {
        Body::Moon => Arc::new(MoonCentre::new(eph.clone())),
        other => Arc::new(PlanetCentre::new(eph.clone(), other).unwrap()),
    }
}

/// Solver for a target seen from the centre of the Earth.
pub fn geocentric_solver(target: Arc<dyn PositionProvider>) -> ApparentPlaceSolver {
    let eph = ephemeris();
    ApparentPlaceSolver::new(
        Arc::new(EarthCentre::new(eph.clone())),
        target,
        Arc::new(PlanetCentre::sun(eph)),
    )
    .with_earth_orientation(orientation())
}

/// Solver for a target seen by an observer standing at `place`.
pub fn topocentric_solver(target: Arc<dyn PositionProvider>, place: Place) -> ApparentPlaceSolver {
    let eph = ephemeris();
    let observer = TerrestrialObserver::new(EarthCentre::new(eph.clone()), place, orientation());
    ApparentPlaceSolver::new(
        Arc::new(observer),
        target,
        Arc::new(PlanetCentre::sun(eph)),
    )
    .with_earth_orientation(orientation())
}

pub fn geocentric_engine(body: Body, place: Place) -> LocalVisibility {
    let eph = ephemeris();
    LocalVisibility::new(geocentric_solver(body_provider(&eph, body)), place).unwrap()
}

pub fn topocentric_engine(body: Body, place: Place) -> LocalVisibility {
    let eph = ephemeris();
    LocalVisibility::new(topocentric_solver(body_provider(&eph, body), place), place).unwrap()
}

/// A star at a fixed J2000 direction, 10⁶ AU away: negligible parallax, and a light time
/// that keeps the emission epoch inside the analytic ephemeris span.
pub struct FixedStar {
    position: Vector3<f64>,
}

impl FixedStar {
    pub fn new(ra: Radian, dec: Radian) -> Self {
        FixedStar {
            position: Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()) * 1e6,
        }
    }
}

impl PositionProvider for FixedStar {
    fn body(&self) -> Body {
        Body::MinorBody
    }

    fn state_vector(&self, _jd: JulianDate) -> Result<StateVector, SightError> {
        Ok(StateVector::new(self.position, Vector3::zeros()))
    }

    fn earliest(&self) -> JulianDate {
        f64::NEG_INFINITY
    }

    fn latest(&self) -> JulianDate {
        f64::INFINITY
    }

    fn epoch(&self) -> JulianDate {
        sightline::constants::J2000
    }
}

pub fn star_engine(ra: Radian, dec: Radian, place: Place) -> LocalVisibility {
    LocalVisibility::new(geocentric_solver(Arc::new(FixedStar::new(ra, dec))), place).unwrap()
}

/// Hours elapsed since the start of a window opening at 0h UT.
pub fn ut_hours(jd: JulianDate, jdstart: JulianDate) -> f64 {
    (jd - jdstart) * 24.0
}
