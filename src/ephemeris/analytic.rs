//! # Low-precision analytic ephemeris
//!
//! [`MeanElementsEphemeris`] implements [`Ephemeris`] without any data file:
//!
//! - **Planets and the Earth–Moon barycentre**: Keplerian mean elements referred to the
//!   mean ecliptic and equinox of J2000, with linear rates per Julian century
//!   (E. M. Standish, *Keplerian Elements for Approximate Positions of the Major Planets*,
//!   fit over 1800–2050). Positions are good to a few arcminutes for the inner planets.
//! - **Sun**: held at the barycentre.
//! - **Moon**: the low-precision lunar series of the *Astronomical Almanac* (longitude,
//!   latitude and horizontal parallax of date), about 0.3° in position. The longitude is
//!   brought back to the J2000 equinox with the general precession; the velocity is a
//!   central difference.
//!
//! This accuracy is enough for rise, set and transit times at the minute level.

use nalgebra::Vector3;

use crate::constants::{JulianDate, DAYS_PER_CENTURY, ERAU, RADEG};
use crate::orbit::{ecliptic_to_equatorial, OrbitalElements};
use crate::sight_errors::SightError;
use crate::time::centuries_since_j2000;

use super::{Component, Ephemeris, StateVector};

/// Earth/Moon mass ratio (DE405).
pub const EMRAT: f64 = 81.300_56;

/// First date covered by the mean-element fit (1800-01-01).
pub const MEAN_ELEMENTS_EARLIEST: JulianDate = 2_378_496.5;

/// Last date covered by the mean-element fit (2050-12-31).
pub const MEAN_ELEMENTS_LATEST: JulianDate = 2_470_171.5;

/// General precession in longitude, degrees per Julian century.
const GENERAL_PRECESSION: f64 = 1.3972;

/// Step of the central difference used for the lunar velocity, in days.
const MOON_VELOCITY_STEP: f64 = 1e-2;

/// Mean elements of one orbit at J2000 and their rates.
///
/// Angles in degrees, rates per Julian century; `a` in AU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    pub semi_major_axis: (f64, f64),
    pub eccentricity: (f64, f64),
    pub inclination: (f64, f64),
    pub mean_longitude: (f64, f64),
    pub perihelion_longitude: (f64, f64),
    pub node_longitude: (f64, f64),
}

impl MeanElements {
    const fn new(rows: [(f64, f64); 6]) -> Self {
        MeanElements {
            semi_major_axis: rows[0],
            eccentricity: rows[1],
            inclination: rows[2],
            mean_longitude: rows[3],
            perihelion_longitude: rows[4],
            node_longitude: rows[5],
        }
    }

    fn validate(&self) -> Result<(), SightError> {
        let (a, _) = self.semi_major_axis;
        let (e, _) = self.eccentricity;
        if !(a.is_finite() && a > 0.0) {
            return Err(SightError::EphemerisFormat(format!(
                "semi-major axis must be positive, got {a}"
            )));
        }
        if !(0.0..1.0).contains(&e) {
            return Err(SightError::EphemerisFormat(format!(
                "eccentricity must lie in [0, 1), got {e}"
            )));
        }
        Ok(())
    }

    /// Osculating Keplerian elements at `jd` together with the mean motion in rad/day.
    pub fn at(&self, jd: JulianDate) -> (OrbitalElements, f64) {
        let t = centuries_since_j2000(jd);
        let value = |(v0, rate): (f64, f64)| v0 + rate * t;

        let mean_longitude = value(self.mean_longitude);
        let perihelion = value(self.perihelion_longitude);
        let node = value(self.node_longitude);

        let elements = OrbitalElements {
            reference_epoch: jd,
            semi_major_axis: value(self.semi_major_axis),
            eccentricity: value(self.eccentricity),
            inclination: value(self.inclination) * RADEG,
            ascending_node_longitude: node * RADEG,
            periapsis_argument: (perihelion - node) * RADEG,
            mean_anomaly: (mean_longitude - perihelion) * RADEG,
        };
        let mean_motion = self.mean_longitude.1 * RADEG / DAYS_PER_CENTURY;
        (elements, mean_motion)
    }
}

#[rustfmt::skip]
const MERCURY: MeanElements = MeanElements::new([
    (0.38709927, 0.00000037), (0.20563593, 0.00001906), (7.00497902, -0.00594749),
    (252.25032350, 149472.67411175), (77.45779628, 0.16047689), (48.33076593, -0.12534081),
]);

#[rustfmt::skip]
const VENUS: MeanElements = MeanElements::new([
    (0.72333566, 0.00000390), (0.00677672, -0.00004107), (3.39467605, -0.00078890),
    (181.97909950, 58517.81538729), (131.60246718, 0.00268329), (76.67984255, -0.27769418),
]);

#[rustfmt::skip]
const EARTH_MOON_BARYCENTRE: MeanElements = MeanElements::new([
    (1.00000261, 0.00000562), (0.01671123, -0.00004392), (-0.00001531, -0.01294668),
    (100.46457166, 35999.37244981), (102.93768193, 0.32327364), (0.0, 0.0),
]);

#[rustfmt::skip]
const MARS: MeanElements = MeanElements::new([
    (1.52371034, 0.00001847), (0.09339410, 0.00007882), (1.84969142, -0.00813131),
    (-4.55343205, 19140.30268499), (-23.94362959, 0.44441088), (49.55953891, -0.29257343),
]);

#[rustfmt::skip]
const JUPITER: MeanElements = MeanElements::new([
    (5.20288700, -0.00011607), (0.04838624, -0.00013253), (1.30439695, -0.00183714),
    (34.39644051, 3034.74612775), (14.72847983, 0.21252668), (100.47390909, 0.20469106),
]);

#[rustfmt::skip]
const SATURN: MeanElements = MeanElements::new([
    (9.53667594, -0.00125060), (0.05386179, -0.00050991), (2.48599187, 0.00193609),
    (49.95424423, 1222.49362201), (92.59887831, -0.41897216), (113.66242448, -0.28867794),
]);

#[rustfmt::skip]
const URANUS: MeanElements = MeanElements::new([
    (19.18916464, -0.00196176), (0.04725744, -0.00004397), (0.77263783, -0.00242939),
    (313.23810451, 428.48202785), (170.95427630, 0.40805281), (74.01692503, 0.04240589),
]);

#[rustfmt::skip]
const NEPTUNE: MeanElements = MeanElements::new([
    (30.06992276, 0.00026291), (0.00859048, 0.00005105), (1.77004347, 0.00035372),
    (-55.12002969, 218.45945325), (44.96476227, -0.32241464), (131.78422574, -0.00508664),
]);

#[rustfmt::skip]
const PLUTO: MeanElements = MeanElements::new([
    (39.48211675, -0.00031596), (0.24882730, 0.00005170), (17.14001206, 0.00004818),
    (238.92903833, 145.20780515), (224.06891629, -0.04062942), (110.30393684, -0.01183482),
]);

/// Planetary mean elements plus the truncated lunar series.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanElementsEphemeris {
    // Mercury, Venus, EMB, Mars, Jupiter, Saturn, Uranus, Neptune, Pluto
    elements: [MeanElements; 9],
}

impl Default for MeanElementsEphemeris {
    fn default() -> Self {
        MeanElementsEphemeris {
            elements: [
                MERCURY,
                VENUS,
                EARTH_MOON_BARYCENTRE,
                MARS,
                JUPITER,
                SATURN,
                URANUS,
                NEPTUNE,
                PLUTO,
            ],
        }
    }
}

impl MeanElementsEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mean elements of one heliocentric component.
    ///
    /// # Errors
    /// [`SightError::EphemerisFormat`] when the elements do not describe a bound orbit or
    /// when `component` is not a heliocentric orbit (the Sun, the geocentric Moon).
    pub fn with_elements(
        mut self,
        component: Component,
        elements: MeanElements,
    ) -> Result<Self, SightError> {
        elements.validate()?;
        let index = Self::slot(component).ok_or_else(|| {
            SightError::EphemerisFormat(format!("{component:?} has no mean orbital elements"))
        })?;
        self.elements[index] = elements;
        Ok(self)
    }

    pub fn mean_elements(&self, component: Component) -> Option<&MeanElements> {
        Self::slot(component).map(|i| &self.elements[i])
    }

    fn slot(component: Component) -> Option<usize> {
        match component {
            Component::Mercury => Some(0),
            Component::Venus => Some(1),
            Component::EarthMoonBarycentre => Some(2),
            Component::Mars => Some(3),
            Component::Jupiter => Some(4),
            Component::Saturn => Some(5),
            Component::Uranus => Some(6),
            Component::Neptune => Some(7),
            Component::Pluto => Some(8),
            Component::Sun | Component::MoonGeocentric => None,
        }
    }
}

impl Ephemeris for MeanElementsEphemeris {
    fn state(&self, component: Component, jd: JulianDate) -> Result<StateVector, SightError> {
        self.check_range(jd)?;

        match component {
            Component::Sun => Ok(StateVector::new(Vector3::zeros(), Vector3::zeros())),
            Component::MoonGeocentric => {
                let h = MOON_VELOCITY_STEP;
                let before = geocentric_moon(jd - h);
                let after = geocentric_moon(jd + h);
                Ok(StateVector::new(
                    geocentric_moon(jd),
                    (after - before) / (2.0 * h),
                ))
            }
            planet => {
                let index = Self::slot(planet).ok_or_else(|| {
                    SightError::EphemerisFormat(format!("{planet:?} is not tabulated"))
                })?;
                let (elements, mean_motion) = self.elements[index].at(jd);
                Ok(elements
                    .ecliptic_state(mean_motion)?
                    .rotated(&ecliptic_to_equatorial()))
            }
        }
    }

    fn earth_moon_mass_ratio(&self) -> f64 {
        EMRAT
    }

    fn earliest(&self) -> JulianDate {
        MEAN_ELEMENTS_EARLIEST
    }

    fn latest(&self) -> JulianDate {
        MEAN_ELEMENTS_LATEST
    }
}

/// Geocentric position of the Moon, equatorial J2000, AU.
///
/// Ecliptic longitude λ, latitude β and horizontal parallax π of date from the
/// low-precision series of the Astronomical Almanac; the distance is `1 / sin π` Earth radii.
pub fn geocentric_moon(jd: JulianDate) -> Vector3<f64> {
    let t = centuries_since_j2000(jd);
    let sin_deg = |a: f64| (a * RADEG).sin();
    let cos_deg = |a: f64| (a * RADEG).cos();

    let lambda = 218.32 + 481_267.881 * t
        + 6.29 * sin_deg(135.0 + 477_198.87 * t)
        - 1.27 * sin_deg(259.3 - 413_335.36 * t)
        + 0.66 * sin_deg(235.7 + 890_534.22 * t)
        + 0.21 * sin_deg(269.9 + 954_397.74 * t)
        - 0.19 * sin_deg(357.5 + 35_999.05 * t)
        - 0.11 * sin_deg(186.5 + 966_404.03 * t);

    let beta = 5.13 * sin_deg(93.3 + 483_202.02 * t)
        + 0.28 * sin_deg(228.2 + 960_400.89 * t)
        - 0.28 * sin_deg(318.3 + 6_003.15 * t)
        - 0.17 * sin_deg(217.6 - 407_332.21 * t);

    let parallax = 0.9508
        + 0.0518 * cos_deg(135.0 + 477_198.87 * t)
        + 0.0095 * cos_deg(259.3 - 413_335.36 * t)
        + 0.0078 * cos_deg(235.7 + 890_534.22 * t)
        + 0.0028 * cos_deg(269.9 + 954_397.74 * t);

    let distance = ERAU / sin_deg(parallax);

    // equinox of date -> J2000
    let lambda = (lambda - GENERAL_PRECESSION * t) * RADEG;
    let beta = beta * RADEG;

    let ecliptic = Vector3::new(
        beta.cos() * lambda.cos(),
        beta.cos() * lambda.sin(),
        beta.sin(),
    ) * distance;

    ecliptic_to_equatorial() * ecliptic
}

#[cfg(test)]
mod analytic_test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::constants::J2000;
    use crate::ref_system::equatorial_angles;

    #[test]
    fn test_range_is_enforced() {
        let eph = MeanElementsEphemeris::new();
        let err = eph.state(Component::Mars, MEAN_ELEMENTS_EARLIEST - 1.0);
        assert_eq!(
            err,
            Err(SightError::EphemerisRange {
                jd: MEAN_ELEMENTS_EARLIEST - 1.0,
                earliest: MEAN_ELEMENTS_EARLIEST,
                latest: MEAN_ELEMENTS_LATEST,
            })
        );
        assert!(eph.state(Component::Mars, MEAN_ELEMENTS_LATEST).is_ok());
    }

    #[test]
    fn test_earth_moon_barycentre_distance() {
        let eph = MeanElementsEphemeris::new();
        for k in 0..12 {
            let r = eph
                .state(Component::EarthMoonBarycentre, J2000 + 30.0 * k as f64)
                .unwrap()
                .position
                .norm();
            assert!(r > 0.983 && r < 1.017, "{r}");
        }
    }

    #[test]
    fn test_sun_direction_at_march_equinox() {
        // 2024-03-20 03:06 UT: the geocentric Sun crosses RA 0h
        let eph = MeanElementsEphemeris::new();
        let emb = eph
            .state(Component::EarthMoonBarycentre, 2_460_389.63)
            .unwrap();
        let (ra, dec) = equatorial_angles(&(-emb.position));
        let ra = if ra > std::f64::consts::PI {
            ra - crate::constants::DPI
        } else {
            ra
        };
        // J2000 frame: the equinox of date has moved by ~0.34°
        assert_abs_diff_eq!(ra.to_degrees(), -0.33, epsilon = 0.1);
        assert_abs_diff_eq!(dec.to_degrees(), -0.14, epsilon = 0.1);
    }

    #[test]
    fn test_moon_velocity_matches_orbital_speed() {
        let eph = MeanElementsEphemeris::new();
        let moon = eph.state(Component::MoonGeocentric, J2000 + 77.7).unwrap();
        // ~1.02 km/s
        let speed = moon.velocity.norm() * crate::constants::AU / 86_400.0;
        assert!(speed > 0.9 && speed < 1.15, "{speed}");
    }

    #[test]
    fn test_moon_meeus_example() {
        // 1992 April 12, 0h TD: λ = 133.162655°, β = -3.229126°, Δ = 368409.7 km
        let jd = 2_448_724.5;
        let moon = geocentric_moon(jd);
        let distance_km = moon.norm() * crate::constants::AU;
        assert_abs_diff_eq!(distance_km, 368_409.7, epsilon = 2_000.0);

        let ecliptic = ecliptic_to_equatorial().transpose() * moon;
        let t = centuries_since_j2000(jd);
        let lambda = ecliptic.y.atan2(ecliptic.x).to_degrees() + GENERAL_PRECESSION * t;
        let beta = (ecliptic.z / ecliptic.norm()).asin().to_degrees();
        assert_abs_diff_eq!(lambda, 133.162655, epsilon = 0.5);
        assert_abs_diff_eq!(beta, -3.229126, epsilon = 0.3);
    }

    #[test]
    fn test_with_elements_validation() {
        let eph = MeanElementsEphemeris::new();
        let hyperbolic = MeanElements {
            eccentricity: (1.2, 0.0),
            ..MARS
        };
        assert!(matches!(
            eph.clone().with_elements(Component::Mars, hyperbolic),
            Err(SightError::EphemerisFormat(_))
        ));
        assert!(matches!(
            eph.clone().with_elements(Component::Sun, MARS),
            Err(SightError::EphemerisFormat(_))
        ));

        let replaced = eph.with_elements(Component::Jupiter, MARS).unwrap();
        assert_eq!(replaced.mean_elements(Component::Jupiter), Some(&MARS));
    }
}
