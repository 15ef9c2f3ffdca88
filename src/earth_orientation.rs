//! # Earth orientation
//!
//! The [`EarthOrientation`] capability supplies everything the apparent-place solver and
//! the visibility engine need to know about the orientation of the Earth:
//!
//! - the precession matrix between two epochs,
//! - the nutation matrix of date,
//! - the mean obliquity of the ecliptic,
//! - ΔT = TDB − UT,
//! - the Greenwich apparent sidereal time (GAST).
//!
//! [`Iau1980`] implements it with the classical IAU 1976 precession, the IAU 1980 nutation
//! theory (principal terms) and the IAU 1982 sidereal time, which is the accuracy level
//! appropriate for rise/set and transit work.
//!
//! ## Conventions
//!
//! All matrices transform **vectors**: `x_to = M · x_from`. The precession matrix from
//! J2000 to the mean equator of date is `P = R3(-z)·R2(θ)·R3(-ζ)` and the nutation matrix
//! is `N = R1(-ε-Δε)·R3(-Δψ)·R1(ε)`, written here with the active rotations of
//! [`rotmt`].

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ArcSec, JulianDate, Radian, DPI, J2000, RADEG, RADSEC},
    ref_system::rotmt,
    time::{centuries_since_j2000, gmst, leap_second_delta_t, seconds_to_days},
};

/// Earth-orientation capability consumed by the solver and the visibility engine.
pub trait EarthOrientation: Send + Sync {
    /// Precession matrix rotating a vector referred to the mean equator and equinox of
    /// `from` onto the mean equator and equinox of `to`.
    fn precession_matrix(&self, from: JulianDate, to: JulianDate) -> Matrix3<f64>;

    /// Nutation matrix rotating a mean-of-date vector onto the true equator and equinox of date.
    fn nutation_matrix(&self, jd: JulianDate) -> Matrix3<f64>;

    /// Mean obliquity of the ecliptic, in radians.
    fn mean_obliquity(&self, jd: JulianDate) -> Radian;

    /// ΔT = TDB − UT, in **days**.
    fn delta_t(&self, jd: JulianDate) -> f64;

    /// Greenwich apparent sidereal time for a UT Julian Date, in radians `[0, 2π)`.
    fn sidereal_time(&self, jd_ut: JulianDate) -> Radian;
}

/// Source of ΔT used by [`Iau1980`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DeltaT {
    /// TDB − UTC from the leap-second table (see [`leap_second_delta_t`]).
    #[default]
    LeapSeconds,
    /// A constant ΔT, in seconds.
    Fixed(f64),
}

/// IAU 1976/1980 Earth-orientation model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Iau1980 {
    pub delta_t: DeltaT,
}

impl Iau1980 {
    pub fn new(delta_t: DeltaT) -> Self {
        Iau1980 { delta_t }
    }
}

impl EarthOrientation for Iau1980 {
    fn precession_matrix(&self, from: JulianDate, to: JulianDate) -> Matrix3<f64> {
        if from == J2000 {
            return prec(to);
        }
        prec(to) * prec(from).transpose()
    }

    fn nutation_matrix(&self, jd: JulianDate) -> Matrix3<f64> {
        rnut80(jd)
    }

    fn mean_obliquity(&self, jd: JulianDate) -> Radian {
        obleq(jd)
    }

    fn delta_t(&self, jd: JulianDate) -> f64 {
        match self.delta_t {
            DeltaT::LeapSeconds => leap_second_delta_t(jd),
            DeltaT::Fixed(seconds) => seconds_to_days(seconds),
        }
    }

    fn sidereal_time(&self, jd_ut: JulianDate) -> Radian {
        (gmst(jd_ut) + equequ(jd_ut)).rem_euclid(DPI)
    }
}

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// The obliquity ε is a cubic polynomial in Julian centuries `T` since J2000:
///
/// ```text
/// ε(T) = 23°26'21.448" − 46.815"·T − 0.00059"·T² + 0.001813"·T³
/// ```
///
/// evaluated with Horner's scheme.
pub fn obleq(jd: JulianDate) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.00059 * RADSEC;
    let ob3 = 0.001813 * RADSEC;

    let t = centuries_since_j2000(jd);

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// One periodic term of the IAU 1980 nutation series.
///
/// `args` multiplies the fundamental arguments (D, M, M', F, Ω); the coefficients are in
/// units of 0.0001".
struct NutationTerm {
    args: [i8; 5],
    psi: f64,
    psi_t: f64,
    eps: f64,
    eps_t: f64,
}

const fn term(args: [i8; 5], psi: f64, psi_t: f64, eps: f64, eps_t: f64) -> NutationTerm {
    NutationTerm {
        args,
        psi,
        psi_t,
        eps,
        eps_t,
    }
}

/// Principal terms of the IAU 1980 nutation theory (amplitudes down to 0.0007").
const NUTATION_TERMS: [NutationTerm; 40] = [
    term([0, 0, 0, 0, 1], -171996.0, -174.2, 92025.0, 8.9),
    term([-2, 0, 0, 2, 2], -13187.0, -1.6, 5736.0, -3.1),
    term([0, 0, 0, 2, 2], -2274.0, -0.2, 977.0, -0.5),
    term([0, 0, 0, 0, 2], 2062.0, 0.2, -895.0, 0.5),
    term([0, 1, 0, 0, 0], 1426.0, -3.4, 54.0, -0.1),
    term([0, 0, 1, 0, 0], 712.0, 0.1, -7.0, 0.0),
    term([-2, 1, 0, 2, 2], -517.0, 1.2, 224.0, -0.6),
    term([0, 0, 0, 2, 1], -386.0, -0.4, 200.0, 0.0),
    term([0, 0, 1, 2, 2], -301.0, 0.0, 129.0, -0.1),
    term([-2, -1, 0, 2, 2], 217.0, -0.5, -95.0, 0.3),
    term([-2, 0, 1, 0, 0], -158.0, 0.0, 0.0, 0.0),
    term([-2, 0, 0, 2, 1], 129.0, 0.1, -70.0, 0.0),
    term([0, 0, -1, 2, 2], 123.0, 0.0, -53.0, 0.0),
    term([2, 0, 0, 0, 0], 63.0, 0.0, 0.0, 0.0),
    term([0, 0, 1, 0, 1], 63.0, 0.1, -33.0, 0.0),
    term([2, 0, -1, 2, 2], -59.0, 0.0, 26.0, 0.0),
    term([0, 0, -1, 0, 1], -58.0, -0.1, 32.0, 0.0),
    term([0, 0, 1, 2, 1], -51.0, 0.0, 27.0, 0.0),
    term([-2, 0, 2, 0, 0], 48.0, 0.0, 0.0, 0.0),
    term([0, 0, -2, 2, 1], 46.0, 0.0, -24.0, 0.0),
    term([2, 0, 0, 2, 2], -38.0, 0.0, 16.0, 0.0),
    term([0, 0, 2, 2, 2], -31.0, 0.0, 13.0, 0.0),
    term([0, 0, 2, 0, 0], 29.0, 0.0, 0.0, 0.0),
    term([-2, 0, 1, 2, 2], 29.0, 0.0, -12.0, 0.0),
    term([0, 0, 0, 2, 0], 26.0, 0.0, 0.0, 0.0),
    term([-2, 0, 0, 2, 0], -22.0, 0.0, 0.0, 0.0),
    term([0, 0, -1, 2, 1], 21.0, 0.0, -10.0, 0.0),
    term([0, 2, 0, 0, 0], 17.0, -0.1, 0.0, 0.0),
    term([2, 0, -1, 0, 1], 16.0, 0.0, -8.0, 0.0),
    term([-2, 2, 0, 2, 2], -16.0, 0.1, 7.0, 0.0),
    term([0, 1, 0, 0, 1], -15.0, 0.0, 9.0, 0.0),
    term([-2, 0, 1, 0, 1], -13.0, 0.0, 7.0, 0.0),
    term([0, -1, 0, 0, 1], -12.0, 0.0, 6.0, 0.0),
    term([0, 0, 2, -2, 0], 11.0, 0.0, 0.0, 0.0),
    term([2, 0, -1, 2, 1], -10.0, 0.0, 5.0, 0.0),
    term([2, 0, 1, 2, 2], -8.0, 0.0, 3.0, 0.0),
    term([0, 1, 0, 2, 2], 7.0, 0.0, -3.0, 0.0),
    term([-2, 1, 1, 0, 0], -7.0, 0.0, 0.0, 0.0),
    term([0, -1, 0, 2, 2], -7.0, 0.0, 3.0, 0.0),
    term([2, 0, 0, 2, 1], -7.0, 0.0, 3.0, 0.0),
];

/// Compute the nutation angles in longitude and obliquity (IAU 1980 theory).
///
/// Returns `(Δψ, Δε)` in **arcseconds**. The series is evaluated over the principal terms
/// of the theory, driven by the five Delaunay-type arguments:
///
/// - D: mean elongation of the Moon from the Sun
/// - M: mean anomaly of the Sun
/// - M': mean anomaly of the Moon
/// - F: argument of latitude of the Moon
/// - Ω: longitude of the Moon's ascending node
pub fn nutn80(jd: JulianDate) -> (ArcSec, ArcSec) {
    let t = centuries_since_j2000(jd);
    let t2 = t * t;
    let t3 = t2 * t;

    let d = 297.85036 + 445267.111480 * t - 0.0019142 * t2 + t3 / 189474.0;
    let m = 357.52772 + 35999.050340 * t - 0.0001603 * t2 - t3 / 300000.0;
    let mp = 134.96298 + 477198.867398 * t + 0.0086972 * t2 + t3 / 56250.0;
    let f = 93.27191 + 483202.017538 * t - 0.0036825 * t2 + t3 / 327270.0;
    let om = 125.04452 - 1934.136261 * t + 0.0020708 * t2 + t3 / 450000.0;

    let fundamental = [d, m, mp, f, om].map(|deg| (deg % 360.0) * RADEG);

    let (dpsi, deps) = NUTATION_TERMS
        .iter()
        .fold((0.0, 0.0), |(dpsi, deps), term| {
            let arg: f64 = term
                .args
                .iter()
                .zip(fundamental.iter())
                .map(|(&k, &a)| f64::from(k) * a)
                .sum();
            (
                dpsi + (term.psi + term.psi_t * t) * arg.sin(),
                deps + (term.eps + term.eps_t * t) * arg.cos(),
            )
        });

    // 0.0001" → arcseconds
    (dpsi * 1e-4, deps * 1e-4)
}

/// Construct the nutation rotation matrix (IAU 1980).
///
/// Three successive rotations take a vector from the mean equator and equinox of date to
/// the true equator and equinox of date:
///
/// 1. about X by −ε (mean obliquity) onto the ecliptic,
/// 2. about Z by Δψ (nutation in longitude),
/// 3. about X by ε + Δε (true obliquity) back onto the true equator.
pub fn rnut80(jd: JulianDate) -> Matrix3<f64> {
    let epsm = obleq(jd);
    let (dpsi, deps) = nutn80(jd);

    let dpsi = dpsi * RADSEC;
    let epst = epsm + deps * RADSEC;

    rotmt(epst, 0) * rotmt(dpsi, 2) * rotmt(-epsm, 0)
}

/// Compute the equation of the equinoxes (nutation correction) in radians.
///
/// ```text
/// Eq_eq = Δψ · cos(ε)
/// ```
///
/// It is the difference between apparent and mean sidereal time.
pub fn equequ(jd: JulianDate) -> Radian {
    let oblm = obleq(jd);
    let (dpsi, _deps) = nutn80(jd);

    RADSEC * dpsi * oblm.cos()
}

/// Compute the precession matrix from J2000 to the mean equator and equinox of date
/// (IAU 1976 model).
///
/// The precession angles are polynomials in Julian centuries `T` since J2000:
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ(T) = (0.5567530 − 0.0001185·T − 0.0000116·T²) · T  [deg]
/// z(T) = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// ```
pub fn prec(jd: JulianDate) -> Matrix3<f64> {
    let zed = 0.6406161 * RADEG;
    let zd = 0.6406161 * RADEG;
    let thd = 0.5567530 * RADEG;

    let zedd = 0.0000839 * RADEG;
    let zdd = 0.0003041 * RADEG;
    let thdd = -0.0001185 * RADEG;

    let zeddd = 0.0000050 * RADEG;
    let zddd = 0.0000051 * RADEG;
    let thddd = -0.0000116 * RADEG;

    let t = centuries_since_j2000(jd);

    let zeta = ((zeddd * t + zedd) * t + zed) * t;
    let z = ((zddd * t + zdd) * t + zd) * t;
    let theta = ((thddd * t + thdd) * t + thd) * t;

    rotmt(z, 2) * rotmt(-theta, 1) * rotmt(zeta, 2)
}
