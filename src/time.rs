use hifitime::Epoch;

use crate::constants::{
    JulianDate, Radian, DAYS_PER_CENTURY, DPI, J2000, JDTOMJD, MJD, SECONDS_PER_DAY,
    SIDEREAL_RATIO,
};

/// Transformation from julian date (JD) in modified julian date (MJD)
pub fn jd_to_mjd(jd: JulianDate) -> MJD {
    jd - JDTOMJD
}

/// Transformation from modified julian date (MJD) in julian date (JD)
pub fn mjd_to_jd(mjd: MJD) -> JulianDate {
    mjd + JDTOMJD
}

/// Julian centuries elapsed since J2000.0.
pub fn centuries_since_j2000(jd: JulianDate) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

/// Difference TDB − UTC in **days** from the leap-second table.
///
/// This is the ΔT used when no measured UT1 is at hand: UT1 stays within 0.9 s of UTC,
/// so TDB − UTC = 32.184 s + (TAI − UTC) is a good approximation of TDB − UT over the
/// leap-second era. The conversion is done by [`hifitime`].
///
/// # Arguments
/// * `jd_tdb` - Julian Date in the TDB scale.
pub fn leap_second_delta_t(jd_tdb: JulianDate) -> f64 {
    let epoch = Epoch::from_jde_tdb(jd_tdb);
    jd_tdb - epoch.to_jde_utc_days()
}

/// Convert a ΔT expressed in seconds into days.
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `jd_ut` - Julian Date (UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # Details
/// The GMST is computed in two steps:
/// 1. Use a cubic polynomial (coefficients C0–C3) to get GMST at 0h UT1
///    in seconds for the given date.
/// 2. Add the contribution of Earth's rotation during the fractional day
///    using [`SIDEREAL_RATIO`], which converts solar days to sidereal days.
///
/// # References
/// * IAU 1982, IERS Conventions 1996/2000.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(jd_ut: JulianDate) -> Radian {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Days are counted from midnight in MJD, which keeps 0h UT1 on integer values
    let tjm = jd_to_mjd(jd_ut);
    let itjm = tjm.floor();
    let t = centuries_since_j2000(mjd_to_jd(itjm));

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    let h = (tjm - itjm) * DPI;

    (gmst0 + h * SIDEREAL_RATIO).rem_euclid(DPI)
}
