use nalgebra::Vector3;
use ordered_float::NotNan;

use crate::constants::{
    Degree, JulianDate, Meter, Radian, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU, RADEG,
};
use crate::sight_errors::SightError;

/// A geographic location on the Earth's reference ellipsoid.
///
/// The geodetic coordinates are validated once at construction; the parallax constants
/// `ρ·cos φ'` and `ρ·sin φ'` (geocentric distance in Earth equatorial radii times the cosine
/// and sine of the geocentric latitude) are derived from them and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Place {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    height: NotNan<f64>,
    timezone: NotNan<f64>,
    rho_cos_phi: NotNan<f64>,
    rho_sin_phi: NotNan<f64>,
}

impl Place {
    /// Arguments
    /// ---------
    /// * `latitude`: geodetic latitude in degrees, `[-90, 90]`.
    /// * `longitude`: longitude in degrees, positive east, `[-180, 360]`.
    /// * `height`: height above the ellipsoid in meters.
    /// * `timezone`: offset of local civil time from UT, in hours.
    ///
    /// Errors
    /// ------
    /// * [`SightError::NanValue`] if any argument is NaN.
    /// * [`SightError::InvalidPlace`] if an argument is outside its range.
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        height: Meter,
        timezone: f64,
    ) -> Result<Self, SightError> {
        let latitude = NotNan::new(latitude)?;
        let longitude = NotNan::new(longitude)?;
        let height = NotNan::new(height)?;
        let timezone = NotNan::new(timezone)?;

        if latitude.abs() > 90.0 {
            return Err(SightError::InvalidPlace(format!(
                "latitude {latitude}° is outside [-90°, 90°]"
            )));
        }
        if !(-180.0..=360.0).contains(&longitude.into_inner()) {
            return Err(SightError::InvalidPlace(format!(
                "longitude {longitude}° is outside [-180°, 360°]"
            )));
        }
        if !height.is_finite() {
            return Err(SightError::InvalidPlace(format!("height {height} m")));
        }
        if timezone.abs() > 14.0 {
            return Err(SightError::InvalidPlace(format!(
                "timezone offset {timezone} h is outside [-14 h, 14 h]"
            )));
        }

        let (rho_cos_phi, rho_sin_phi) =
            lat_alt_to_parallax(latitude.into_inner() * RADEG, height.into_inner());

        Ok(Place {
            latitude,
            longitude,
            height,
            timezone,
            rho_cos_phi: NotNan::new(rho_cos_phi)?,
            rho_sin_phi: NotNan::new(rho_sin_phi)?,
        })
    }

    /// Geodetic latitude in degrees.
    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    /// Longitude in degrees, positive east.
    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    /// Height above the ellipsoid in meters.
    pub fn height(&self) -> Meter {
        self.height.into_inner()
    }

    /// Offset of local civil time from UT, in hours.
    pub fn timezone(&self) -> f64 {
        self.timezone.into_inner()
    }

    pub fn latitude_rad(&self) -> Radian {
        self.latitude() * RADEG
    }

    pub fn longitude_rad(&self) -> Radian {
        self.longitude() * RADEG
    }

    pub fn rho_cos_phi(&self) -> f64 {
        self.rho_cos_phi.into_inner()
    }

    pub fn rho_sin_phi(&self) -> f64 {
        self.rho_sin_phi.into_inner()
    }

    /// Geocentric latitude φ' in radians.
    pub fn geocentric_latitude(&self) -> Radian {
        self.rho_sin_phi().atan2(self.rho_cos_phi())
    }

    /// Distance from the centre of the Earth, in Earth equatorial radii.
    pub fn geocentric_distance(&self) -> f64 {
        self.rho_cos_phi().hypot(self.rho_sin_phi())
    }

    /// Site vector in the Earth-fixed frame (x towards the Greenwich meridian, z towards the
    /// north pole), in AU.
    pub fn body_fixed_position(&self) -> Vector3<f64> {
        let (sin_lon, cos_lon) = self.longitude_rad().sin_cos();
        Vector3::new(
            ERAU * self.rho_cos_phi() * cos_lon,
            ERAU * self.rho_cos_phi() * sin_lon,
            ERAU * self.rho_sin_phi(),
        )
    }

    /// Local civil time of a UT Julian Date, as a Julian Date.
    pub fn local_time(&self, jd_ut: JulianDate) -> JulianDate {
        jd_ut + self.timezone() / 24.0
    }
}

/// Convert geodetic latitude and height into the normalized parallax constants.
///
/// Arguments
/// ---------
/// * `lat` - Geodetic latitude in **radians**.
/// * `height` - Height above the reference ellipsoid in **meters**.
///
/// Returns
/// -------
/// `(ρ·cos φ', ρ·sin φ')` in units of the Earth equatorial radius.
fn lat_alt_to_parallax(lat: Radian, height: Meter) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // reduced (parametric) latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}
