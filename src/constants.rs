//! # Constants and type definitions for Sightline
//!
//! This module centralizes the **physical constants**, **conversion factors** and
//! **type aliases** shared by the apparent-place solver and the visibility engine.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (AU, Earth ellipsoid, speed of light)
//! - Relativistic constants used by the light-time and deflection corrections
//! - Unit conversions (degrees, arcminutes, arcseconds ↔ radians)
//! - Core type aliases used across the crate
//!
//! Time is a real-valued Julian Date everywhere in the crate.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000: JulianDate = 2_451_545.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcminutes → radians
pub const RADMIN: f64 = std::f64::consts::PI / 10_800.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648_000.0;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth equatorial radius expressed in astronomical units
pub const ERAU: f64 = (EARTH_MAJOR_AXIS / 1000.) / AU;

/// Earth rotation rate relative to the equinox, in sidereal days per solar day
pub const SIDEREAL_RATIO: f64 = 1.002_737_909_34;

/// Gaussian gravitational constant k (heliocentric two-body dynamics)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day²
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = 173.1446;

/// Solar gravitational radius GM☉/c² in astronomical units.
///
/// Enters the Shapiro delay of the light-time equation and the
/// gravitational light deflection by the Sun.
pub const SUN_GRAV_RADIUS: f64 = 9.87e-9;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcminutes
pub type ArcMin = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Julian Date (days), TDB or UT depending on context
pub type JulianDate = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
