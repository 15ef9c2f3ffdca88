//! # Sightline
//!
//! Apparent places of solar-system bodies and the local circumstances that follow from
//! them: meridian transits, rising and setting, and twilight.
//!
//! ## Layout
//!
//! - [`ephemeris`]: barycentric position providers (planets, Earth, Moon, a terrestrial
//!   observer, two-body orbits) and a built-in low-precision analytic ephemeris.
//! - [`earth_orientation`]: precession, nutation, ΔT and sidereal time.
//! - [`apparent`]: the apparent-place solver (light time, light deflection, aberration,
//!   frame of date).
//! - [`visibility`]: transit and altitude-crossing searches for a geographic place.
//! - [`root_finding`]: the scalar root and extremum searches behind them.
//!
//! Time is a real Julian Date throughout: TDB unless stated otherwise, UT for the
//! visibility engine. Distances are in AU and angles in radians.
//!
//! ## Logging
//!
//! The crate reports fallbacks and convergence failures through the [`log`] facade and
//! never installs a logger itself.

pub mod apparent;
pub mod constants;
pub mod earth_orientation;
pub mod ephemeris;
pub mod kepler;
pub mod orbit;
pub mod ref_system;
pub mod root_finding;
pub mod sight_errors;
pub mod time;
pub mod visibility;

pub use apparent::{ApparentPlace, ApparentPlaceSolver, SolverConfig};
pub use sight_errors::SightError;
pub use visibility::{Event, EventKind, Horizon, LocalVisibility, Place, VisibilityConfig};
