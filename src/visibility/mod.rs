//! # Local visibility: transits, rising, setting and twilight
//!
//! [`LocalVisibility`] drives an [`ApparentPlaceSolver`] from a geographic [`Place`] and
//! finds, inside the one-day window `[jdstart, jdstart + 1)`:
//!
//! - **meridian transits** ([`LocalVisibility::find_transits`]), by Newton steps on the
//!   hour angle with the mean sidereal rate of the body,
//! - **altitude-threshold crossings** ([`LocalVisibility::find_altitude_crossings`]): the
//!   altitude is sampled at the window ends and at each transit (refined to the local
//!   extremum), and every sign change of `altitude − threshold` is refined by false
//!   position, then bisection.
//!
//! The threshold altitude is selected by a [`Horizon`] policy.
//!
//! | Policy | Sun | Other bodies |
//! |---|---|---|
//! | [`Horizon::UpperLimb`] | −34′ − 16′ | −34′ |
//! | [`Horizon::LowerLimb`] | −34′ + 16′ | −34′ |
//! | [`Horizon::CentreOfDisk`] | −34′ | −34′ |
//! | [`Horizon::CivilTwilight`] | −6° | unsupported |
//! | [`Horizon::NauticalTwilight`] | −12° | unsupported |
//! | [`Horizon::AstronomicalTwilight`] | −18° | unsupported |
//!
//! For the Moon seen from the centre of the Earth, the threshold is raised by the
//! horizontal parallax, scaled for the limb (the lunar semidiameter is 0.2724 of the
//! parallax). Seen by a topocentric observer the parallax is already in the apparent place
//! and only the semidiameter is applied for the limb policies.
//!
//! A body that never reaches the threshold in the window (circumpolar, or always below)
//! simply yields no crossing events.
//!
//! ## Time scale
//!
//! Every `jd`/`jdstart` taken by the engine is a **UT** Julian Date, and every [`Event`]
//! instant is reported in UT. The apparent place is solved at the matching TDB instant
//! `jd + ΔT(jd)`, while the sidereal time is taken at `jd` itself.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    apparent::{ApparentPlace, ApparentPlaceSolver},
    constants::{ArcMin, JulianDate, Radian, AU, DPI, EARTH_MAJOR_AXIS, RADEG, RADMIN},
    earth_orientation::EarthOrientation,
    ephemeris::Body,
    ref_system::signed_angle,
    root_finding::{
        golden_section_maximum, golden_section_minimum, parabolic_extremum, refine_root,
        RefineOptions, RootSearch,
    },
    sight_errors::{SearchStage, SightError},
};

pub mod event;
pub mod place;

pub use event::{Event, EventKind};
pub use place::Place;

/// Limb factor of the lunar parallax for the upper limb (1 − k, k = Moon/Earth radius ratio).
const MOON_UPPER_LIMB_FACTOR: f64 = 0.7276;
const MOON_CENTRE_FACTOR: f64 = 1.0;
const MOON_LOWER_LIMB_FACTOR: f64 = 1.2724;

/// Sun elevation below which the refraction model of [`LocalVisibility::apparent_altitude`]
/// is switched off, in degrees.
const SUNRISE_SUNSET_ANGLE: f64 = -0.83337;

/// Altitude threshold selector for rise/set and twilight searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    UpperLimb,
    LowerLimb,
    CentreOfDisk,
    CivilTwilight,
    NauticalTwilight,
    AstronomicalTwilight,
}

impl Horizon {
    fn twilight_depression(&self) -> Option<f64> {
        match self {
            Horizon::CivilTwilight => Some(6.0),
            Horizon::NauticalTwilight => Some(12.0),
            Horizon::AstronomicalTwilight => Some(18.0),
            _ => None,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Horizon::UpperLimb => "upper limb",
            Horizon::LowerLimb => "lower limb",
            Horizon::CentreOfDisk => "centre of disk",
            Horizon::CivilTwilight => "civil twilight",
            Horizon::NauticalTwilight => "nautical twilight",
            Horizon::AstronomicalTwilight => "astronomical twilight",
        };
        write!(f, "{name}")
    }
}

/// Tuning of the visibility searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Horizontal refraction (arcminutes).
    pub refraction: ArcMin,
    /// Mean solar semidiameter (arcminutes).
    pub solar_semidiameter: ArcMin,
    /// Convergence of the transit search (days).
    pub transit_tolerance: f64,
    pub max_transit_iterations: usize,
    /// Half spacing of the three samples used to locate the altitude extremum at a transit
    /// (days).
    pub extremum_half_width: f64,
    pub false_position_iterations: usize,
    pub bisection_iterations: usize,
    /// A crossing is accepted when `|altitude − threshold|` is below this (arcminutes).
    pub altitude_tolerance: ArcMin,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        VisibilityConfig {
            refraction: 34.0,
            solar_semidiameter: 16.0,
            transit_tolerance: 1e-5,
            max_transit_iterations: 50,
            extremum_half_width: 30.0 / 1440.0,
            false_position_iterations: 20,
            bisection_iterations: 20,
            altitude_tolerance: 0.1,
        }
    }
}

impl VisibilityConfig {
    fn refine_options(&self) -> RefineOptions {
        RefineOptions {
            false_position_iterations: self.false_position_iterations,
            bisection_iterations: self.bisection_iterations,
            tolerance: self.altitude_tolerance * RADMIN,
        }
    }
}

/// Result of the refinement of one pair of consecutive altitude samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingOutcome {
    pub start: JulianDate,
    pub end: JulianDate,
    /// [`EventKind::Rise`] or [`EventKind::Set`] when the pair brackets a crossing.
    pub kind: Option<EventKind>,
    pub search: RootSearch,
}

/// Transit and rise/set finder for one target seen from one place.
#[derive(Clone)]
pub struct LocalVisibility {
    solver: ApparentPlaceSolver,
    place: Place,
    config: VisibilityConfig,
}

impl LocalVisibility {
    /// # Errors
    /// [`SightError::MissingEarthOrientation`] when `solver` has no Earth-orientation
    /// provider: hour angles need the sidereal time and the of-date right ascension.
    pub fn new(solver: ApparentPlaceSolver, place: Place) -> Result<Self, SightError> {
        if solver.earth_orientation().is_none() {
            return Err(SightError::MissingEarthOrientation);
        }
        Ok(LocalVisibility {
            solver,
            place,
            config: VisibilityConfig::default(),
        })
    }

    pub fn with_config(mut self, config: VisibilityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solver(&self) -> &ApparentPlaceSolver {
        &self.solver
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    fn orientation(&self) -> Result<&dyn EarthOrientation, SightError> {
        self.solver
            .earth_orientation()
            .ok_or(SightError::MissingEarthOrientation)
    }

    fn body(&self) -> Body {
        self.solver.target().body()
    }

    /// TDB instant matching the UT Julian Date `jd`.
    fn tdb(&self, jd: JulianDate) -> Result<JulianDate, SightError> {
        Ok(jd + self.orientation()?.delta_t(jd))
    }

    /// Apparent place at the UT instant `jd` with its local hour angle in `[−π, π)`.
    fn local_place(&self, jd: JulianDate) -> Result<(ApparentPlace, Radian), SightError> {
        let orientation = self.orientation()?;
        let apparent = self.solver.solve(self.tdb(jd)?)?;
        let gast = orientation.sidereal_time(jd);
        let hour_angle =
            signed_angle(gast - apparent.ra_of_date()? + self.place.longitude_rad());
        Ok((apparent, hour_angle))
    }

    /// Local hour angle of the target at `jd` (UT), in `[−π, π)`; negative east of the
    /// meridian.
    pub fn hour_angle(&self, jd: JulianDate) -> Result<Radian, SightError> {
        Ok(self.local_place(jd)?.1)
    }

    /// Altitude above the geometric horizon at `jd` (UT), without refraction.
    pub fn geometric_altitude(&self, jd: JulianDate) -> Result<Radian, SightError> {
        let (apparent, hour_angle) = self.local_place(jd)?;
        let dec = apparent.dec_of_date()?;
        let (sin_lat, cos_lat) = self.place.latitude_rad().sin_cos();
        let sin_alt = sin_lat * dec.sin() + cos_lat * dec.cos() * hour_angle.cos();
        Ok(sin_alt.clamp(-1.0, 1.0).asin())
    }

    /// Altitude including atmospheric refraction (Sæmundsson formula scaled for
    /// temperature and pressure), as used by the NREL solar position algorithm.
    ///
    /// Arguments
    /// ---------
    /// * `jd`: UT Julian Date.
    /// * `temperature`: air temperature in °C.
    /// * `pressure`: air pressure in millibars.
    pub fn apparent_altitude(
        &self,
        jd: JulianDate,
        temperature: f64,
        pressure: f64,
    ) -> Result<Radian, SightError> {
        let e0 = self.geometric_altitude(jd)? / RADEG;
        if e0 <= SUNRISE_SUNSET_ANGLE {
            return Ok(e0 * RADEG);
        }
        let refraction = (pressure / 1010.0) * (283.0 / (273.0 + temperature)) * 1.02
            / (60.0 * ((e0 + 10.3 / (e0 + 5.11)) * RADEG).tan());
        Ok((e0 + refraction) * RADEG)
    }

    /// Threshold altitude selected by `policy` for the target, evaluated at `jd` (UT).
    ///
    /// # Errors
    /// [`SightError::UnsupportedHorizon`] for a twilight policy with a target other than
    /// the Sun.
    pub fn horizon_altitude(&self, policy: Horizon, jd: JulianDate) -> Result<Radian, SightError> {
        let body = self.body();
        let refraction = -self.config.refraction * RADMIN;
        let semidiameter = self.config.solar_semidiameter * RADMIN;

        if let Some(depression) = policy.twilight_depression() {
            if body != Body::Sun {
                return Err(SightError::UnsupportedHorizon { policy, body });
            }
            return Ok(-depression * RADEG);
        }

        let threshold = match (body, policy) {
            (Body::Sun, Horizon::UpperLimb) => refraction - semidiameter,
            (Body::Sun, Horizon::LowerLimb) => refraction + semidiameter,
            _ => refraction,
        };

        if body == Body::Moon {
            let factor = match policy {
                Horizon::UpperLimb => MOON_UPPER_LIMB_FACTOR,
                Horizon::LowerLimb => MOON_LOWER_LIMB_FACTOR,
                _ => MOON_CENTRE_FACTOR,
            };
            let distance = self.solver.solve(self.tdb(jd)?)?.geometric_distance();
            let parallax = (EARTH_MAJOR_AXIS / 1000.0 / (AU * distance)).asin();
            // a topocentric place already carries the parallax, only the semidiameter is left
            let factor = if self.solver.observer().is_topocentric() {
                factor - MOON_CENTRE_FACTOR
            } else {
                factor
            };
            return Ok(threshold + factor * parallax);
        }
        Ok(threshold)
    }

    /// Mean rate of the hour angle of the target, radians per day.
    fn mean_sidereal_rate(&self) -> f64 {
        match self.body() {
            Body::Sun => DPI,
            Body::Moon => DPI * (1.0 - 1.0 / 27.322),
            _ => DPI * 366.0 / 365.0,
        }
    }

    fn converge_transit(
        &self,
        mut jd: JulianDate,
        target: Radian,
        rate: f64,
    ) -> Result<JulianDate, SightError> {
        let mut step = f64::INFINITY;
        for _ in 0..self.config.max_transit_iterations {
            step = -signed_angle(self.hour_angle(jd)? - target) / rate;
            jd += step;
            if step.abs() < self.config.transit_tolerance {
                return Ok(jd);
            }
        }
        log::debug!(
            "transit search for {} stalled near JD {jd} (last step {step:e})",
            self.body()
        );
        Err(SightError::NonConvergence {
            stage: SearchStage::TransitSearch,
            iterations: self.config.max_transit_iterations,
            last_step: step,
        })
    }

    /// Meridian transits in the UT window `[jdstart, jdstart + 1)`, in time order.
    ///
    /// Upper and lower transits alternate; at most three fit in the window.
    pub fn find_transits(&self, jdstart: JulianDate) -> Result<Vec<Event>, SightError> {
        let rate = self.mean_sidereal_rate();
        let mut target = if self.hour_angle(jdstart)? < 0.0 {
            0.0
        } else {
            PI
        };

        let mut jd = jdstart;
        let mut events = Vec::with_capacity(3);
        for _ in 0..3 {
            jd = self.converge_transit(jd, target, rate)?;
            if jd >= jdstart && jd < jdstart + 1.0 {
                let kind = if target == 0.0 {
                    EventKind::UpperTransit
                } else {
                    EventKind::LowerTransit
                };
                events.push(Event::new(kind, jd));
            }
            target = if target == 0.0 { PI } else { 0.0 };
            jd += PI / rate;
        }
        Ok(events)
    }

    /// Time of the altitude extremum near a transit, clamped to `[lo, hi]`.
    fn altitude_extremum<F>(
        &self,
        f: &mut F,
        transit: &Event,
        lo: JulianDate,
        hi: JulianDate,
    ) -> Result<JulianDate, SightError>
    where
        F: FnMut(f64) -> Result<f64, SightError>,
    {
        let h = self.config.extremum_half_width;
        let t = match parabolic_extremum(&mut *f, transit.jd, h)? {
            Some(t) => t,
            None => {
                log::debug!(
                    "flat altitude curve at JD {}, using golden-section search",
                    transit.jd
                );
                let (a, b) = (transit.jd - h, transit.jd + h);
                let tolerance = self.config.transit_tolerance;
                match transit.kind {
                    EventKind::LowerTransit => {
                        golden_section_minimum(&mut *f, a, b, tolerance, 100)?
                    }
                    _ => golden_section_maximum(&mut *f, a, b, tolerance, 100)?,
                }
            }
        };
        Ok(t.clamp(lo, hi))
    }

    /// Refinement outcome of every consecutive pair of altitude samples in
    /// `[jdstart, jdstart + 1]`.
    ///
    /// Pairs without a sign change report [`RootSearch::NoBracket`]; pairs whose crossing
    /// could not be pinned down report [`RootSearch::NotConverged`].
    pub fn altitude_crossing_outcomes(
        &self,
        jdstart: JulianDate,
        policy: Horizon,
    ) -> Result<Vec<CrossingOutcome>, SightError> {
        let threshold = self.horizon_altitude(policy, jdstart)?;
        let mut f = |jd: f64| -> Result<f64, SightError> {
            Ok(self.geometric_altitude(jd)? - threshold)
        };

        let jdend = jdstart + 1.0;
        let mut samples = vec![(jdstart, f(jdstart)?)];
        for transit in self.find_transits(jdstart)? {
            let t = self.altitude_extremum(&mut f, &transit, jdstart, jdend)?;
            samples.push((t, f(t)?));
        }
        samples.push((jdend, f(jdend)?));
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let options = self.config.refine_options();
        samples
            .windows(2)
            .map(|pair| {
                let (lo, hi) = (pair[0], pair[1]);
                let kind = match (lo.1 >= 0.0, hi.1 >= 0.0) {
                    (false, true) => Some(EventKind::Rise),
                    (true, false) => Some(EventKind::Set),
                    _ => None,
                };
                let search = refine_root(&mut f, lo, hi, &options)?;
                Ok(CrossingOutcome {
                    start: lo.0,
                    end: hi.0,
                    kind,
                    search,
                })
            })
            .collect()
    }

    /// Rise and set events for `policy` in the UT window `[jdstart, jdstart + 1)`, in time
    /// order.
    ///
    /// # Errors
    /// [`SightError::NonConvergence`] when a bracketed crossing survives both false position
    /// and bisection; an empty vector means the threshold is genuinely not crossed.
    pub fn find_altitude_crossings(
        &self,
        jdstart: JulianDate,
        policy: Horizon,
    ) -> Result<Vec<Event>, SightError> {
        let mut events = Vec::new();
        for outcome in self.altitude_crossing_outcomes(jdstart, policy)? {
            match (outcome.search, outcome.kind) {
                (RootSearch::Found(jd), Some(kind)) if jd < jdstart + 1.0 => {
                    events.push(Event::new(kind, jd))
                }
                (RootSearch::NotConverged { residual, .. }, _) => {
                    return Err(SightError::NonConvergence {
                        stage: SearchStage::AltitudeCrossing,
                        iterations: self.config.false_position_iterations
                            + self.config.bisection_iterations,
                        last_step: residual,
                    });
                }
                _ => {}
            }
        }
        Ok(events)
    }

    /// Transits and crossings for `policy`, merged in time order.
    pub fn find_events(
        &self,
        jdstart: JulianDate,
        policy: Horizon,
    ) -> Result<Vec<Event>, SightError> {
        let mut events = self.find_transits(jdstart)?;
        events.extend(self.find_altitude_crossings(jdstart, policy)?);
        events.sort_by(|a, b| a.jd.total_cmp(&b.jd));
        Ok(events)
    }
}
