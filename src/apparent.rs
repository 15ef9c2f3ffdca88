//! # Apparent place of a solar-system body
//!
//! [`ApparentPlaceSolver`] turns three barycentric [`PositionProvider`]s (observer, target,
//! Sun) into the direction in which the target is actually seen at a given instant.
//!
//! ## Corrections, in order
//!
//! 1. **Light time**: the target is evaluated at the emission time `t − τ`, where `τ`
//!    solves `c·τ = |P| + 2k·ln[(E + P + Q) / (E − P + Q)]` (the second term is the Shapiro
//!    delay, omitted when the target is the Sun).
//! 2. **Gravitational light deflection** by the Sun (skipped when the target is the Sun).
//! 3. **Relativistic aberration** due to the observer velocity.
//! 4. Optionally, **precession and nutation** to the true equator and equinox of date, when
//!    an [`EarthOrientation`] provider is attached.
//!
//! Here `P`, `Q` and `E` are the observer→target, Sun→target and Sun→observer vectors, and
//! `k = GM☉/c²`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sightline::apparent::ApparentPlaceSolver;
//! use sightline::ephemeris::{
//!     Body, EarthCentre, MeanElementsEphemeris, PlanetCentre, SharedEphemeris,
//! };
//!
//! let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
//! let solver = ApparentPlaceSolver::new(
//!     Arc::new(EarthCentre::new(eph.clone())),
//!     Arc::new(PlanetCentre::new(eph.clone(), Body::Mars).unwrap()),
//!     Arc::new(PlanetCentre::sun(eph)),
//! );
//! let place = solver.solve(2_460_000.5).unwrap();
//! assert!(place.ra_j2000() >= 0.0 && place.ra_j2000() < std::f64::consts::TAU);
//! ```

use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{JulianDate, Radian, SUN_GRAV_RADIUS, VLIGHT_AU},
    earth_orientation::EarthOrientation,
    ephemeris::{Body, PositionProvider},
    ref_system::equatorial_angles,
    sight_errors::{SearchStage, SightError},
};

/// Convergence settings of the light-time iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop when successive light-time estimates differ by less than this (days).
    pub light_time_tolerance: f64,
    pub max_light_time_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            light_time_tolerance: 1e-9,
            max_light_time_iterations: 50,
        }
    }
}

/// A unit direction with its right ascension in `[0, 2π)` and declination in `[−π/2, π/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialPosition {
    pub direction: Vector3<f64>,
    pub ra: Radian,
    pub dec: Radian,
}

impl EquatorialPosition {
    fn from_direction(direction: Vector3<f64>) -> Self {
        let (ra, dec) = equatorial_angles(&direction);
        EquatorialPosition {
            direction,
            ra,
            dec,
        }
    }
}

/// Apparent place of one target at one instant.
///
/// Immutable; every [`ApparentPlaceSolver::solve`] returns a fresh value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPlace {
    jd: JulianDate,
    geometric_distance: f64,
    light_path_distance: f64,
    heliocentric_distance: f64,
    light_time: f64,
    j2000: EquatorialPosition,
    of_date: Option<EquatorialPosition>,
}

impl ApparentPlace {
    /// Instant of observation (TDB).
    pub fn jd(&self) -> JulianDate {
        self.jd
    }

    /// Observer–target distance at the instant of observation, before any correction (AU).
    pub fn geometric_distance(&self) -> f64 {
        self.geometric_distance
    }

    /// Distance travelled by light, including the Shapiro delay (AU).
    pub fn light_path_distance(&self) -> f64 {
        self.light_path_distance
    }

    /// Sun–target distance at the emission time (AU).
    pub fn heliocentric_distance(&self) -> f64 {
        self.heliocentric_distance
    }

    /// Light travel time (days).
    pub fn light_time(&self) -> f64 {
        self.light_time
    }

    pub fn j2000(&self) -> &EquatorialPosition {
        &self.j2000
    }

    pub fn direction_j2000(&self) -> Vector3<f64> {
        self.j2000.direction
    }

    pub fn ra_j2000(&self) -> Radian {
        self.j2000.ra
    }

    pub fn dec_j2000(&self) -> Radian {
        self.j2000.dec
    }

    /// Position on the true equator and equinox of date, when the solver had an
    /// Earth-orientation provider.
    pub fn of_date(&self) -> Option<&EquatorialPosition> {
        self.of_date.as_ref()
    }

    fn require_of_date(&self) -> Result<&EquatorialPosition, SightError> {
        self.of_date
            .as_ref()
            .ok_or(SightError::MissingEarthOrientation)
    }

    pub fn direction_of_date(&self) -> Result<Vector3<f64>, SightError> {
        Ok(self.require_of_date()?.direction)
    }

    pub fn ra_of_date(&self) -> Result<Radian, SightError> {
        Ok(self.require_of_date()?.ra)
    }

    pub fn dec_of_date(&self) -> Result<Radian, SightError> {
        Ok(self.require_of_date()?.dec)
    }
}

/// Computes [`ApparentPlace`]s of a target seen by an observer.
#[derive(Clone)]
pub struct ApparentPlaceSolver {
    observer: Arc<dyn PositionProvider>,
    target: Arc<dyn PositionProvider>,
    sun: Arc<dyn PositionProvider>,
    earth_orientation: Option<Arc<dyn EarthOrientation>>,
    config: SolverConfig,
}

impl ApparentPlaceSolver {
    pub fn new(
        observer: Arc<dyn PositionProvider>,
        target: Arc<dyn PositionProvider>,
        sun: Arc<dyn PositionProvider>,
    ) -> Self {
        ApparentPlaceSolver {
            observer,
            target,
            sun,
            earth_orientation: None,
            config: SolverConfig::default(),
        }
    }

    /// Attach an Earth-orientation provider; results then carry the of-date position.
    pub fn with_earth_orientation(mut self, earth_orientation: Arc<dyn EarthOrientation>) -> Self {
        self.earth_orientation = Some(earth_orientation);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn observer(&self) -> &dyn PositionProvider {
        self.observer.as_ref()
    }

    pub fn target(&self) -> &dyn PositionProvider {
        self.target.as_ref()
    }

    pub fn earth_orientation(&self) -> Option<&dyn EarthOrientation> {
        self.earth_orientation.as_deref()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Apparent place of the target at `t` (TDB Julian Date).
    ///
    /// Errors
    /// ------
    /// * Any provider error ([`SightError::EphemerisRange`], [`SightError::EphemerisFormat`])
    ///   is returned unchanged.
    /// * [`SightError::NonConvergence`] when the light-time iteration exceeds
    ///   [`SolverConfig::max_light_time_iterations`].
    pub fn solve(&self, t: JulianDate) -> Result<ApparentPlace, SightError> {
        let observer = self.observer.state_vector(t)?;
        let eb = observer.position;
        let sb = self.sun.position(t)?;
        let e = eb - sb;
        let ee = e.norm();

        let is_sun = self.target.body() == Body::Sun;
        let light_time = self.light_time(t, &eb, ee, is_sun)?;

        let mut p = light_time.target_from_observer.normalize();
        let e = e / ee;

        if !is_sun {
            let q = light_time.target_from_sun.normalize();
            let correction = e * p.dot(&q) - q * e.dot(&p);
            p += correction * ((2.0 * SUN_GRAV_RADIUS / ee) / (1.0 + q.dot(&e)));
        }

        let vc = observer.velocity / VLIGHT_AU;
        let beta = (1.0 - vc.norm_squared()).sqrt();
        let pv = p.dot(&vc);
        let d = 1.0 + pv;
        let p = (p * (beta / d) + vc * ((1.0 + pv / (1.0 + beta)) / d)).normalize();

        let of_date = self.earth_orientation.as_ref().map(|eo| {
            let ut = t - eo.delta_t(t);
            let rotation = eo.nutation_matrix(ut) * eo.precession_matrix(self.target.epoch(), ut);
            EquatorialPosition::from_direction(rotation * p)
        });

        Ok(ApparentPlace {
            jd: t,
            geometric_distance: light_time.geometric_distance,
            light_path_distance: light_time.light_path,
            heliocentric_distance: light_time.target_from_sun.norm(),
            light_time: light_time.tau,
            j2000: EquatorialPosition::from_direction(p),
            of_date,
        })
    }

    fn light_time(
        &self,
        t: JulianDate,
        eb: &Vector3<f64>,
        ee: f64,
        is_sun: bool,
    ) -> Result<LightTime, SightError> {
        let mut tau = 0.0;
        let mut geometric_distance = None;
        let mut last_step = f64::INFINITY;

        for iteration in 1..=self.config.max_light_time_iterations {
            let qb = self.target.position(t - tau)?;
            let sb = self.sun.position(t - tau)?;
            let p = qb - eb;
            let q = qb - sb;
            let pn = p.norm();
            let qn = q.norm();
            let geometric = *geometric_distance.get_or_insert(pn);

            let mut light_path = pn;
            if !is_sun {
                let denominator = (ee - pn + qn).max(f64::MIN_POSITIVE);
                light_path += 2.0 * SUN_GRAV_RADIUS * ((ee + pn + qn) / denominator).ln();
            }

            let new_tau = light_path / VLIGHT_AU;
            last_step = new_tau - tau;
            tau = new_tau;

            if last_step.abs() < self.config.light_time_tolerance {
                log::trace!(
                    "light time {tau:.3e} d for {} converged in {iteration} iterations",
                    self.target.body()
                );
                return Ok(LightTime {
                    tau,
                    light_path,
                    geometric_distance: geometric,
                    target_from_observer: p,
                    target_from_sun: q,
                });
            }
        }

        log::debug!(
            "light time for {} at JD {t} did not converge (last step {last_step:e})",
            self.target.body()
        );
        Err(SightError::NonConvergence {
            stage: SearchStage::LightTime,
            iterations: self.config.max_light_time_iterations,
            last_step,
        })
    }
}

struct LightTime {
    tau: f64,
    light_path: f64,
    geometric_distance: f64,
    target_from_observer: Vector3<f64>,
    target_from_sun: Vector3<f64>,
}

#[cfg(test)]
mod apparent_test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::constants::{DPI, J2000, RADSEC};
    use crate::earth_orientation::{DeltaT, Iau1980};
    use crate::ephemeris::{
        EarthCentre, MeanElementsEphemeris, MoonCentre, PlanetCentre, SharedEphemeris,
        StateVector,
    };

    fn solver_for(body: Body) -> ApparentPlaceSolver {
        let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
        let target: Arc<dyn PositionProvider> = match body {
            Body::Moon => Arc::new(MoonCentre::new(eph.clone())),
            other => Arc::new(PlanetCentre::new(eph.clone(), other).unwrap()),
        };
        ApparentPlaceSolver::new(
            Arc::new(EarthCentre::new(eph.clone())),
            target,
            Arc::new(PlanetCentre::sun(eph)),
        )
    }

    /// Fixed point in space, far enough away to make light time irrelevant.
    struct FixedPoint {
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    }

    impl PositionProvider for FixedPoint {
        fn body(&self) -> Body {
            Body::MinorBody
        }

        fn state_vector(&self, _jd: JulianDate) -> Result<StateVector, SightError> {
            Ok(StateVector::new(self.position, self.velocity))
        }

        fn earliest(&self) -> JulianDate {
            f64::NEG_INFINITY
        }

        fn latest(&self) -> JulianDate {
            f64::INFINITY
        }

        fn epoch(&self) -> JulianDate {
            J2000
        }
    }

    #[test]
    fn test_solve_is_idempotent() {
        let solver = solver_for(Body::Mars);
        let a = solver.solve(J2000 + 3000.25).unwrap();
        let b = solver.solve(J2000 + 3000.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_light_time_is_a_fixed_point() {
        let t = J2000 + 777.7;
        let sun = PlanetCentre::sun(Arc::new(MeanElementsEphemeris::new()));
        for body in [Body::Sun, Body::Moon, Body::Venus, Body::Saturn] {
            let solver = solver_for(body);
            let place = solver.solve(t).unwrap();
            let tau = place.light_time();

            // light path rebuilt from scratch at the returned emission time
            let eb = solver.observer().position(t).unwrap();
            let ee = (eb - sun.position(t).unwrap()).norm();
            let qb = solver.target().position(t - tau).unwrap();
            let pn = (qb - eb).norm();
            let qn = (qb - sun.position(t - tau).unwrap()).norm();
            let mut light_path = pn;
            if body != Body::Sun {
                light_path += 2.0 * SUN_GRAV_RADIUS * ((ee + pn + qn) / (ee - pn + qn)).ln();
            }

            assert!(
                (light_path - tau * VLIGHT_AU).abs() < VLIGHT_AU * 1e-9,
                "{body}: {:e}",
                light_path - tau * VLIGHT_AU
            );
            assert!(place.light_path_distance() > 0.0);
            assert!(place.geometric_distance() > 0.0);
        }
    }

    #[test]
    fn test_sun_has_no_shapiro_delay_and_zero_heliocentric_distance() {
        let place = solver_for(Body::Sun).solve(J2000 + 100.0).unwrap();
        assert_eq!(place.heliocentric_distance(), 0.0);
        // the Sun is static in this ephemeris: light path equals the geometric distance
        assert_abs_diff_eq!(
            place.light_path_distance(),
            place.geometric_distance(),
            epsilon = 1e-15
        );
        assert!(place.ra_j2000().is_finite() && place.dec_j2000().is_finite());
    }

    #[test]
    fn test_sun_is_displaced_by_aberration_only() {
        // geometric direction vs apparent direction: ≈ 20.5″
        let solver = solver_for(Body::Sun);
        let jd = J2000 + 200.0;
        let place = solver.solve(jd).unwrap();
        let earth = solver.observer().position(jd).unwrap();
        let geometric = (-earth).normalize();
        let angle = geometric.angle(&place.direction_j2000());
        assert_abs_diff_eq!(angle / RADSEC, 20.5, epsilon = 0.6);
    }

    #[test]
    fn test_deflection_near_the_sun() {
        // a distant source 1° from the Sun is deflected by ≈ 0.5″ away from the Sun
        let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
        let earth = EarthCentre::new(eph.clone());
        let jd = J2000 + 50.0;
        let e = earth.state_vector(jd).unwrap();
        let sunward = -e.position.normalize();
        let axis = sunward.cross(&Vector3::z()).normalize();
        let offset = nalgebra::Rotation3::from_axis_angle(
            &nalgebra::Unit::new_normalize(axis),
            1f64.to_radians(),
        ) * sunward;

        let star = FixedPoint {
            position: e.position + offset * 1e6,
            velocity: Vector3::zeros(),
        };
        // observer at rest to isolate the deflection
        let observer = FixedPoint {
            position: e.position,
            velocity: Vector3::zeros(),
        };
        let solver = ApparentPlaceSolver::new(
            Arc::new(observer),
            Arc::new(star),
            Arc::new(PlanetCentre::sun(eph)),
        );
        let place = solver.solve(jd).unwrap();
        let shift = offset.angle(&place.direction_j2000()) / RADSEC;
        assert!(shift > 0.3 && shift < 0.7, "{shift}");
        // pushed away from the Sun
        assert!(place.direction_j2000().angle(&sunward) > offset.angle(&sunward));
    }

    #[test]
    fn test_angles_are_normalised() {
        let solver = solver_for(Body::Jupiter);
        for k in 0..40 {
            let place = solver.solve(J2000 + 37.3 * k as f64).unwrap();
            assert!(place.ra_j2000() >= 0.0 && place.ra_j2000() < DPI);
            assert!(place.dec_j2000().abs() <= std::f64::consts::FRAC_PI_2);
        }
    }

    #[test]
    fn test_of_date_requires_earth_orientation() {
        let solver = solver_for(Body::Venus);
        let place = solver.solve(J2000).unwrap();
        assert!(place.of_date().is_none());
        assert_eq!(place.ra_of_date(), Err(SightError::MissingEarthOrientation));
        assert_eq!(place.dec_of_date(), Err(SightError::MissingEarthOrientation));
        assert!(place.direction_of_date().is_err());

        let solver = solver.with_earth_orientation(Arc::new(Iau1980::new(DeltaT::Fixed(69.0))));
        let place = solver.solve(J2000 + 9000.0).unwrap();
        let of_date = place.of_date().unwrap();
        assert!(of_date.ra >= 0.0 && of_date.ra < DPI);
        // ~25 years of precession: tens of arcminutes
        let shift = place.direction_j2000().angle(&of_date.direction).to_degrees();
        assert!(shift > 0.1 && shift < 0.6, "{shift}");
    }

    #[test]
    fn test_light_time_cap() {
        let solver = solver_for(Body::Neptune).with_config(SolverConfig {
            light_time_tolerance: 0.0,
            max_light_time_iterations: 4,
        });
        match solver.solve(J2000) {
            Err(SightError::NonConvergence {
                stage, iterations, ..
            }) => {
                assert_eq!(stage, SearchStage::LightTime);
                assert_eq!(iterations, 4);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }

    #[test]
    fn test_provider_errors_propagate() {
        let solver = solver_for(Body::Mars);
        assert!(matches!(
            solver.solve(1_000_000.0),
            Err(SightError::EphemerisRange { .. })
        ));
    }

    #[test]
    fn test_config_from_partial_json_uses_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"max_light_time_iterations": 12}"#).unwrap();
        assert_eq!(config.max_light_time_iterations, 12);
        assert_eq!(config.light_time_tolerance, 1e-9);
    }
}
