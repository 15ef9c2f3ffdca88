use std::fmt;

use thiserror::Error;

use crate::constants::JulianDate;
use crate::ephemeris::Body;
use crate::visibility::Horizon;

/// Iterative process that can exhaust its iteration budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStage {
    /// Light-time equation of the apparent-place solver.
    LightTime,
    /// Meridian transit search of the visibility engine.
    TransitSearch,
    /// False position + bisection refinement of a horizon crossing.
    AltitudeCrossing,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStage::LightTime => write!(f, "light-time iteration"),
            SearchStage::TransitSearch => write!(f, "transit search"),
            SearchStage::AltitudeCrossing => write!(f, "altitude crossing refinement"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SightError {
    #[error("Julian Date {jd} outside the ephemeris range [{earliest}, {latest}]")]
    EphemerisRange {
        jd: JulianDate,
        earliest: JulianDate,
        latest: JulianDate,
    },

    #[error("Malformed ephemeris data: {0}")]
    EphemerisFormat(String),

    #[error("{stage} did not converge after {iterations} iterations (last step {last_step:e})")]
    NonConvergence {
        stage: SearchStage,
        iterations: usize,
        last_step: f64,
    },

    #[error("No Earth-orientation provider was supplied; of-date quantities are unavailable")]
    MissingEarthOrientation,

    #[error("Body {0} is not served by this position provider")]
    UnsupportedBody(Body),

    #[error("Horizon policy {policy} is not defined for {body}")]
    UnsupportedHorizon { policy: Horizon, body: Body },

    #[error("Invalid geographic place: {0}")]
    InvalidPlace(String),

    #[error("ROOTS finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),

    #[error("NaN encountered in a validated coordinate")]
    NanValue(#[from] ordered_float::FloatIsNan),
}

impl PartialEq for SightError {
    fn eq(&self, other: &Self) -> bool {
        use SightError::*;
        match (self, other) {
            (
                EphemerisRange {
                    jd: a,
                    earliest: ea,
                    latest: la,
                },
                EphemerisRange {
                    jd: b,
                    earliest: eb,
                    latest: lb,
                },
            ) => a == b && ea == eb && la == lb,
            (EphemerisFormat(a), EphemerisFormat(b)) => a == b,
            (
                NonConvergence {
                    stage: a,
                    iterations: ia,
                    ..
                },
                NonConvergence {
                    stage: b,
                    iterations: ib,
                    ..
                },
            ) => a == b && ia == ib,
            (UnsupportedBody(a), UnsupportedBody(b)) => a == b,
            (
                UnsupportedHorizon {
                    policy: pa,
                    body: ba,
                },
                UnsupportedHorizon {
                    policy: pb,
                    body: bb,
                },
            ) => pa == pb && ba == bb,
            (InvalidPlace(a), InvalidPlace(b)) => a == b,
            (RootFindingError(a), RootFindingError(b)) => a == b,

            // Unit-like variants
            (MissingEarthOrientation, MissingEarthOrientation) => true,
            (NanValue(_), NanValue(_)) => true,

            _ => false,
        }
    }
}
