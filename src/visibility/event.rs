use std::fmt;

use crate::constants::JulianDate;

/// What happens at an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Upward crossing of the threshold altitude.
    Rise,
    /// Downward crossing of the threshold altitude.
    Set,
    /// Passage across the local meridian, hour angle 0.
    UpperTransit,
    /// Passage across the local meridian below the pole, hour angle π.
    LowerTransit,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Rise => write!(f, "rise"),
            EventKind::Set => write!(f, "set"),
            EventKind::UpperTransit => write!(f, "upper transit"),
            EventKind::LowerTransit => write!(f, "lower transit"),
        }
    }
}

/// A visibility event at a UT Julian Date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub jd: JulianDate,
}

impl Event {
    pub fn new(kind: EventKind, jd: JulianDate) -> Self {
        Event { kind, jd }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, EventKind::UpperTransit | EventKind::LowerTransit)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at JD {:.5}", self.kind, self.jd)
    }
}
