//! # Scalar root finding and extremum search
//!
//! Generic numerical primitives over a fallible real function `f: f64 -> Result<f64, E>`.
//! The visibility engine uses them with `f(t) = altitude(t) − threshold`, but nothing here
//! knows about astronomy; every function is tested on closed-form functions.
//!
//! | Function | Purpose |
//! |---|---|
//! | [`false_position`] | regula falsi on a sign-changing bracket |
//! | [`bisection`] | interval halving on a sign-changing bracket |
//! | [`refine_root`] | false position, then bisection on the narrowed bracket |
//! | [`parabolic_extremum`] | vertex of the parabola through three equally spaced samples |
//! | [`golden_section_maximum`] / [`golden_section_minimum`] | derivative-free extremum search |
//!
//! A root search ends in one of three [`RootSearch`] states, so that *"there is no root"*
//! and *"the root could not be pinned down"* are never confused.

use serde::{Deserialize, Serialize};

/// Outcome of a bracketed root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootSearch {
    /// A root, with `|f(root)|` below the requested tolerance.
    Found(f64),
    /// The end points do not bracket a sign change.
    NoBracket,
    /// The iteration budget ran out; `estimate` is the best point reached and `residual`
    /// its function value.
    NotConverged { estimate: f64, residual: f64 },
}

impl RootSearch {
    pub fn root(&self) -> Option<f64> {
        match self {
            RootSearch::Found(t) => Some(*t),
            _ => None,
        }
    }
}

/// Two points where `f` has opposite signs. A zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: f64,
    pub f_lo: f64,
    pub hi: f64,
    pub f_hi: f64,
}

impl Bracket {
    /// `None` when `f_lo` and `f_hi` have the same sign.
    pub fn new(lo: f64, f_lo: f64, hi: f64, f_hi: f64) -> Option<Self> {
        if (f_lo >= 0.0) == (f_hi >= 0.0) {
            return None;
        }
        Some(Bracket { lo, f_lo, hi, f_hi })
    }

    /// Keep the half that still contains the sign change.
    fn shrink(&mut self, x: f64, fx: f64) {
        if (fx >= 0.0) == (self.f_lo >= 0.0) {
            self.lo = x;
            self.f_lo = fx;
        } else {
            self.hi = x;
            self.f_hi = fx;
        }
    }

    fn best(&self) -> (f64, f64) {
        if self.f_lo.abs() <= self.f_hi.abs() {
            (self.lo, self.f_lo)
        } else {
            (self.hi, self.f_hi)
        }
    }
}

/// Iteration budgets and tolerance of [`refine_root`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefineOptions {
    pub false_position_iterations: usize,
    pub bisection_iterations: usize,
    /// Stop as soon as `|f(x)|` falls below this value.
    pub tolerance: f64,
}

/// Regula falsi on `bracket`, which is narrowed in place.
///
/// Stops with [`RootSearch::Found`] as soon as `|f(x)| < tolerance`.
pub fn false_position<F, E>(
    f: &mut F,
    bracket: &mut Bracket,
    max_iter: usize,
    tolerance: f64,
) -> Result<RootSearch, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if let Some(found) = found_at_end(bracket, tolerance) {
        return Ok(found);
    }

    for _ in 0..max_iter {
        let denominator = bracket.f_hi - bracket.f_lo;
        if denominator == 0.0 {
            break;
        }
        let x = bracket.hi - bracket.f_hi * (bracket.hi - bracket.lo) / denominator;
        let fx = f(x)?;
        if fx.abs() < tolerance {
            return Ok(RootSearch::Found(x));
        }
        bracket.shrink(x, fx);
    }

    let (estimate, residual) = bracket.best();
    Ok(RootSearch::NotConverged { estimate, residual })
}

/// Bisection on `bracket`, which is narrowed in place.
pub fn bisection<F, E>(
    f: &mut F,
    bracket: &mut Bracket,
    max_iter: usize,
    tolerance: f64,
) -> Result<RootSearch, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if let Some(found) = found_at_end(bracket, tolerance) {
        return Ok(found);
    }

    for _ in 0..max_iter {
        let x = 0.5 * (bracket.lo + bracket.hi);
        let fx = f(x)?;
        if fx.abs() < tolerance {
            return Ok(RootSearch::Found(x));
        }
        bracket.shrink(x, fx);
    }

    let (estimate, residual) = bracket.best();
    Ok(RootSearch::NotConverged { estimate, residual })
}

/// Root of `f` between `(lo, f_lo)` and `(hi, f_hi)`: false position first, bisection on
/// the narrowed bracket when false position stalls.
pub fn refine_root<F, E>(
    mut f: F,
    (lo, f_lo): (f64, f64),
    (hi, f_hi): (f64, f64),
    options: &RefineOptions,
) -> Result<RootSearch, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let Some(mut bracket) = Bracket::new(lo, f_lo, hi, f_hi) else {
        return Ok(RootSearch::NoBracket);
    };

    let outcome = false_position(
        &mut f,
        &mut bracket,
        options.false_position_iterations,
        options.tolerance,
    )?;
    if let RootSearch::Found(_) = outcome {
        return Ok(outcome);
    }

    log::debug!(
        "false position stalled on [{}, {}], falling back to bisection",
        bracket.lo,
        bracket.hi
    );
    let outcome = bisection(
        &mut f,
        &mut bracket,
        options.bisection_iterations,
        options.tolerance,
    )?;
    if let RootSearch::NotConverged { estimate, residual } = outcome {
        log::debug!("bisection gave up at {estimate} with residual {residual:e}");
    }
    Ok(outcome)
}

fn found_at_end(bracket: &Bracket, tolerance: f64) -> Option<RootSearch> {
    if bracket.f_lo.abs() < tolerance {
        Some(RootSearch::Found(bracket.lo))
    } else if bracket.f_hi.abs() < tolerance {
        Some(RootSearch::Found(bracket.hi))
    } else {
        None
    }
}

/// Vertex of the parabola through `f(t − h)`, `f(t)`, `f(t + h)`.
///
/// Returns `None` when the three samples are collinear.
pub fn parabolic_extremum<F, E>(mut f: F, t: f64, h: f64) -> Result<Option<f64>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let f_minus = f(t - h)?;
    let f_zero = f(t)?;
    let f_plus = f(t + h)?;

    let curvature = f_plus - 2.0 * f_zero + f_minus;
    if curvature == 0.0 || !curvature.is_finite() {
        return Ok(None);
    }
    let dt = -h * (f_plus - f_minus) / (2.0 * curvature);
    Ok(Some(t + dt))
}

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Argument of the maximum of a unimodal `f` on `[a, b]`, to within `tolerance`.
pub fn golden_section_maximum<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iter: usize,
) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c)?;
    let mut fd = f(d)?;

    for _ in 0..max_iter {
        if (b - a).abs() < tolerance {
            break;
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d)?;
        }
    }
    Ok(0.5 * (a + b))
}

/// Argument of the minimum of a unimodal `f` on `[a, b]`.
pub fn golden_section_minimum<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iter: usize,
) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    golden_section_maximum(|x| Ok(-f(x)?), a, b, tolerance, max_iter)
}
