use roots::{find_root_newton_raphson, SimpleConvergency};

use crate::constants::Radian;
use crate::ref_system::signed_angle;
use crate::sight_errors::SightError;

/// Solve Kepler's equation `E − e·sin E = M` for the eccentric anomaly.
///
/// Newton–Raphson from the classical starting guess `E₀ = M + e·sin M` (or `π` for highly
/// eccentric orbits), capped at 25 iterations.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly M in radians (any range).
/// * `eccentricity`: orbital eccentricity, `0 ≤ e < 1`.
///
/// Returns
/// --------
/// * The eccentric anomaly E in radians, on the same revolution as the reduced M.
pub fn eccentric_anomaly(mean_anomaly: Radian, eccentricity: f64) -> Result<Radian, SightError> {
    let m = signed_angle(mean_anomaly);

    let f = |e_anom: f64| -> f64 { e_anom - eccentricity * e_anom.sin() - m };
    let df = |e_anom: f64| -> f64 { 1.0 - eccentricity * e_anom.cos() };

    let x0 = if eccentricity > 0.8 {
        std::f64::consts::PI * m.signum()
    } else {
        m + eccentricity * m.sin()
    };

    let mut tol = SimpleConvergency {
        eps: f64::EPSILON * 1e2,
        max_iter: 25,
    };

    Ok(find_root_newton_raphson(x0, &f, &df, &mut tol)?)
}
