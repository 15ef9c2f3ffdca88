//! Elementary rotations and equatorial angles.
//!
//! Every matrix built here is an **active** rotation: it rotates a vector inside a fixed
//! frame, so `x' = R · x`. A change of basis by an angle `a` (the "R1/R2/R3" notation of the
//! astronomical literature) is therefore `rotmt(-a, k)`.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Radian, DPI};

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes (X, Y, or Z).
///
/// The rotation follows the **direct (positive/trigonometric)** sense:
/// counter-clockwise when looking down the axis toward the origin.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `k` - Index of the axis of rotation:
///   * `0` → X-axis
///   * `1` → Y-axis
///   * `2` → Z-axis
///
/// # Panics
///
/// Panics if `k > 2`, as only axes 0–2 are valid.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Reduce an angle to the interval `[0, 2π)`.
pub fn principal_angle(a: Radian) -> Radian {
    let r = a.rem_euclid(DPI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if r >= DPI {
        0.0
    } else {
        r
    }
}

/// Reduce an angle to the interval `[-π, π)`.
pub fn signed_angle(a: Radian) -> Radian {
    let r = principal_angle(a + std::f64::consts::PI) - std::f64::consts::PI;
    if r >= std::f64::consts::PI {
        r - DPI
    } else {
        r
    }
}

/// Right ascension and declination of a direction vector.
///
/// The vector need not be normalised. Right ascension is returned in `[0, 2π)` and
/// declination in `[-π/2, π/2]`.
pub fn equatorial_angles(direction: &Vector3<f64>) -> (Radian, Radian) {
    let ra = principal_angle(direction.y.atan2(direction.x));
    let dec = direction
        .z
        .atan2((direction.x * direction.x + direction.y * direction.y).sqrt());
    (ra, dec)
}
