//! The smoothing kernel `W(r, h) = 4 (h - r)³ / h⁴` on `[0, h)`, zero beyond.

use crate::models::Point2;
use crate::utils::EPSILON;

const KERNEL_CONSTANT: f64 = 4.0;
const GRADIENT_CONSTANT: f64 = -12.0;

/// Kernel value at distance `r` for smoothing length `h`.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::sph::pressure_core;
///
/// assert_eq!(pressure_core(0.0, 1.0), 4.0);
/// assert_eq!(pressure_core(1.0, 1.0), 0.0);
/// assert_eq!(pressure_core(0.5, 1.0), 0.5);
/// ```
pub fn pressure_core(r: f64, h: f64) -> f64 {
    if r < h {
        KERNEL_CONSTANT * (h - r).powi(3) / h.powi(4)
    } else {
        0.0
    }
}

/// Kernel value for the displacement `r`.
pub fn pressure_core_at(r: &Point2, h: f64) -> f64 {
    pressure_core(r.norm(), h)
}

/// Gradient of the kernel with respect to `r`.
///
/// Zero outside the support and for displacements shorter than [`EPSILON`],
/// where the direction is undefined.
pub fn pressure_core_gradient(r: &Point2, h: f64) -> Point2 {
    let r_norm = r.norm();
    if r_norm < h && r_norm > EPSILON {
        *r / r_norm * (GRADIENT_CONSTANT * (h - r_norm).powi(2) / h.powi(4))
    } else {
        Point2::zero()
    }
}

/// The distance at which the kernel takes the value `d`, for `0 <= d <= h`; zero otherwise.
pub fn inverse_pressure_core(d: f64, h: f64) -> f64 {
    if (0.0..=h).contains(&d) {
        h - (h.powi(4) * d / KERNEL_CONSTANT).cbrt()
    } else {
        0.0
    }
}
