// Centralized tolerances and helpers for robust geometry.

/// Point coincidence threshold.
pub const EPS_POINT: f64 = 1e-7;
/// Zero-length vector threshold.
pub const EPS_LEN: f64 = 1e-10;
/// Denominator guard for ratios and projections.
pub const EPS_DENOM: f64 = 1e-14;
/// Homogeneous weight below which a point is a direction at infinity.
pub const EPS_WEIGHT: f64 = 1e-10;
/// Small angle (radians) for perpendicularity/colinearity predicates.
pub const EPS_ANGLE: f64 = 1e-8;
/// Relative tolerance used when deriving a distance tolerance from data scale.
pub const EPS_RELATIVE: f64 = 1e-12;
/// Default absolute distance tolerance for the clip engine.
pub const DEFAULT_CLIP_TOLERANCE: f64 = 1e-8;

#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[inline]
pub fn near_zero(x: f64, eps: f64) -> bool {
    x.abs() <= eps
}

/// `num/den`, or `fallback` when the denominator is below [`EPS_DENOM`].
#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM {
        fallback
    } else {
        num / den
    }
}

/// Distance tolerance derived from the data's own coordinate magnitude.
///
/// `1.0` is mixed in so an all-near-origin data set still gets a nonzero
/// tolerance.
pub fn scaled_tolerance(points: &[crate::Point3]) -> f64 {
    let largest = points
        .iter()
        .filter(|&&p| !crate::is_disconnect(p))
        .flat_map(|p| p.iter().map(|c| c.abs()))
        .fold(1.0, f64::max);
    largest * EPS_RELATIVE
}
