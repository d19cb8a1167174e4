//! Float hygiene helpers.
//!
//! Geometry in this workspace ends up in DOM attributes, so values must be
//! finite and canonical before they leave the math layer:
//! - `canonical_f64` folds `-0.0` into `0.0` and all NaNs into one NaN.
//! - `non_negative_extent` turns anything that cannot be a length into `0.0`.

/// Canonicalize a floating-point value for deterministic output.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Clamp a length to `[0, +inf)`; NaN and infinities collapse to `0.0`.
#[inline]
pub fn non_negative_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Absolute-or-relative tolerance comparison.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= eps || diff <= eps * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::{approx_eq, canonical_f64, non_negative_extent};

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert_eq!(canonical_f64(0.0), 0.0);
        assert!(canonical_f64(f64::NAN).is_nan());
        assert_eq!(canonical_f64(1.5), 1.5);
    }

    #[test]
    fn extents_never_go_negative_or_non_finite() {
        assert_eq!(non_negative_extent(-3.0), 0.0);
        assert_eq!(non_negative_extent(f64::NAN), 0.0);
        assert_eq!(non_negative_extent(f64::INFINITY), 0.0);
        assert_eq!(non_negative_extent(12.5), 12.5);
    }

    #[test]
    fn approx_eq_is_relative_for_large_values() {
        assert!(approx_eq(1.0e9, 1.0e9 + 0.5, 1e-9));
        assert!(!approx_eq(1.0, 1.1, 1e-9));
        assert!(approx_eq(0.0, 1e-12, 1e-9));
    }
}
