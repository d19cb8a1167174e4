//! Fit-to-container geometry for the overview.
//!
//! Everything here is pure and deterministic. The overview renderer is the
//! only caller; browser code never recomputes these formulas on its own.

use crate::bounds::{Rect, Size};
use crate::math::Vec2;
use crate::math::precision::non_negative_extent;

/// Uniform scale followed by translation, as in
/// `translate(translate_x, translate_y) scale(scale)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl FitTransform {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Content coordinates to overview coordinates.
    pub fn to_overview(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset()
    }

    /// Overview coordinates back to content coordinates.
    ///
    /// `scale` is strictly positive for every transform `compute_fit` returns.
    pub fn to_content(&self, p: Vec2) -> Vec2 {
        (p - self.offset()) * (1.0 / self.scale)
    }

    pub fn map_rect(&self, r: Rect) -> Rect {
        let origin = self.to_overview(r.origin());
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }
}

/// Aspect-preserving fit of `content` into `container`, centered on both axes.
///
/// Returns `None` when either input is degenerate (zero, negative or
/// non-finite extents) or the result would not be finite. Callers treat
/// `None` as "do not render this cycle".
pub fn compute_fit(content: Rect, container: Size) -> Option<FitTransform> {
    if content.is_degenerate() || container.is_degenerate() {
        return None;
    }

    let x_scale = container.width / content.width;
    let y_scale = container.height / content.height;
    let scale = x_scale.min(y_scale);

    let translate_x =
        container.width / 2.0 - content.width * scale / 2.0 - content.x * scale;
    let translate_y =
        container.height / 2.0 - content.height * scale / 2.0 - content.y * scale;

    let fit = FitTransform {
        scale,
        translate_x,
        translate_y,
    };
    let finite = scale.is_finite() && scale > 0.0 && fit.offset().is_finite();
    finite.then_some(fit)
}

/// Where the primary view's visible region lands in overview coordinates.
///
/// The primary view is assumed to show its content from its own origin, so the
/// rectangle starts at the fit offset. Unusable viewport extents produce a
/// zero-area rectangle rather than an error.
pub fn compute_viewport_indicator(fit: &FitTransform, viewport: Size) -> Rect {
    fit.map_rect(Rect::new(
        0.0,
        0.0,
        non_negative_extent(viewport.width),
        non_negative_extent(viewport.height),
    ))
}

#[cfg(test)]
mod tests {
    use super::{FitTransform, compute_fit, compute_viewport_indicator};
    use crate::bounds::{Rect, Size};
    use crate::math::Vec2;
    use crate::math::precision::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn worked_example_letterboxes_vertically() {
        let fit = compute_fit(Rect::new(0.0, 0.0, 200.0, 100.0), Size::new(400.0, 400.0))
            .expect("valid geometry");
        assert_eq!(
            fit,
            FitTransform {
                scale: 2.0,
                translate_x: 0.0,
                translate_y: 100.0,
            }
        );

        let indicator = compute_viewport_indicator(&fit, Size::new(100.0, 50.0));
        assert_eq!(indicator, Rect::new(0.0, 100.0, 200.0, 100.0));
    }

    #[test]
    fn offset_content_origin_is_compensated() {
        let fit = compute_fit(Rect::new(-50.0, 20.0, 100.0, 100.0), Size::new(200.0, 100.0))
            .expect("valid geometry");
        assert_eq!(fit.scale, 1.0);
        // Content spans x in [-50, 50]; centered in a 200 wide box it must start at 50.
        assert_eq!(fit.translate_x, 100.0);
        assert_eq!(fit.translate_y, -20.0);
        let mapped = fit.map_rect(Rect::new(-50.0, 20.0, 100.0, 100.0));
        assert_eq!(mapped, Rect::new(50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn degenerate_inputs_do_not_render() {
        let container = Size::new(400.0, 400.0);
        assert_eq!(compute_fit(Rect::new(0.0, 0.0, 0.0, 100.0), container), None);
        assert_eq!(compute_fit(Rect::new(0.0, 0.0, 100.0, 0.0), container), None);
        assert_eq!(compute_fit(Rect::new(0.0, 0.0, -1.0, 100.0), container), None);
        assert_eq!(compute_fit(Rect::new(f64::NAN, 0.0, 10.0, 10.0), container), None);
        assert_eq!(
            compute_fit(Rect::new(0.0, 0.0, 10.0, 10.0), Size::new(0.0, 300.0)),
            None
        );
        // 1e308 / 1e-308 overflows to infinity.
        assert_eq!(
            compute_fit(Rect::new(0.0, 0.0, 1e-308, 1e-308), Size::new(1e308, 1e308)),
            None
        );
    }

    #[test]
    fn zero_viewport_gives_zero_area_indicator() {
        let fit = compute_fit(Rect::new(0.0, 0.0, 10.0, 10.0), Size::new(20.0, 20.0))
            .expect("valid geometry");
        let indicator = compute_viewport_indicator(&fit, Size::new(0.0, f64::NAN));
        assert_eq!(indicator, Rect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn content_point_round_trips_through_overview() {
        let fit = compute_fit(Rect::new(10.0, 10.0, 300.0, 150.0), Size::new(120.0, 90.0))
            .expect("valid geometry");
        let p = Vec2::new(42.0, 77.0);
        let back = fit.to_content(fit.to_overview(p));
        assert!(approx_eq(back.x, p.x, 1e-12));
        assert!(approx_eq(back.y, p.y, 1e-12));
    }

    fn extent() -> impl Strategy<Value = f64> {
        0.001f64..10_000.0
    }

    fn coord() -> impl Strategy<Value = f64> {
        -10_000.0f64..10_000.0
    }

    proptest! {
        #[test]
        fn fit_never_overflows_container(
            x in coord(), y in coord(), w in extent(), h in extent(),
            cw in 1.0f64..4_000.0, ch in 1.0f64..4_000.0,
        ) {
            let fit = compute_fit(Rect::new(x, y, w, h), Size::new(cw, ch)).unwrap();
            prop_assert!(fit.scale <= cw / w);
            prop_assert!(fit.scale <= ch / h);
            prop_assert!(fit.scale == cw / w || fit.scale == ch / h);
        }

        #[test]
        fn fitted_content_is_centered(
            x in coord(), y in coord(), w in extent(), h in extent(),
            cw in 1.0f64..4_000.0, ch in 1.0f64..4_000.0,
        ) {
            let content = Rect::new(x, y, w, h);
            let fit = compute_fit(content, Size::new(cw, ch)).unwrap();
            let mapped = fit.map_rect(content);
            let center = Vec2::new(mapped.x + mapped.width / 2.0, mapped.y + mapped.height / 2.0);
            let tol_x = 1e-9 * (1.0 + (x * fit.scale).abs() + w * fit.scale + cw);
            let tol_y = 1e-9 * (1.0 + (y * fit.scale).abs() + h * fit.scale + ch);
            prop_assert!((center.x - cw / 2.0).abs() <= tol_x);
            prop_assert!((center.y - ch / 2.0).abs() <= tol_y);
        }

        #[test]
        fn indicator_uses_fit_scale(
            w in extent(), h in extent(),
            cw in 1.0f64..4_000.0, ch in 1.0f64..4_000.0,
            vw in 0.0f64..4_000.0, vh in 0.0f64..4_000.0,
        ) {
            let fit = compute_fit(Rect::new(0.0, 0.0, w, h), Size::new(cw, ch)).unwrap();
            let indicator = compute_viewport_indicator(&fit, Size::new(vw, vh));
            prop_assert_eq!(indicator.width, vw * fit.scale);
            prop_assert_eq!(indicator.height, vh * fit.scale);
            prop_assert_eq!(indicator.origin(), fit.offset());
        }

        #[test]
        fn zero_width_content_never_yields_a_transform(
            h in extent(), cw in 1.0f64..4_000.0, ch in 1.0f64..4_000.0,
        ) {
            prop_assert!(compute_fit(Rect::new(0.0, 0.0, 0.0, h), Size::new(cw, ch)).is_none());
        }
    }
}
