use crate::math::Vec2;

/// Width/height pair in pixels or user units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// `true` unless both extents are finite and strictly positive.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Degenerate when the size is degenerate or the origin is not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite() && self.y.is_finite()) || self.size().is_degenerate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Size};
    use crate::math::Vec2;

    #[test]
    fn zero_and_negative_sizes_are_degenerate() {
        assert!(Size::new(0.0, 10.0).is_degenerate());
        assert!(Size::new(10.0, -1.0).is_degenerate());
        assert!(Size::new(f64::NAN, 1.0).is_degenerate());
        assert!(Size::new(f64::INFINITY, 1.0).is_degenerate());
        assert!(!Size::new(0.5, 0.5).is_degenerate());
    }

    #[test]
    fn rect_splits_into_origin_and_size() {
        let r = Rect::new(-10.0, 5.0, 20.0, 10.0);
        assert_eq!(r.origin(), Vec2::new(-10.0, 5.0));
        assert_eq!(r.size(), Size::new(20.0, 10.0));
    }

    #[test]
    fn rect_with_non_finite_origin_is_degenerate() {
        assert!(Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }
}
