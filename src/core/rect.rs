//! Axis-Aligned Rectangles
//!
//! Hitboxes and hurtboxes. Edges are half-open, so boxes that only touch
//! do not overlap.

use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_HALF, fixed_mul};
use super::vec2::FixedVec2;

/// Axis-aligned rectangle in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left corner
    pub min: FixedVec2,
    /// Upper-right corner
    pub max: FixedVec2,
}

impl Rect {
    /// Create from two corners.
    pub const fn new(min: FixedVec2, max: FixedVec2) -> Self {
        Self { min, max }
    }

    /// Body box standing on `feet` (feet at the bottom centre).
    pub fn from_feet(feet: FixedVec2, half_width: Fixed, height: Fixed) -> Self {
        Self {
            min: FixedVec2::new(feet.x - half_width, feet.y),
            max: FixedVec2::new(feet.x + half_width, feet.y + height),
        }
    }

    /// Box placed relative to an owner's feet, mirrored by facing.
    ///
    /// `offset.x` is the distance from the owner's centre to the near edge
    /// in the facing direction; `offset.y` is the bottom edge height.
    pub fn from_offset(feet: FixedVec2, facing: i32, offset: FixedVec2, size: FixedVec2) -> Self {
        let near = feet.x + offset.x * facing;
        let far = near + size.x * facing;
        let (left, right) = if facing >= 0 { (near, far) } else { (far, near) };
        Self {
            min: FixedVec2::new(left, feet.y + offset.y),
            max: FixedVec2::new(right, feet.y + offset.y + size.y),
        }
    }

    /// Whether two rectangles overlap with positive area.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Intersection of two rectangles, if they overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Rect {
            min: FixedVec2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: FixedVec2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    /// Centre point.
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(
            self.min.x + fixed_mul(self.max.x - self.min.x, FIXED_HALF),
            self.min.y + fixed_mul(self.max.y - self.min.y, FIXED_HALF),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    fn v(x: f64, y: f64) -> FixedVec2 {
        FixedVec2::new(to_fixed(x), to_fixed(y))
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Rect::new(v(0.0, 0.0), v(1.0, 1.0));
        let b = Rect::new(v(1.0, 0.0), v(2.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_from_offset_mirrors_by_facing() {
        let feet = v(0.0, 0.0);
        let right = Rect::from_offset(feet, 1, v(0.4, 0.5), v(1.2, 1.0));
        assert_eq!(right, Rect::new(v(0.4, 0.5), v(1.6, 1.5)));

        let left = Rect::from_offset(feet, -1, v(0.4, 0.5), v(1.2, 1.0));
        assert_eq!(left, Rect::new(v(-1.6, 0.5), v(-0.4, 1.5)));
    }

    #[test]
    fn test_intersection_center() {
        let a = Rect::new(v(0.0, 0.0), v(2.0, 2.0));
        let b = Rect::new(v(1.0, 1.0), v(3.0, 3.0));
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Rect::new(v(1.0, 1.0), v(2.0, 2.0)));
        assert_eq!(overlap.center(), v(1.5, 1.5));
    }
}
