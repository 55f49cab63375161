//! Fixed-Point 2D Vector
//!
//! Positions, velocities and knockback payloads. y points up.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE, fixed_div, fixed_mul, fixed_sqrt, to_float};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Scale by an integer factor.
    #[inline]
    pub fn scale_int(self, factor: i32) -> Self {
        Self {
            x: self.x.wrapping_mul(factor),
            y: self.y.wrapping_mul(factor),
        }
    }

    /// Mirror the x component by a facing sign (+1 or -1).
    #[inline]
    pub fn mirrored(self, sign: i32) -> Self {
        Self {
            x: self.x.wrapping_mul(sign),
            y: self.y,
        }
    }

    /// Multiply both components by a fixed-point scalar.
    #[inline]
    pub fn scale(self, factor: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, factor),
            y: fixed_mul(self.y, factor),
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> Fixed {
        fixed_mul(self.x, other.x).wrapping_add(fixed_mul(self.y, other.y))
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.dot(self))
    }

    /// Same direction, rescaled to `len`. ZERO stays ZERO.
    pub fn with_length(self, len: Fixed) -> Self {
        let current = self.length();
        if current == 0 {
            return Self::ZERO;
        }
        self.scale(fixed_div(len, current))
    }

    /// Convert to float tuple for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (to_float(self.x), to_float(self.y))
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.wrapping_add(rhs.x),
            y: self.y.wrapping_add(rhs.y),
        }
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(rhs.x),
            y: self.y.wrapping_sub(rhs.y),
        }
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================
