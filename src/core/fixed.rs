//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the encounter simulation.
//! Every gameplay quantity (positions, velocities, health, gauges) is a
//! `Fixed`; floats only appear when state leaves the core for rendering.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ratios
//!
//! Multipliers that designers think of as percentages (combo scaling,
//! armor reduction, break-gauge gain) are stored in basis points and
//! applied with [`apply_bp`]. Quarter-unit results such as `15 × 0.95`
//! are exact in Q16.16, so scenario numbers reproduce bit-for-bit.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

/// 1.0 expressed in basis points.
pub const BP_ONE: u32 = 10_000;

/// Tick duration at the reference rate: 1/60 second = floor(65536/60) = 1092
pub const TICK_DURATION: Fixed = 1092;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use for constants and test setup. Never inside the step function.
///
/// # Example
/// ```
/// use boss_arena::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert hundredths to fixed-point using integer math only.
///
/// `from_centi(150)` is 1.5. Valid for |n| < 32768.
#[inline]
pub const fn from_centi(n: i32) -> Fixed {
    n * FIXED_ONE / 100
}

/// Convert fixed-point to float for the broadcast boundary.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Integer part of a fixed-point value (floor).
#[inline]
pub fn fixed_floor_int(f: Fixed) -> i32 {
    f >> FIXED_SCALE
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then shifts back
/// (arithmetic shift, so negative results round toward -infinity).
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers. Division by zero returns 0.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = ((a as i64) << FIXED_SCALE) / (b as i64);
    wide.clamp(i32::MIN as i64, i32::MAX as i64) as Fixed
}

/// Square root, exact to the last fractional bit (floor). Non-positive
/// input returns 0.
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }
    // sqrt(x / 2^16) × 2^16 = sqrt(x × 2^16)
    let n = (x as u64) << FIXED_SCALE;
    let mut root: u64 = 0;
    let mut bit: u64 = 1 << 62;
    while bit > n {
        bit >>= 2;
    }
    let mut rem = n;
    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root as Fixed
}

/// Scale a fixed-point value by a ratio in basis points.
///
/// `apply_bp(x, 9500)` is `x × 0.95`, truncated toward zero.
#[inline]
pub fn apply_bp(value: Fixed, bp: u32) -> Fixed {
    let wide = (value as i64) * (bp as i64) / (BP_ONE as i64);
    wide as Fixed
}

/// Ratio `num / den` in basis points, clamped to [0, BP_ONE].
///
/// Returns 0 when `den` is not positive.
#[inline]
pub fn ratio_bp(num: Fixed, den: Fixed) -> u32 {
    if den <= 0 || num <= 0 {
        return 0;
    }
    let wide = (num as i64) * (BP_ONE as i64) / (den as i64);
    wide.clamp(0, BP_ONE as i64) as u32
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Subtract and clamp at zero. Health and gauges never go negative.
#[inline]
pub fn saturating_sub_floor(value: Fixed, amount: Fixed) -> Fixed {
    value.saturating_sub(amount).max(0)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(TICK_DURATION, FIXED_ONE / 60);
    }

    #[test]
    fn test_fixed_mul() {
        assert_eq!(fixed_mul(to_fixed(2.0), to_fixed(3.0)), to_fixed(6.0));
        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_apply_bp_exact_quarters() {
        // 15 × 0.95 = 14.25
        assert_eq!(apply_bp(from_int(15), 9_500), to_fixed(14.25));
        // 40 × 0.70 = 28
        assert_eq!(apply_bp(from_int(40), 7_000), from_int(28));
        // 40 × 0.35 = 14
        assert_eq!(apply_bp(from_int(40), 3_500), from_int(14));
        assert_eq!(apply_bp(from_int(40), BP_ONE), from_int(40));
    }

    #[test]
    fn test_ratio_bp() {
        assert_eq!(ratio_bp(from_int(300), from_int(1000)), 3_000);
        assert_eq!(ratio_bp(from_int(5), 0), 0);
        assert_eq!(ratio_bp(from_int(-5), from_int(10)), 0);
        assert_eq!(ratio_bp(from_int(20), from_int(10)), BP_ONE);
    }

    #[test]
    fn test_saturating_sub_floor() {
        assert_eq!(saturating_sub_floor(from_int(10), from_int(28)), 0);
        assert_eq!(saturating_sub_floor(from_int(10), from_int(4)), from_int(6));
    }

    #[test]
    fn test_from_centi() {
        assert_eq!(from_centi(150), to_fixed(1.5));
        assert_eq!(from_centi(1500), from_int(15));
        assert_eq!(from_centi(-25), to_fixed(-0.25));
    }

    #[test]
    fn test_fixed_div() {
        assert_eq!(fixed_div(from_int(18), from_int(4)), to_fixed(4.5));
        assert_eq!(fixed_div(from_int(-3), from_int(2)), to_fixed(-1.5));
        assert_eq!(fixed_div(FIXED_ONE, 0), 0);
    }

    #[test]
    fn test_fixed_sqrt() {
        assert_eq!(fixed_sqrt(from_int(25)), from_int(5));
        assert_eq!(fixed_sqrt(to_fixed(2.25)), to_fixed(1.5));
        assert_eq!(fixed_sqrt(0), 0);
        assert_eq!(fixed_sqrt(-FIXED_ONE), 0);
        // sqrt(2) = 1.41421..., floor at 1/65536
        assert_eq!(fixed_sqrt(from_int(2)), 92681);
    }

    #[test]
    fn test_floor_int() {
        assert_eq!(fixed_floor_int(to_fixed(3.75)), 3);
        assert_eq!(fixed_floor_int(to_fixed(-0.5)), -1);
    }
}
