//! Numeric formats understood by the DWT kernels.
//!
//! Every kernel is generic over [`Sample`], a minimal numeric policy that
//! describes how a stored sample widens into an accumulator, how an
//! accumulator narrows back after the final scale step, and how
//! double-precision filter taps are quantized into the format.
//!
//! | Format | Sample | Accumulator     | Final scale |
//! |--------|--------|-----------------|-------------|
//! | Q31    | `i32`  | `Wrapping<i64>` | `>> 31`     |
//! | Q15    | `i16`  | `Wrapping<i64>` | `>> 15`     |
//! | Q7     | `i8`   | `Wrapping<i32>` | `>> 7`      |
//! | f32    | `f32`  | `f64`           | none        |
//! | f64    | `f64`  | `f64`           | none        |
//!
//! Integer accumulators wrap on overflow like a two's-complement MAC unit.
//! Full-scale Q31 input under antireflect extension can exceed the 64-bit
//! range; the result is then taken modulo `2^64` rather than panicking.

use core::fmt::Debug;
use core::num::Wrapping;
use core::ops::{Add, Mul, Neg, Sub};

/// Q1.31 fixed-point sample.
pub type Q31 = i32;
/// Q1.15 fixed-point sample.
pub type Q15 = i16;
/// Q1.7 fixed-point sample.
pub type Q7 = i8;

/// Arithmetic available on an accumulator.
pub trait Accumulator:
    Copy
    + PartialEq
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn to_f64(self) -> f64;
    #[inline(always)]
    fn twice(self) -> Self {
        self + self
    }
}

/// Storage format of signal samples, filter taps and output coefficients.
pub trait Sample: Copy + PartialEq + Debug + Default + Send + Sync + 'static {
    /// Intermediate type products are summed in.
    type Acc: Accumulator;
    /// Number of fractional bits removed by the final scale step.
    const FRAC_BITS: u32;
    /// Normalized Haar coefficient `cos(pi/4)` stored in this format.
    const HAAR_COEF: Self;

    fn widen(self) -> Self::Acc;
    /// Scale an accumulator down by `shift` fractional bits and store it.
    /// Floating-point formats ignore `shift`.
    fn narrow(acc: Self::Acc, shift: u32) -> Self;
    /// Round `x` to the nearest representable value, saturating at the
    /// format's limits.
    fn quantize(x: f64) -> Self;

    #[inline(always)]
    fn mac(acc: Self::Acc, tap: Self, x: Self::Acc) -> Self::Acc {
        acc + tap.widen() * x
    }
}

macro_rules! impl_int_accumulator {
    ($($t:ty),*) => {$(
        impl Accumulator for $t {
            #[inline(always)]
            fn zero() -> Self {
                Wrapping(0)
            }
            #[inline(always)]
            fn one() -> Self {
                Wrapping(1)
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self.0 as f64
            }
        }
    )*};
}

impl_int_accumulator!(Wrapping<i32>, Wrapping<i64>);

impl Accumulator for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
    #[inline(always)]
    fn one() -> Self {
        1.0
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

macro_rules! impl_fixed_sample {
    ($t:ty, $acc:ty, $frac:expr, $haar:expr) => {
        impl Sample for $t {
            type Acc = Wrapping<$acc>;
            const FRAC_BITS: u32 = $frac;
            const HAAR_COEF: Self = $haar;

            #[inline(always)]
            fn widen(self) -> Wrapping<$acc> {
                Wrapping(self as $acc)
            }

            #[inline(always)]
            fn narrow(acc: Wrapping<$acc>, shift: u32) -> Self {
                (acc.0 >> shift) as $t
            }

            fn quantize(x: f64) -> Self {
                let scaled = libm::round(x * (1u64 << $frac) as f64);
                if scaled >= <$t>::MAX as f64 {
                    <$t>::MAX
                } else if scaled <= <$t>::MIN as f64 {
                    <$t>::MIN
                } else {
                    scaled as $t
                }
            }
        }
    };
}

impl_fixed_sample!(i32, i64, 31, 0x5a82_799a);
impl_fixed_sample!(i16, i64, 15, 0x5a82);
impl_fixed_sample!(i8, i32, 7, 0x5b);

impl Sample for f32 {
    type Acc = f64;
    const FRAC_BITS: u32 = 0;
    const HAAR_COEF: Self = core::f32::consts::FRAC_1_SQRT_2;

    #[inline(always)]
    fn widen(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn narrow(acc: f64, _shift: u32) -> Self {
        acc as f32
    }

    fn quantize(x: f64) -> Self {
        x as f32
    }
}

impl Sample for f64 {
    type Acc = f64;
    const FRAC_BITS: u32 = 0;
    const HAAR_COEF: Self = core::f64::consts::FRAC_1_SQRT_2;

    #[inline(always)]
    fn widen(self) -> f64 {
        self
    }

    #[inline(always)]
    fn narrow(acc: f64, _shift: u32) -> Self {
        acc
    }

    fn quantize(x: f64) -> Self {
        x
    }
}

/// Convert a sample to `f64`, removing the format's fractional bits.
///
/// Handy for inspecting Q-format output against a float reference.
pub fn to_f64<S: Sample>(x: S) -> f64 {
    x.widen().to_f64() / (1u64 << S::FRAC_BITS) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haar_constants_match_quantized_cosine() {
        let c = core::f64::consts::FRAC_1_SQRT_2;
        assert_eq!(Q31::quantize(c), Q31::HAAR_COEF);
        assert_eq!(Q15::quantize(c), Q15::HAAR_COEF);
        assert_eq!(Q7::quantize(c), Q7::HAAR_COEF);
        assert_eq!(f32::quantize(c), f32::HAAR_COEF);
    }

    #[test]
    fn quantize_saturates() {
        assert_eq!(Q31::quantize(1.0), i32::MAX);
        assert_eq!(Q31::quantize(-1.0), i32::MIN);
        assert_eq!(Q15::quantize(4.0), i16::MAX);
        assert_eq!(Q7::quantize(-3.5), i8::MIN);
    }

    #[test]
    fn narrow_is_arithmetic_shift() {
        // floor division, matching a signed right shift
        assert_eq!(Q31::narrow(Wrapping(-1), 31), -1);
        assert_eq!(Q31::narrow(Wrapping(1i64 << 31), 31), 1);
        assert_eq!(Q15::narrow(Wrapping(3 << 15), 15), 3);
        assert_eq!(f32::narrow(0.25, 31), 0.25);
    }

    #[test]
    fn integer_mac_wraps_instead_of_overflowing() {
        // antireflect of [MAX, MIN] one step out: 2*MIN - MAX
        let far = Q31::MIN.widen().twice() - Q31::MAX.widen();
        let acc = Q31::mac(Wrapping(0), Q31::HAAR_COEF, far);
        let exact = i128::from(Q31::HAAR_COEF) * i128::from(far.0);
        assert_eq!(acc.0, exact as i64);
        assert_eq!(Q7::mac(Wrapping(i32::MAX), 1, Wrapping(1)), Wrapping(i32::MIN));
    }

    #[test]
    fn to_f64_scales_fractional_bits() {
        assert_eq!(to_f64::<Q15>(0x4000), 0.5);
        assert_eq!(to_f64::<Q7>(-64), -0.5);
        assert_eq!(to_f64::<f32>(1.5), 1.5);
    }
}
