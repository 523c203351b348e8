//! Signal edge extension.
//!
//! A decomposition filter centred near either end of the signal reaches past
//! `[0, length)`. [`ExtensionMode`] synthesizes those virtual samples on
//! demand instead of materializing a padded copy of the input.
//!
//! ```text
//! constant       aaa|abcd|ddd
//! symmetric      cba|abcd|dcb
//! reflect        dcb|abcd|cba
//! antisymmetric  CBA|abcd|DCB      (upper case = negated)
//! antireflect    point reflection about a and d
//! periodic       bcd|abcd|abc
//! zero           000|abcd|000
//! ```

use core::fmt;

use crate::num::{Accumulator, Sample};
use crate::wavelet::Wavelet;

/// Boundary extension policy.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtensionMode {
    /// Repeat the boundary sample.
    Constant,
    /// Mirror including the boundary sample.
    #[default]
    Symmetric,
    /// Mirror excluding the boundary sample. Needs at least two samples.
    Reflect,
    /// Mirror including the boundary sample and negate.
    Antisymmetric,
    /// Point-reflect about the boundary sample. Needs at least two samples.
    Antireflect,
    /// Wrap around to the opposite end of the signal.
    Periodic,
    /// Extend with zeros.
    Zero,
}

/// Side of the signal a filter hangs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Virtual indices below zero.
    Left,
    /// Virtual indices at or beyond the signal length.
    Right,
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionMode::Constant => "constant",
            ExtensionMode::Symmetric => "symmetric",
            ExtensionMode::Reflect => "reflect",
            ExtensionMode::Antisymmetric => "antisymmetric",
            ExtensionMode::Antireflect => "antireflect",
            ExtensionMode::Periodic => "periodic",
            ExtensionMode::Zero => "zero",
        };
        f.write_str(name)
    }
}

impl ExtensionMode {
    /// All supported modes, in declaration order.
    pub const ALL: [ExtensionMode; 7] = [
        ExtensionMode::Constant,
        ExtensionMode::Symmetric,
        ExtensionMode::Reflect,
        ExtensionMode::Antisymmetric,
        ExtensionMode::Antireflect,
        ExtensionMode::Periodic,
        ExtensionMode::Zero,
    ];

    /// Smallest signal length the mode's formula is defined for.
    pub const fn min_signal_length(self) -> usize {
        match self {
            ExtensionMode::Reflect | ExtensionMode::Antireflect => 2,
            _ => 1,
        }
    }

    /// Value of the extended signal at virtual index `k`.
    ///
    /// Inside `[0, len)` this is the sample itself. Outside, the mode's rule is
    /// applied repeatedly until the index lands inside the signal, so any `k`
    /// is valid as long as `signal.len() >= self.min_signal_length()`. Below
    /// that length, reflect and antireflect fall back to the boundary sample.
    pub fn sample_at<S: Sample>(self, signal: &[S], k: isize) -> S::Acc {
        let n = signal.len() as isize;
        if (0..n).contains(&k) {
            return signal[k as usize].widen();
        }
        match self {
            ExtensionMode::Constant => signal[k.clamp(0, n - 1) as usize].widen(),
            ExtensionMode::Symmetric => signal[mirror(k, n)].widen(),
            ExtensionMode::Reflect | ExtensionMode::Antireflect if n < 2 => signal[0].widen(),
            ExtensionMode::Reflect => {
                let period = 2 * n - 2;
                let m = k.rem_euclid(period);
                let idx = if m < n { m } else { period - m };
                signal[idx as usize].widen()
            }
            ExtensionMode::Antisymmetric => {
                let x = signal[mirror(k, n)].widen();
                if k.div_euclid(n) % 2 == 0 {
                    x
                } else {
                    -x
                }
            }
            ExtensionMode::Antireflect => antireflect(signal, k),
            ExtensionMode::Periodic => signal[k.rem_euclid(n) as usize].widen(),
            ExtensionMode::Zero => S::Acc::zero(),
        }
    }

    /// Accumulate the contribution of every filter tap that hangs over
    /// `edge` for the output centred at `offset`.
    ///
    /// `cursor` is the first tap index not yet accumulated. On the right edge
    /// the hanging taps are `cursor..=offset-length`, on the left edge they are
    /// `cursor..filter_len` (all of which must map below zero). On return
    /// `cursor` points past the last hanging tap.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn extend<S: Sample>(
        self,
        edge: Edge,
        signal: &[S],
        wavelet: &Wavelet<'_, S>,
        offset: usize,
        cursor: &mut usize,
        sum_lo: &mut S::Acc,
        sum_hi: &mut S::Acc,
    ) {
        let end = match edge {
            Edge::Left => wavelet.len(),
            Edge::Right => offset + 1 - signal.len(),
        };
        if self != ExtensionMode::Zero {
            for j in *cursor..end {
                let x = self.sample_at(signal, offset as isize - j as isize);
                *sum_lo = S::mac(*sum_lo, wavelet.dec_lo()[j], x);
                *sum_hi = S::mac(*sum_hi, wavelet.dec_hi()[j], x);
            }
        }
        *cursor = (*cursor).max(end);
    }
}

/// Whole-sample symmetric mirror with period `2n`.
#[inline]
fn mirror(k: isize, n: isize) -> usize {
    let m = k.rem_euclid(2 * n);
    (if m < n { m } else { 2 * n - 1 - m }) as usize
}

/// Iterated point reflection: `x[-j] = 2x[0] - x[j]`,
/// `x[n-1+j] = 2x[n-1] - x[n-1-j]`.
fn antireflect<S: Sample>(signal: &[S], mut k: isize) -> S::Acc {
    let n = signal.len() as isize;
    let first = signal[0].widen().twice();
    let last = signal[signal.len() - 1].widen().twice();
    let mut acc = S::Acc::zero();
    let mut negate = false;
    loop {
        let (pivot, next) = if k < 0 {
            (first, -k)
        } else if k >= n {
            (last, 2 * (n - 1) - k)
        } else {
            let x = signal[k as usize].widen();
            return if negate { acc - x } else { acc + x };
        };
        acc = if negate { acc - pivot } else { acc + pivot };
        negate = !negate;
        k = next;
    }
}
