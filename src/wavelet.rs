//! Wavelet decomposition filters.
//!
//! Taps are stored in convolution order: `dec_lo[j]` multiplies the sample
//! `j` positions before the output's centre. For the Haar wavelet that gives
//! `dec_lo = [c, c]` and `dec_hi = [-c, c]`, so `A[n] = c(x[2n] + x[2n+1])`
//! and `D[n] = c(x[2n] - x[2n+1])`.
//!
//! no_std + alloc compatible

#![allow(clippy::excessive_precision)]

extern crate alloc;
use alloc::vec::Vec;

use crate::dwt::DwtError;
use crate::num::Sample;

/// Selects the kernel a decomposition is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveletKind {
    /// Orthonormal Haar, handled by the normalized two-tap fast path.
    Haar,
    /// Daubechies-1, identical to [`WaveletKind::Haar`].
    Db1,
    /// Haar with unit taps and no final scaling.
    HaarUnnormalized,
    /// Any other even-length filter, handled by the region engine.
    Generic,
}

impl WaveletKind {
    pub fn is_haar(self) -> bool {
        !matches!(self, WaveletKind::Generic)
    }
}

/// A validated, borrowed decomposition filter pair.
#[derive(Debug, Clone, Copy)]
pub struct Wavelet<'a, S> {
    kind: WaveletKind,
    dec_lo: &'a [S],
    dec_hi: &'a [S],
}

impl<'a, S: Sample> Wavelet<'a, S> {
    /// Build a filter from its lowpass and highpass decomposition taps.
    ///
    /// Returns [`DwtError::InvalidFilterLength`] unless the filter has an even
    /// number of taps (at least two), and [`DwtError::FilterTapMismatch`] if
    /// the two tap sequences differ in length. Haar kinds must have exactly two
    /// taps.
    pub fn new(kind: WaveletKind, dec_lo: &'a [S], dec_hi: &'a [S]) -> Result<Self, DwtError> {
        if dec_lo.len() != dec_hi.len() {
            return Err(DwtError::FilterTapMismatch {
                dec_lo: dec_lo.len(),
                dec_hi: dec_hi.len(),
            });
        }
        let len = dec_lo.len();
        if len < 2 || len % 2 != 0 || (kind.is_haar() && len != 2) {
            return Err(DwtError::InvalidFilterLength { length: len });
        }
        Ok(Self {
            kind,
            dec_lo,
            dec_hi,
        })
    }

    #[inline(always)]
    pub fn kind(&self) -> WaveletKind {
        self.kind
    }

    /// Number of taps.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.dec_lo.len()
    }

    /// Always `false`; a validated filter has at least two taps.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.dec_lo.is_empty()
    }

    #[inline(always)]
    pub fn dec_lo(&self) -> &'a [S] {
        self.dec_lo
    }

    #[inline(always)]
    pub fn dec_hi(&self) -> &'a [S] {
        self.dec_hi
    }
}

/// Owned filter taps, e.g. a quantized built-in family or coefficients
/// staged into scratch memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank<S> {
    kind: WaveletKind,
    dec_lo: Vec<S>,
    dec_hi: Vec<S>,
}

impl<S: Sample> FilterBank<S> {
    /// Take ownership of tap vectors, validating them like [`Wavelet::new`].
    pub fn new(kind: WaveletKind, dec_lo: Vec<S>, dec_hi: Vec<S>) -> Result<Self, DwtError> {
        Wavelet::new(kind, &dec_lo, &dec_hi)?;
        Ok(Self {
            kind,
            dec_lo,
            dec_hi,
        })
    }

    /// Build from a lowpass filter, deriving the highpass taps with the
    /// quadrature mirror relation `dec_hi[k] = (-1)^(k+1) dec_lo[F-1-k]`.
    pub fn from_lowpass(kind: WaveletKind, dec_lo: &[f64]) -> Result<Self, DwtError> {
        let (lo, hi) = quadrature_mirror(dec_lo);
        Self::new(kind, lo, hi)
    }

    pub fn wavelet(&self) -> Wavelet<'_, S> {
        Wavelet {
            kind: self.kind,
            dec_lo: &self.dec_lo,
            dec_hi: &self.dec_hi,
        }
    }

    /// Wrap taps copied from an already validated [`Wavelet`].
    pub(crate) fn staged(kind: WaveletKind, dec_lo: Vec<S>, dec_hi: Vec<S>) -> Self {
        Self {
            kind,
            dec_lo,
            dec_hi,
        }
    }

    pub(crate) fn into_taps(self) -> (Vec<S>, Vec<S>) {
        (self.dec_lo, self.dec_hi)
    }
}

/// Built-in wavelet families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveletFamily {
    Haar,
    Db1,
    HaarUnnormalized,
    Db2,
    Db3,
    Db4,
    Sym4,
    Coif1,
}

const HAAR: [f64; 2] = [
    core::f64::consts::FRAC_1_SQRT_2,
    core::f64::consts::FRAC_1_SQRT_2,
];

const DB2: [f64; 4] = [
    -0.12940952255092145,
    0.22414386804185735,
    0.836516303737469,
    0.48296291314469025,
];

const DB3: [f64; 6] = [
    0.03522629188570953,
    -0.08544127388202666,
    -0.13501102001025458,
    0.45987750211849154,
    0.8068915093110925,
    0.33267055295008263,
];

const DB4: [f64; 8] = [
    -0.010597401784997278,
    0.032883011666982945,
    0.030841381835986965,
    -0.18703481171888114,
    -0.02798376941698385,
    0.6308807679295904,
    0.7148465705525415,
    0.23037781330885523,
];

const SYM4: [f64; 8] = [
    -0.07576571478927333,
    -0.02963552764599851,
    0.49761866763201545,
    0.8037387518059161,
    0.29785779560527736,
    -0.09921954357684722,
    -0.012603967262037833,
    0.0322231006040427,
];

const COIF1: [f64; 6] = [
    -0.01565572813546454,
    -0.0727326195128539,
    0.38486484686420286,
    0.8525720202122554,
    0.3378976624578092,
    -0.0727326195128539,
];

impl WaveletFamily {
    pub fn kind(self) -> WaveletKind {
        match self {
            WaveletFamily::Haar => WaveletKind::Haar,
            WaveletFamily::Db1 => WaveletKind::Db1,
            WaveletFamily::HaarUnnormalized => WaveletKind::HaarUnnormalized,
            _ => WaveletKind::Generic,
        }
    }

    /// Double-precision lowpass decomposition taps.
    pub fn dec_lo(self) -> &'static [f64] {
        match self {
            WaveletFamily::Haar | WaveletFamily::Db1 => &HAAR,
            WaveletFamily::HaarUnnormalized => &[1.0, 1.0],
            WaveletFamily::Db2 => &DB2,
            WaveletFamily::Db3 => &DB3,
            WaveletFamily::Db4 => &DB4,
            WaveletFamily::Sym4 => &SYM4,
            WaveletFamily::Coif1 => &COIF1,
        }
    }

    /// Quantize the family's taps into format `S`.
    ///
    /// The normalized Haar taps use `S::HAAR_COEF` directly so the generic
    /// engine and the Haar fast path agree bit for bit. The unnormalized Haar
    /// taps are the raw integer `1`: they are only meaningful to the
    /// unnormalized fast path, which applies no final shift.
    pub fn filter_bank<S: Sample>(self) -> FilterBank<S> {
        let c = match self {
            WaveletFamily::Haar | WaveletFamily::Db1 => Some(S::HAAR_COEF),
            WaveletFamily::HaarUnnormalized => Some(S::narrow(num_one::<S>(), 0)),
            _ => None,
        };
        let (lo, hi) = match c {
            Some(c) => (
                alloc::vec![c, c],
                alloc::vec![S::narrow(-c.widen(), 0), c],
            ),
            None => quadrature_mirror(self.dec_lo()),
        };
        FilterBank {
            kind: self.kind(),
            dec_lo: lo,
            dec_hi: hi,
        }
    }
}

fn quadrature_mirror<S: Sample>(dec_lo: &[f64]) -> (Vec<S>, Vec<S>) {
    let len = dec_lo.len();
    let lo = dec_lo.iter().map(|&t| S::quantize(t)).collect();
    let hi = (0..len)
        .map(|k| {
            let t = dec_lo[len - 1 - k];
            S::quantize(if k % 2 == 0 { -t } else { t })
        })
        .collect();
    (lo, hi)
}

#[inline(always)]
fn num_one<S: Sample>() -> S::Acc {
    <S::Acc as crate::num::Accumulator>::one()
}
