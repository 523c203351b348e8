//! Two-tap Haar fast path.
//!
//! With `dec_lo = [c, c]` and `dec_hi = [-c, c]` every output pairs two
//! neighbouring samples, so even-length signals need no boundary handling at
//! all. An odd-length signal adds one trailing output whose second sample is
//! the right extension `e` of the last sample, computed in closed form.

use crate::extension::ExtensionMode;
use crate::num::{Accumulator, Sample};
use crate::partition::{Lanes, Partition};

/// Haar coefficient and final shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaarScale<S: Sample> {
    coef: S::Acc,
    shift: u32,
}

impl<S: Sample> HaarScale<S> {
    /// `cos(pi/4)` in the sample format, removed by the format's shift.
    pub fn normalized() -> Self {
        Self {
            coef: S::HAAR_COEF.widen(),
            shift: S::FRAC_BITS,
        }
    }

    /// Unit coefficient and no shift: `A = x0 + x1`, `D = x0 - x1`.
    pub fn unnormalized() -> Self {
        Self {
            coef: S::Acc::one(),
            shift: 0,
        }
    }

    #[inline(always)]
    fn emit<L: Lanes<S>>(&self, lanes: &mut L, n: usize, lo: S::Acc, hi: S::Acc) {
        lanes.store(n, S::narrow(lo, self.shift), S::narrow(hi, self.shift));
    }
}

/// Right extension of the last sample, the only virtual sample a two-tap
/// filter ever reads.
#[inline]
fn trailing_extension<S: Sample>(signal: &[S], mode: ExtensionMode) -> S::Acc {
    let len = signal.len();
    let last = signal[len - 1].widen();
    match mode {
        ExtensionMode::Constant | ExtensionMode::Symmetric => last,
        ExtensionMode::Reflect => signal[len - 2].widen(),
        ExtensionMode::Antisymmetric => -last,
        ExtensionMode::Antireflect => last.twice() - signal[len - 2].widen(),
        ExtensionMode::Periodic => signal[0].widen(),
        ExtensionMode::Zero => S::Acc::zero(),
    }
}

pub(crate) fn decompose<S: Sample, L: Lanes<S>>(
    signal: &[S],
    mode: ExtensionMode,
    scale: HaarScale<S>,
    partition: Partition,
    lanes: &mut L,
) {
    let c = scale.coef;
    let pairs = signal.len() / 2;
    for n in partition.indices(pairs) {
        let s0 = signal[2 * n].widen();
        let s1 = signal[2 * n + 1].widen();
        scale.emit(lanes, n, c * s0 + c * s1, c * s0 - c * s1);
    }
    if signal.len() % 2 == 1 && pairs % partition.n_pe() == partition.core_id() {
        let last = signal[signal.len() - 1].widen();
        let e = trailing_extension(signal, mode);
        scale.emit(lanes, pairs, c * e + c * last, c * last - c * e);
    }
}
