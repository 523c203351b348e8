//! Four-region convolution engine for arbitrary even-length filters.
//!
//! Output `n` is the filter applied at virtual offset `2n + 1`:
//! `A[n] = sum_j dec_lo[j] * ext(2n + 1 - j)`, likewise for `D[n]`. Offsets
//! are split by [`RegionPlan`] so that only the edge regions ever consult the
//! extension policy and the interior loop touches nothing but the signal.

use crate::extension::{Edge, ExtensionMode};
use crate::num::{Accumulator, Sample};
use crate::partition::{Lanes, Partition, RegionPlan};
use crate::wavelet::Wavelet;

/// Outputs each region produces for one unit, in
/// [`Region`](crate::partition::Region) order.
pub fn region_counts(signal_len: usize, filter_len: usize, partition: Partition) -> [usize; 4] {
    RegionPlan::new(signal_len, filter_len, partition).counts()
}

#[inline(always)]
fn store<S: Sample, L: Lanes<S>>(lanes: &mut L, offset: usize, lo: S::Acc, hi: S::Acc) {
    lanes.store(
        (offset - 1) / 2,
        S::narrow(lo, S::FRAC_BITS),
        S::narrow(hi, S::FRAC_BITS),
    );
}

/// Accumulate taps `taps` against in-bounds samples `signal[offset - j]`.
#[inline(always)]
fn inner<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    offset: usize,
    taps: core::ops::Range<usize>,
    lo: &mut S::Acc,
    hi: &mut S::Acc,
) {
    let (dec_lo, dec_hi) = (wavelet.dec_lo(), wavelet.dec_hi());
    for j in taps {
        let x = signal[offset - j].widen();
        *lo = S::mac(*lo, dec_lo[j], x);
        *hi = S::mac(*hi, dec_hi[j], x);
    }
}

pub(crate) fn decompose<S: Sample, L: Lanes<S>>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    partition: Partition,
    lanes: &mut L,
) {
    let len = signal.len();
    let filter_len = wavelet.len();
    let plan = RegionPlan::new(len, filter_len, partition);
    let zero = S::Acc::zero();

    // Filter overhangs the left edge.
    for offset in plan.left.iter() {
        let (mut lo, mut hi) = (zero, zero);
        inner(signal, wavelet, offset, 0..offset + 1, &mut lo, &mut hi);
        let mut cursor = offset + 1;
        mode.extend(Edge::Left, signal, wavelet, offset, &mut cursor, &mut lo, &mut hi);
        store(lanes, offset, lo, hi);
    }

    // Filter fully inside the signal, two taps per step.
    let tap_pairs = wavelet
        .dec_lo()
        .chunks_exact(2)
        .zip(wavelet.dec_hi().chunks_exact(2));
    for offset in plan.interior.iter() {
        let window = &signal[offset + 1 - filter_len..=offset];
        let (mut lo, mut hi) = (zero, zero);
        for ((t_lo, t_hi), x) in tap_pairs.clone().zip(window.rchunks_exact(2)) {
            let (x0, x1) = (x[1].widen(), x[0].widen());
            lo = S::mac(S::mac(lo, t_lo[0], x0), t_lo[1], x1);
            hi = S::mac(S::mac(hi, t_hi[0], x0), t_hi[1], x1);
        }
        store(lanes, offset, lo, hi);
    }

    // Signal shorter than the filter: both edges contribute.
    for offset in plan.short_center.iter() {
        let (mut lo, mut hi) = (zero, zero);
        let mut cursor = 0;
        mode.extend(Edge::Right, signal, wavelet, offset, &mut cursor, &mut lo, &mut hi);
        inner(signal, wavelet, offset, cursor..offset + 1, &mut lo, &mut hi);
        cursor = offset + 1;
        mode.extend(Edge::Left, signal, wavelet, offset, &mut cursor, &mut lo, &mut hi);
        store(lanes, offset, lo, hi);
    }

    // Filter overhangs the right edge.
    for offset in plan.right.iter() {
        let (mut lo, mut hi) = (zero, zero);
        let mut cursor = 0;
        mode.extend(Edge::Right, signal, wavelet, offset, &mut cursor, &mut lo, &mut hi);
        inner(signal, wavelet, offset, cursor..filter_len, &mut lo, &mut hi);
        store(lanes, offset, lo, hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::SliceLanes;
    use crate::wavelet::{WaveletFamily, WaveletKind};
    use alloc::vec;
    use alloc::vec::Vec;

    fn direct(signal: &[f64], wavelet: &Wavelet<'_, f64>, mode: ExtensionMode) -> Vec<(f64, f64)> {
        let out = crate::dwt_length(signal.len(), wavelet.len());
        (0..out)
            .map(|n| {
                let offset = 2 * n + 1;
                let mut lo = 0.0;
                let mut hi = 0.0;
                for j in 0..wavelet.len() {
                    let x = mode.sample_at(signal, offset as isize - j as isize);
                    lo += wavelet.dec_lo()[j] * x;
                    hi += wavelet.dec_hi()[j] * x;
                }
                (lo, hi)
            })
            .collect()
    }

    fn run(signal: &[f64], wavelet: &Wavelet<'_, f64>, mode: ExtensionMode) -> Vec<(f64, f64)> {
        let out = crate::dwt_length(signal.len(), wavelet.len());
        let mut a = vec![0.0; out];
        let mut d = vec![0.0; out];
        decompose(
            signal,
            wavelet,
            mode,
            Partition::SINGLE,
            &mut SliceLanes::new(&mut a, &mut d),
        );
        a.into_iter().zip(d).collect()
    }

    #[test]
    fn matches_direct_evaluation() {
        let signal: Vec<f64> = (0..13).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        for family in [WaveletFamily::Db2, WaveletFamily::Db4, WaveletFamily::Coif1] {
            let bank = family.filter_bank::<f64>();
            let w = bank.wavelet();
            for mode in ExtensionMode::ALL {
                for len in [2usize, 3, 4, 7, 8, 13] {
                    let got = run(&signal[..len], &w, mode);
                    let want = direct(&signal[..len], &w, mode);
                    for ((ga, gd), (wa, wd)) in got.iter().zip(&want) {
                        assert!((ga - wa).abs() < 1e-12, "{family:?} {mode} {len}");
                        assert!((gd - wd).abs() < 1e-12, "{family:?} {mode} {len}");
                    }
                }
            }
        }
    }

    #[test]
    fn region_counts_for_long_signal() {
        // 10 samples, 4 taps: offsets 1 | 3 5 7 9 | 11
        assert_eq!(region_counts(10, 4, Partition::SINGLE), [1, 4, 0, 1]);
        // 3 samples, 6 taps: offsets 1 | - | 3 | 5 7
        assert_eq!(region_counts(3, 6, Partition::SINGLE), [1, 0, 1, 2]);
    }

    #[test]
    fn integer_taps_accumulate_exactly() {
        let lo = [1i32, 2, 3, 4];
        let hi = [4i32, -3, 2, -1];
        let w = Wavelet::new(WaveletKind::Generic, &lo, &hi).unwrap();
        let x = [1i32, 0, 0, 0, 0, 0];
        let mut a = [0i32; 4];
        let mut d = [0i32; 4];
        // an impulse picks out taps 1 and 3; the Q31 shift floors them
        decompose(
            &x,
            &w,
            ExtensionMode::Zero,
            Partition::SINGLE,
            &mut SliceLanes::new(&mut a, &mut d),
        );
        assert_eq!(a, [0, 0, 0, 0]);
        assert_eq!(d, [-1, -1, 0, 0]);
    }
}
