use alloc::vec;
use alloc::vec::Vec;

use proptest::prelude::*;
use proptest::prop_assert_eq;
use proptest::proptest;

use crate::dwt::{dwt, dwt_length, dwt_unit};
use crate::extension::ExtensionMode;
use crate::num::{Sample, Q15, Q31};
use crate::wavelet::{Wavelet, WaveletFamily, WaveletKind};

fn mode_strategy() -> impl Strategy<Value = ExtensionMode> {
    proptest::sample::select(ExtensionMode::ALL.to_vec())
}

fn family_strategy() -> impl Strategy<Value = WaveletFamily> {
    proptest::sample::select(vec![
        WaveletFamily::Haar,
        WaveletFamily::Db2,
        WaveletFamily::Db3,
        WaveletFamily::Db4,
        WaveletFamily::Sym4,
        WaveletFamily::Coif1,
    ])
}

fn decompose<S: Sample>(x: &[S], w: &Wavelet<'_, S>, mode: ExtensionMode) -> (Vec<S>, Vec<S>) {
    let len = dwt_length(x.len(), w.len());
    let mut a = vec![S::default(); len];
    let mut d = vec![S::default(); len];
    dwt(x, w, mode, &mut a, &mut d).unwrap();
    (a, d)
}

proptest! {
    #[test]
    fn prop_units_reassemble_single_core(
        ref signal in proptest::collection::vec(-(1i32 << 24)..(1i32 << 24), 2..64),
        family in family_strategy(),
        mode in mode_strategy(),
        n_pe in 1usize..7,
    ) {
        let bank = family.filter_bank::<Q31>();
        let w = bank.wavelet();
        let (a_ref, d_ref) = decompose(signal, &w, mode);
        let mut a = vec![0; a_ref.len()];
        let mut d = vec![0; d_ref.len()];
        for core_id in 0..n_pe {
            dwt_unit(signal, &w, mode, &mut a, &mut d, core_id, n_pe).unwrap();
        }
        prop_assert_eq!(a, a_ref);
        prop_assert_eq!(d, d_ref);
    }

    #[test]
    fn prop_haar_fast_path_matches_engine(
        ref signal in proptest::collection::vec(any::<i16>(), 2..48),
        mode in mode_strategy(),
    ) {
        let bank = WaveletFamily::Haar.filter_bank::<Q15>();
        let fast = bank.wavelet();
        let generic = Wavelet::new(WaveletKind::Generic, fast.dec_lo(), fast.dec_hi()).unwrap();
        prop_assert_eq!(decompose(signal, &fast, mode), decompose(signal, &generic, mode));
    }

    #[test]
    fn prop_q31_tracks_f64(
        ref signal in proptest::collection::vec(-0.1f64..0.1, 8..40),
        family in family_strategy(),
        mode in mode_strategy(),
    ) {
        let q: Vec<Q31> = signal.iter().map(|&v| Q31::quantize(v)).collect();
        let qbank = family.filter_bank::<Q31>();
        let fbank = family.filter_bank::<f64>();
        let (qa, qd) = decompose(&q, &qbank.wavelet(), mode);
        let (fa, fd) = decompose(signal, &fbank.wavelet(), mode);
        for (q, f) in qa.iter().chain(&qd).zip(fa.iter().chain(&fd)) {
            prop_assert!((crate::num::to_f64(*q) - f).abs() < 1e-6);
        }
    }
}
