//! One-level DWT entry points.
//!
//! [`dwt`] runs a whole decomposition on the calling thread. [`dwt_unit`] runs
//! one execution unit's strided share so a cluster of `n_pe` callers can split
//! the work, and [`DwtInstance`] packages the arguments a cluster entry point
//! receives. Every entry point validates its inputs before writing a single
//! output coefficient.
//!
//! ```
//! use clusterdwt::{dwt_f32, ExtensionMode, WaveletFamily};
//!
//! let bank = WaveletFamily::Haar.filter_bank::<f32>();
//! let x = [1.0f32, 2.0, 3.0, 4.0];
//! let mut a = [0.0f32; 2];
//! let mut d = [0.0f32; 2];
//! dwt_f32(&x, &bank.wavelet(), ExtensionMode::Symmetric, &mut a, &mut d).unwrap();
//! assert!((a[0] - 3.0 * core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
//! ```

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::convolve;
use crate::extension::ExtensionMode;
use crate::haar::{self, HaarScale};
use crate::hal::ClusterHal;
use crate::num::{Sample, Q15, Q31, Q7};
use crate::partition::{Lanes, Partition, SharedLanes, SliceLanes};
use crate::wavelet::{Wavelet, WaveletKind};

/// Errors reported by the DWT entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwtError {
    /// The input signal has no samples.
    EmptyInput,
    /// The extension mode needs more samples than the signal has.
    SignalTooShort { mode: ExtensionMode, length: usize },
    /// Filters must have an even number of taps, at least two.
    InvalidFilterLength { length: usize },
    /// Lowpass and highpass taps differ in count.
    FilterTapMismatch { dec_lo: usize, dec_hi: usize },
    /// An output slice does not hold exactly [`dwt_length`] coefficients.
    OutputLengthMismatch {
        expected: usize,
        approx: usize,
        detail: usize,
    },
    /// `core_id` must be below `n_pe`, and `n_pe` must be non-zero.
    InvalidPartition { core_id: usize, n_pe: usize },
    /// A [`DwtInstance`] unit was run a second time.
    UnitAlreadyRun { core_id: usize },
}

impl core::fmt::Display for DwtError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DwtError::EmptyInput => write!(f, "input signal is empty"),
            DwtError::SignalTooShort { mode, length } => write!(
                f,
                "{mode} extension needs at least {} samples, got {length}",
                mode.min_signal_length()
            ),
            DwtError::InvalidFilterLength { length } => {
                write!(f, "filter length {length} is not even and at least 2")
            }
            DwtError::FilterTapMismatch { dec_lo, dec_hi } => write!(
                f,
                "lowpass has {dec_lo} taps but highpass has {dec_hi}"
            ),
            DwtError::OutputLengthMismatch {
                expected,
                approx,
                detail,
            } => write!(
                f,
                "outputs must hold {expected} coefficients, got approx {approx} and detail {detail}"
            ),
            DwtError::InvalidPartition { core_id, n_pe } => {
                write!(f, "core {core_id} is outside a cluster of {n_pe}")
            }
            DwtError::UnitAlreadyRun { core_id } => {
                write!(f, "core {core_id} already ran its share of this instance")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DwtError {}

/// Number of approximation (and detail) coefficients one decomposition level
/// of `signal_len` samples produces with a `filter_len`-tap filter.
///
/// Equals `ceil(signal_len / 2)` for two-tap filters.
#[inline]
pub const fn dwt_length(signal_len: usize, filter_len: usize) -> usize {
    (signal_len + filter_len.saturating_sub(1)) / 2
}

/// Check everything a decomposition relies on. Nothing is written on error.
pub(crate) fn validate<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx_len: usize,
    detail_len: usize,
) -> Result<(), DwtError> {
    let result = check(signal, wavelet, mode, approx_len, detail_len);
    if let Err(_err) = &result {
        crate::dwt_log!(warn, "rejected decomposition: {}", _err);
    }
    result
}

fn check<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx_len: usize,
    detail_len: usize,
) -> Result<(), DwtError> {
    if signal.is_empty() {
        return Err(DwtError::EmptyInput);
    }
    if signal.len() < mode.min_signal_length() {
        return Err(DwtError::SignalTooShort {
            mode,
            length: signal.len(),
        });
    }
    let expected = dwt_length(signal.len(), wavelet.len());
    if approx_len != expected || detail_len != expected {
        return Err(DwtError::OutputLengthMismatch {
            expected,
            approx: approx_len,
            detail: detail_len,
        });
    }
    Ok(())
}

/// Route one unit's share to the kernel its wavelet kind selects.
pub(crate) fn run_unit<S: Sample, L: Lanes<S>>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    partition: Partition,
    lanes: &mut L,
) {
    match wavelet.kind() {
        WaveletKind::Haar | WaveletKind::Db1 => {
            haar::decompose(signal, mode, HaarScale::normalized(), partition, lanes)
        }
        WaveletKind::HaarUnnormalized => {
            haar::decompose(signal, mode, HaarScale::unnormalized(), partition, lanes)
        }
        WaveletKind::Generic => convolve::decompose(signal, wavelet, mode, partition, lanes),
    }
}

/// Compute one decomposition level on the calling thread.
///
/// `approx` and `detail` must each hold exactly
/// [`dwt_length(signal.len(), wavelet.len())`](dwt_length) coefficients.
pub fn dwt<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx: &mut [S],
    detail: &mut [S],
) -> Result<(), DwtError> {
    validate(signal, wavelet, mode, approx.len(), detail.len())?;
    crate::dwt_log!(
        debug,
        "dwt: {} samples, {:?} filter of {} taps, {} extension",
        signal.len(),
        wavelet.kind(),
        wavelet.len(),
        mode
    );
    run_unit(
        signal,
        wavelet,
        mode,
        Partition::SINGLE,
        &mut SliceLanes::new(approx, detail),
    );
    Ok(())
}

/// Compute the share of unit `core_id` in a cluster of `n_pe` units.
///
/// Only indices congruent to `core_id` modulo `n_pe` are written; the caller
/// runs every unit over the same outputs and waits for all of them.
pub fn dwt_unit<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx: &mut [S],
    detail: &mut [S],
    core_id: usize,
    n_pe: usize,
) -> Result<(), DwtError> {
    let partition = Partition::new(core_id, n_pe)?;
    validate(signal, wavelet, mode, approx.len(), detail.len())?;
    run_unit(
        signal,
        wavelet,
        mode,
        partition,
        &mut SliceLanes::new(approx, detail),
    );
    Ok(())
}

/// Arguments shared by every unit of one cluster run.
///
/// Built once by the dispatching core, then handed to each unit, which calls
/// [`DwtInstance::run`] with its own HAL handle. Every unit may run once; the
/// instance records which units have started so two callers can never write
/// the same outputs.
pub struct DwtInstance<'a, S> {
    signal: &'a [S],
    wavelet: Wavelet<'a, S>,
    mode: ExtensionMode,
    n_pe: usize,
    lanes: SharedLanes<'a, S>,
    // one flag per unit that owns at least one output
    started: Vec<AtomicBool>,
}

impl<'a, S: Sample> DwtInstance<'a, S> {
    /// Validate a cluster run of `n_pe` units writing into `approx`/`detail`.
    pub fn new(
        signal: &'a [S],
        wavelet: Wavelet<'a, S>,
        mode: ExtensionMode,
        approx: &'a mut [S],
        detail: &'a mut [S],
        n_pe: usize,
    ) -> Result<Self, DwtError> {
        if n_pe == 0 {
            return Err(DwtError::InvalidPartition { core_id: 0, n_pe });
        }
        validate(signal, &wavelet, mode, approx.len(), detail.len())?;
        let expected = approx.len();
        let lanes = SharedLanes::new(approx, detail).ok_or(DwtError::OutputLengthMismatch {
            expected,
            approx: expected,
            detail: expected,
        })?;
        let started = (0..n_pe.min(expected))
            .map(|_| AtomicBool::new(false))
            .collect();
        Ok(Self {
            signal,
            wavelet,
            mode,
            n_pe,
            lanes,
            started,
        })
    }

    pub fn n_pe(&self) -> usize {
        self.n_pe
    }

    /// Run the share of the unit identified by `hal.core_id()`.
    ///
    /// Fails with [`DwtError::UnitAlreadyRun`] if that unit has already
    /// started on this instance, whether on this thread or another.
    pub fn run<H: ClusterHal>(&self, hal: &H) -> Result<(), DwtError> {
        let partition = Partition::new(hal.core_id(), self.n_pe)?;
        let core_id = partition.core_id();
        // Units past the output length own no indices and write nothing.
        if let Some(flag) = self.started.get(core_id) {
            if flag.swap(true, Ordering::AcqRel) {
                crate::dwt_log!(warn, "core {} ran twice on one instance", core_id);
                return Err(DwtError::UnitAlreadyRun { core_id });
            }
        }
        let mut lanes = self.lanes;
        run_unit(self.signal, &self.wavelet, self.mode, partition, &mut lanes);
        Ok(())
    }
}

macro_rules! format_entry_points {
    ($t:ty, $dwt:ident, $unit:ident) => {
        #[doc = concat!("[`dwt`] for `", stringify!($t), "` samples.")]
        pub fn $dwt(
            signal: &[$t],
            wavelet: &Wavelet<'_, $t>,
            mode: ExtensionMode,
            approx: &mut [$t],
            detail: &mut [$t],
        ) -> Result<(), DwtError> {
            dwt(signal, wavelet, mode, approx, detail)
        }

        #[doc = concat!("[`dwt_unit`] for `", stringify!($t), "` samples.")]
        pub fn $unit(
            signal: &[$t],
            wavelet: &Wavelet<'_, $t>,
            mode: ExtensionMode,
            approx: &mut [$t],
            detail: &mut [$t],
            core_id: usize,
            n_pe: usize,
        ) -> Result<(), DwtError> {
            dwt_unit(signal, wavelet, mode, approx, detail, core_id, n_pe)
        }
    };
}

format_entry_points!(Q31, dwt_q31, dwt_unit_q31);
format_entry_points!(Q15, dwt_q15, dwt_unit_q15);
format_entry_points!(Q7, dwt_q7, dwt_unit_q7);
format_entry_points!(f32, dwt_f32, dwt_unit_f32);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::HostCluster;
    use crate::wavelet::WaveletFamily;
    use alloc::vec;

    #[test]
    fn output_length() {
        assert_eq!(dwt_length(6, 2), 3);
        assert_eq!(dwt_length(7, 2), 4);
        assert_eq!(dwt_length(1, 2), 1);
        assert_eq!(dwt_length(10, 4), 6);
        assert_eq!(dwt_length(5, 8), 6);
    }

    #[test]
    fn validation_leaves_outputs_untouched() {
        let bank = WaveletFamily::Db2.filter_bank::<f32>();
        let mut a = vec![9.0f32; 3];
        let mut d = vec![9.0f32; 3];
        for mode in [ExtensionMode::Reflect, ExtensionMode::Antireflect] {
            let err = dwt(&[1.0], &bank.wavelet(), mode, &mut a[..2], &mut d[..2]).unwrap_err();
            assert_eq!(err, DwtError::SignalTooShort { mode, length: 1 });
        }
        let err = dwt(&[], &bank.wavelet(), ExtensionMode::Zero, &mut a, &mut d).unwrap_err();
        assert_eq!(err, DwtError::EmptyInput);
        let err = dwt(
            &[1.0, 2.0],
            &bank.wavelet(),
            ExtensionMode::Zero,
            &mut a,
            &mut d[..2],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DwtError::OutputLengthMismatch {
                expected: 2,
                approx: 3,
                detail: 2
            }
        );
        assert!(a.iter().chain(d.iter()).all(|&v| v == 9.0));
    }

    #[test]
    fn unit_rejects_bad_partition() {
        let bank = WaveletFamily::Haar.filter_bank::<Q15>();
        let mut a = [0i16; 2];
        let mut d = [0i16; 2];
        let err = dwt_unit_q15(
            &[1, 2, 3, 4],
            &bank.wavelet(),
            ExtensionMode::Symmetric,
            &mut a,
            &mut d,
            2,
            2,
        )
        .unwrap_err();
        assert_eq!(err, DwtError::InvalidPartition { core_id: 2, n_pe: 2 });
    }

    #[test]
    fn instance_runs_every_unit() {
        let bank = WaveletFamily::Db2.filter_bank::<f64>();
        let x = [3.0, -1.0, 4.0, 1.0, -5.0, 9.0, 2.0];
        let mut a_ref = [0.0; 5];
        let mut d_ref = [0.0; 5];
        dwt(&x, &bank.wavelet(), ExtensionMode::Periodic, &mut a_ref, &mut d_ref).unwrap();

        let mut a = [0.0; 5];
        let mut d = [0.0; 5];
        let inst = DwtInstance::new(
            &x,
            bank.wavelet(),
            ExtensionMode::Periodic,
            &mut a,
            &mut d,
            3,
        )
        .unwrap();
        for core_id in 0..inst.n_pe() {
            inst.run(&HostCluster::new(core_id)).unwrap();
        }
        assert_eq!(
            inst.run(&HostCluster::new(3)),
            Err(DwtError::InvalidPartition { core_id: 3, n_pe: 3 })
        );
        assert_eq!(
            inst.run(&HostCluster::new(1)),
            Err(DwtError::UnitAlreadyRun { core_id: 1 })
        );
        drop(inst);
        assert_eq!(a, a_ref);
        assert_eq!(d, d_ref);
    }

    #[test]
    fn idle_units_may_run_freely() {
        let bank = WaveletFamily::HaarUnnormalized.filter_bank::<f32>();
        let x = [1.0f32, 2.0, 3.0];
        let mut a = [0.0f32; 2];
        let mut d = [0.0f32; 2];
        let inst = DwtInstance::new(
            &x,
            bank.wavelet(),
            ExtensionMode::Zero,
            &mut a,
            &mut d,
            4,
        )
        .unwrap();
        // units 2 and 3 own no outputs
        for _ in 0..2 {
            inst.run(&HostCluster::new(3)).unwrap();
        }
        inst.run(&HostCluster::new(0)).unwrap();
        inst.run(&HostCluster::new(1)).unwrap();
        drop(inst);
        assert_eq!(a, [3.0, 3.0]);
        assert_eq!(d, [-1.0, 3.0]);
    }

    #[test]
    fn error_messages() {
        let msg = alloc::format!(
            "{}",
            DwtError::SignalTooShort {
                mode: ExtensionMode::Reflect,
                length: 1
            }
        );
        assert_eq!(msg, "reflect extension needs at least 2 samples, got 1");
    }
}
