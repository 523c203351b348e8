//! Cluster-wide decomposition on the rayon pool.
//!
//! The dispatching thread validates the call and stages generic filter taps
//! through the [`ClusterHal`](crate::hal::ClusterHal). Each unit then runs on its own rayon task with
//! a [`HostCluster`] that reports its id, and the call returns once every unit
//! has finished.
//!
//! Tuning:
//! - `CLUSTERDWT_UNITS` / [`set_parallel_dwt_units`]: units per call
//!   (default: number of logical CPUs).
//! - `CLUSTERDWT_PAR_THRESHOLD` / [`set_parallel_dwt_threshold`]: outputs
//!   below which [`dwt_parallel`] runs a single unit (default 1024).

use core::sync::atomic::{AtomicUsize, Ordering};
use rayon::prelude::*;
use std::sync::OnceLock;

use crate::dwt::{validate, DwtError, DwtInstance};
use crate::extension::ExtensionMode;
use crate::hal::{release_coefficients, stage_coefficients, HostCluster};
use crate::num::{Sample, Q15, Q31, Q7};
use crate::wavelet::{Wavelet, WaveletKind};

const DEFAULT_THRESHOLD: usize = 1024;

/// `0` means no override.
static PARALLEL_DWT_UNITS_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static PARALLEL_DWT_THRESHOLD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static PARALLEL_ENV: OnceLock<ParallelEnv> = OnceLock::new();

struct ParallelEnv {
    units: usize,
    threshold: usize,
}

fn parallel_env() -> &'static ParallelEnv {
    PARALLEL_ENV.get_or_init(|| {
        let units = std::env::var("CLUSTERDWT_UNITS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n != 0)
            .unwrap_or_else(|| num_cpus::get().max(1));
        let threshold = std::env::var("CLUSTERDWT_PAR_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n != 0)
            .unwrap_or(DEFAULT_THRESHOLD);
        ParallelEnv { units, threshold }
    })
}

/// Override the number of execution units. Passing `0` reverts to the
/// environment variable or the CPU count.
pub fn set_parallel_dwt_units(units: usize) {
    PARALLEL_DWT_UNITS_OVERRIDE.store(units, Ordering::Relaxed);
}

/// Override the minimum output length that fans out across units. Passing
/// `0` reverts to the environment variable or the built-in default.
pub fn set_parallel_dwt_threshold(outputs: usize) {
    PARALLEL_DWT_THRESHOLD_OVERRIDE.store(outputs, Ordering::Relaxed);
}

pub fn parallel_dwt_units() -> usize {
    match PARALLEL_DWT_UNITS_OVERRIDE.load(Ordering::Relaxed) {
        0 => parallel_env().units,
        n => n,
    }
}

pub fn parallel_dwt_threshold() -> usize {
    match PARALLEL_DWT_THRESHOLD_OVERRIDE.load(Ordering::Relaxed) {
        0 => parallel_env().threshold,
        n => n,
    }
}

/// Decompose across the configured number of units.
///
/// Outputs shorter than [`parallel_dwt_threshold`] run as a single unit.
pub fn dwt_parallel<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx: &mut [S],
    detail: &mut [S],
) -> Result<(), DwtError> {
    let n_pe = if approx.len() < parallel_dwt_threshold() {
        1
    } else {
        parallel_dwt_units()
    };
    dwt_parallel_with_units(signal, wavelet, mode, approx, detail, n_pe)
}

/// Decompose across exactly `n_pe` units.
pub fn dwt_parallel_with_units<S: Sample>(
    signal: &[S],
    wavelet: &Wavelet<'_, S>,
    mode: ExtensionMode,
    approx: &mut [S],
    detail: &mut [S],
    n_pe: usize,
) -> Result<(), DwtError> {
    if n_pe == 0 {
        return Err(DwtError::InvalidPartition { core_id: 0, n_pe });
    }
    // Reject bad calls before touching scratch memory.
    validate(signal, wavelet, mode, approx.len(), detail.len())?;
    let master = HostCluster::new(0);
    // Haar kernels never read the taps.
    let staged = match wavelet.kind() {
        WaveletKind::Generic => Some(stage_coefficients(&master, wavelet)),
        _ => None,
    };
    let local = staged.as_ref().map_or(*wavelet, |bank| bank.wavelet());
    let result = DwtInstance::new(signal, local, mode, approx, detail, n_pe).and_then(|inst| {
        crate::dwt_log!(
            debug,
            "dwt_parallel: {} samples over {} units",
            signal.len(),
            inst.n_pe()
        );
        (0..inst.n_pe())
            .into_par_iter()
            .try_for_each(|core_id| inst.run(&HostCluster::new(core_id)))
    });
    if let Some(bank) = staged {
        release_coefficients(&master, bank);
    }
    result
}

macro_rules! parallel_entry_points {
    ($t:ty, $par:ident) => {
        #[doc = concat!("[`dwt_parallel`] for `", stringify!($t), "` samples.")]
        pub fn $par(
            signal: &[$t],
            wavelet: &Wavelet<'_, $t>,
            mode: ExtensionMode,
            approx: &mut [$t],
            detail: &mut [$t],
        ) -> Result<(), DwtError> {
            dwt_parallel(signal, wavelet, mode, approx, detail)
        }
    };
}

parallel_entry_points!(Q31, dwt_parallel_q31);
parallel_entry_points!(Q15, dwt_parallel_q15);
parallel_entry_points!(Q7, dwt_parallel_q7);
parallel_entry_points!(f32, dwt_parallel_f32);
