//! # clusterdwt - One-level DWT kernels for multi-core DSP clusters
//!
//! Boundary-aware discrete wavelet decomposition producing approximation and
//! detail coefficients, written for MCU-class targets and cooperating
//! clusters of cores.
//!
//! ## Features
//!
//! - **Seven extension modes**: constant, symmetric, reflect, antisymmetric,
//!   antireflect, periodic and zero, evaluated on the fly without padding
//! - **Four-region convolution engine** for any even-length filter
//! - **Haar fast path**, normalized and unnormalized
//! - **Strided multi-core partitioning**: unit `k` of `n` writes outputs
//!   `k, k+n, k+2n, ...`, bit-identical to the single-core result
//! - **Q31, Q15, Q7, f32 and f64** through one generic engine
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` and CPU-count detection
//! - `parallel`: run a cluster on the Rayon pool
//! - `verbose-logging`: dispatch and validation messages through `log`
//! - `internal-tests`: property tests
//!
//! ## Example
//!
//! ```
//! use clusterdwt::{dwt_q15, dwt_length, ExtensionMode, WaveletFamily};
//!
//! let bank = WaveletFamily::Db2.filter_bank::<i16>();
//! let x: [i16; 8] = [100, 200, 300, 400, 300, 200, 100, 0];
//! let len = dwt_length(x.len(), bank.wavelet().len());
//! let mut a = vec![0i16; len];
//! let mut d = vec![0i16; len];
//! dwt_q15(&x, &bank.wavelet(), ExtensionMode::Symmetric, &mut a, &mut d).unwrap();
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Emit a `log` record when `verbose-logging` is enabled; compiles to nothing
/// otherwise.
macro_rules! dwt_log {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "verbose-logging")]
        {
            log::$level!($($arg)+);
        }
    };
}
pub(crate) use dwt_log;

/// Sample formats and accumulator arithmetic.
pub mod num;

/// Boundary extension policy.
pub mod extension;

/// Wavelet filters and built-in families.
pub mod wavelet;

/// Strided work partitioning and output lanes.
pub mod partition;

/// Generic four-region convolution engine.
pub mod convolve;

/// Two-tap Haar fast path.
pub mod haar;

/// Validated entry points and cluster instances.
pub mod dwt;

/// Cluster services consumed by the DWT.
pub mod hal;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use convolve::region_counts;
pub use dwt::{
    dwt, dwt_f32, dwt_length, dwt_q15, dwt_q31, dwt_q7, dwt_unit, dwt_unit_f32, dwt_unit_q15,
    dwt_unit_q31, dwt_unit_q7, DwtError, DwtInstance,
};
pub use extension::ExtensionMode;
pub use hal::{ClusterHal, CopyDirection, HostCluster, Transfer};
pub use num::{Sample, Q15, Q31, Q7};
pub use partition::{Partition, Region};
pub use wavelet::{FilterBank, Wavelet, WaveletFamily, WaveletKind};

#[cfg(feature = "parallel")]
pub use parallel::{
    dwt_parallel, dwt_parallel_f32, dwt_parallel_q15, dwt_parallel_q31, dwt_parallel_q7,
    dwt_parallel_with_units, set_parallel_dwt_threshold, set_parallel_dwt_units,
};

#[cfg(all(feature = "internal-tests", test))]
mod proptests;
