//! Cluster services the DWT consumes but does not implement.
//!
//! On the target these map to the core-id register, the L1 scratch allocator
//! and the DMA engine. [`HostCluster`] stands in for them on a host: heap
//! scratch buffers and copies that complete before `bulk_copy` returns.

extern crate alloc;
use alloc::vec::Vec;

use crate::num::Sample;
use crate::wavelet::{FilterBank, Wavelet};

/// Direction of a bulk copy between shared and unit-local memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDirection {
    /// Shared memory into local scratch.
    ToLocal,
    /// Local scratch back to shared memory.
    ToShared,
}

/// Handle to an issued bulk copy. Must be passed to [`ClusterHal::wait`]
/// before the destination is read.
#[must_use = "a transfer must be waited on before its destination is read"]
#[derive(Debug, PartialEq, Eq)]
pub struct Transfer {
    bytes: usize,
    direction: CopyDirection,
}

impl Transfer {
    pub fn new(bytes: usize, direction: CopyDirection) -> Self {
        Self { bytes, direction }
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn direction(&self) -> CopyDirection {
        self.direction
    }
}

/// Per-unit platform services.
pub trait ClusterHal {
    /// Id of the calling execution unit.
    fn core_id(&self) -> usize;

    /// Allocate `len` samples of fast scratch memory.
    fn scratch_alloc<S: Sample>(&self, len: usize) -> Vec<S>;

    /// Return a buffer obtained from [`ClusterHal::scratch_alloc`].
    fn scratch_free<S: Sample>(&self, buf: Vec<S>);

    /// Start copying `src` into `dst`; both have the same length.
    fn bulk_copy<S: Sample>(&self, src: &[S], dst: &mut [S], direction: CopyDirection)
        -> Transfer;

    /// Block until `transfer` has completed.
    fn wait(&self, transfer: Transfer);
}

/// Host implementation of [`ClusterHal`] for one execution unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCluster {
    core_id: usize,
}

impl HostCluster {
    pub fn new(core_id: usize) -> Self {
        Self { core_id }
    }
}

impl ClusterHal for HostCluster {
    fn core_id(&self) -> usize {
        self.core_id
    }

    fn scratch_alloc<S: Sample>(&self, len: usize) -> Vec<S> {
        alloc::vec![S::default(); len]
    }

    fn scratch_free<S: Sample>(&self, buf: Vec<S>) {
        drop(buf);
    }

    fn bulk_copy<S: Sample>(
        &self,
        src: &[S],
        dst: &mut [S],
        direction: CopyDirection,
    ) -> Transfer {
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        Transfer::new(n * core::mem::size_of::<S>(), direction)
    }

    fn wait(&self, _transfer: Transfer) {}
}

/// Copy a filter's taps into scratch memory and wait for both copies.
pub fn stage_coefficients<S: Sample, H: ClusterHal>(
    hal: &H,
    wavelet: &Wavelet<'_, S>,
) -> FilterBank<S> {
    let mut dec_lo = hal.scratch_alloc::<S>(wavelet.len());
    let mut dec_hi = hal.scratch_alloc::<S>(wavelet.len());
    let lo = hal.bulk_copy(wavelet.dec_lo(), &mut dec_lo, CopyDirection::ToLocal);
    let hi = hal.bulk_copy(wavelet.dec_hi(), &mut dec_hi, CopyDirection::ToLocal);
    hal.wait(lo);
    hal.wait(hi);
    crate::dwt_log!(debug, "staged {} filter taps", wavelet.len());
    FilterBank::staged(wavelet.kind(), dec_lo, dec_hi)
}

/// Hand staged taps back to the scratch allocator.
pub fn release_coefficients<S: Sample, H: ClusterHal>(hal: &H, bank: FilterBank<S>) {
    let (dec_lo, dec_hi) = bank.into_taps();
    hal.scratch_free(dec_lo);
    hal.scratch_free(dec_hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Q15;
    use crate::wavelet::WaveletFamily;
    use core::cell::Cell;

    /// Counts outstanding transfers and scratch buffers.
    #[derive(Default)]
    struct Recording {
        inner: HostCluster,
        in_flight: Cell<usize>,
        live_buffers: Cell<isize>,
        bytes: Cell<usize>,
    }

    impl ClusterHal for Recording {
        fn core_id(&self) -> usize {
            self.inner.core_id()
        }
        fn scratch_alloc<S: Sample>(&self, len: usize) -> Vec<S> {
            self.live_buffers.set(self.live_buffers.get() + 1);
            self.inner.scratch_alloc(len)
        }
        fn scratch_free<S: Sample>(&self, buf: Vec<S>) {
            self.live_buffers.set(self.live_buffers.get() - 1);
            self.inner.scratch_free(buf)
        }
        fn bulk_copy<S: Sample>(
            &self,
            src: &[S],
            dst: &mut [S],
            direction: CopyDirection,
        ) -> Transfer {
            self.in_flight.set(self.in_flight.get() + 1);
            self.inner.bulk_copy(src, dst, direction)
        }
        fn wait(&self, transfer: Transfer) {
            self.bytes.set(self.bytes.get() + transfer.bytes());
            self.in_flight.set(self.in_flight.get() - 1);
        }
    }

    #[test]
    fn staging_copies_and_waits() {
        let hal = Recording::default();
        let bank = WaveletFamily::Db3.filter_bank::<Q15>();
        let staged = stage_coefficients(&hal, &bank.wavelet());
        assert_eq!(hal.in_flight.get(), 0);
        assert_eq!(hal.bytes.get(), 2 * 6 * 2);
        assert_eq!(hal.live_buffers.get(), 2);
        assert_eq!(staged, bank);
        release_coefficients(&hal, staged);
        assert_eq!(hal.live_buffers.get(), 0);
    }
}
