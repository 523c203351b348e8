//! Work partitioning across cooperating execution units.
//!
//! Output index `n` of a decomposition is centred on virtual offset
//! `2n + 1`. Unit `core_id` of `n_pe` owns every index congruent to `core_id`
//! modulo `n_pe`, i.e. offsets `1 + 2*core_id, 1 + 2*core_id + 2*n_pe, ...`.
//! The single-core engine is the `(0, 1)` partition.

use core::marker::PhantomData;
use core::ops::Range;

use crate::dwt::DwtError;

/// Filter step between consecutive outputs of one unit (downsampling by 2).
pub const FILT_STEP: usize = 2;

/// Which strided share of the outputs an execution unit computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    core_id: usize,
    n_pe: usize,
}

impl Partition {
    /// The whole output range on a single unit.
    pub const SINGLE: Partition = Partition {
        core_id: 0,
        n_pe: 1,
    };

    pub fn new(core_id: usize, n_pe: usize) -> Result<Self, DwtError> {
        if n_pe == 0 || core_id >= n_pe {
            return Err(DwtError::InvalidPartition { core_id, n_pe });
        }
        Ok(Self { core_id, n_pe })
    }

    #[inline(always)]
    pub fn core_id(&self) -> usize {
        self.core_id
    }

    #[inline(always)]
    pub fn n_pe(&self) -> usize {
        self.n_pe
    }

    /// Virtual offset of this unit's first output.
    #[inline(always)]
    pub fn first_offset(&self) -> usize {
        1 + FILT_STEP * self.core_id
    }

    /// Offset increment between this unit's outputs.
    #[inline(always)]
    pub fn stride(&self) -> usize {
        FILT_STEP * self.n_pe
    }

    /// Output indices this unit writes for an output of `len` entries.
    pub fn indices(&self, len: usize) -> core::iter::StepBy<Range<usize>> {
        (self.core_id.min(len)..len).step_by(self.n_pe)
    }
}

/// The four convolution regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Filter hangs over the left edge only.
    LeftHanging,
    /// Filter lies entirely inside the signal.
    Interior,
    /// Signal shorter than the filter; both edges contribute.
    ShortCenter,
    /// Filter hangs over the right edge only.
    RightHanging,
}

/// An arithmetic progression of offsets `start, start + step, ... < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSpan {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl OffsetSpan {
    #[inline]
    pub fn iter(&self) -> core::iter::StepBy<Range<usize>> {
        (self.start..self.end.max(self.start)).step_by(self.step)
    }

    pub fn count(&self) -> usize {
        if self.end <= self.start {
            0
        } else {
            (self.end - self.start).div_ceil(self.step)
        }
    }
}

/// One unit's offsets split into the four regions, in evaluation order.
///
/// Each boundary is found by advancing the unit's own progression until the
/// region predicate fails, so the split stays exhaustive and disjoint even
/// when a stride jumps across several regions at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPlan {
    pub left: OffsetSpan,
    pub interior: OffsetSpan,
    pub short_center: OffsetSpan,
    pub right: OffsetSpan,
}

impl RegionPlan {
    pub fn new(signal_len: usize, filter_len: usize, partition: Partition) -> Self {
        let step = partition.stride();
        let advance = |from: usize, bound: usize| -> usize {
            if from >= bound {
                from
            } else {
                from + (bound - from).div_ceil(step) * step
            }
        };
        let reach = filter_len.saturating_sub(1);
        let start = partition.first_offset();
        let left_end = advance(start, reach.min(signal_len));
        let interior_end = advance(left_end, signal_len);
        let short_end = advance(interior_end, reach);
        let right_end = advance(short_end, signal_len + reach);
        let span = |start, end| OffsetSpan { start, end, step };
        Self {
            left: span(start, left_end),
            interior: span(left_end, interior_end),
            short_center: span(interior_end, short_end),
            right: span(short_end, right_end),
        }
    }

    pub fn span(&self, region: Region) -> OffsetSpan {
        match region {
            Region::LeftHanging => self.left,
            Region::Interior => self.interior,
            Region::ShortCenter => self.short_center,
            Region::RightHanging => self.right,
        }
    }

    /// Outputs produced per region, in [`Region`] order.
    pub fn counts(&self) -> [usize; 4] {
        [
            self.left.count(),
            self.interior.count(),
            self.short_center.count(),
            self.right.count(),
        ]
    }
}

/// Destination for finished coefficient pairs.
pub trait Lanes<S> {
    fn store(&mut self, index: usize, approx: S, detail: S);
}

/// Exclusive borrow of both output sequences.
pub struct SliceLanes<'a, S> {
    approx: &'a mut [S],
    detail: &'a mut [S],
}

impl<'a, S> SliceLanes<'a, S> {
    pub fn new(approx: &'a mut [S], detail: &'a mut [S]) -> Self {
        Self { approx, detail }
    }
}

impl<S> Lanes<S> for SliceLanes<'_, S> {
    #[inline(always)]
    fn store(&mut self, index: usize, approx: S, detail: S) {
        self.approx[index] = approx;
        self.detail[index] = detail;
    }
}

/// Output sequences shared by every unit of a cluster run.
///
/// Each unit writes only the indices its [`Partition`] owns, so concurrent
/// stores never touch the same element as long as every `core_id` runs once.
/// The type is crate-private; [`DwtInstance`](crate::dwt::DwtInstance)
/// enforces the one-run-per-unit rule before handing out a copy.
#[derive(Clone, Copy)]
pub(crate) struct SharedLanes<'a, S> {
    approx: *mut S,
    detail: *mut S,
    len: usize,
    _marker: PhantomData<&'a mut [S]>,
}

// SAFETY: see the type-level comment; every index is written by one unit.
unsafe impl<S: Send> Send for SharedLanes<'_, S> {}
unsafe impl<S: Send> Sync for SharedLanes<'_, S> {}

impl<'a, S> SharedLanes<'a, S> {
    /// Share two equally long output slices. Returns `None` if the lengths
    /// differ.
    pub(crate) fn new(approx: &'a mut [S], detail: &'a mut [S]) -> Option<Self> {
        if approx.len() != detail.len() {
            return None;
        }
        Some(Self {
            approx: approx.as_mut_ptr(),
            detail: detail.as_mut_ptr(),
            len: approx.len(),
            _marker: PhantomData,
        })
    }
}

impl<S> Lanes<S> for SharedLanes<'_, S> {
    #[inline(always)]
    fn store(&mut self, index: usize, approx: S, detail: S) {
        assert!(index < self.len, "output index {index} out of range");
        // SAFETY: in bounds (checked above) and owned by exactly one unit.
        unsafe {
            self.approx.add(index).write(approx);
            self.detail.add(index).write(detail);
        }
    }
}
