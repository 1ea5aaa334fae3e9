//! Frame buffers and their ownership hand-off
//!
//! A `FrameBuffer` is one slot of the pool: an aligned pixel region plus
//! capture metadata and a lifecycle state. The state is an atomic observed
//! with release/acquire ordering so the recycler can test it without taking
//! any queue lock. Exclusive pixel access is claimed by compare-and-swap
//! through a `FrameGuard`, which release-stores `Ready` on every exit path.

use crate::PipelineError;
use aligned_memory::AlignedBuf;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};

/// Lifecycle of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameState {
    /// At rest in a queue or momentarily in transit between queues
    Ready = 0,
    /// The sensor is filling the pixel region
    BusyWriting = 1,
    /// The ISP is reading and correcting the pixel region
    BusyProcessing = 2,
}

impl FrameState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => FrameState::BusyWriting,
            2 => FrameState::BusyProcessing,
            _ => FrameState::Ready,
        }
    }
}

/// One pre-allocated frame of the pool.
///
/// The pixel region is allocated once at init and its address never
/// changes; queues circulate shared references back to it instead of
/// copying pixels.
pub struct FrameBuffer {
    id: u32,
    len: usize,
    pixels: UnsafeCell<AlignedBuf>,
    state: AtomicU8,
    timestamp_ns: AtomicU64,
    lens_id: AtomicU32,
}

// SAFETY: the pixel region is only reachable through a FrameGuard, and
// guard creation wins a compare-and-swap on `state`, so at most one thread
// holds mutable access at a time. Every other field is atomic.
unsafe impl Send for FrameBuffer {}
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    /// Allocate the pixel region for slot `id`
    pub fn new(id: u32, size: usize, alignment: usize) -> Result<Self, PipelineError> {
        let pixels = AlignedBuf::zeroed(size, alignment)?;
        Ok(Self {
            id,
            len: size,
            pixels: UnsafeCell::new(pixels),
            state: AtomicU8::new(FrameState::Ready as u8),
            timestamp_ns: AtomicU64::new(0),
            lens_id: AtomicU32::new(0),
        })
    }

    /// Stable slot index within the pool
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Pixel region length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-byte region (never the case for a pool buffer)
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base address of the pixel region
    pub fn pixel_ptr(&self) -> *const u8 {
        // SAFETY: reads the stable base pointer; the region itself is not
        // dereferenced here.
        unsafe { (*self.pixels.get()).as_ptr() }
    }

    /// Current lifecycle state (acquire)
    pub fn state(&self) -> FrameState {
        FrameState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True when the frame can be reclaimed out of a queue.
    ///
    /// Acquire pairs with the guard's release store, so an observer that
    /// sees `Ready` also sees the holder's completed pixel writes.
    pub fn is_recyclable(&self) -> bool {
        self.state.load(Ordering::Acquire) == FrameState::Ready as u8
    }

    /// Capture time stamped by the sensor (monotonic nanoseconds)
    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns.load(Ordering::Relaxed)
    }

    /// Lens the frame was captured through
    pub fn lens_id(&self) -> u32 {
        self.lens_id.load(Ordering::Relaxed)
    }

    /// Claim the frame for capture, or `None` if another holder owns it
    pub fn begin_write(&self) -> Option<FrameGuard<'_>> {
        self.claim(FrameState::BusyWriting)
    }

    /// Claim the frame for ISP processing, or `None` if already claimed
    pub fn begin_process(&self) -> Option<FrameGuard<'_>> {
        self.claim(FrameState::BusyProcessing)
    }

    fn claim(&self, busy: FrameState) -> Option<FrameGuard<'_>> {
        self.state
            .compare_exchange(
                FrameState::Ready as u8,
                busy as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .ok()?;
        Some(FrameGuard { frame: self })
    }
}

/// Scoped exclusive access to a claimed frame.
///
/// Dropping the guard release-stores `Ready`, publishing the pixel writes
/// to the next thread that acquires the state.
pub struct FrameGuard<'a> {
    frame: &'a FrameBuffer,
}

impl FrameGuard<'_> {
    /// Slot index of the claimed frame
    pub fn id(&self) -> u32 {
        self.frame.id
    }

    /// Mutable view of the pixel region
    pub fn pixels(&mut self) -> &mut [u8] {
        // SAFETY: the claim CAS made this guard the sole holder until drop.
        unsafe { (*self.frame.pixels.get()).as_mut_slice() }
    }

    /// Stamp capture metadata; ordered by the guard's release on drop
    pub fn set_capture_metadata(&mut self, timestamp_ns: u64, lens_id: u32) {
        self.frame.timestamp_ns.store(timestamp_ns, Ordering::Relaxed);
        self.frame.lens_id.store(lens_id, Ordering::Relaxed);
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.frame
            .state
            .store(FrameState::Ready as u8, Ordering::Release);
    }
}
