//! Camera device: pool, queues, cache, and counters
//!
//! `CameraDevice` wires the pipeline together. It owns the frame pool and
//! the two ring queues the workers trade buffers through, and it guards the
//! lens cache and the run counters behind a single mutex. The stop token is
//! an atomic the controller clears at shutdown.

use crate::config::PipelineConfig;
use crate::eeprom::LensProfile;
use crate::frame::FrameBuffer;
use crate::PipelineError;
use frame_queue::RingQueue;
use lens_cache::LruCache;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Counters accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames the ISP finished
    pub processed: u64,
    /// Sensor iterations that found no buffer at all
    pub sensor_dropped: u64,
    /// Ready frames reclaimed before the ISP consumed them
    pub isp_dropped: u64,
    /// Lens lookups that had to touch the EEPROM
    pub cache_misses: u64,
}

/// State guarded by the single device lock
pub(crate) struct Shared {
    pub(crate) stats: PipelineStats,
    pub(crate) lens_cache: LruCache<LensProfile>,
}

/// The pipeline root: pool, queues, cache, counters, stop token.
pub struct CameraDevice {
    config: PipelineConfig,
    pool: Vec<Arc<FrameBuffer>>,
    pub(crate) ready_queue: RingQueue<Arc<FrameBuffer>>,
    pub(crate) free_queue: RingQueue<Arc<FrameBuffer>>,
    shared: Mutex<Shared>,
    running: AtomicBool,
}

impl CameraDevice {
    /// Allocate the pool, prime the free queue with every buffer, and build
    /// the empty cache. Any allocation failure aborts startup.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        if config.buffer_count == 0 {
            return Err(PipelineError::Config(
                "buffer_count must be at least 1".into(),
            ));
        }
        if config.frame_width == 0 || config.frame_height == 0 {
            return Err(PipelineError::Config(
                "frame dimensions must be nonzero".into(),
            ));
        }

        let ready_queue = RingQueue::new(config.buffer_count)?;
        let free_queue = RingQueue::new(config.buffer_count)?;
        let lens_cache = LruCache::new(config.lens_cache_capacity)?;

        let frame_size = config.frame_size();
        let mut pool = Vec::with_capacity(config.buffer_count);
        for id in 0..config.buffer_count {
            let frame = Arc::new(FrameBuffer::new(id as u32, frame_size, config.alignment)?);
            // Priming cannot eject: the queue is sized to the pool.
            free_queue.write(frame.clone())?;
            pool.push(frame);
        }

        info!(
            target: "system",
            "allocated {} frame buffers of {} bytes ({}-byte aligned)",
            config.buffer_count,
            frame_size,
            config.alignment
        );

        Ok(Self {
            config,
            pool,
            ready_queue,
            free_queue,
            shared: Mutex::new(Shared {
                stats: PipelineStats::default(),
                lens_cache,
            }),
            running: AtomicBool::new(false),
        })
    }

    /// Configuration the device was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The frame pool, indexed by slot id
    pub fn pool(&self) -> &[Arc<FrameBuffer>] {
        &self.pool
    }

    /// True while the workers should keep iterating
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Allow the worker loops to run
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Ask the worker loops to exit after their current iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Snapshot of the run counters
    pub fn stats(&self) -> Result<PipelineStats, PipelineError> {
        Ok(self.lock_shared()?.stats)
    }

    /// Lens profiles currently cached
    pub fn cached_lens_count(&self) -> Result<usize, PipelineError> {
        Ok(self.lock_shared()?.lens_cache.len())
    }

    pub(crate) fn lock_shared(&self) -> Result<MutexGuard<'_, Shared>, PipelineError> {
        self.shared
            .lock()
            .map_err(|e| PipelineError::LockPoisoned(e.to_string()))
    }

    /// Return a buffer to the free pool.
    ///
    /// The pool bounds both queues, so the write can never eject; if it
    /// ever did, the stray buffer is re-queued rather than lost.
    pub(crate) fn return_to_free(&self, frame: Arc<FrameBuffer>) -> Result<(), PipelineError> {
        if let Some(stray) = self.free_queue.write(frame)? {
            debug_assert!(false, "free queue ejected buffer {} on return", stray.id());
            self.free_queue.write(stray)?;
        }
        Ok(())
    }

    pub(crate) fn record_sensor_drop(&self) -> Result<u64, PipelineError> {
        let mut shared = self.lock_shared()?;
        shared.stats.sensor_dropped += 1;
        Ok(shared.stats.sensor_dropped)
    }

    pub(crate) fn record_isp_drop(&self) -> Result<u64, PipelineError> {
        let mut shared = self.lock_shared()?;
        shared.stats.isp_dropped += 1;
        Ok(shared.stats.isp_dropped)
    }

    pub(crate) fn record_processed(&self) -> Result<u64, PipelineError> {
        let mut shared = self.lock_shared()?;
        shared.stats.processed += 1;
        Ok(shared.stats.processed)
    }
}
