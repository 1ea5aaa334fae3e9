//! LumaStream Camera Pipeline
//!
//! Simulates a fixed-rate capture pipeline: a sensor thread fills
//! pre-allocated, cache-line-aligned frame buffers and hands them to an ISP
//! thread through bounded ring queues, while an LRU cache amortizes slow
//! lens-calibration loads.
//!
//! Exactly `buffer_count` buffers circulate in a closed loop
//! (free → sensor → ready → ISP → free). Nothing blocks: a starved reader
//! polls, and when the ISP falls behind the sensor reclaims the oldest
//! unprocessed ready frame instead of waiting.

pub mod config;
pub mod device;
pub mod eeprom;
pub mod frame;
pub mod isp;
pub mod sensor;

pub use config::PipelineConfig;
pub use device::{CameraDevice, PipelineStats};
pub use eeprom::LensProfile;
pub use frame::{FrameBuffer, FrameGuard, FrameState};

use aligned_memory::AllocError;
use frame_queue::QueueError;
use lens_cache::CacheError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rejected configuration (zero counts or dimensions)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Pixel memory could not be allocated at startup
    #[error("frame allocation failed: {0}")]
    Alloc(#[from] AllocError),

    /// A frame queue failed
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// The lens cache could not be built
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// A thread panicked while holding the device lock
    #[error("device lock poisoned: {0}")]
    LockPoisoned(String),

    /// A worker tried to claim a buffer another holder still owns
    #[error("buffer {id} was not ready (state {state:?})")]
    FrameBusy { id: u32, state: FrameState },
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
