//! ISP worker
//!
//! Dequeues ready frames, looks up the lens calibration (loading it from
//! the simulated EEPROM on a miss), applies the gain pass, and returns the
//! buffer to the free pool. Reads never block so the loop stays responsive
//! to shutdown.

use crate::device::CameraDevice;
use crate::eeprom::load_lens_profile;
use crate::PipelineError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// What a single ISP iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessOutcome {
    /// A frame was corrected and returned to the free pool
    Processed { buffer_id: u32 },
    /// The ready queue was empty
    Idle,
}

/// Run the processing loop until the stop token clears.
pub fn run(dev: Arc<CameraDevice>) -> Result<(), PipelineError> {
    info!(target: "isp", "processing loop started");
    let idle = Duration::from_millis(1);

    while dev.is_running() {
        if let ProcessOutcome::Idle = step(&dev)? {
            thread::sleep(idle);
        }
    }

    info!(target: "isp", "processing loop stopped");
    Ok(())
}

/// One processing iteration.
pub(crate) fn step(dev: &CameraDevice) -> Result<ProcessOutcome, PipelineError> {
    let Some(frame) = dev.ready_queue.read()? else {
        return Ok(ProcessOutcome::Idle);
    };

    info!(target: "isp", "processing buffer {}", frame.id());
    let mut guard = frame.begin_process().ok_or(PipelineError::FrameBusy {
        id: frame.id(),
        state: frame.state(),
    })?;

    let lens_id = frame.lens_id();
    let gain = lookup_gain(dev, lens_id)?;

    apply_gain(guard.pixels(), gain);
    thread::sleep(Duration::from_millis(dev.config().isp_latency_ms));

    info!(
        target: "isp",
        "processed buffer {} | lens {} | timestamp {}",
        frame.id(),
        lens_id,
        frame.timestamp_ns()
    );

    // Publish Ready before the frame re-enters circulation.
    drop(guard);
    let buffer_id = frame.id();
    dev.return_to_free(frame)?;

    let processed = dev.record_processed()?;
    if processed % 30 == 0 {
        info!(target: "isp", "{} frames processed so far", processed);
    }

    Ok(ProcessOutcome::Processed { buffer_id })
}

/// Fetch the gain for `lens_id`, loading and caching the profile on a miss.
///
/// The whole lookup, including the slow EEPROM read, runs under the device
/// lock; the per-pixel pass does not.
fn lookup_gain(dev: &CameraDevice, lens_id: u32) -> Result<f32, PipelineError> {
    let eeprom_latency = Duration::from_millis(dev.config().eeprom_latency_ms);
    let mut shared = dev.lock_shared()?;

    if let Some(profile) = shared.lens_cache.get(lens_id) {
        return Ok(profile.gain_factor);
    }

    shared.stats.cache_misses += 1;
    info!(target: "isp", "cache miss, loading lens {} calibration", lens_id);
    let profile = load_lens_profile(lens_id, eeprom_latency);
    let gain = profile.gain_factor;
    shared.lens_cache.put(lens_id, profile);
    Ok(gain)
}

/// Per-pixel gain with saturation at full scale
fn apply_gain(pixels: &mut [u8], gain: f32) {
    for px in pixels.iter_mut() {
        *px = (f32::from(*px) * gain).min(255.0) as u8;
    }
}
