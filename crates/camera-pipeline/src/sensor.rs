//! Sensor worker
//!
//! Simulates the fixed-rate capture interrupt. Each iteration draws an
//! empty buffer from the free queue, fills it with the test pattern, and
//! publishes it to the ready queue. With the free pool exhausted it
//! reclaims the oldest unprocessed ready frame; with nothing reclaimable
//! the frame is dropped and counted.

use crate::device::CameraDevice;
use crate::frame::FrameBuffer;
use crate::PipelineError;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Monotonic nanoseconds since the first call in this process
pub(crate) fn monotonic_ns() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Lens selection shifts every ten buffer slots, cycling five lenses
pub(crate) fn lens_for(id: u32) -> u32 {
    (id / 10) % 5
}

/// What a single sensor iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptureOutcome {
    /// A frame was captured and published to the ready queue
    Captured { buffer_id: u32 },
    /// No free buffer and no recyclable ready frame
    Dropped,
}

/// Run the capture loop until the stop token clears.
pub fn run(dev: Arc<CameraDevice>) -> Result<(), PipelineError> {
    let interval = Duration::from_millis(dev.config().sensor_interval_ms);
    info!(
        target: "sensor",
        "capture loop started ({} ms frame period)",
        dev.config().sensor_interval_ms
    );

    while dev.is_running() {
        thread::sleep(interval);
        step(&dev)?;
    }

    info!(target: "sensor", "capture loop stopped");
    Ok(())
}

/// One capture iteration.
pub(crate) fn step(dev: &CameraDevice) -> Result<CaptureOutcome, PipelineError> {
    let frame = match dev.free_queue.read()? {
        Some(frame) => Some(frame),
        None => reclaim_ready_frame(dev)?,
    };

    let Some(frame) = frame else {
        let total = dev.record_sensor_drop()?;
        warn!(target: "sensor", "DROP! no buffers available, {} total sensor drops", total);
        return Ok(CaptureOutcome::Dropped);
    };

    capture(&frame)?;
    info!(target: "sensor", "buffer {} ready for processing", frame.id());

    let buffer_id = frame.id();
    if let Some(unprocessed) = dev.ready_queue.write(frame)? {
        // The ready queue was full; the displaced frame skips the ISP and
        // goes straight back to the free pool.
        info!(
            target: "sensor",
            "getting back unprocessed buffer {}",
            unprocessed.id()
        );
        dev.return_to_free(unprocessed)?;
    }

    Ok(CaptureOutcome::Captured { buffer_id })
}

/// Reclaim the oldest ready frame the ISP has not started on.
fn reclaim_ready_frame(dev: &CameraDevice) -> Result<Option<Arc<FrameBuffer>>, PipelineError> {
    let Some(frame) = dev.ready_queue.extract_stale(|f| f.is_recyclable())? else {
        return Ok(None);
    };
    let total = dev.record_isp_drop()?;
    warn!(
        target: "isp",
        "DROP! recycled unprocessed buffer {}, {} total isp drops",
        frame.id(),
        total
    );
    Ok(Some(frame))
}

/// Fill the frame with the simulated DMA pattern and stamp its metadata.
fn capture(frame: &Arc<FrameBuffer>) -> Result<(), PipelineError> {
    let mut guard = frame.begin_write().ok_or(PipelineError::FrameBusy {
        id: frame.id(),
        state: frame.state(),
    })?;

    // A per-buffer seed keeps consecutive frames distinguishable.
    let seed = (frame.id() % 255) as u8;
    for (i, px) in guard.pixels().iter_mut().enumerate() {
        *px = (i as u8).wrapping_add(seed);
    }
    guard.set_capture_metadata(monotonic_ns(), lens_for(frame.id()));
    Ok(())
}
