//! Pipeline configuration

use serde::{Deserialize, Serialize};

/// Capture geometry and simulation timing for the pipeline.
///
/// The default mirrors the reference hardware model: 1080p 8-bit frames,
/// a four-buffer pool, cache-line alignment, and generous simulated
/// latencies that make the backpressure path visible on a terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Frame width in pixels (one byte per pixel)
    pub frame_width: usize,

    /// Frame height in pixels
    pub frame_height: usize,

    /// Buffers circulating in the pool
    pub buffer_count: usize,

    /// Pixel region alignment in bytes (power of two)
    pub alignment: usize,

    /// Lens profiles held by the metadata cache
    pub lens_cache_capacity: usize,

    /// Sensor frame period (milliseconds)
    pub sensor_interval_ms: u64,

    /// Simulated ISP processing latency per frame (milliseconds)
    pub isp_latency_ms: u64,

    /// Simulated EEPROM read latency on a cache miss (milliseconds)
    pub eeprom_latency_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_width: 1920,
            frame_height: 1080,
            buffer_count: 4,
            alignment: 64,
            lens_cache_capacity: 10,
            sensor_interval_ms: 500,
            isp_latency_ms: 1000,
            eeprom_latency_ms: 20,
        }
    }
}

impl PipelineConfig {
    /// 60 fps capture cadence with a fast ISP
    pub fn realtime() -> Self {
        Self {
            sensor_interval_ms: 16,
            isp_latency_ms: 5,
            ..Default::default()
        }
    }

    /// Bytes in one frame's pixel region
    pub fn frame_size(&self) -> usize {
        self.frame_width * self.frame_height
    }
}
