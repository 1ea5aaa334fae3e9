//! Simulated lens EEPROM
//!
//! Stands in for the slow I2C read that fetches per-lens calibration from
//! the camera module. Only the latency and the owned return value matter to
//! the pipeline; the profile contents are synthetic.

use std::thread;
use std::time::Duration;

/// Calibration data for one lens position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensProfile {
    /// Lens the profile was read for
    pub lens_id: u32,
    /// Multiplier applied to every pixel during correction
    pub gain_factor: f32,
}

/// Read the calibration profile for `lens_id`.
///
/// Sleeps for `latency` to model the hardware transaction, then returns an
/// owned profile the caller typically hands to the cache.
pub fn load_lens_profile(lens_id: u32, latency: Duration) -> LensProfile {
    thread::sleep(latency);
    LensProfile {
        lens_id,
        gain_factor: 1.2 + lens_id as f32 * 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_scales_with_lens() {
        let p0 = load_lens_profile(0, Duration::ZERO);
        let p4 = load_lens_profile(4, Duration::ZERO);
        assert_eq!(p0.lens_id, 0);
        assert!((p0.gain_factor - 1.2).abs() < 1e-6);
        assert!((p4.gain_factor - 1.6).abs() < 1e-6);
    }
}
