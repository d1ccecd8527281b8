//! Video frames and the external collaborators that produce them.
//!
//! The booth does not run landmark models itself. A [`FrameSource`] yields
//! timestamped frames and a [`Detector`] turns each frame into face and hand
//! results. With the `camera` feature an OpenCV webcam source is available.

use crate::detection::DetectionFrame;
use crate::Result;
use image::RgbaImage;
use std::time::Instant;

#[cfg(feature = "camera")]
pub mod camera;

/// One video frame stamped with a monotonic millisecond clock
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    pub timestamp_ms: u64,
}

impl Frame {
    #[must_use]
    pub fn new(image: RgbaImage, timestamp_ms: u64) -> Self {
        Self { image, timestamp_ms }
    }
}

/// Produces frames until exhausted or released
pub trait FrameSource {
    /// Next frame, or `None` once the source has no more frames
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Stop producing frames and free the device
    fn release(&mut self) -> Result<()>;

    /// Get source name
    fn name(&self) -> &str;
}

/// Face and hand landmark detection for a frame
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionFrame>;
}

/// Monotonic millisecond clock counting from its creation
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    #[must_use]
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    /// Milliseconds since the clock started; never decreases
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_near_zero_and_advances() {
        let clock = FrameClock::start();
        let first = clock.now_ms();
        assert!(first < 1000);

        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.now_ms();
        assert!(second >= first + 1);
        assert!(clock.now_ms() >= second);
    }
}
