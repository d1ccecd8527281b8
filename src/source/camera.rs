//! Webcam frame source backed by OpenCV.

use super::{Frame, FrameClock, FrameSource};
use crate::config::CameraConfig;
use crate::utils::image_conversion::bgr_mat_to_rgba;
use crate::{Error, Result};
use log::{info, warn};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};

/// Frames read from a local camera
pub struct CameraSource {
    capture: VideoCapture,
    index: i32,
    clock: FrameClock,
    released: bool,
}

impl CameraSource {
    /// Open the camera described by `config`
    pub fn open(config: &CameraConfig) -> Result<Self> {
        info!("Opening camera {}", config.index);
        let mut capture = VideoCapture::new(config.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::Camera(format!("Camera {} could not be opened", config.index)));
        }

        capture.set(CAP_PROP_FRAME_WIDTH, f64::from(config.width))?;
        capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(config.height))?;

        // Reduce buffer size for lower latency
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;

        Ok(Self {
            capture,
            index: config.index,
            clock: FrameClock::start(),
            released: false,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }

        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.empty() {
            warn!("Failed to read frame from camera {}", self.index);
            return Err(Error::Camera("Empty frame".to_string()));
        }

        Ok(Some(Frame::new(bgr_mat_to_rgba(&mat)?, self.clock.now_ms())))
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.capture.release()?;
            info!("Camera {} released", self.index);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "camera"
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release camera {}: {e}", self.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "Requires a connected webcam"]
    fn test_camera_frames_then_release() {
        let mut source = CameraSource::open(&CameraConfig::default()).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert!(frame.image.width() > 0);

        source.release().unwrap();
        assert!(source.next_frame().unwrap().is_none());
    }
}
