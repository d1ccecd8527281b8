//! Scripted sessions for headless runs.
//!
//! A script is a JSON-lines file. Each non-empty line is one frame:
//!
//! ```text
//! {"t": 0}
//! {"t": 33, "face": {"detections": [{"boundingBox": {"xCenter": 0.5, "yCenter": 0.5, "width": 0.2, "height": 0.25}}]}}
//! {"t": 66, "hand": {"landmarks": [[{"x": 0.5, "y": 0.1}]]}}
//! ```
//!
//! `t` is the frame timestamp in milliseconds and must increase strictly.
//! A missing `face` or `hand` means nothing was detected in that frame.
//! Lines starting with `#` are ignored. Every frame shows the same
//! background image.

use crate::config::CameraConfig;
use crate::detection::{DetectionFrame, FaceResult, HandResult};
use crate::source::{Detector, Frame, FrameSource};
use crate::{Error, Result};
use image::{Rgba, RgbaImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Background used when no image is given
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([96, 96, 96, 255]);

/// One scripted frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// Timestamp in milliseconds
    pub t: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<HandResult>,
}

impl ScriptFrame {
    /// Detector output for this frame; both results are always delivered
    #[must_use]
    pub fn detection(&self) -> DetectionFrame {
        DetectionFrame {
            face: Some(self.face.clone().unwrap_or_default()),
            hand: Some(self.hand.clone().unwrap_or_default()),
        }
    }
}

/// Parse a JSON-lines script
pub fn parse_script(text: &str) -> Result<Vec<ScriptFrame>> {
    let mut frames: Vec<ScriptFrame> = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let frame: ScriptFrame = serde_json::from_str(line)
            .map_err(|e| Error::InvalidInput(format!("Script line {}: {e}", number + 1)))?;

        if let Some(previous) = frames.last() {
            if frame.t <= previous.t {
                return Err(Error::InvalidInput(format!(
                    "Script line {}: timestamp {} does not follow {}",
                    number + 1,
                    frame.t,
                    previous.t
                )));
            }
        }
        frames.push(frame);
    }

    Ok(frames)
}

/// Frame source that replays script timestamps over a still background
pub struct ReplaySource {
    background: RgbaImage,
    timestamps: VecDeque<u64>,
    released: bool,
}

impl ReplaySource {
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Frames not yet handed out
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.timestamps.len()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        Ok(self
            .timestamps
            .pop_front()
            .map(|t| Frame::new(self.background.clone(), t)))
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            debug!("Replay released with {} frames left", self.timestamps.len());
        }
        self.released = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Detector that looks up scripted results by frame timestamp
pub struct ReplayDetector {
    results: HashMap<u64, DetectionFrame>,
}

impl Detector for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionFrame> {
        self.results
            .remove(&frame.timestamp_ms)
            .ok_or_else(|| Error::InvalidInput(format!("No scripted detection at t={}", frame.timestamp_ms)))
    }
}

/// Split a script into a frame source and its matching detector
#[must_use]
pub fn replay(frames: &[ScriptFrame], background: RgbaImage) -> (ReplaySource, ReplayDetector) {
    let source = ReplaySource {
        background,
        timestamps: frames.iter().map(|f| f.t).collect(),
        released: false,
    };
    let detector = ReplayDetector {
        results: frames.iter().map(|f| (f.t, f.detection())).collect(),
    };
    (source, detector)
}

/// Load a script file, with an optional background image
pub fn load<P: AsRef<Path>>(
    script: P,
    background: Option<&Path>,
    camera: &CameraConfig,
) -> Result<(ReplaySource, ReplayDetector)> {
    let text = std::fs::read_to_string(script.as_ref())?;
    let frames = parse_script(&text)?;

    let background = match background {
        Some(path) => image::open(path)?.to_rgba8(),
        None => RgbaImage::from_pixel(camera.width, camera.height, DEFAULT_BACKGROUND),
    };

    info!(
        "Loaded {} scripted frames from {} ({}x{} background)",
        frames.len(),
        script.as_ref().display(),
        background.width(),
        background.height()
    );
    Ok(replay(&frames, background))
}
