//! Main application module: the booth driving loop.

use crate::{
    assets::Assets,
    capture::{CaptureResult, CapturePipeline},
    config::Config,
    detection::{DetectionFrame, DetectionSnapshot, FrameSignals},
    error::Result,
    overlay::Compositor,
    publish::Publisher,
    session::{RenderInstructions, SessionMachine, SessionState},
    source::{Detector, Frame, FrameSource},
};
use image::RgbaImage;
use log::{debug, info, warn};
use std::sync::Arc;

/// Everything produced while processing one frame
pub struct FrameOutput {
    /// What the session wants displayed
    pub instructions: RenderInstructions,
    /// Transparent overlay layer, present only while the overlay is shown
    pub overlay: Option<RgbaImage>,
    /// Set on the frame where the photo was taken
    pub capture: Option<CaptureResult>,
}

/// Main booth struct
pub struct Booth {
    machine: SessionMachine,
    signals: FrameSignals,
    compositor: Compositor,
    pipeline: CapturePipeline,
    assets: Assets,
    source: Option<Box<dyn FrameSource>>,
    running: bool,
}

impl Booth {
    /// Create a booth from configuration and loaded assets
    pub fn new(config: &Config, assets: Assets, publisher: Arc<dyn Publisher>) -> Result<Self> {
        info!("Initializing emoji booth with {} emojis", assets.emojis.len());

        let machine = SessionMachine::new(&config.session, &config.gesture, assets.emojis.len())?;
        let smoother = config.create_filter()?;
        info!("Face box smoothing: {}", smoother.name());
        let compositor = Compositor::new(&config.overlay);
        let pipeline = CapturePipeline::new(compositor, &config.capture, publisher);

        Ok(Self {
            machine,
            signals: FrameSignals::new(smoother),
            compositor,
            pipeline,
            assets,
            source: None,
            running: false,
        })
    }

    /// Begin a session on `source`. Only valid while idle.
    pub fn start(&mut self, source: Box<dyn FrameSource>) -> Result<()> {
        self.machine.start()?;
        self.signals.clear();
        // Any source left from an ended session is released first
        self.stop();
        info!("Session started on {} source", source.name());
        self.source = Some(source);
        self.running = true;
        Ok(())
    }

    /// Abandon the session from any state and release the frame source
    pub fn reset(&mut self) {
        self.machine.reset();
        self.signals.clear();
        self.stop();
        info!("Booth reset");
    }

    /// Pick an emoji while the picker is visible
    pub fn select_emoji(&mut self, index: usize) -> Result<()> {
        self.machine.select_emoji(index)
    }

    /// Ingest one frame's detections, advance the session and render.
    ///
    /// `detection` is `None` when no new results arrived for this frame; the
    /// previous ones are reused. A capture spawns the publish task, so this
    /// must run inside a Tokio runtime.
    pub fn process_frame(&mut self, frame: &Frame, detection: Option<&DetectionFrame>) -> Result<FrameOutput> {
        if let Some(detection) = detection {
            self.signals.ingest(detection);
        }
        let snapshot = self.signals.snapshot();
        let instructions = self.machine.tick(&snapshot, frame.timestamp_ms);
        let emoji = self.assets.emojis.get(instructions.selected_emoji);

        let overlay = instructions.show_overlay.then(|| {
            self.compositor.render_layer(
                frame.image.width(),
                frame.image.height(),
                snapshot.face.as_ref(),
                emoji,
                snapshot.hand.as_ref(),
                self.assets.hand_icon.as_ref(),
            )
        });

        let capture = if instructions.capture_requested() {
            let captured = self.pipeline.capture(&frame.image, snapshot.face.as_ref(), emoji);
            // The session is over whether or not the photo could be taken
            self.stop();
            let artifact = captured?;
            let share = self.pipeline.spawn_publish(&artifact);
            Some(CaptureResult { artifact, share })
        } else {
            None
        };

        Ok(FrameOutput {
            instructions,
            overlay,
            capture,
        })
    }

    /// Run the main loop until a photo is taken, the source runs dry, or
    /// the booth is reset
    pub async fn run(&mut self, detector: &mut dyn Detector) -> Result<Option<CaptureResult>> {
        info!("Starting main booth loop");
        let mut frame_count: u64 = 0;

        while self.running {
            let Some(source) = self.source.as_mut() else {
                break;
            };

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("End of {} source reached", source.name());
                    self.stop();
                    break;
                }
                Err(e) => {
                    warn!("Failed to read frame, retrying: {e}");
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            let detection = match detector.detect(&frame) {
                Ok(detection) => Some(detection),
                Err(e) => {
                    warn!("Detection failed for frame at {} ms: {e}", frame.timestamp_ms);
                    None
                }
            };

            frame_count += 1;
            let output = self.process_frame(&frame, detection.as_ref())?;
            debug!(
                "Frame {frame_count}: {} {}",
                output.instructions.state, output.instructions.countdown
            );

            if let Some(capture) = output.capture {
                info!("Photo captured after {frame_count} frames");
                return Ok(Some(capture));
            }

            tokio::task::yield_now().await;
        }

        info!("Booth loop finished after {frame_count} frames");
        Ok(None)
    }

    /// Leave the loop and release the source, logging release failures
    fn stop(&mut self) {
        self.running = false;
        if let Some(mut source) = self.source.take() {
            match source.release() {
                Ok(()) => debug!("Released {} source", source.name()),
                Err(e) => warn!("Failed to release {} source: {e}", source.name()),
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    #[must_use]
    pub fn selected_emoji(&self) -> usize {
        self.machine.selected_emoji()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Latest smoothed detections
    #[must_use]
    pub fn snapshot(&self) -> DetectionSnapshot {
        self.signals.snapshot()
    }

    #[must_use]
    pub fn assets(&self) -> &Assets {
        &self.assets
    }
}
