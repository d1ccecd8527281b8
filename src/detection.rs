//! Detector output contracts and per-frame signal ingestion.
//!
//! The landmark detector is an external collaborator. It hands over a face
//! result and a hand result per video frame; this module keeps the latest of
//! each (last writer wins) and smooths the face box as results arrive.

use crate::constants::WRIST_LANDMARK;
use crate::filters::BoxFilter;
use serde::{Deserialize, Serialize};

/// Face region in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBox {
    /// Horizontal center, 0 at the left edge
    pub x_center: f64,
    /// Vertical center, 0 at the top edge
    pub y_center: f64,
    /// Width as a fraction of frame width
    pub width: f64,
    /// Height as a fraction of frame height
    pub height: f64,
}

impl NormalizedBox {
    #[must_use]
    pub const fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Top edge in normalized coordinates
    #[must_use]
    pub fn top(&self) -> f64 {
        self.y_center - self.height / 2.0
    }
}

/// A single normalized landmark point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }
}

/// Ordered hand landmarks; index 0 is the wrist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandSample {
    landmarks: Vec<Landmark>,
}

impl HandSample {
    /// Build a sample, rejecting an empty landmark list
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Option<Self> {
        if landmarks.is_empty() {
            None
        } else {
            Some(Self { landmarks })
        }
    }

    /// Sample holding only a wrist point
    #[must_use]
    pub fn from_wrist(x: f64, y: f64) -> Self {
        Self {
            landmarks: vec![Landmark::new(x, y)],
        }
    }

    #[must_use]
    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST_LANDMARK]
    }

    #[must_use]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

/// One face detection as delivered by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    pub bounding_box: NormalizedBox,
}

/// Face detector output for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceResult {
    #[serde(default)]
    pub detections: Vec<FaceDetection>,
}

impl FaceResult {
    /// First detected box, if any
    #[must_use]
    pub fn primary(&self) -> Option<NormalizedBox> {
        self.detections.first().map(|d| d.bounding_box)
    }
}

/// Hand detector output for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    #[serde(default)]
    pub landmarks: Vec<Vec<Landmark>>,
}

impl HandResult {
    /// First detected hand, if any
    #[must_use]
    pub fn primary(&self) -> Option<HandSample> {
        self.landmarks.first().cloned().and_then(HandSample::new)
    }
}

/// Detector outputs for a single frame; `None` means that result was not
/// delivered for this frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(default)]
    pub face: Option<FaceResult>,
    #[serde(default)]
    pub hand: Option<HandResult>,
}

/// What the state machine sees on a tick: smoothed face and latest hand
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSnapshot {
    pub face: Option<NormalizedBox>,
    pub hand: Option<HandSample>,
}

impl DetectionSnapshot {
    #[must_use]
    pub fn new(face: Option<NormalizedBox>, hand: Option<HandSample>) -> Self {
        Self { face, hand }
    }
}

/// Latest-value slot for detector results, with face smoothing applied on ingest
pub struct FrameSignals {
    smoother: Box<dyn BoxFilter>,
    face: Option<NormalizedBox>,
    hand: Option<HandSample>,
}

impl FrameSignals {
    #[must_use]
    pub fn new(smoother: Box<dyn BoxFilter>) -> Self {
        Self {
            smoother,
            face: None,
            hand: None,
        }
    }

    /// Ingest a face result. An empty result drops the smoothed box and the
    /// filter memory so the next detection starts fresh.
    pub fn ingest_face(&mut self, result: &FaceResult) {
        match result.primary() {
            Some(raw) => self.face = Some(self.smoother.apply(raw)),
            None => {
                self.smoother.reset();
                self.face = None;
            }
        }
    }

    /// Ingest a hand result, replacing the previous sample
    pub fn ingest_hand(&mut self, result: &HandResult) {
        self.hand = result.primary();
    }

    /// Ingest whichever results were delivered; an undelivered half keeps its
    /// previous value
    pub fn ingest(&mut self, frame: &DetectionFrame) {
        if let Some(face) = &frame.face {
            self.ingest_face(face);
        }
        if let Some(hand) = &frame.hand {
            self.ingest_hand(hand);
        }
    }

    /// Snapshot read at tick time
    #[must_use]
    pub fn snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot {
            face: self.face,
            hand: self.hand.clone(),
        }
    }

    #[must_use]
    pub fn face(&self) -> Option<NormalizedBox> {
        self.face
    }

    /// Forget everything, including smoother memory
    pub fn clear(&mut self) {
        self.smoother.reset();
        self.face = None;
        self.hand = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::exponential::ExponentialFilter;

    fn face(b: NormalizedBox) -> FaceResult {
        FaceResult {
            detections: vec![FaceDetection { bounding_box: b }],
        }
    }

    #[test]
    fn test_parse_detector_json() {
        let json = r#"{
            "face": {"detections": [{"boundingBox": {"xCenter": 0.5, "yCenter": 0.4, "width": 0.2, "height": 0.3}}]},
            "hand": {"landmarks": [[{"x": 0.1, "y": 0.2}, {"x": 0.15, "y": 0.25}]]}
        }"#;
        let frame: DetectionFrame = serde_json::from_str(json).unwrap();
        let face = frame.face.unwrap().primary().unwrap();
        assert_eq!(face, NormalizedBox::new(0.5, 0.4, 0.2, 0.3));
        let hand = frame.hand.unwrap().primary().unwrap();
        assert_eq!(hand.wrist(), Landmark::new(0.1, 0.2));
        assert_eq!(hand.landmarks().len(), 2);
    }

    #[test]
    fn test_empty_hand_list_is_absent() {
        let result = HandResult {
            landmarks: vec![vec![]],
        };
        assert!(result.primary().is_none());
    }

    #[test]
    fn test_signals_reset_on_missing_face() {
        let mut signals = FrameSignals::new(Box::new(ExponentialFilter::new(0.5)));
        signals.ingest_face(&face(NormalizedBox::new(0.2, 0.2, 0.2, 0.2)));
        signals.ingest_face(&face(NormalizedBox::new(0.4, 0.4, 0.4, 0.4)));
        let smoothed = signals.face().unwrap();
        assert!((smoothed.x_center - 0.3).abs() < 1e-12);

        signals.ingest_face(&FaceResult::default());
        assert!(signals.face().is_none());

        // Re-initialises instead of blending with the pre-gap value
        signals.ingest_face(&face(NormalizedBox::new(0.8, 0.8, 0.1, 0.1)));
        assert_eq!(signals.face(), Some(NormalizedBox::new(0.8, 0.8, 0.1, 0.1)));
    }

    #[test]
    fn test_hand_last_writer_wins() {
        let mut signals = FrameSignals::new(Box::new(ExponentialFilter::new(0.4)));
        let first = HandResult {
            landmarks: vec![vec![Landmark::new(0.1, 0.1)]],
        };
        let second = HandResult {
            landmarks: vec![vec![Landmark::new(0.6, 0.7)]],
        };
        signals.ingest_hand(&first);
        signals.ingest_hand(&second);
        assert_eq!(signals.snapshot().hand.unwrap().wrist(), Landmark::new(0.6, 0.7));

        signals.ingest_hand(&HandResult::default());
        assert!(signals.snapshot().hand.is_none());
    }

    #[test]
    fn test_undelivered_result_keeps_previous() {
        let mut signals = FrameSignals::new(Box::new(ExponentialFilter::new(0.4)));
        let b = NormalizedBox::new(0.5, 0.5, 0.2, 0.2);
        signals.ingest(&DetectionFrame {
            face: Some(face(b)),
            hand: Some(HandResult {
                landmarks: vec![vec![Landmark::new(0.3, 0.3)]],
            }),
        });
        signals.ingest(&DetectionFrame::default());
        let snapshot = signals.snapshot();
        assert_eq!(snapshot.face, Some(b));
        assert!(snapshot.hand.is_some());

        signals.clear();
        assert_eq!(signals.snapshot(), DetectionSnapshot::default());
    }
}
