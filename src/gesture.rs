//! Hand gesture interpretation.
//!
//! Two kinds of gesture drive the booth: a raised hand (wrist above the face,
//! or above a fixed line when no face is visible) and a lateral swipe of the
//! wrist, tracked across frames with time and distance bounds.

use crate::config::GestureConfig;
use crate::detection::{HandSample, NormalizedBox};
use log::debug;

/// Raised relative to the face: wrist above the top edge of the face box
#[must_use]
pub fn is_raised_above_face(hand: Option<&HandSample>, face: Option<&NormalizedBox>) -> bool {
    match (hand, face) {
        (Some(hand), Some(face)) => hand.wrist().y < face.top(),
        _ => false,
    }
}

/// Raised relative to the frame: wrist above `threshold` of frame height
#[must_use]
pub fn is_raised_in_frame(hand: Option<&HandSample>, threshold: f64) -> bool {
    hand.is_some_and(|hand| hand.wrist().y < threshold)
}

/// Either raised predicate holds
#[must_use]
pub fn is_raised(hand: Option<&HandSample>, face: Option<&NormalizedBox>, threshold: f64) -> bool {
    is_raised_above_face(hand, face) || is_raised_in_frame(hand, threshold)
}

/// Anchor of an in-progress swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeTracker {
    pub origin_x: f64,
    pub origin_time: u64,
}

/// Lateral swipe detector
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    threshold: f64,
    max_duration_ms: u64,
    cooldown_ms: u64,
    tracker: Option<SwipeTracker>,
    last_swipe: u64,
}

impl SwipeDetector {
    /// Create a new swipe detector
    #[must_use]
    pub fn new(threshold: f64, max_duration_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            threshold,
            max_duration_ms,
            cooldown_ms,
            tracker: None,
            last_swipe: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.swipe_threshold, config.swipe_max_duration_ms, config.swipe_cooldown_ms)
    }

    /// Feed the latest hand sample; returns true when a swipe fires
    pub fn update(&mut self, hand: Option<&HandSample>, now: u64) -> bool {
        let Some(hand) = hand else {
            self.tracker = None;
            return false;
        };
        let x = hand.wrist().x;

        let Some(tracker) = self.tracker else {
            self.anchor(x, now);
            return false;
        };

        let dx = x - tracker.origin_x;
        let dt = now.saturating_sub(tracker.origin_time);
        let since_last = now.saturating_sub(self.last_swipe);

        if dx.abs() > self.threshold && dt < self.max_duration_ms && since_last > self.cooldown_ms {
            debug!("Swipe detected: dx={dx:.3} over {dt}ms");
            self.tracker = None;
            self.last_swipe = now;
            true
        } else if dt >= self.max_duration_ms {
            self.anchor(x, now);
            false
        } else {
            false
        }
    }

    fn anchor(&mut self, x: f64, now: u64) {
        self.tracker = Some(SwipeTracker {
            origin_x: x,
            origin_time: now,
        });
    }

    /// Drop the active track, keeping the swipe cooldown
    pub fn clear_tracker(&mut self) {
        self.tracker = None;
    }

    /// Reset the detector
    pub fn reset(&mut self) {
        self.tracker = None;
        self.last_swipe = 0;
    }

    #[must_use]
    pub fn tracker(&self) -> Option<SwipeTracker> {
        self.tracker
    }

    #[must_use]
    pub fn last_swipe(&self) -> u64 {
        self.last_swipe
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}
