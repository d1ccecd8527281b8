//! Gesture-driven emoji photo booth.
//!
//! A visitor raises a hand to start, swipes to pick an emoji that is drawn
//! over their face, and raises a hand again to take a photo. The photo is
//! published to a remote host and shared as a link plus QR code; when
//! publishing fails a tiny embedded preview is shared instead.
//!
//! The pipeline for each video frame:
//! 1. The external landmark detector delivers face and hand results
//! 2. The face box is smoothed as it is ingested
//! 3. The session state machine ticks on the latest snapshot
//! 4. The overlay layer is rendered while the overlay is live
//! 5. On capture, the emoji is composited at full resolution and published
//!
//! # Examples
//!
//! ## Driving the state machine directly
//!
//! ```
//! use emoji_booth::config::Config;
//! use emoji_booth::detection::{DetectionSnapshot, HandSample, NormalizedBox};
//! use emoji_booth::session::{SessionMachine, SessionState};
//!
//! # fn main() -> emoji_booth::Result<()> {
//! let config = Config::default();
//! let mut machine = SessionMachine::new(&config.session, &config.gesture, 20)?;
//! machine.start()?;
//!
//! let face = NormalizedBox::new(0.5, 0.5, 0.2, 0.2);
//! let lowered = DetectionSnapshot::new(Some(face), None);
//! let raised = DetectionSnapshot::new(Some(face), Some(HandSample::from_wrist(0.5, 0.2)));
//!
//! machine.tick(&lowered, 0);
//! let render = machine.tick(&raised, 2500);
//! assert_eq!(render.state, SessionState::StartCountdown);
//! assert_eq!(render.countdown, "3");
//! # Ok(())
//! # }
//! ```
//!
//! ## Replaying a scripted session
//!
//! ```no_run
//! use emoji_booth::{app::Booth, assets::Assets, config::Config, publish::{create_publisher, Publisher}, replay};
//! use std::sync::Arc;
//!
//! # async fn run() -> emoji_booth::Result<()> {
//! let config = Config::default();
//! let assets = Assets::load(&config.assets).await;
//! let publisher: Arc<dyn Publisher> = Arc::from(create_publisher(&config.publish)?);
//! let (source, mut detector) = replay::load("session.jsonl", None, &config.camera)?;
//!
//! let mut booth = Booth::new(&config, assets, publisher)?;
//! booth.start(Box::new(source))?;
//! if let Some(capture) = booth.run(&mut detector).await? {
//!     println!("{}", capture.share.resolve().await.as_str());
//! }
//! # Ok(())
//! # }
//! ```

/// Detector result contracts and smoothed signal ingestion
pub mod detection;

/// Face box smoothing filters
pub mod filters;

/// Raise and swipe gesture recognition
pub mod gesture;

/// Countdown timers
pub mod countdown;

/// Session state machine
pub mod session;

/// Overlay geometry and compositing
pub mod overlay;

/// Emoji and hand indicator assets
pub mod assets;

/// Photo capture and share link resolution
pub mod capture;

/// Remote photo publishing
pub mod publish;

/// Frame sources and detector interfaces
pub mod source;

/// Scripted sessions
pub mod replay;

/// Main application module
pub mod app;

/// Utility functions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
