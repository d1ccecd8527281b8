//! Configuration management for the emoji booth

use crate::constants::{
    DEFAULT_ASSET_TIMEOUT_MS, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, DEFAULT_COUNTDOWN_MS, DEFAULT_EMOJI_CODES,
    DEFAULT_EMOJI_SCALE, DEFAULT_EMOJI_Y_OFFSET, DEFAULT_HAND_ICON_SCALE, DEFAULT_PHOTO_QUALITY,
    DEFAULT_PREVIEW_QUALITY, DEFAULT_PREVIEW_WIDTH, DEFAULT_RAISE_COOLDOWN_MS, DEFAULT_RAISE_THRESHOLD,
    DEFAULT_SMOOTHING_ALPHA, DEFAULT_SWIPE_COOLDOWN_MS, DEFAULT_SWIPE_MAX_DURATION_MS, DEFAULT_SWIPE_THRESHOLD,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Face box smoothing
    pub smoothing: SmoothingConfig,

    /// Gesture thresholds
    pub gesture: GestureConfig,

    /// Session timing
    pub session: SessionConfig,

    /// Overlay geometry
    pub overlay: OverlayConfig,

    /// Captured photo and fallback preview
    pub capture: CaptureConfig,

    /// Emoji and hand indicator images
    pub assets: AssetConfig,

    /// Remote publishing
    pub publish: PublishConfig,

    /// Camera settings
    pub camera: CameraConfig,
}

/// Face box smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`exponential` or `none`)
    pub filter: String,

    /// Exponential smoothing weight of the newest sample
    pub alpha: f64,
}

/// Raise and swipe thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Wrist above this fraction of frame height is raised when no face is known
    pub raise_threshold: f64,

    /// Minimum horizontal wrist travel for a swipe, in normalized units
    pub swipe_threshold: f64,

    /// A swipe must complete within this many milliseconds
    pub swipe_max_duration_ms: u64,

    /// Minimum time between two swipes
    pub swipe_cooldown_ms: u64,
}

/// Session timers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of both countdowns
    pub countdown_ms: u64,

    /// Time the hand must be lowered before a new raise counts
    pub raise_cooldown_ms: u64,
}

/// Overlay geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Emoji size relative to the face box
    pub emoji_scale: f64,

    /// Upward shift as a fraction of the emoji height
    pub emoji_y_offset: f64,

    /// Hand indicator size as a fraction of frame width
    pub hand_icon_scale: f64,
}

/// Captured photo encoding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Width of the fallback preview in pixels
    pub preview_width: u32,

    /// JPEG quality of the fallback preview (1-100)
    pub preview_quality: u8,

    /// JPEG quality of the published photo (1-100)
    pub photo_quality: u8,
}

/// Asset locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `<code>.png` emoji images
    pub emoji_dir: PathBuf,

    /// Emoji codes in selection order
    pub emoji_codes: Vec<String>,

    /// Hand indicator image
    pub hand_icon: PathBuf,

    /// Upper bound on waiting for any single asset
    pub load_timeout_ms: u64,
}

/// Publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Upload photos; when false only the fallback preview is used
    pub enabled: bool,

    /// Cloudinary cloud name
    pub cloud_name: String,

    /// Unsigned upload preset
    pub upload_preset: String,

    /// Override of the upload endpoint
    pub endpoint: Option<String>,

    /// Request timeout
    pub timeout_ms: u64,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index
    pub index: i32,

    /// Requested frame width
    pub width: u32,

    /// Requested frame height
    pub height: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            filter: "exponential".to_string(),
            alpha: DEFAULT_SMOOTHING_ALPHA,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            raise_threshold: DEFAULT_RAISE_THRESHOLD,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            swipe_max_duration_ms: DEFAULT_SWIPE_MAX_DURATION_MS,
            swipe_cooldown_ms: DEFAULT_SWIPE_COOLDOWN_MS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_ms: DEFAULT_COUNTDOWN_MS,
            raise_cooldown_ms: DEFAULT_RAISE_COOLDOWN_MS,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            emoji_scale: DEFAULT_EMOJI_SCALE,
            emoji_y_offset: DEFAULT_EMOJI_Y_OFFSET,
            hand_icon_scale: DEFAULT_HAND_ICON_SCALE,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preview_width: DEFAULT_PREVIEW_WIDTH,
            preview_quality: DEFAULT_PREVIEW_QUALITY,
            photo_quality: DEFAULT_PHOTO_QUALITY,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            emoji_dir: PathBuf::from("emojis"),
            emoji_codes: DEFAULT_EMOJI_CODES.iter().map(ToString::to_string).collect(),
            hand_icon: PathBuf::from("hand/hand.png"),
            load_timeout_ms: DEFAULT_ASSET_TIMEOUT_MS,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cloud_name: "demo".to_string(),
            upload_preset: "arbooth".to_string(),
            endpoint: None,
            timeout_ms: 15_000,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the face box filter described by the smoothing section
    pub fn create_filter(&self) -> Result<Box<dyn crate::filters::BoxFilter>> {
        match self.smoothing.filter.to_lowercase().as_str() {
            "exponential" | "ema" => crate::filters::create_filter(&format!("exponential:{}", self.smoothing.alpha)),
            other => crate::filters::create_filter(other),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        fn fraction(name: &str, value: f64) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0, got {value}")))
            }
        }

        if !(self.smoothing.alpha > 0.0 && self.smoothing.alpha <= 1.0) {
            return Err(Error::ConfigError(format!(
                "Smoothing alpha must be in (0, 1], got {}",
                self.smoothing.alpha
            )));
        }
        fraction("Raise threshold", self.gesture.raise_threshold)?;
        fraction("Swipe threshold", self.gesture.swipe_threshold)?;
        fraction("Hand icon scale", self.overlay.hand_icon_scale)?;

        if self.gesture.swipe_max_duration_ms == 0 {
            return Err(Error::ConfigError("Swipe max duration must be greater than 0".to_string()));
        }
        if self.session.countdown_ms == 0 {
            return Err(Error::ConfigError("Countdown must be greater than 0".to_string()));
        }
        if self.overlay.emoji_scale <= 0.0 {
            return Err(Error::ConfigError("Emoji scale must be positive".to_string()));
        }
        if self.capture.preview_width == 0 {
            return Err(Error::ConfigError("Preview width must be greater than 0".to_string()));
        }
        for (name, quality) in [
            ("Preview quality", self.capture.preview_quality),
            ("Photo quality", self.capture.photo_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(Error::ConfigError(format!("{name} must be between 1 and 100")));
            }
        }
        if self.assets.emoji_codes.is_empty() {
            return Err(Error::ConfigError("At least one emoji code is required".to_string()));
        }
        if self.publish.enabled && (self.publish.cloud_name.is_empty() || self.publish.upload_preset.is_empty()) {
            return Err(Error::ConfigError(
                "Publishing requires a cloud name and an upload preset".to_string(),
            ));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::ConfigError("Camera resolution must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Emoji Booth Configuration

# Face box smoothing
smoothing:
  filter: "exponential"
  alpha: 0.4

# Gesture thresholds (normalized frame units, milliseconds)
gesture:
  raise_threshold: 0.3
  swipe_threshold: 0.08
  swipe_max_duration_ms: 3000
  swipe_cooldown_ms: 300

# Session timing
session:
  countdown_ms: 3000
  raise_cooldown_ms: 2000

# Overlay geometry
overlay:
  emoji_scale: 2.5
  emoji_y_offset: 0.1
  hand_icon_scale: 0.08

# Captured photo
capture:
  preview_width: 20
  preview_quality: 60
  photo_quality: 90

# Assets
assets:
  emoji_dir: "emojis"
  hand_icon: "hand/hand.png"
  load_timeout_ms: 2000

# Remote publishing (Cloudinary unsigned upload)
publish:
  enabled: true
  cloud_name: "demo"
  upload_preset: "arbooth"
  timeout_ms: 15000

# Camera
camera:
  index: 0
  width: 640
  height: 480
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assets.emoji_codes.len(), 20);
        assert_eq!(config.create_filter().unwrap().name(), "ExponentialFilter");
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.raise_cooldown_ms, 2000);
        // Codes omitted from the file fall back to the defaults
        assert_eq!(config.assets.emoji_codes.len(), 20);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.smoothing.alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.raise_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.capture.photo_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.assets.emoji_codes.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.publish.upload_preset.clear();
        assert!(config.validate().is_err());
        config.publish.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_none_filter_from_config() {
        let mut config = Config::default();
        config.smoothing.filter = "none".to_string();
        assert_eq!(config.create_filter().unwrap().name(), "NoFilter");
    }
}
