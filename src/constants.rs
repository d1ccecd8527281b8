//! Constants used throughout the application

/// Default exponential smoothing weight for the face box
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.4;

/// Exponential filter bounds
pub const SMOOTHING_ALPHA_MIN: f64 = 0.0;
pub const SMOOTHING_ALPHA_MAX: f64 = 1.0;

/// Wrist above this fraction of frame height counts as raised when no face is known
pub const DEFAULT_RAISE_THRESHOLD: f64 = 0.3;

/// Swipe detection defaults
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 0.08;
pub const DEFAULT_SWIPE_MAX_DURATION_MS: u64 = 3000;
pub const DEFAULT_SWIPE_COOLDOWN_MS: u64 = 300;

/// Session timing defaults
pub const DEFAULT_COUNTDOWN_MS: u64 = 3000;
pub const DEFAULT_RAISE_COOLDOWN_MS: u64 = 2000;

/// Overlay geometry defaults
pub const DEFAULT_EMOJI_SCALE: f64 = 2.5;
pub const DEFAULT_EMOJI_Y_OFFSET: f64 = 0.10;
pub const DEFAULT_HAND_ICON_SCALE: f64 = 0.08;

/// Capture defaults
pub const DEFAULT_PREVIEW_WIDTH: u32 = 20;
pub const DEFAULT_PREVIEW_QUALITY: u8 = 60;
pub const DEFAULT_PHOTO_QUALITY: u8 = 90;

/// Default camera resolution
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;

/// Asset load timeout
pub const DEFAULT_ASSET_TIMEOUT_MS: u64 = 2000;

/// Landmark index of the wrist in a hand sample
pub const WRIST_LANDMARK: usize = 0;

/// Milliseconds per displayed countdown step
pub const MS_PER_SECOND: u64 = 1000;

/// Instruction shown while waiting for the first raise
pub const INSTRUCTION_RAISE_TO_START: &str = "Raise your hand above your head to start";

/// Instruction shown while the overlay is live
pub const INSTRUCTION_OVERLAY: &str =
    "Swipe your hand from right to left to change the smiley.\nRaise your hand to take a photo.";

/// Unicode code points of the bundled emoji images, in display order
pub const DEFAULT_EMOJI_CODES: [&str; 20] = [
    "1f600", "1f603", "1f604", "1f601", "1f606", "1f605", "1f923", "1f602", "1f60a", "1f607", "1f608", "1f609",
    "1f60b", "1f60c", "1f60d", "1f60e", "1f60f", "1f610", "1f611", "1f612",
];

/// Cloudinary unsigned upload endpoint base
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// QR code rendering service
pub const QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
