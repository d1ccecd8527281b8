//! Emoji and hand indicator images.
//!
//! Loading never blocks the booth indefinitely: each file gets a bounded
//! wait, and an asset that fails or times out is simply absent. A missing
//! emoji is skipped when drawn; a missing hand indicator suppresses that
//! overlay.

use crate::config::AssetConfig;
use crate::{Error, Result};
use image::RgbaImage;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Decode an image file into RGBA
pub fn decode_asset(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Decode an image on the blocking pool, giving up after `timeout`
pub async fn load_asset(path: PathBuf, timeout: Duration) -> Result<RgbaImage> {
    let display = path.display().to_string();
    let task = tokio::task::spawn_blocking(move || decode_asset(&path));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(Error::Asset(format!("loader for {display} failed: {join_error}"))),
        Err(_) => Err(Error::Asset(format!("timed out after {timeout:?} loading {display}"))),
    }
}

/// Like [`load_asset`], but logs and returns `None` on failure
pub async fn load_optional(path: PathBuf, timeout: Duration) -> Option<RgbaImage> {
    match load_asset(path, timeout).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}

/// Ordered emoji images; entries that failed to load are `None`
#[derive(Debug, Clone, Default)]
pub struct EmojiSet {
    codes: Vec<String>,
    images: Vec<Option<RgbaImage>>,
}

impl EmojiSet {
    /// Build a set from already decoded images
    pub fn from_images(codes: Vec<String>, images: Vec<Option<RgbaImage>>) -> Result<Self> {
        if codes.len() != images.len() {
            return Err(Error::InvalidInput(format!(
                "{} emoji codes but {} images",
                codes.len(),
                images.len()
            )));
        }
        Ok(Self { codes, images })
    }

    /// Load `<dir>/<code>.png` for every code
    pub async fn load(dir: &Path, codes: &[String], timeout: Duration) -> Self {
        let mut images = Vec::with_capacity(codes.len());
        for code in codes {
            images.push(load_optional(dir.join(format!("{code}.png")), timeout).await);
        }

        let set = Self {
            codes: codes.to_vec(),
            images,
        };
        info!("Loaded {}/{} emoji images from {}", set.loaded_count(), set.len(), dir.display());
        set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image at `index`, if it loaded
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.images.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn code(&self, index: usize) -> Option<&str> {
        self.codes.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.images.iter().filter(|i| i.is_some()).count()
    }
}

/// All images the booth draws
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub emojis: EmojiSet,
    pub hand_icon: Option<RgbaImage>,
}

impl Assets {
    /// Load everything named in the asset configuration
    pub async fn load(config: &AssetConfig) -> Self {
        let timeout = Duration::from_millis(config.load_timeout_ms);
        let emojis = EmojiSet::load(&config.emoji_dir, &config.emoji_codes, timeout).await;
        let hand_icon = load_optional(config.hand_icon.clone(), timeout).await;
        if hand_icon.is_none() {
            warn!("Hand indicator unavailable; continuing without it");
        }
        Self { emojis, hand_icon }
    }
}
