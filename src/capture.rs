//! Capture and publish pipeline.
//!
//! A capture freezes the current frame with the emoji composited on it at
//! full resolution, derives a tiny JPEG preview that is always available as a
//! fallback payload, and hands the full photo to a [`Publisher`]. Publishing
//! runs on its own task and always resolves to a [`ShareLink`].

use crate::config::CaptureConfig;
use crate::detection::NormalizedBox;
use crate::overlay::Compositor;
use crate::publish::{qr_code_url, Publisher};
use crate::utils::safe_cast::f64_to_u32_clamp;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, RgbImage, RgbaImage};
use log::{info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Where a captured photo can be retrieved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    /// Reference returned by the publisher
    Remote(String),
    /// Locally derived preview data URL
    Fallback(String),
}

impl ShareLink {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(s) | Self::Fallback(s) => s,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// URL of a QR code image for this link
    #[must_use]
    pub fn qr_code_url(&self) -> String {
        qr_code_url(self.as_str())
    }
}

/// The frozen result of one capture
#[derive(Debug, Clone)]
pub struct CapturedArtifact {
    /// Full-resolution composite
    pub photo: RgbaImage,
    /// JPEG bytes submitted to the publisher
    pub photo_jpeg: Vec<u8>,
    /// Small JPEG preview
    pub preview_jpeg: Vec<u8>,
    /// Preview as a `data:` URL, used when publishing fails
    pub fallback: String,
}

/// Publish result that resolves in the background
pub struct PendingShare {
    handle: JoinHandle<ShareLink>,
    fallback: String,
}

impl PendingShare {
    /// Wait for the publish task; a crashed task degrades to the fallback
    pub async fn resolve(self) -> ShareLink {
        match self.handle.await {
            Ok(link) => link,
            Err(e) => {
                warn!("Publish task failed: {e}");
                ShareLink::Fallback(self.fallback)
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

/// A finished capture with its publish still in flight
pub struct CaptureResult {
    pub artifact: CapturedArtifact,
    pub share: PendingShare,
}

/// Composites, encodes and publishes captured frames
#[derive(Clone)]
pub struct CapturePipeline {
    compositor: Compositor,
    config: CaptureConfig,
    publisher: Arc<dyn Publisher>,
}

impl CapturePipeline {
    pub fn new(compositor: Compositor, config: &CaptureConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            compositor,
            config: config.clone(),
            publisher,
        }
    }

    /// Draw the emoji onto a copy of `frame` using the overlay geometry
    #[must_use]
    pub fn composite(&self, frame: &RgbaImage, face: Option<&NormalizedBox>, emoji: Option<&RgbaImage>) -> RgbaImage {
        let mut photo = frame.clone();
        self.compositor.draw_emoji(&mut photo, face, emoji);
        photo
    }

    /// Freeze a frame into a captured artifact
    pub fn capture(
        &self,
        frame: &RgbaImage,
        face: Option<&NormalizedBox>,
        emoji: Option<&RgbaImage>,
    ) -> Result<CapturedArtifact> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(Error::InvalidInput("Cannot capture an empty frame".to_string()));
        }

        let photo = self.composite(frame, face, emoji);
        let photo_jpeg = encode_jpeg(&photo, self.config.photo_quality)?;

        let (preview_w, preview_h) = preview_size(photo.width(), photo.height(), self.config.preview_width);
        let preview = imageops::resize(&photo, preview_w, preview_h, FilterType::Triangle);
        let preview_jpeg = encode_jpeg(&preview, self.config.preview_quality)?;
        let fallback = data_url(&preview_jpeg);

        info!(
            "Captured {}x{} photo ({} bytes), preview {}x{} ({} bytes)",
            photo.width(),
            photo.height(),
            photo_jpeg.len(),
            preview_w,
            preview_h,
            preview_jpeg.len()
        );

        Ok(CapturedArtifact {
            photo,
            photo_jpeg,
            preview_jpeg,
            fallback,
        })
    }

    /// Publish an artifact, falling back to its preview on any failure
    pub async fn publish(&self, artifact: &CapturedArtifact) -> ShareLink {
        publish_with_fallback(self.publisher.as_ref(), artifact.photo_jpeg.clone(), artifact.fallback.clone()).await
    }

    /// Start publishing on a separate task
    #[must_use]
    pub fn spawn_publish(&self, artifact: &CapturedArtifact) -> PendingShare {
        let publisher = Arc::clone(&self.publisher);
        let photo = artifact.photo_jpeg.clone();
        let fallback = artifact.fallback.clone();
        let task_fallback = fallback.clone();
        let handle =
            tokio::spawn(async move { publish_with_fallback(publisher.as_ref(), photo, task_fallback).await });
        PendingShare { handle, fallback }
    }
}

async fn publish_with_fallback(publisher: &dyn Publisher, photo: Vec<u8>, fallback: String) -> ShareLink {
    match publisher.publish(photo).await {
        Ok(reference) => {
            info!("Photo published via {}: {reference}", publisher.name());
            ShareLink::Remote(reference)
        }
        Err(e) => {
            warn!("Publishing via {} failed, using preview fallback: {e}", publisher.name());
            ShareLink::Fallback(fallback)
        }
    }
}

/// Preview dimensions: fixed width, aspect-preserving height, at least 1px
#[must_use]
pub fn preview_size(width: u32, height: u32, preview_width: u32) -> (u32, u32) {
    if width == 0 {
        return (preview_width.max(1), 1);
    }
    let h = f64::from(height) / f64::from(width) * f64::from(preview_width);
    (preview_width.max(1), f64_to_u32_clamp(h, 1, u32::MAX))
}

/// Encode an RGBA image as baseline JPEG (alpha dropped)
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb: RgbImage = image.convert();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    Ok(buffer)
}

/// Wrap JPEG bytes in a `data:` URL
#[must_use]
pub fn data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::OfflinePublisher;
    use image::Rgba;

    fn pipeline() -> CapturePipeline {
        CapturePipeline::new(Compositor::default(), &CaptureConfig::default(), Arc::new(OfflinePublisher))
    }

    #[test]
    fn test_preview_size_preserves_aspect() {
        assert_eq!(preview_size(640, 480, 20), (20, 15));
        assert_eq!(preview_size(1920, 1080, 20), (20, 11));
        assert_eq!(preview_size(100, 1, 20), (20, 1));
    }

    #[test]
    fn test_capture_produces_fallback() {
        let frame = RgbaImage::from_pixel(64, 48, Rgba([10, 20, 30, 255]));
        let artifact = pipeline().capture(&frame, None, None).unwrap();
        assert_eq!(artifact.photo.dimensions(), (64, 48));
        assert!(artifact.fallback.starts_with("data:image/jpeg;base64,"));
        assert!(!artifact.photo_jpeg.is_empty());

        let preview = image::load_from_memory(&artifact.preview_jpeg).unwrap();
        assert_eq!((preview.width(), preview.height()), (20, 15));
    }

    #[test]
    fn test_capture_rejects_empty_frame() {
        let frame = RgbaImage::new(0, 0);
        assert!(pipeline().capture(&frame, None, None).is_err());
    }

    #[test]
    fn test_composite_matches_overlay_geometry() {
        let frame = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 255]));
        let emoji = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let face = NormalizedBox::new(0.5, 0.5, 0.2, 0.2);
        let photo = pipeline().composite(&frame, Some(&face), Some(&emoji));
        // 100x100 emoji at (50, 40)
        assert_eq!(photo.get_pixel(100, 90).0, [255, 255, 255, 255]);
        assert_eq!(photo.get_pixel(100, 145).0, [0, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_publish_failure_uses_fallback() {
        let frame = RgbaImage::from_pixel(32, 32, Rgba([200, 100, 50, 255]));
        let pipeline = pipeline();
        let artifact = pipeline.capture(&frame, None, None).unwrap();
        let link = pipeline.publish(&artifact).await;
        assert_eq!(link, ShareLink::Fallback(artifact.fallback.clone()));
        assert!(!link.as_str().is_empty());

        let pending = pipeline.spawn_publish(&artifact);
        assert_eq!(pending.resolve().await, ShareLink::Fallback(artifact.fallback));
    }
}
