//! Overlay compositing.
//!
//! The emoji is placed from the smoothed face box: scaled up around the box
//! center so it covers the whole head, then lifted by a fraction of its own
//! height. The same rule is used for the live overlay layer and for the final
//! photo, only the canvas size differs.

use crate::config::OverlayConfig;
use crate::detection::{HandSample, Landmark, NormalizedBox};
use crate::utils::safe_cast::{f64_to_i64_clamp, f64_to_u32_clamp};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Largest drawn asset relative to the canvas; guards against degenerate boxes
const MAX_ASSET_CANVAS_RATIO: f64 = 8.0;

/// Destination rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Stateless compositor holding the overlay geometry constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    emoji_scale: f64,
    emoji_y_offset: f64,
    hand_icon_scale: f64,
}

impl Compositor {
    #[must_use]
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            emoji_scale: config.emoji_scale,
            emoji_y_offset: config.emoji_y_offset,
            hand_icon_scale: config.hand_icon_scale,
        }
    }

    /// Where the emoji goes on a `canvas_width` x `canvas_height` canvas
    #[must_use]
    pub fn emoji_rect(&self, face: &NormalizedBox, canvas_width: u32, canvas_height: u32) -> PixelRect {
        let (cw, ch) = (f64::from(canvas_width), f64::from(canvas_height));
        let scaled_w = face.width * self.emoji_scale;
        let scaled_h = face.height * self.emoji_scale;
        let width = scaled_w * cw;
        let height = scaled_h * ch;

        PixelRect {
            x: (face.x_center - scaled_w / 2.0) * cw,
            y: (face.y_center - scaled_h / 2.0) * ch - height * self.emoji_y_offset,
            width,
            height,
        }
    }

    /// Square hand indicator centered on the wrist
    #[must_use]
    pub fn hand_rect(&self, wrist: Landmark, canvas_width: u32, canvas_height: u32) -> PixelRect {
        let (cw, ch) = (f64::from(canvas_width), f64::from(canvas_height));
        let size = cw * self.hand_icon_scale;

        PixelRect {
            x: wrist.x * cw - size / 2.0,
            y: wrist.y * ch - size / 2.0,
            width: size,
            height: size,
        }
    }

    /// Draw the emoji onto `canvas`. No-op without a face box or asset.
    pub fn draw_emoji(&self, canvas: &mut RgbaImage, face: Option<&NormalizedBox>, emoji: Option<&RgbaImage>) {
        if let (Some(face), Some(emoji)) = (face, emoji) {
            let rect = self.emoji_rect(face, canvas.width(), canvas.height());
            blit(canvas, emoji, rect);
        }
    }

    /// Draw the hand indicator onto `canvas`. No-op without a hand or asset.
    pub fn draw_hand(&self, canvas: &mut RgbaImage, hand: Option<&HandSample>, icon: Option<&RgbaImage>) {
        if let (Some(hand), Some(icon)) = (hand, icon) {
            let rect = self.hand_rect(hand.wrist(), canvas.width(), canvas.height());
            blit(canvas, icon, rect);
        }
    }

    /// Render a transparent overlay layer for the live view
    #[must_use]
    pub fn render_layer(
        &self,
        width: u32,
        height: u32,
        face: Option<&NormalizedBox>,
        emoji: Option<&RgbaImage>,
        hand: Option<&HandSample>,
        hand_icon: Option<&RgbaImage>,
    ) -> RgbaImage {
        let mut layer = RgbaImage::new(width, height);
        self.draw_emoji(&mut layer, face, emoji);
        self.draw_hand(&mut layer, hand, hand_icon);
        layer
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(&OverlayConfig::default())
    }
}

/// Resize `asset` to `rect` and alpha-blend it onto `canvas`
fn blit(canvas: &mut RgbaImage, asset: &RgbaImage, rect: PixelRect) {
    let max_w = f64_to_u32_clamp(f64::from(canvas.width()) * MAX_ASSET_CANVAS_RATIO, 1, u32::MAX);
    let max_h = f64_to_u32_clamp(f64::from(canvas.height()) * MAX_ASSET_CANVAS_RATIO, 1, u32::MAX);
    let width = f64_to_u32_clamp(rect.width, 0, max_w);
    let height = f64_to_u32_clamp(rect.height, 0, max_h);
    if width == 0 || height == 0 || asset.width() == 0 || asset.height() == 0 {
        return;
    }

    let resized = imageops::resize(asset, width, height, FilterType::Triangle);
    let x = f64_to_i64_clamp(rect.x, -i64::from(width), i64::from(canvas.width()));
    let y = f64_to_i64_clamp(rect.y, -i64::from(height), i64::from(canvas.height()));
    imageops::overlay(canvas, &resized, x, y);
}
