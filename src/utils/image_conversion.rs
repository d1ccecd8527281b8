//! Conversion from OpenCV frames to `image` buffers.

use crate::utils::safe_cast::i32_to_u32;
use crate::{Error, Result};
use image::RgbaImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::imgproc;

/// Convert an 8-bit BGR camera frame to RGBA
///
/// # Errors
/// * Returns error if the Mat is empty or not 3-channel
/// * Returns error if color conversion fails
pub fn bgr_mat_to_rgba(mat: &Mat) -> Result<RgbaImage> {
    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();

    if rows <= 0 || cols <= 0 || channels != 3 {
        return Err(Error::InvalidInput(format!(
            "Invalid Mat dimensions: {rows}x{cols}x{channels}"
        )));
    }

    let mut rgba = Mat::default();
    imgproc::cvt_color(mat, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

    let width = i32_to_u32(rgba.cols())?;
    let height = i32_to_u32(rgba.rows())?;
    let data = rgba.data_bytes()?.to_vec();

    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| Error::InvalidInput(format!("Frame buffer does not match {width}x{height} RGBA")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1, CV_8UC3};

    #[test]
    fn test_bgr_to_rgba_swaps_channels() {
        let mat = Mat::new_rows_cols_with_default(4, 6, CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)).unwrap();
        let image = bgr_mat_to_rgba(&mat).unwrap();
        assert_eq!(image.dimensions(), (6, 4));
        assert_eq!(image.get_pixel(0, 0).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_rejects_single_channel() {
        let mat = Mat::new_rows_cols_with_default(4, 4, CV_8UC1, Scalar::all(0.0)).unwrap();
        assert!(bgr_mat_to_rgba(&mat).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(bgr_mat_to_rgba(&Mat::default()).is_err());
    }
}
