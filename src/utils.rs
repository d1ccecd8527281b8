//! Numeric and image conversion helpers.

pub mod safe_cast;

#[cfg(feature = "camera")]
pub mod image_conversion;
