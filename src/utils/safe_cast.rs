//! Safe casting utilities for pixel geometry

use crate::{Error, Result};

/// Safely convert i32 to u32, rejecting negative values
///
/// # Errors
///
/// Returns an error if the value is negative
pub fn i32_to_u32(value: i32) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} cannot be a pixel dimension")))
}

/// Round, clamp and convert f64 to u32 for pixel sizes
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_sign_loss)] // Clamped to a non-negative range
pub fn f64_to_u32_clamp(value: f64, min: u32, max: u32) -> u32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as u32).clamp(min, max)
}

/// Round, clamp and convert f64 to i64 for pixel offsets
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_precision_loss)] // Bounds are approximate by nature
pub fn f64_to_i64_clamp(value: f64, min: i64, max: i64) -> i64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(min as f64, max as f64);
    (clamped as i64).clamp(min, max)
}
