//! Smoothing filters for the detected face box.
//!
//! Raw detector boxes jitter from frame to frame; a filter turns them into a
//! stable anchor for the emoji overlay.

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::constants::{DEFAULT_SMOOTHING_ALPHA, SMOOTHING_ALPHA_MAX, SMOOTHING_ALPHA_MIN};
use crate::detection::NormalizedBox;
use crate::{Error, Result};

/// Trait for all face box filters
pub trait BoxFilter: Send + Sync {
    /// Feed a raw box and get the filtered one
    fn apply(&mut self, raw: NormalizedBox) -> NormalizedBox;

    /// Forget all history; the next sample initialises the filter
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes boxes through unchanged
pub struct NoFilter;

impl BoxFilter for NoFilter {
    fn apply(&mut self, raw: NormalizedBox) -> NormalizedBox {
        raw
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a filter from a spec such as `none`, `exponential` or `exponential:0.4`
pub fn create_filter(spec: &str) -> Result<Box<dyn BoxFilter>> {
    let spec = spec.to_lowercase();
    let mut parts = spec.split(':');
    let kind = parts.next().unwrap_or_default();
    let param = parts.next();
    if parts.next().is_some() {
        return Err(Error::FilterError(format!("Too many parameters in filter spec: {spec}")));
    }

    match kind {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "ema" => {
            let alpha = match param {
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|e| Error::FilterError(format!("Invalid alpha '{raw}': {e}")))?,
                None => DEFAULT_SMOOTHING_ALPHA,
            };
            if !(alpha > SMOOTHING_ALPHA_MIN && alpha <= SMOOTHING_ALPHA_MAX) {
                return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {spec}"))),
    }
}
