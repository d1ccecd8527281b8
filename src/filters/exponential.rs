use super::BoxFilter;
use crate::detection::NormalizedBox;

/// Exponential smoothing filter over all four box fields
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<NormalizedBox>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, last: None }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn blend(&self, raw: f64, previous: f64) -> f64 {
        self.alpha * raw + (1.0 - self.alpha) * previous
    }
}

impl BoxFilter for ExponentialFilter {
    fn apply(&mut self, raw: NormalizedBox) -> NormalizedBox {
        let filtered = match self.last {
            Some(last) => NormalizedBox {
                x_center: self.blend(raw.x_center, last.x_center),
                y_center: self.blend(raw.y_center, last.y_center),
                width: self.blend(raw.width, last.width),
                height: self.blend(raw.height, last.height),
            },
            None => raw,
        };

        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
