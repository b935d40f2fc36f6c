//! Per-frame classification results.

/// Confidence scores of one forward pass, one per label index.
pub type Prediction = Vec<f32>;

/// A label whose confidence cleared the threshold in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Text drawn next to the detection, e.g. `person: 90.00%`.
    pub fn caption(&self) -> String {
        format!("{}: {:.2}%", self.label, self.confidence * 100.0)
    }
}
