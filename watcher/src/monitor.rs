//! Co-occurrence of two target classes within one frame.
use common::detection::Detection;

pub const PERSON: &str = "person";
pub const BOTTLE: &str = "bottle";

/// Reports frames in which two target labels are detected together.
///
/// Only the current frame is considered, there is no temporal window.
#[derive(Clone, Debug)]
pub struct CoOccurrenceMonitor {
    first: String,
    second: String,
}

impl Default for CoOccurrenceMonitor {
    fn default() -> Self {
        Self::new(PERSON, BOTTLE)
    }
}

impl CoOccurrenceMonitor {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Whether both targets are among the detections.
    pub fn matches(&self, detections: &[Detection]) -> bool {
        let has = |target: &str| detections.iter().any(|d| d.label == target);
        has(self.first.as_str()) && has(self.second.as_str())
    }

    /// Check the detections of a frame and log a notice if both targets are present.
    pub fn observe(&self, detections: &[Detection]) -> bool {
        let fired = self.matches(detections);
        if fired {
            log::info!(
                "{} and {} detected in the same frame.",
                self.first,
                self.second
            );
        }
        fired
    }
}
