//! Confidence filtering of raw predictions.
use common::{detection::Detection, labels::LabelTable};

/// Minimum confidence for a class to count as detected.
pub const MIN_CONFIDENCE: f32 = 0.5;

/// Pair scores with their labels and keep those above `min_confidence`.
///
/// Classes are thresholded independently and the output keeps label order. Scores without a
/// label are dropped, so an empty label table yields no detections.
pub fn filter_predictions(
    prediction: &[f32],
    labels: &LabelTable,
    min_confidence: f32,
) -> Vec<Detection> {
    if prediction.len() != labels.len() {
        log::debug!(
            "Prediction has {} scores for {} labels",
            prediction.len(),
            labels.len()
        );
    }

    labels
        .iter()
        .zip(prediction.iter())
        .filter_map(|(label, &confidence)| match confidence {
            x if x > min_confidence => Some(Detection::new(label, confidence)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn labels(names: &[&str]) -> LabelTable {
        LabelTable::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn keeps_confident_classes_in_index_order() {
        let detections = filter_predictions(
            &[0.9, 0.2, 0.6],
            &labels(&["person", "car", "bottle"]),
            MIN_CONFIDENCE,
        );

        assert_eq!(
            detections,
            vec![Detection::new("person", 0.9), Detection::new("bottle", 0.6)]
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let detections =
            filter_predictions(&[0.5, 0.500001], &labels(&["cat", "dog"]), MIN_CONFIDENCE);
        assert_eq!(detections, vec![Detection::new("dog", 0.500001)]);
    }

    #[test]
    fn empty_label_table_detects_nothing() {
        let detections = filter_predictions(&[0.99, 0.98, 0.97], &labels(&[]), MIN_CONFIDENCE);
        assert!(detections.is_empty());
    }

    #[test]
    fn unlabeled_scores_are_dropped() {
        let detections = filter_predictions(&[0.1, 0.9, 0.95], &labels(&["a", "b"]), 0.5);
        assert_eq!(detections, vec![Detection::new("b", 0.9)]);
    }

    #[test]
    fn output_is_subset_above_threshold() {
        let table = labels(&["a", "b", "c", "d", "e", "f"]);
        let prediction = [0.51, 0.49, 1.0, 0.0, 0.75, 0.5];

        let detections = filter_predictions(&prediction, &table, MIN_CONFIDENCE);

        assert_eq!(detections.len(), 3);
        for (i, detection) in detections.iter().enumerate() {
            assert!(detection.confidence > MIN_CONFIDENCE);
            assert!(table.iter().any(|label| label == detection.label));
            assert!(detections[i + 1..]
                .iter()
                .all(|other| other.label != detection.label));
        }
    }
}
