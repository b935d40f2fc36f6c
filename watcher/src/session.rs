//! Detection session: the loaded model, its labels and the per-frame pipeline.
//!
//! A frame runs through gate, preprocessing, classification, filtering, rendering and the
//! co-occurrence check. Frame, input tensor and prediction are owned by the run and dropped
//! at the end of it, on early returns as well.
use common::{
    detection::{Detection, Prediction},
    labels::LabelTable,
    Error, Frame, Result,
};
use tract_onnx::prelude::Tensor;

use crate::{
    filter::{filter_predictions, MIN_CONFIDENCE},
    gate::{is_bright_enough, MIN_BRIGHTNESS},
    monitor::CoOccurrenceMonitor,
    nn::{preprocess, InferModel},
    provider::LoadedResources,
    render::OverlayRenderer,
};

/// Result of one pipeline run.
pub enum FrameOutcome {
    /// The frame was too dark and was not classified.
    Dark,
    Classified(FrameReport),
}

pub struct FrameReport {
    pub detections: Vec<Detection>,
    /// Both target labels were detected in this frame.
    pub co_occurrence: bool,
    /// Frame with the detections drawn on it.
    pub canvas: Frame,
}

pub struct Session {
    model: Option<Box<dyn InferModel>>,
    labels: LabelTable,
    renderer: OverlayRenderer,
    monitor: CoOccurrenceMonitor,
    min_brightness: f32,
    min_confidence: f32,
}

impl Session {
    pub fn new(resources: LoadedResources, renderer: OverlayRenderer) -> Self {
        Self::build(Some(resources.model), resources.labels, renderer)
    }

    /// Session whose model has not been loaded. Every classification fails.
    pub fn without_model(labels: LabelTable, renderer: OverlayRenderer) -> Self {
        Self::build(None, labels, renderer)
    }

    fn build(
        model: Option<Box<dyn InferModel>>,
        labels: LabelTable,
        renderer: OverlayRenderer,
    ) -> Self {
        Self {
            model,
            labels,
            renderer,
            monitor: CoOccurrenceMonitor::default(),
            min_brightness: MIN_BRIGHTNESS,
            min_confidence: MIN_CONFIDENCE,
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Forward pass on a preprocessed tensor.
    pub fn classify(&self, input: Tensor) -> Result<Prediction> {
        let model = self.model.as_ref().ok_or(Error::ModelNotReady)?;
        model.predict(input)
    }

    /// Run the whole pipeline on one frame.
    pub fn process_frame(&mut self, frame: Frame) -> Result<FrameOutcome> {
        if self.model.is_none() {
            return Err(Error::ModelNotReady);
        }

        if !is_bright_enough(&frame, self.min_brightness) {
            log::info!("Frame is too dark, skipping detection.");
            return Ok(FrameOutcome::Dark);
        }

        let prediction = self.classify(preprocess(&frame))?;
        let detections = filter_predictions(&prediction, &self.labels, self.min_confidence);
        log::debug!("Detected {:?}", detections);

        let canvas = self.renderer.render(&frame, &detections);
        let co_occurrence = self.monitor.observe(&detections);

        Ok(FrameOutcome::Classified(FrameReport {
            detections,
            co_occurrence,
            canvas,
        }))
    }
}
