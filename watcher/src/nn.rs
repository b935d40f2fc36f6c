//! Preprocessing and classification network.
//!
use std::path::Path;

use common::{detection::Prediction, Error, Frame, Result};
use ndarray::s;
use tract_onnx::prelude::*;

type NnModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Spatial input size of the network.
pub const INPUT_SIZE: u32 = 224;

/// Number of color channels of the network input.
pub const INPUT_CHANNELS: usize = 3;

/// A classification network producing one confidence per label index.
pub trait InferModel: Send {
    /// Run the forward pass on a preprocessed tensor.
    ///
    /// The input is consumed, so it is released as soon as the pass is done.
    fn predict(&self, input: Tensor) -> Result<Prediction>;
}

/// ONNX classifier run with tract.
///
/// Expects input `f32 [1, 224, 224, 3]` and yields scores of shape `[1, N]`.
pub struct TractClassifier {
    model: NnModel,
}

impl TractClassifier {
    /// Load and optimize the model at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = load_model(path).map_err(|err| Error::load(path.display().to_string(), err))?;
        Ok(Self { model })
    }
}

fn load_model(path: &Path) -> TractResult<NnModel> {
    let size = INPUT_SIZE as usize;
    let input_fact =
        InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, INPUT_CHANNELS));
    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, input_fact)?
        .into_optimized()?
        .into_runnable()
}

impl InferModel for TractClassifier {
    fn predict(&self, input: Tensor) -> Result<Prediction> {
        let raw_nn_out = self
            .model
            .run(tvec!(input.into()))
            .map_err(|err| Error::Inference(err.into()))?;

        let scores = raw_nn_out
            .first()
            .ok_or_else(|| Error::Inference("model produced no output".into()))?
            .to_array_view::<f32>()
            .map_err(|err| Error::Inference(err.into()))?;

        // Scores are either batched `[1, N]` or flat `[N]`
        let prediction = match scores.ndim() {
            2 => scores.slice(s![0, ..]).iter().copied().collect(),
            _ => scores.iter().copied().collect(),
        };

        Ok(prediction)
    }
}

/// Turn a frame into the network input.
///
/// Resizes to 224x224 with nearest-neighbor sampling, adds a batch dimension and scales
/// every channel value into `[0, 1]`. The result has shape `[1, 224, 224, 3]`.
pub fn preprocess(frame: &Frame) -> Tensor {
    let (width, height) = frame.dimensions();
    let size = INPUT_SIZE as usize;

    // Source pixel of output index `i` is `floor(i * src / 224)`, without corner alignment
    let nearest = |i: usize, src: u32| ((i as u64 * src as u64) / INPUT_SIZE as u64) as u32;

    tract_ndarray::Array4::from_shape_fn((1, size, size, INPUT_CHANNELS), |(_, y, x, c)| {
        frame[(nearest(x, width), nearest(y, height))][c] as f32 / 255.0
    })
    .into()
}
