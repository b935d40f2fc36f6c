//! Model provider loading the classifier and its label table once per session.
//!
//! Loading follows `Uninitialized -> Loading -> Ready | Failed`. Both end states are final,
//! a failed load is not retried.
use std::path::{Path, PathBuf};

use common::{labels::LabelTable, Error, Result};
use reqwest::Client;

use crate::{
    nn::{InferModel, TractClassifier},
    utils::fetch_resource,
};

/// Builds a model from a local model file.
pub type ModelLoader = fn(&Path) -> Result<Box<dyn InferModel>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// Everything a session needs from the provider.
pub struct LoadedResources {
    pub model: Box<dyn InferModel>,
    pub labels: LabelTable,
}

pub struct ModelProvider {
    model_location: String,
    metadata_location: String,
    cache_dir: PathBuf,
    loader: ModelLoader,
    state: LoadState,
}

fn load_tract_model(path: &Path) -> Result<Box<dyn InferModel>> {
    Ok(Box::new(TractClassifier::from_path(path)?))
}

impl ModelProvider {
    /// Provider for an ONNX model and a metadata document, each a path or URL.
    pub fn new(
        model_location: impl Into<String>,
        metadata_location: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::with_loader(model_location, metadata_location, cache_dir, load_tract_model)
    }

    pub fn with_loader(
        model_location: impl Into<String>,
        metadata_location: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
        loader: ModelLoader,
    ) -> Self {
        Self {
            model_location: model_location.into(),
            metadata_location: metadata_location.into(),
            cache_dir: cache_dir.into(),
            loader,
            state: LoadState::Uninitialized,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Load the model, then the labels.
    pub async fn load(&mut self) -> Result<LoadedResources> {
        if self.state != LoadState::Uninitialized {
            return Err(Error::InvalidState(format!(
                "model provider is {:?}, loading happens once",
                self.state
            )));
        }

        self.state = LoadState::Loading;
        match self.load_resources().await {
            Ok(resources) => {
                self.state = LoadState::Ready;
                Ok(resources)
            }
            Err(err) => {
                self.state = LoadState::Failed;
                Err(err)
            }
        }
    }

    async fn load_resources(&self) -> Result<LoadedResources> {
        let client = Client::new();

        log::info!("Loading model...");
        let model_path = fetch_resource(&client, &self.model_location, &self.cache_dir).await?;
        let loader = self.loader;
        let model = tokio::task::spawn_blocking(move || loader(&model_path))
            .await
            .map_err(|err| Error::load(&self.model_location, err))??;
        log::info!("Model loaded successfully.");

        log::info!("Loading metadata...");
        let metadata_path =
            fetch_resource(&client, &self.metadata_location, &self.cache_dir).await?;
        let labels = LabelTable::from_metadata_file(metadata_path)?;
        log::info!("Metadata loaded: {:?}", labels.iter().collect::<Vec<_>>());

        Ok(LoadedResources { model, labels })
    }
}

#[cfg(test)]
mod test {
    use common::detection::Prediction;
    use tract_onnx::prelude::Tensor;

    use super::*;

    struct ConstantModel;

    impl InferModel for ConstantModel {
        fn predict(&self, _input: Tensor) -> Result<Prediction> {
            Ok(vec![0.9, 0.1])
        }
    }

    fn load_constant_model(path: &Path) -> Result<Box<dyn InferModel>> {
        std::fs::metadata(path).map_err(|err| Error::load(path.display().to_string(), err))?;
        Ok(Box::new(ConstantModel))
    }

    #[tokio::test]
    async fn loads_model_then_labels() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let model = dir.path().join("model.onnx");
        let metadata = dir.path().join("metadata.json");
        std::fs::write(&model, b"onnx")?;
        std::fs::write(&metadata, br#"{"labels": ["person", "bottle"]}"#)?;

        let mut provider = ModelProvider::with_loader(
            model.display().to_string(),
            metadata.display().to_string(),
            dir.path(),
            load_constant_model,
        );
        assert_eq!(provider.state(), LoadState::Uninitialized);

        let resources = provider.load().await?;
        assert_eq!(provider.state(), LoadState::Ready);
        assert_eq!(resources.labels.iter().collect::<Vec<_>>(), ["person", "bottle"]);

        // Ready is final
        assert!(matches!(provider.load().await, Err(Error::InvalidState(_))));
        assert_eq!(provider.state(), LoadState::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn missing_labels_field_still_loads() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let model = dir.path().join("model.onnx");
        let metadata = dir.path().join("metadata.json");
        std::fs::write(&model, b"onnx")?;
        std::fs::write(&metadata, br#"{"modelName": "classifier"}"#)?;

        let mut provider = ModelProvider::with_loader(
            model.display().to_string(),
            metadata.display().to_string(),
            dir.path(),
            load_constant_model,
        );

        let resources = provider.load().await?;
        assert!(resources.labels.is_empty());
        assert_eq!(provider.state(), LoadState::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn failed_load_is_not_retried() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = ModelProvider::with_loader(
            dir.path().join("missing.onnx").display().to_string(),
            dir.path().join("metadata.json").display().to_string(),
            dir.path(),
            load_constant_model,
        );

        assert!(matches!(provider.load().await, Err(Error::Load { .. })));
        assert_eq!(provider.state(), LoadState::Failed);

        std::fs::write(dir.path().join("missing.onnx"), b"onnx")?;
        assert!(matches!(provider.load().await, Err(Error::InvalidState(_))));
        assert_eq!(provider.state(), LoadState::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_onnx_is_a_load_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let model = dir.path().join("model.onnx");
        std::fs::write(&model, b"definitely not protobuf")?;

        let mut provider = ModelProvider::new(
            model.display().to_string(),
            dir.path().join("metadata.json").display().to_string(),
            dir.path(),
        );

        assert!(matches!(provider.load().await, Err(Error::Load { .. })));
        assert_eq!(provider.state(), LoadState::Failed);

        Ok(())
    }
}
