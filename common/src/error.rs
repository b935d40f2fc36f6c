//! Error types shared across the workspace.

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error of a failed load or inference.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model or metadata resource is unreachable or malformed.
    #[error("failed to load {resource}")]
    Load {
        resource: String,
        #[source]
        source: BoxedSource,
    },

    /// Camera access denied or no video source available.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Classifier invoked before a model was loaded.
    #[error("model not loaded")]
    ModelNotReady,

    /// Forward pass of the model failed.
    #[error("inference failed")]
    Inference(#[source] BoxedSource),

    /// Operation is not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Build a load error for `resource` from any error source.
    pub fn load(resource: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Error::Load {
            resource: resource.into(),
            source: source.into(),
        }
    }
}
