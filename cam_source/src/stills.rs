//! Directory of still images posing as a camera.
use std::path::{Path, PathBuf};

use common::{Error, Frame, Result};

use crate::FrameSource;

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Cycles over the images of a directory in file name order.
pub struct StillImageSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl StillImageSource {
    /// Collect all images in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|err| Error::CameraUnavailable(format!("{}: {err}", dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::CameraUnavailable(format!(
                "no images found in {}",
                dir.display()
            )));
        }

        log::info!("Using {} still images from {}", paths.len(), dir.display());

        Ok(Self { paths, next: 0 })
    }
}

impl FrameSource for StillImageSource {
    fn capture(&mut self) -> Result<Frame> {
        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();

        log::debug!("Reading {}", path.display());
        Ok(image::open(path)?.to_rgb8())
    }
}
