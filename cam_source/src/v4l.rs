//! V4L2 camera on a Linux machine.
//!
use common::{Error, Frame, Result};
use image::ImageFormat;
use rscam::{Camera, Config};

use crate::FrameSource;

/// Initialized camera delivering decoded MJPG frames.
pub struct V4lCamera {
    cam: Camera,
}

impl V4lCamera {
    /// Open and start a video device.
    ///
    /// Without an explicit `resolution` or `frame_rate`, the largest resolution and the
    /// highest frame rate supported for `format` are used.
    pub fn open(
        device_name: &str,
        format: &str,
        resolution: Option<(u32, u32)>,
        frame_rate: Option<(u32, u32)>,
    ) -> Result<Self> {
        let mut cam = Camera::new(device_name).map_err(|err| unavailable(device_name, err))?;
        log_supported_formats(&cam, format);
        let format = format.as_bytes();

        log::info!("Using camera {}", device_name);

        let resolution = resolution
            .map(Ok)
            .unwrap_or_else(|| get_max_resolution(&cam, format))
            .map_err(|err| unavailable(device_name, err))?;

        let frame_rate = frame_rate
            .map(Ok)
            .unwrap_or_else(|| get_max_frame_rate(&cam, format, resolution))
            .map_err(|err| unavailable(device_name, err))?;

        cam.start(&Config {
            interval: frame_rate,
            resolution,
            format,
            ..Default::default()
        })
        .map_err(|err| unavailable(device_name, err))?;

        Ok(Self { cam })
    }
}

impl FrameSource for V4lCamera {
    fn capture(&mut self) -> Result<Frame> {
        let raw = self.cam.capture()?;
        let frame = image::load_from_memory_with_format(&raw[..], ImageFormat::Jpeg)?;
        Ok(frame.to_rgb8())
    }
}

fn unavailable(device_name: &str, err: impl std::fmt::Display) -> Error {
    Error::CameraUnavailable(format!("{device_name}: {err}"))
}

/// Get the maximum supported resolution for the given format.
fn get_max_resolution(cam: &Camera, format: &[u8]) -> std::result::Result<(u32, u32), String> {
    let resolution_info = cam.resolutions(format).map_err(|err| err.to_string())?;
    log::debug!("Found resolutions: {:?}", &resolution_info);
    match resolution_info {
        rscam::ResolutionInfo::Discretes(resolutions) => resolutions
            .iter()
            // Highest resolution in terms of number of pixels
            .max_by_key(|res| res.0 * res.1)
            .copied(),
        rscam::ResolutionInfo::Stepwise { max, .. } => Some(max),
    }
    .ok_or_else(|| "no resolution found".to_owned())
}

/// Get the maximum supported frame rate for the given format and resolution.
fn get_max_frame_rate(
    cam: &Camera,
    format: &[u8],
    resolution: (u32, u32),
) -> std::result::Result<(u32, u32), String> {
    let interval_info = cam
        .intervals(format, resolution)
        .map_err(|err| err.to_string())?;
    log::debug!("Found frame rates: {:?}", &interval_info);
    match interval_info {
        // Intervals are (numerator, denominator) of the frame period in seconds
        rscam::IntervalInfo::Discretes(intervals) => intervals
            .iter()
            .max_by_key(|(numerator, denominator)| denominator / numerator.max(&1))
            .copied(),
        rscam::IntervalInfo::Stepwise { min, .. } => Some(min),
    }
    .ok_or_else(|| "no frame rate found".to_owned())
}

fn log_supported_formats(cam: &Camera, format: &str) {
    let formats: Vec<_> = cam.formats().filter_map(|fmt| fmt.ok()).collect();
    log::debug!(
        "Supported formats: {:?}, using format {:?}",
        formats,
        format
    );
}
