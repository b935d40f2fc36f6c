//! Frame sources feeding the detection pipeline.
//!
//! A source hands out owned RGB frames at its native resolution. Two kinds exist:
//! - `V4lCamera` (feature `v4l`) captures MJPG frames from a Linux video device.
//! - `StillImageSource` cycles over the images of a directory, e.g. for testing without a camera.
pub mod stills;
#[cfg(feature = "v4l")]
pub mod v4l;

use common::{Error, Frame, Result};

pub use stills::StillImageSource;
#[cfg(feature = "v4l")]
pub use v4l::V4lCamera;

/// Pull-based source of camera frames.
pub trait FrameSource: Send {
    /// Capture the current frame.
    fn capture(&mut self) -> Result<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture(&mut self) -> Result<Frame> {
        (**self).capture()
    }
}

/// Wait until the source delivers its first frame.
///
/// Gives up after `attempts` failed captures.
pub fn wait_until_ready(source: &mut dyn FrameSource, attempts: usize) -> Result<(u32, u32)> {
    let mut last_err = None;
    for attempt in 1..=attempts {
        match source.capture() {
            Ok(frame) => {
                log::info!("Camera stream started.");
                return Ok(frame.dimensions());
            }
            Err(err) => {
                log::debug!("Source not ready (attempt {attempt}/{attempts}): {err}");
                last_err = Some(err);
            }
        }
    }

    Err(Error::CameraUnavailable(match last_err {
        Some(err) => format!("no frame after {attempts} attempts: {err}"),
        None => "no capture attempted".into(),
    }))
}

/// Open the camera at `device_name` with the largest resolution it supports.
#[cfg(feature = "v4l")]
pub fn open_camera(device_name: &str) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(V4lCamera::open(device_name, "MJPG", None, None)?))
}

/// Camera support was not compiled in.
#[cfg(not(feature = "v4l"))]
pub fn open_camera(device_name: &str) -> Result<Box<dyn FrameSource>> {
    Err(Error::CameraUnavailable(format!(
        "cannot open {device_name}: built without the `v4l` feature"
    )))
}

#[cfg(test)]
mod test {
    use super::*;

    struct FlakySource {
        failures_left: usize,
    }

    impl FrameSource for FlakySource {
        fn capture(&mut self) -> Result<Frame> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(Error::CameraUnavailable("warming up".into()));
            }
            Ok(Frame::new(640, 480))
        }
    }

    #[test]
    fn ready_after_warm_up() {
        let mut source = FlakySource { failures_left: 2 };
        assert_eq!(wait_until_ready(&mut source, 3).unwrap(), (640, 480));
    }

    #[test]
    fn never_ready() {
        let mut source = FlakySource { failures_left: 5 };
        let err = wait_until_ready(&mut source, 3).unwrap_err();
        assert!(matches!(err, Error::CameraUnavailable(_)));
    }

    #[cfg(not(feature = "v4l"))]
    #[test]
    fn camera_requires_feature() {
        assert!(matches!(
            open_camera("/dev/video0"),
            Err(Error::CameraUnavailable(_))
        ));
    }
}
