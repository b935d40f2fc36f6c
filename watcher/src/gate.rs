//! Brightness gate skipping near-black frames.
use common::Frame;

/// Minimum mean luminance for a frame to be classified.
pub const MIN_BRIGHTNESS: f32 = 0.1;

/// Mean of all channel intensities of all pixels, normalized to `[0, 1]`.
///
/// An empty frame has luminance zero.
pub fn mean_luminance(frame: &Frame) -> f32 {
    let raw = frame.as_raw();
    if raw.is_empty() {
        return 0.0;
    }

    let sum: u64 = raw.iter().map(|&v| v as u64).sum();
    (sum as f64 / (raw.len() as f64 * 255.0)) as f32
}

/// Whether the frame is bright enough to be worth classifying.
pub fn is_bright_enough(frame: &Frame, min_brightness: f32) -> bool {
    mean_luminance(frame) > min_brightness
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    fn scaled(frame: &Frame, k: f32) -> Frame {
        Frame::from_fn(frame.width(), frame.height(), |x, y| {
            let p = frame.get_pixel(x, y);
            Rgb(p.0.map(|v| (v as f32 * k).min(255.0) as u8))
        })
    }

    #[test]
    fn dark_frame_is_skipped() {
        // 0.05 * 255 = 12.75, so a mix of 12 and 13 averages to 0.05
        let frame = Frame::from_fn(4, 4, |x, _| {
            if x % 4 < 1 {
                Rgb([12, 12, 12])
            } else {
                Rgb([13, 13, 13])
            }
        });

        assert!((mean_luminance(&frame) - 0.05).abs() < 1e-6);
        assert!(!is_bright_enough(&frame, MIN_BRIGHTNESS));
    }

    #[test]
    fn threshold_is_exclusive() {
        let frame = Frame::from_pixel(8, 8, Rgb([51, 51, 51]));
        assert!((mean_luminance(&frame) - 0.2).abs() < 1e-6);
        assert!(is_bright_enough(&frame, 0.1));
        assert!(!is_bright_enough(&frame, 1.0));
    }

    #[test]
    fn channels_are_averaged() {
        let frame = Frame::from_pixel(3, 3, Rgb([255, 0, 0]));
        assert!((mean_luminance(&frame) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_frame_is_dark() {
        assert_eq!(mean_luminance(&Frame::new(0, 0)), 0.0);
        assert!(!is_bright_enough(&Frame::new(0, 0), MIN_BRIGHTNESS));
    }

    #[test]
    fn brighter_frame_passes_if_darker_does() {
        let base = Frame::from_fn(16, 16, |x, y| Rgb([(x * 3) as u8, (y * 2) as u8, 20]));

        for threshold in [0.02, 0.05, 0.1, 0.2, 0.5] {
            for k in [1.5, 2.0, 4.0, 10.0] {
                if is_bright_enough(&base, threshold) {
                    assert!(is_bright_enough(&scaled(&base, k), threshold));
                }
            }
        }
    }
}
