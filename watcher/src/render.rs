//! Overlay of detections on the frame.
//!
//! This is a whole-frame classifier, so there is no localization to draw. Each detection gets
//! a rectangle from `illustrative_geometry`, which is random placeholder geometry and does NOT
//! enclose the detected object.
use std::path::Path;

use common::{detection::Detection, Frame};
use image::Rgb;
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};
use lazy_static::lazy_static;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rusttype::{Font, Scale};

pub const BOX_WIDTH: u32 = 100;
pub const BOX_HEIGHT: u32 = 50;
pub const FONT_SIZE: f32 = 16.0;

const COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Placeholder box for a detection.
///
/// The top-left corner is drawn uniformly from the frame, the size is fixed. The position
/// carries no information about where the object is.
pub fn illustrative_geometry<R: Rng>(rng: &mut R, width: u32, height: u32) -> Rect {
    let x = rng.random_range(0..width.max(1));
    let y = rng.random_range(0..height.max(1));
    Rect::at(x as i32, y as i32).of_size(BOX_WIDTH, BOX_HEIGHT)
}

/// Baseline of the caption: above the box if it fits on the canvas, below the top edge otherwise.
pub fn caption_baseline(box_top: i32) -> i32 {
    if box_top > 20 {
        box_top - 5
    } else {
        box_top + 15
    }
}

/// Draws frames with their detections onto a canvas.
pub struct OverlayRenderer {
    font: Option<Font<'static>>,
    rng: StdRng,
}

impl OverlayRenderer {
    pub fn new(font: Option<Font<'static>>, rng: StdRng) -> Self {
        Self { font, rng }
    }

    /// Renderer with captions in the font at `path`, or in the built-in font without a path.
    ///
    /// Falls back to the built-in font if the file cannot be loaded.
    pub fn with_font_file(path: Option<&Path>) -> Self {
        let font = match path {
            None => DEJAVU_MONO.clone(),
            Some(path) => match std::fs::read(path).ok().and_then(Font::try_from_vec) {
                Some(font) => font,
                None => {
                    log::warn!(
                        "Could not load font {}, using the built-in font",
                        path.display()
                    );
                    DEJAVU_MONO.clone()
                }
            },
        };
        Self::new(Some(font), StdRng::from_os_rng())
    }

    /// Renderer without captions and a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(None, StdRng::seed_from_u64(seed))
    }

    /// Draw the frame at its native resolution with one box and caption per detection.
    pub fn render(&mut self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut canvas = frame.clone();
        let (width, height) = canvas.dimensions();

        for detection in detections {
            let rect = illustrative_geometry(&mut self.rng, width, height);
            self.draw_detection(&mut canvas, rect, detection);
        }

        canvas
    }

    fn draw_detection(&self, canvas: &mut Frame, rect: Rect, detection: &Detection) {
        // 2px stroke
        draw_hollow_rect_mut(canvas, rect, COLOR);
        draw_hollow_rect_mut(
            canvas,
            Rect::at(rect.left() + 1, rect.top() + 1).of_size(BOX_WIDTH - 2, BOX_HEIGHT - 2),
            COLOR,
        );

        if let Some(font) = &self.font {
            let caption = detection.caption();
            draw_text_mut(
                canvas,
                COLOR,
                rect.left(),
                caption_baseline(rect.top()) - FONT_SIZE as i32,
                Scale::uniform(FONT_SIZE),
                font,
                &caption,
            );
        }
    }
}

lazy_static! {
    static ref DEJAVU_MONO: Font<'static> = {
        let font_data: &[u8] = include_bytes!("../../resources/DejaVuSansMono.ttf");
        Font::try_from_bytes(font_data).expect("failed to load font")
    };
}
