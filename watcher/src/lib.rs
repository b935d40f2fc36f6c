//! Watch a camera feed, classify sampled frames and overlay the detected labels.
//!
//! Frames flow through `gate` -> `nn` -> `filter` -> (`render`, `monitor`), driven by the
//! sampler and pipeline worker of `ticker`. Rendered canvases are served by `endpoints`.
pub mod endpoints;
pub mod filter;
pub mod gate;
pub mod meter;
pub mod monitor;
pub mod nn;
pub mod provider;
pub mod render;
pub mod session;
pub mod ticker;
pub mod utils;

use std::io::Cursor;

use bytes::Bytes;
use common::{Frame, Result};
use image::{codecs::jpeg::JpegEncoder, ColorType};
use tokio::sync::broadcast;

/// Broadcasts multipart items of rendered canvases to HTTP viewers.
pub type CanvasSender = broadcast::Sender<Bytes>;

/// Wrap JPEG data as one part of a `multipart/x-mixed-replace` stream.
pub fn as_jpeg_stream_item(data: &[u8]) -> Bytes {
    Bytes::copy_from_slice(
        &[
            "--frame\r\nContent-Type: image/jpeg\r\n\r\n".as_bytes(),
            data,
            "\r\n\r\n".as_bytes(),
        ]
        .concat(),
    )
}

/// Encode a canvas as JPEG.
pub fn encode_jpeg(canvas: &Frame, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let (width, height) = canvas.dimensions();
    JpegEncoder::new_with_quality(&mut buf, quality).encode(
        canvas.as_raw(),
        width,
        height,
        ColorType::Rgb8,
    )?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn stream_item_has_part_header() {
        let item = as_jpeg_stream_item(&[0xff, 0xd8, 0xff, 0xd9]);
        assert!(item.starts_with(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n"));
        assert!(item.ends_with(b"\xff\xd8\xff\xd9\r\n\r\n"));
    }

    #[test]
    fn canvas_encodes_as_jpeg() -> Result<()> {
        let canvas = Frame::from_pixel(64, 48, Rgb([10, 200, 30]));
        let jpeg = encode_jpeg(&canvas, 95)?;

        let decoded = image::load_from_memory(&jpeg)?.to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 48));

        Ok(())
    }
}
