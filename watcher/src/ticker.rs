//! Fixed-interval sampling feeding a single pipeline worker.
//!
//! The sampler captures a frame every period and puts it into a slot holding one frame. A
//! frame the worker has not picked up yet is replaced by the newer one, so the worker always
//! gets the latest frame, pipeline runs never overlap and stale frames never pile up.
use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use cam_source::FrameSource;
use common::Frame;
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{
    as_jpeg_stream_item, encode_jpeg,
    meter::METER,
    session::{FrameOutcome, Session},
    CanvasSender,
};

/// Default sampling period.
pub const SAMPLING_PERIOD: Duration = Duration::from_millis(200);

const JPEG_QUALITY: u8 = 90;

/// Sampler end of the single-frame slot.
pub struct FrameSlot {
    tx: Arc<watch::Sender<Option<Frame>>>,
}

/// Worker end of the single-frame slot.
pub struct FrameReceiver {
    rx: watch::Receiver<Option<Frame>>,
    tx: Weak<watch::Sender<Option<Frame>>>,
}

/// Slot between sampler and worker.
pub fn frame_slot() -> (FrameSlot, FrameReceiver) {
    let (tx, rx) = watch::channel(None);
    let tx = Arc::new(tx);
    let receiver = FrameReceiver {
        rx,
        tx: Arc::downgrade(&tx),
    };
    (FrameSlot { tx }, receiver)
}

impl FrameSlot {
    /// Hand the newest frame to the worker, replacing a frame it has not taken yet.
    ///
    /// Returns `false` once the worker is gone.
    pub fn offer(&self, frame: Frame) -> bool {
        if self.tx.is_closed() {
            return false;
        }

        if self.tx.send_replace(Some(frame)).is_some() {
            METER.tick_dropped();
            log::debug!("Pipeline busy, replacing stale frame");
        }
        true
    }
}

impl FrameReceiver {
    /// Wait for a frame and take it out of the slot.
    ///
    /// Returns `None` once the sampler is gone.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            self.rx.changed().await.ok()?;
            let tx = self.tx.upgrade()?;

            let mut frame = None;
            // Taking the frame is not a new value, so receivers are not notified
            tx.send_if_modified(|slot| {
                frame = slot.take();
                false
            });

            if frame.is_some() {
                return frame;
            }
        }
    }
}

/// Spawn the sampler capturing a frame from `source` every `period`.
///
/// Captures run on the blocking pool since reading and decoding a frame blocks.
pub fn spawn_sampler<S>(mut source: S, period: Duration, slot: FrameSlot) -> JoinHandle<()>
where
    S: FrameSource + 'static,
{
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticks.tick().await;

            let captured = tokio::task::spawn_blocking(move || {
                let frame = source.capture();
                (source, frame)
            })
            .await;

            let frame = match captured {
                Ok((returned, frame)) => {
                    source = returned;
                    frame
                }
                Err(err) => {
                    log::error!("Capture task failed, stopping sampler: {err}");
                    break;
                }
            };

            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("Error capturing frame: {err}");
                    continue;
                }
            };
            METER.tick_sampled();

            if !slot.offer(frame) {
                log::info!("Pipeline worker stopped, stopping sampler");
                break;
            }
        }
    })
}

/// Spawn the worker running the pipeline on every frame taken from the slot.
///
/// Per-frame errors are logged and the frame is skipped. Rendered canvases are broadcast as
/// multipart stream items while anyone is listening.
pub fn spawn_pipeline_worker(
    mut session: Session,
    mut frame_rx: FrameReceiver,
    canvas_tx: CanvasSender,
) -> JoinHandle<Session> {
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || {
        while let Some(frame) = handle.block_on(frame_rx.next_frame()) {
            match session.process_frame(frame) {
                Ok(FrameOutcome::Dark) => METER.tick_dark(),
                Ok(FrameOutcome::Classified(report)) => {
                    METER.tick_infered();
                    if canvas_tx.receiver_count() == 0 {
                        continue;
                    }
                    match encode_jpeg(&report.canvas, JPEG_QUALITY) {
                        Ok(buf) => {
                            canvas_tx.send(as_jpeg_stream_item(&buf)).ok();
                        }
                        Err(err) => log::warn!("Error encoding canvas: {err}"),
                    }
                }
                Err(err) => log::error!("Skipping frame: {err}"),
            }
        }

        log::info!("Frame slot closed, stopping pipeline worker");
        session
    })
}
