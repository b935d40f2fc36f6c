//! Frame counters logged as rates.
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use tokio::{task::JoinHandle, time::interval};

pub static METER: Meter = Meter::new();

#[derive(Default)]
pub struct Meter {
    sampled_frames: AtomicU64,
    dropped_frames: AtomicU64,
    dark_frames: AtomicU64,
    infered_frames: AtomicU64,
}

/// Counter values since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeterReading {
    pub sampled: u64,
    pub dropped: u64,
    pub dark: u64,
    pub infered: u64,
}

impl Meter {
    pub const fn new() -> Meter {
        Meter {
            sampled_frames: AtomicU64::new(0),
            dropped_frames: AtomicU64::new(0),
            dark_frames: AtomicU64::new(0),
            infered_frames: AtomicU64::new(0),
        }
    }

    pub fn tick_sampled(&self) {
        self.sampled_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Frame dropped because the pipeline was still busy.
    pub fn tick_dropped(&self) {
        self.dropped_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_dark(&self) {
        self.dark_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_infered(&self) {
        self.infered_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_reset(&self) -> MeterReading {
        MeterReading {
            sampled: self.sampled_frames.swap(0, Ordering::Relaxed),
            dropped: self.dropped_frames.swap(0, Ordering::Relaxed),
            dark: self.dark_frames.swap(0, Ordering::Relaxed),
            infered: self.infered_frames.swap(0, Ordering::Relaxed),
        }
    }
}

pub fn spawn_meter_logger() -> JoinHandle<()> {
    tokio::spawn(async {
        let mut log_interval = interval(Duration::from_secs(2));
        log_interval.tick().await;

        loop {
            let start = Instant::now();
            log_interval.tick().await;

            let reading = METER.get_reset();
            let elapsed = start.elapsed().as_secs_f32();

            if reading.sampled > 0 {
                log::info!(
                    "Sampled frames per second: {:.2} ({} dropped while busy)",
                    reading.sampled as f32 / elapsed,
                    reading.dropped
                );
            }
            if reading.dark > 0 {
                log::info!("Dark frames per second: {:.2}", reading.dark as f32 / elapsed);
            }
            if reading.infered > 0 {
                log::info!(
                    "Infered frames per second: {:.2}",
                    reading.infered as f32 / elapsed
                );
            }
        }
    })
}
