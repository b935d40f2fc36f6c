//! Watcher binary.
//!
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use axum::{routing::get, Extension, Router};
use cam_source::{open_camera, wait_until_ready, FrameSource, StillImageSource};
use clap::Parser;
use env_logger::TimestampPrecision;
use tokio::sync::broadcast;
use watcher::{
    endpoints::{healthcheck, overlay_stream},
    meter::spawn_meter_logger,
    provider::ModelProvider,
    render::OverlayRenderer,
    session::Session,
    ticker::{frame_slot, spawn_pipeline_worker, spawn_sampler, SAMPLING_PERIOD},
};

/// Attempts to get a first frame from the camera before giving up.
const READY_ATTEMPTS: usize = 50;

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Path or URL of the ONNX classification model
    #[clap(long, default_value = "models/model.onnx")]
    model: String,

    /// Path or URL of the metadata JSON holding the labels
    #[clap(long, default_value = "models/metadata.json")]
    metadata: String,

    /// Video device to capture from
    #[clap(long, default_value = "/dev/video0")]
    camera_device: String,

    /// Directory of images to use instead of the camera
    #[clap(long)]
    images_dir: Option<PathBuf>,

    /// Sampling period in milliseconds
    #[clap(long, default_value_t = SAMPLING_PERIOD.as_millis() as u64)]
    interval_ms: u64,

    /// Font used for the labels on the overlay instead of the built-in one
    #[clap(long)]
    font: Option<PathBuf>,

    /// Address to serve the overlay stream on
    #[clap(long, default_value = "127.0.0.1:3000")]
    server_address: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("watcher");
    let mut provider = ModelProvider::new(&args.model, &args.metadata, cache_dir);
    let resources = provider.load().await.context("startup failed")?;

    let mut source: Box<dyn FrameSource> = match &args.images_dir {
        Some(dir) => Box::new(StillImageSource::from_dir(dir)?),
        None => open_camera(&args.camera_device)?,
    };
    let (width, height) = wait_until_ready(source.as_mut(), READY_ATTEMPTS)?;
    log::info!("Frames are {}x{}", width, height);

    let renderer = OverlayRenderer::with_font_file(args.font.as_deref());
    let session = Session::new(resources, renderer);

    // Build the pipeline: sampler -> single-frame slot -> worker -> canvas broadcast
    let (canvas_tx, _) = broadcast::channel(4);
    let (slot, frame_rx) = frame_slot();
    spawn_pipeline_worker(session, frame_rx, canvas_tx.clone());
    spawn_sampler(source, Duration::from_millis(args.interval_ms), slot);

    spawn_meter_logger();

    // Build HTTP server with endpoints
    let app = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/stream", get(overlay_stream))
        .layer(Extension(canvas_tx));

    // Serve HTTP server
    let addr: SocketAddr = args.server_address.parse()?;
    log::info!("Serving overlay stream on http://{}/stream", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
