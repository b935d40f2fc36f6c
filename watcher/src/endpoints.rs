//! Endpoints of HTTP server.
//!
use axum::{body::StreamBody, http::header, response::IntoResponse, Extension};
use futures::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::CanvasSender;

/// Health check endpoint.
pub async fn healthcheck() -> &'static str {
    "healthy"
}

/// Stream of rendered overlay canvases.
pub async fn overlay_stream(Extension(canvas_tx): Extension<CanvasSender>) -> impl IntoResponse {
    log::info!("Overlay stream requested");

    // Viewers lagging behind skip the canvases they missed
    let stream = BroadcastStream::new(canvas_tx.subscribe())
        .filter_map(|item| futures::future::ready(item.ok()))
        .map(Ok::<_, std::convert::Infallible>);

    // Set body and headers for multipart streaming
    let body = StreamBody::new(stream);
    let headers = [(
        header::CONTENT_TYPE,
        "multipart/x-mixed-replace; boundary=frame",
    )];

    (headers, body)
}
