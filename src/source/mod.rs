use std::{io::Cursor, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    canvas::buffer::PixelBuffer,
    error::{EngineError, Result},
};

pub mod memory;

pub use memory::StaticImageSource;

/// Where the authoritative canvas image comes from. The engine never
/// speaks a transport itself; the host injects one.
pub trait ImageSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>>;
}

/// Turns fetched bytes into a pixel buffer. Injected so the core carries
/// no platform-specific image I/O and tests can use synthetic buffers.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;
}

/// Decodes the canvas PNG served by the image endpoint. Rejects images
/// that are not the configured square size.
#[derive(Debug, Clone, Copy)]
pub struct PngDecoder {
    expected_side: u32,
}

impl PngDecoder {
    pub fn new(expected_side: u32) -> Self {
        Self { expected_side }
    }
}

impl ImageDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::normalize_to_color8());

        let mut reader = decoder
            .read_info()
            .map_err(|e| EngineError::DecodeFailure(format!("PNG header error: {}", e)))?;

        let (width, height) = {
            let info = reader.info();
            (info.width, info.height)
        };

        if width != self.expected_side || height != self.expected_side {
            return Err(EngineError::CanvasSizeMismatch {
                expected: self.expected_side,
                actual: width.max(height),
            });
        }

        let pixel_count = (width as usize) * (height as usize);

        // 4 bytes per pixel is an upper bound for any normalized frame.
        let mut raw = vec![0u8; pixel_count * 4];
        let frame = reader
            .next_frame(&mut raw)
            .map_err(|e| EngineError::DecodeFailure(format!("PNG read error: {}", e)))?;

        let channels = match frame.color_type {
            png::ColorType::Rgba => 4,
            png::ColorType::Rgb => 3,
            other => {
                return Err(EngineError::DecodeFailure(format!(
                    "Unsupported PNG color type: {:?}",
                    other
                )));
            }
        };

        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for pixel in raw[..pixel_count * channels].chunks_exact(channels) {
            rgba.extend_from_slice(&pixel[..3]);
            rgba.push(255);
        }

        PixelBuffer::from_rgba(self.expected_side, rgba).ok_or_else(|| {
            EngineError::DecodeFailure("Decoded PNG has the wrong pixel count".into())
        })
    }
}

/// Fetches and decodes the authoritative image once.
pub async fn refresh_once(
    source: &dyn ImageSource,
    decoder: &dyn ImageDecoder,
) -> Result<PixelBuffer> {
    let bytes = source.fetch().await?;
    decoder.decode(&bytes)
}

/// Polls the image source on a fixed interval and publishes each fresh
/// buffer on the watch channel. Failures are logged and retried on the
/// next tick; the task stops once every receiver is gone. Refreshes only
/// ever replace the base layer - pending and optimistic state live in the
/// session and are untouched.
pub fn spawn_refresh_task(
    source: Arc<dyn ImageSource>,
    decoder: Arc<dyn ImageDecoder>,
    interval: Duration,
    sender: watch::Sender<PixelBuffer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match refresh_once(source.as_ref(), decoder.as_ref()).await {
                Ok(buffer) => {
                    if sender.send(buffer).is_err() {
                        tracing::debug!("All canvas watchers dropped, stopping refresh task");
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Canvas refresh failed, retrying next poll");
                }
            }
        }
    })
}
