use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::{
    error::{EngineError, Result},
    source::ImageSource,
};

/// Serves a fixed byte blob as the authoritative image. Used by the
/// offline demo and tests; `set` swaps the blob to simulate the backend
/// catching up with confirmed edits.
#[derive(Debug, Default)]
pub struct StaticImageSource {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl StaticImageSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
        }
    }

    /// An empty source; fetches fail until `set` provides an image.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&self, bytes: Vec<u8>) {
        *self.bytes.lock().expect("image source mutex poisoned") = Some(bytes);
    }
}

impl ImageSource for StaticImageSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>> {
        Box::pin(async {
            self.bytes
                .lock()
                .expect("image source mutex poisoned")
                .clone()
                .ok_or_else(|| EngineError::FetchFailure("No image available yet".into()))
        })
    }
}
