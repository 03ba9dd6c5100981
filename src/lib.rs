pub mod canvas;
pub mod config;
pub mod error;
pub mod ledger;
pub mod session;
pub mod source;
pub mod utils;

pub use canvas::{
    buffer::{PixelBuffer, Rgb},
    types::GridPoint,
    viewport::Viewport,
};
pub use config::Config;
pub use error::{EngineError, Result};
pub use ledger::{DrawBatch, InMemoryLedger, LedgerClient, TransactionHandle};
pub use session::{CanvasSession, SessionMode, StrokeConfig};
pub use source::{ImageDecoder, ImageSource, PngDecoder, StaticImageSource};
