use serde::{Deserialize, Serialize};

use crate::canvas::buffer::Rgb;

/// Where the session sits in its lifecycle. Drawing accumulates pending
/// edits; Submitting means one batch is in flight and blocks a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    ViewOnly,
    Drawing,
    Submitting,
}

/// Brush color and stroke width selected by the user's tool controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeConfig {
    pub color: Rgb,
    pub width: u32,
}

impl StrokeConfig {
    /// The palette the drawing controls present.
    pub const PALETTE: [Rgb; 8] = [
        Rgb::new(0, 0, 0),
        Rgb::new(255, 255, 255),
        Rgb::new(0, 158, 253),
        Rgb::new(0, 197, 3),
        Rgb::new(255, 198, 0),
        Rgb::new(255, 125, 0),
        Rgb::new(250, 0, 106),
        Rgb::new(196, 0, 199),
    ];
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            color: Self::PALETTE[0],
            width: 1,
        }
    }
}
