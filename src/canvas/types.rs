use serde::{Deserialize, Serialize};

/// One cell of the pixel grid. Signed because the coordinate mapper may
/// produce points left of or above the canvas origin; those are valid
/// values and get filtered before any buffer write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}
