use std::io::Cursor;

use crate::{
    canvas::{buffer::PixelBuffer, optimistic::OptimisticUpdate, pending::PendingEdits},
    error::{EngineError, Result},
};

/// Merges the three layers into one renderable image:
/// 1. the authoritative buffer,
/// 2. optimistic patches oldest-first, so a newer confirmed edit of the
///    same pixel wins,
/// 3. pending edits last, so in-progress work always shows on top.
///
/// Pure function of its inputs; the session re-runs it whenever any layer
/// changes.
pub fn composite(
    base: &PixelBuffer,
    optimistic_updates: &[OptimisticUpdate],
    pending: &PendingEdits,
) -> PixelBuffer {
    let mut merged = base.clone();

    for update in optimistic_updates {
        for (&(x, y), &color) in &update.image_patch {
            merged.set(x, y, color);
        }
    }

    for ((x, y), color) in pending.iter() {
        merged.set(x, y, color);
    }

    merged
}

/// Re-encodes a composited frame as a PNG for whatever surface renders it.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(Cursor::new(&mut png_data), buffer.side(), buffer.side());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| EngineError::Internal(format!("PNG header error: {}", e)))?;
        writer
            .write_image_data(buffer.as_rgba())
            .map_err(|e| EngineError::Internal(format!("PNG write error: {}", e)))?;
    }

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{buffer::Rgb, optimistic::OptimisticUpdate, pending::ImagePatch};

    #[test]
    fn compositing_without_overlays_is_identity() {
        let mut base = PixelBuffer::blank(8);
        base.set(2, 5, Rgb::new(9, 9, 9));

        let merged = composite(&base, &[], &PendingEdits::new());

        assert_eq!(merged, base);
    }

    #[test]
    fn pending_wins_over_optimistic_wins_over_base() {
        let red = Rgb::new(255, 0, 0);
        let green = Rgb::new(0, 255, 0);
        let blue = Rgb::new(0, 0, 255);

        let mut base = PixelBuffer::blank(4);
        base.set(1, 1, red);

        let mut image_patch = ImagePatch::new();
        image_patch.insert((1, 1), green);
        let optimistic = vec![OptimisticUpdate {
            image_patch,
            committed_at_ms: 0,
        }];

        let mut pending = PendingEdits::new();
        pending.insert(1, 1, blue);

        let merged = composite(&base, &optimistic, &pending);
        assert_eq!(merged.get(1, 1), Some(blue));

        // Drop the pending layer and the optimistic color shows through.
        let merged = composite(&base, &optimistic, &PendingEdits::new());
        assert_eq!(merged.get(1, 1), Some(green));

        // Untouched pixels keep the authoritative color.
        assert_eq!(merged.get(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn newer_optimistic_patch_wins_over_older() {
        let base = PixelBuffer::blank(4);

        let mut older = ImagePatch::new();
        older.insert((2, 2), Rgb::new(10, 10, 10));
        let mut newer = ImagePatch::new();
        newer.insert((2, 2), Rgb::new(20, 20, 20));

        let updates = vec![
            OptimisticUpdate {
                image_patch: older,
                committed_at_ms: 100,
            },
            OptimisticUpdate {
                image_patch: newer,
                committed_at_ms: 200,
            },
        ];

        let merged = composite(&base, &updates, &PendingEdits::new());
        assert_eq!(merged.get(2, 2), Some(Rgb::new(20, 20, 20)));
    }

    #[test]
    fn encode_png_produces_a_png_stream() {
        let buffer = PixelBuffer::blank(4);
        let data = encode_png(&buffer).unwrap();
        assert_eq!(&data[1..4], b"PNG");
    }
}
