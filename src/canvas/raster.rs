use crate::canvas::types::GridPoint;

/// Bresenham line between two grid cells, inclusive of both endpoints.
/// Every consecutive pair of emitted cells is 8-adjacent, so strokes stay
/// gap-free no matter how far apart two pointer samples land.
pub fn line(p1: GridPoint, p2: GridPoint) -> Vec<GridPoint> {
    let mut points = Vec::new();

    let dx = (p2.x - p1.x).abs();
    let dy = (p2.y - p1.y).abs();

    let sign_x = if p1.x < p2.x { 1 } else { -1 };
    let sign_y = if p1.y < p2.y { 1 } else { -1 };

    let mut error = dx - dy;
    let mut x = p1.x;
    let mut y = p1.y;

    points.push(GridPoint::new(x, y));

    while x != p2.x || y != p2.y {
        let error2 = error * 2;

        if error2 > -dy {
            error -= dy;
            x += sign_x;
        }

        if error2 < dx {
            error += dx;
            y += sign_y;
        }

        points.push(GridPoint::new(x, y));
    }

    points
}

/// Expands each cell into a `width` x `width` block. Offsets run from
/// `-floor(w/2)` through `ceil(w/2) - 1` on each axis, so odd widths
/// center on the cell and even widths bias up-left by half a pixel.
pub fn thicken(points: &[GridPoint], width: u32) -> Vec<GridPoint> {
    if width <= 1 {
        return points.to_vec();
    }

    let lo = -((width / 2) as i64);
    let hi = (width as i64 + 1) / 2;

    let mut thickened = Vec::with_capacity(points.len() * (width as usize) * (width as usize));
    for point in points {
        for offset_x in lo..hi {
            for offset_y in lo..hi {
                thickened.push(GridPoint::new(point.x + offset_x, point.y + offset_y));
            }
        }
    }

    thickened
}

/// Drops every cell outside `[0, side)` on either axis. Drawing over an
/// edge clips instead of wrapping or erroring.
pub fn clip(points: Vec<GridPoint>, side: u32) -> Vec<(u32, u32)> {
    let side = side as i64;
    points
        .into_iter()
        .filter(|point| point.x >= 0 && point.x < side && point.y >= 0 && point.y < side)
        .map(|point| (point.x as u32, point.y as u32))
        .collect()
}

/// Full stroke pipeline: rasterize the segment, thicken it, clip it to the
/// canvas. The output order is the paint order (later writes win).
pub fn stroke_points(p1: GridPoint, p2: GridPoint, width: u32, side: u32) -> Vec<(u32, u32)> {
    clip(thicken(&line(p1, p2), width), side)
}
