use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::oval_region::OvalRegion;

pub const OVAL_COLOR: [u8; 3] = [0, 0, 255];
pub const BOX_COLOR: [u8; 3] = [255, 0, 0];
pub const STROKE_WIDTH: u32 = 2;

/// Curve samples per stroke ring are capped at this multiple of the canvas
/// perimeter, so huge radii cost no more than a full-frame outline.
const MAX_SAMPLES_PER_PERIMETER_PX: usize = 4;

/// Paints precomputed guide pixels and the detection boxes into `frame`.
pub fn paint_overlay(frame: &mut Frame, guide: &[(u32, u32)], boxes: &[BoundingBox]) {
    paint_pixels(frame, guide, OVAL_COLOR);
    for b in boxes {
        paint_box_outline(frame, b, BOX_COLOR, STROKE_WIDTH);
    }
}

pub fn paint_pixels(frame: &mut Frame, pixels: &[(u32, u32)], rgb: [u8; 3]) {
    for &(x, y) in pixels {
        frame.put_pixel(x as i64, y as i64, rgb);
    }
}

/// Pixels of a `width` x `height` canvas covered by the oval outline,
/// stroked inward `stroke` pixels thick.
///
/// Samples the parametric curve densely enough that consecutive points
/// are under a pixel apart, up to the perimeter cap.
pub fn oval_outline_pixels(
    oval: &OvalRegion,
    width: u32,
    height: u32,
    stroke: u32,
) -> Vec<(u32, u32)> {
    let (cx, cy) = oval.center();
    let (rx, ry) = oval.radii();
    let cap = (2 * (width as usize + height as usize) * MAX_SAMPLES_PER_PERIMETER_PX).max(8);
    let steps = ((rx.max(ry) * std::f64::consts::TAU * 2.0).ceil() as usize).clamp(8, cap);

    let mut pixels = Vec::new();
    for t in 0..stroke {
        let inset = t as f64;
        let (ax, ay) = ((rx - inset).max(0.0), (ry - inset).max(0.0));
        for i in 0..steps {
            let theta = i as f64 / steps as f64 * std::f64::consts::TAU;
            let x = (cx + ax * theta.cos()).round();
            let y = (cy + ay * theta.sin()).round();
            if x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64 {
                pixels.push((x as u32, y as u32));
            }
        }
    }
    pixels.sort_unstable();
    pixels.dedup();
    pixels
}

/// Strokes a rectangle inward from the box edges, clipped to the frame.
pub fn paint_box_outline(frame: &mut Frame, b: &BoundingBox, rgb: [u8; 3], stroke: u32) {
    let x0 = b.x.round() as i64;
    let y0 = b.y.round() as i64;
    let x1 = (b.x + b.width).round() as i64 - 1;
    let y1 = (b.y + b.height).round() as i64 - 1;
    if x1 < x0 || y1 < y0 {
        return;
    }

    for t in 0..stroke as i64 {
        for x in x0..=x1 {
            frame.put_pixel(x, y0 + t, rgb);
            frame.put_pixel(x, y1 - t, rgb);
        }
        for y in y0..=y1 {
            frame.put_pixel(x0 + t, y, rgb);
            frame.put_pixel(x1 - t, y, rgb);
        }
    }
}
