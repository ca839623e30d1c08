//! Box overlap helpers shared by detection backends.

use crate::shared::bounding_box::BoundingBox;

/// IoU between two boxes given as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy non-maximum suppression over scored boxes.
///
/// Highest score first; a box is dropped when its IoU with an already
/// kept box exceeds `iou_thresh`.
pub fn nms(mut scored: Vec<(BoundingBox, f64)>, iou_thresh: f64) -> Vec<(BoundingBox, f64)> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<(BoundingBox, f64)> = Vec::with_capacity(scored.len());
    for candidate in scored {
        let corners = candidate.0.corners();
        let dominated = keep
            .iter()
            .any(|(kept, _)| bbox_iou(&kept.corners(), &corners) > iou_thresh);
        if !dominated {
            keep.push(candidate);
        }
    }
    keep
}
