/// A detected face, in pixels.
///
/// Detectors report boxes in frame space; [`DisplayMapping`] converts
/// them into the display space the oval guide lives in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from `(x1, y1, x2, y2)` corners.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Geometric center `(x + width / 2, y + height / 2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }
}

/// Scale from frame pixels to display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    scale_x: f64,
    scale_y: f64,
}

impl DisplayMapping {
    pub fn new(frame_width: u32, frame_height: u32, display_width: u32, display_height: u32) -> Self {
        let ratio = |display: u32, frame: u32| {
            if frame == 0 {
                1.0
            } else {
                display as f64 / frame as f64
            }
        };
        Self {
            scale_x: ratio(display_width, frame_width),
            scale_y: ratio(display_height, frame_height),
        }
    }

    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn to_display(&self, boxes: &[BoundingBox]) -> Vec<BoundingBox> {
        boxes
            .iter()
            .map(|b| b.scaled(self.scale_x, self.scale_y))
            .collect()
    }
}
