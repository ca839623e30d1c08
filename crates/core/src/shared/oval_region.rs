use thiserror::Error;

use super::bounding_box::BoundingBox;

#[derive(Error, Debug, PartialEq)]
pub enum OvalError {
    #[error("oval radii must be positive and finite, got {radius_x} x {radius_y}")]
    InvalidRadius { radius_x: f64, radius_y: f64 },
}

/// The oval guide a face has to sit in, in display pixels.
///
/// Fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OvalRegion {
    center_x: f64,
    center_y: f64,
    radius_x: f64,
    radius_y: f64,
}

impl OvalRegion {
    pub fn new(center_x: f64, center_y: f64, radius_x: f64, radius_y: f64) -> Result<Self, OvalError> {
        let valid = |r: f64| r.is_finite() && r > 0.0;
        if !valid(radius_x) || !valid(radius_y) {
            return Err(OvalError::InvalidRadius { radius_x, radius_y });
        }
        Ok(Self {
            center_x,
            center_y,
            radius_x,
            radius_y,
        })
    }

    /// Oval centered on a display of the given size.
    pub fn centered(
        display_width: u32,
        display_height: u32,
        radius_x: f64,
        radius_y: f64,
    ) -> Result<Self, OvalError> {
        Self::new(
            display_width as f64 / 2.0,
            display_height as f64 / 2.0,
            radius_x,
            radius_y,
        )
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.radius_x, self.radius_y)
    }

    /// `dx² / rx² + dy² / ry²` for a point; `<= 1` means inside.
    pub fn normalized_distance(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        (dx * dx) / (self.radius_x * self.radius_x) + (dy * dy) / (self.radius_y * self.radius_y)
    }

    /// Boundary inclusive.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.normalized_distance(x, y) <= 1.0
    }

    /// A box counts as inside when its center is.
    pub fn contains(&self, b: &BoundingBox) -> bool {
        let (cx, cy) = b.center();
        self.contains_point(cx, cy)
    }
}
