use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Black-box face detection: a frame in, one box per face out.
///
/// Boxes are in the frame's own pixel space. `&mut self` because model
/// sessions need mutable access to run.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
