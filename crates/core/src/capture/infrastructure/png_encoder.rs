use std::io::Cursor;

use crate::capture::domain::capture_sink::CaptureError;
use crate::shared::frame::Frame;

/// Encodes a frame as PNG bytes with the `image` crate.
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, CaptureError> {
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or(CaptureError::InvalidFrame {
            width: frame.width(),
            height: frame.height(),
        })?;

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}
