use ndarray::ArrayView3;

/// One decoded camera frame: packed RGB24 bytes, row-major.
///
/// `sequence` counts frames as the feed decoded them, so a tick can tell
/// whether it is looking at a fresh frame or the same one again.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    sequence: u64,
}

pub const RGB_CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// A uniformly filled frame.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * RGB_CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, RGB_CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Returns a copy stretched to `width` x `height`, aspect ratio ignored.
    ///
    /// Returns a plain clone when the size already matches.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let Some(img) = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
        else {
            return self.clone();
        };
        let scaled =
            image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Frame::new(scaled.into_raw(), width, height, self.sequence)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * RGB_CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Sets one pixel; coordinates outside the frame are ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * RGB_CHANNELS;
        self.data[i..i + RGB_CHANNELS].copy_from_slice(&rgb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.sequence(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_filled_sets_every_pixel() {
        let frame = Frame::filled(3, 2, [10, 20, 30]);
        assert_eq!(frame.data().len(), 18);
        assert_eq!(frame.pixel(2, 1), Some([10, 20, 30]));
    }

    #[test]
    fn test_as_ndarray_shape_is_height_width_channels() {
        let frame = Frame::filled(4, 2, [0, 0, 0]);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_resized_changes_dimensions_and_keeps_sequence() {
        let frame = Frame::new(vec![200u8; 8 * 4 * 3], 8, 4, 42);
        let scaled = frame.resized(16, 12);
        assert_eq!(scaled.width(), 16);
        assert_eq!(scaled.height(), 12);
        assert_eq!(scaled.sequence(), 42);
        assert_eq!(scaled.pixel(15, 11), Some([200, 200, 200]));
    }

    #[test]
    fn test_resized_same_size_is_identical() {
        let frame = Frame::filled(5, 5, [1, 2, 3]);
        let same = frame.resized(5, 5);
        assert_eq!(same.data(), frame.data());
    }

    #[test]
    fn test_put_pixel_ignores_out_of_bounds() {
        let mut frame = Frame::filled(2, 2, [0, 0, 0]);
        frame.put_pixel(-1, 0, [255, 0, 0]);
        frame.put_pixel(2, 1, [255, 0, 0]);
        frame.put_pixel(1, 1, [0, 255, 0]);
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(frame.pixel(1, 1), Some([0, 255, 0]));
        assert_eq!(frame.pixel(2, 2), None);
    }
}
