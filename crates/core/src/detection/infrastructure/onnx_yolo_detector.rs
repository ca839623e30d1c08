/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Letterboxes the frame to the model's square input, runs inference,
/// and turns the surviving detections into frame-space boxes.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;
use super::math::nms;

/// Fallback input resolution when the model doesn't specify one.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Gray fill for letterbox padding (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Loads the model and reads its input size from the NCHW input shape.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!("Loaded {} (input {input_size}px)", model_path.display());

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }
        let mut letterboxed = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(std::mem::take(&mut letterboxed.tensor))?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let rows = decode_rows(data, shape[1], shape[2]);
        let scored = rows
            .into_iter()
            .filter(|row| row.len() >= 5 && row[4] as f64 >= self.confidence)
            .map(|row| {
                let b = letterboxed.unmap(row[0] as f64, row[1] as f64, row[2] as f64, row[3] as f64);
                (b, row[4] as f64)
            })
            .collect();

        Ok(nms(scored, NMS_IOU_THRESH)
            .into_iter()
            .map(|(b, _)| b)
            .collect())
    }
}

/// Splits the raw output into one feature row per candidate.
///
/// YOLO exports either `[1, features, candidates]` or the transpose;
/// the smaller axis is the feature axis.
fn decode_rows(data: &[f32], dim1: usize, dim2: usize) -> Vec<Vec<f32>> {
    let transposed = dim1 < dim2;
    let (candidates, features) = if transposed { (dim2, dim1) } else { (dim1, dim2) };

    (0..candidates)
        .map(|i| {
            if transposed {
                (0..features).map(|f| data[f * candidates + i]).collect()
            } else {
                data[i * features..(i + 1) * features].to_vec()
            }
        })
        .collect()
}

struct Letterboxed {
    tensor: ndarray::Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterboxed {
    /// Maps a `(cx, cy, w, h)` detection back to frame pixels.
    fn unmap(&self, cx: f64, cy: f64, w: f64, h: f64) -> BoundingBox {
        let px = self.pad_x as f64;
        let py = self.pad_y as f64;
        BoundingBox::from_corners(
            (cx - w / 2.0 - px) / self.scale,
            (cy - h / 2.0 - py) / self.scale,
            (cx + w / 2.0 - px) / self.scale,
            (cy + h / 2.0 - py) / self.scale,
        )
    }
}

/// Nearest-neighbour resize into a padded `target` x `target` NCHW tensor.
fn letterbox(frame: &Frame, target_size: u32) -> Letterboxed {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    Letterboxed {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}
