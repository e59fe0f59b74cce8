//! BlazeFace (short-range) face detector on ONNX Runtime.
//!
//! For callers that ship their own model file. The frame is stretched to the
//! 128×128 model input; boxes come back in anchor order after suppression,
//! which keeps tie-breaking between equal faces stable across frames.
use std::path::Path;

use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::execution_provider::open_session;

const INPUT_SIZE: u32 = 128;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

/// 16×16 cells × 2 anchors + 8×8 cells × 6 anchors.
const ANCHOR_COUNT: usize = 896;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const SUPPRESSION_IOU: f32 = 0.3;

pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    min_score: f32,
    params: DetectionParams,
    anchors: Vec<Anchor>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    cx: f32,
    cy: f32,
}

/// Decoded box in normalized `[0, 1]` corner coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    anchor: usize,
    score: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn iou(&self, other: &Candidate) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = w * h;
        if inter <= 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }

    fn to_face_box(self, frame_w: u32, frame_h: u32) -> FaceBox {
        let (fw, fh) = (frame_w as f32, frame_h as f32);
        FaceBox::from_corners(
            (self.x1 * fw).round() as i32,
            (self.y1 * fh).round() as i32,
            (self.x2 * fw).round() as i32,
            (self.y2 * fh).round() as i32,
        )
    }
}

impl OnnxBlazefaceDetector {
    /// `confidence` is the minimum sigmoid score, in `[0, 1]`.
    pub fn new(
        model_path: &Path,
        confidence: f64,
        params: DetectionParams,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
            min_score: confidence as f32,
            params,
            anchors: short_range_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let input = ort::value::Tensor::from_array(model_input(frame)?)?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() < 2 {
            return Err(format!("BlazeFace model returned {} outputs, expected 2", outputs.len()).into());
        }

        // [1, 896, 16] regressors, [1, 896, 1] logits
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let logits = outputs[1].try_extract_array::<f32>()?;
        let regressors = regressors.as_slice().ok_or("regressor tensor is not contiguous")?;
        let logits = logits.as_slice().ok_or("score tensor is not contiguous")?;

        let candidates = decode(&self.anchors, regressors, logits, self.min_score);
        let boxes = suppress(candidates, SUPPRESSION_IOU)
            .into_iter()
            .map(|c| c.to_face_box(frame.width(), frame.height()))
            .collect();

        Ok(self.params.sanitize(boxes, frame.width(), frame.height()))
    }
}

/// Stretches the frame to the model input, NCHW in `[-1, 1]`.
fn model_input(frame: &Frame) -> Result<Array4<f32>, Box<dyn std::error::Error>> {
    let rgb = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("frame is not 3-channel RGB")?;
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let s = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, s, s));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 127.5 - 1.0;
        }
    }
    Ok(tensor)
}

fn short_range_anchors() -> Vec<Anchor> {
    let mut anchors = Vec::with_capacity(ANCHOR_COUNT);
    for (stride, per_cell) in [(8u32, 2usize), (16, 6)] {
        let cells = INPUT_SIZE / stride;
        for row in 0..cells {
            for col in 0..cells {
                let anchor = Anchor {
                    cx: (col as f32 + 0.5) / cells as f32,
                    cy: (row as f32 + 0.5) / cells as f32,
                };
                anchors.extend(std::iter::repeat(anchor).take(per_cell));
            }
        }
    }
    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Anchor-relative regressions → normalized corner boxes above `min_score`.
fn decode(anchors: &[Anchor], regressors: &[f32], logits: &[f32], min_score: f32) -> Vec<Candidate> {
    let scale = INPUT_SIZE as f32;
    anchors
        .iter()
        .zip(logits)
        .zip(regressors.chunks_exact(REGRESSOR_STRIDE))
        .enumerate()
        .filter_map(|(i, ((anchor, &logit), reg))| {
            let score = sigmoid(logit.clamp(-100.0, 100.0));
            if score < min_score {
                return None;
            }
            let cx = anchor.cx + reg[0] / scale;
            let cy = anchor.cy + reg[1] / scale;
            let (half_w, half_h) = (reg[2] / scale / 2.0, reg[3] / scale / 2.0);
            Some(Candidate {
                anchor: i,
                score,
                x1: (cx - half_w).clamp(0.0, 1.0),
                y1: (cy - half_h).clamp(0.0, 1.0),
                x2: (cx + half_w).clamp(0.0, 1.0),
                y2: (cy + half_h).clamp(0.0, 1.0),
            })
        })
        .collect()
}

/// Greedy non-maximum suppression by score; survivors are returned in
/// anchor order.
fn suppress(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|c| c.anchor);
    kept
}
