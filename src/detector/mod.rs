//! Object Detector - camera frame pipeline
//!
//! Per-request state machine:
//! `Decode → Preprocess → Infer → DecodeBoxes → Filter → Suppress →
//! Rank → Respond`. Any stage failure short-circuits to a terminal
//! no-detection response carrying a diagnostic message; nothing raises
//! past the pipeline boundary.

mod labels;
mod postprocess;

pub use labels::{object_type_for, priority_of, COCO_CLASSES};
pub use postprocess::{decode_boxes, iou, non_max_suppression, rank, BoundingBox, Detection};

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::RgbImage;
use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_NMS_THRESHOLD, DETECTOR_INPUT_SIZE, DETECTOR_MODEL,
};
use crate::error::FrameError;
use crate::registry::ModelRegistry;

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FrameRequest {
    /// Base64-encoded JPEG or PNG frame
    pub image_base64: String,
    pub confidence_threshold: Option<f32>,
    pub nms_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameResponse {
    pub detected: bool,
    pub object_type: String,
    pub raw_label: Option<String>,
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bbox: Option<BoundingBox>,
    pub all_detections: Vec<Detection>,
    pub message: String,
}

impl FrameResponse {
    /// Terminal no-detection response.
    fn none(message: impl Into<String>) -> Self {
        Self {
            detected: false,
            object_type: "none".to_string(),
            raw_label: None,
            confidence: 0.0,
            bbox: None,
            all_detections: Vec::new(),
            message: message.into(),
        }
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

pub struct ObjectDetector {
    registry: Arc<ModelRegistry>,
    input_size: u32,
}

impl ObjectDetector {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            input_size: DETECTOR_INPUT_SIZE,
        }
    }

    /// Run the full pipeline. Never fails: stage errors become a
    /// terminal no-detection response.
    pub fn detect(&self, request: &FrameRequest) -> FrameResponse {
        match self.run_pipeline(request) {
            Ok(response) => response,
            Err(e) => {
                log::debug!("frame pipeline terminated: {}", e);
                FrameResponse::none(e.to_string())
            }
        }
    }

    fn run_pipeline(&self, request: &FrameRequest) -> Result<FrameResponse, FrameError> {
        let conf_threshold = request
            .confidence_threshold
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        let nms_threshold = request.nms_threshold.unwrap_or(DEFAULT_NMS_THRESHOLD);

        // Decode
        let bytes = BASE64.decode(request.image_base64.trim())?;
        let frame = image::load_from_memory(&bytes)
            .map_err(|e| FrameError::Decode(e.to_string()))?
            .to_rgb8();
        let (orig_w, orig_h) = frame.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Err(FrameError::EmptyImage);
        }

        // The detection network is a registry artifact like any other
        let bundle = self
            .registry
            .get(DETECTOR_MODEL)
            .ok_or(FrameError::NoModel)?;

        // Preprocess + Infer
        let input = self.preprocess(&frame);
        let (shape, data) = bundle.estimator().infer_image(input)?;

        // DecodeBoxes + Filter
        let net = (self.input_size as f32, self.input_size as f32);
        let candidates = decode_boxes(
            &data,
            &shape,
            net,
            (orig_w as f32, orig_h as f32),
            conf_threshold,
        );
        if candidates.is_empty() {
            return Ok(FrameResponse::none("no objects above confidence threshold"));
        }

        // Suppress + Rank
        let survivors = non_max_suppression(candidates, nms_threshold);
        let ranked = rank(survivors);

        // Respond: the best-ranked detection drives downstream danger
        // logic even when it is not the most confident one
        let best = &ranked[0];
        Ok(FrameResponse {
            detected: true,
            object_type: best.object_type.clone(),
            raw_label: Some(best.label.clone()),
            confidence: best.confidence,
            bbox: Some(best.bbox),
            message: format!(
                "detected {} ({:.2}), {} object(s) in frame",
                best.object_type,
                best.confidence,
                ranked.len()
            ),
            all_detections: ranked,
        })
    }

    /// Resize to the network resolution, RGB channel order, NCHW float
    /// tensor. Math stays in f32 throughout; the [0,1] normalization is
    /// the last step per channel value.
    fn preprocess(&self, frame: &RgbImage) -> Array4<f32> {
        let size = self.input_size;
        let resized = image::imageops::resize(
            frame,
            size,
            size,
            image::imageops::FilterType::Triangle,
        );

        let mut input = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
        input
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    fn detector() -> (tempfile::TempDir, ObjectDetector) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::new(dir.path()));
        (dir, ObjectDetector::new(registry))
    }

    fn png_base64(width: u32, height: u32) -> String {
        let img = RgbImage::new(width, height);
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        BASE64.encode(&buf)
    }

    #[test]
    fn test_bad_base64_is_terminal_not_fatal() {
        let (_dir, detector) = detector();
        let response = detector.detect(&FrameRequest {
            image_base64: "!!!not base64!!!".to_string(),
            confidence_threshold: None,
            nms_threshold: None,
        });
        assert!(!response.detected);
        assert_eq!(response.object_type, "none");
        assert!(response.bbox.is_none());
        assert!(response.message.contains("base64"));
    }

    #[test]
    fn test_undecodable_image_is_terminal() {
        let (_dir, detector) = detector();
        let response = detector.detect(&FrameRequest {
            image_base64: BASE64.encode(b"definitely not a png"),
            confidence_threshold: None,
            nms_threshold: None,
        });
        assert!(!response.detected);
        assert!(response.all_detections.is_empty());
    }

    #[test]
    fn test_missing_detector_artifact_is_terminal() {
        let (_dir, detector) = detector();
        let response = detector.detect(&FrameRequest {
            image_base64: png_base64(32, 32),
            confidence_threshold: None,
            nms_threshold: None,
        });
        assert!(!response.detected);
        assert!(response.message.contains("no detection model"));
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let (_dir, detector) = detector();
        let mut img = RgbImage::new(8, 8);
        img.put_pixel(0, 0, image::Rgb([255, 128, 0]));
        let input = detector.preprocess(&img);
        assert_eq!(input.shape(), &[1, 3, 640, 640]);
        for &v in input.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
