//! Detection post-processing: box decode, NMS, ranking
//!
//! The network emits one row per candidate:
//! `[cx, cy, w, h, objectness, class scores...]` in network input
//! coordinates. Rows are confidence-filtered before any coordinate
//! math, rescaled per axis (the resize does not preserve aspect
//! ratio), clipped to the frame, deduplicated by greedy NMS and ranked
//! by (safety priority, confidence).

use serde::Serialize;

use super::labels::{object_type_for, priority_of, COCO_CLASSES};

/// Axis-aligned box in original-frame pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One surviving detection.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub label: String,
    pub object_type: String,
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

// ============================================================================
// BOX DECODE
// ============================================================================

/// Decode raw output rows into frame-space boxes, dropping rows below
/// `conf_threshold` and degenerate boxes after clipping.
pub fn decode_boxes(
    data: &[f32],
    shape: &[usize],
    net_size: (f32, f32),
    orig_size: (f32, f32),
    conf_threshold: f32,
) -> Vec<Detection> {
    let Some(&attrs) = shape.last() else {
        return Vec::new();
    };
    if attrs <= 5 || data.is_empty() {
        return Vec::new();
    }
    let num_classes = attrs - 5;
    let rows = data.len() / attrs;

    let (net_w, net_h) = net_size;
    let (orig_w, orig_h) = orig_size;
    // Aspect ratio is not assumed preserved: independent per-axis scale
    let scale_x = orig_w / net_w;
    let scale_y = orig_h / net_h;

    let mut detections = Vec::new();

    for row in 0..rows {
        let base = row * attrs;
        let objectness = data[base + 4];
        if objectness < conf_threshold {
            continue;
        }

        let mut best_class = 0usize;
        let mut best_score = 0.0f32;
        for class_id in 0..num_classes {
            let score = data[base + 5 + class_id];
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }

        let confidence = objectness * best_score;
        if confidence < conf_threshold {
            continue;
        }

        let cx = data[base];
        let cy = data[base + 1];
        let w = data[base + 2];
        let h = data[base + 3];

        // Corner coords in frame space, then clip to the frame
        let x1 = ((cx - w / 2.0) * scale_x).max(0.0);
        let y1 = ((cy - h / 2.0) * scale_y).max(0.0);
        let x2 = ((cx + w / 2.0) * scale_x).min(orig_w);
        let y2 = ((cy + h / 2.0) * scale_y).min(orig_h);

        let width = x2 - x1;
        let height = y2 - y1;
        if width <= 0.0 || height <= 0.0 {
            continue;
        }

        let label = COCO_CLASSES.get(best_class).copied().unwrap_or("unknown");
        detections.push(Detection {
            label: label.to_string(),
            object_type: object_type_for(label).to_string(),
            confidence,
            bbox: BoundingBox {
                x: x1,
                y: y1,
                width,
                height,
            },
        });
    }

    detections
}

// ============================================================================
// NON-MAX SUPPRESSION
// ============================================================================

/// Intersection-over-union; 0 when the union is empty.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.width * a.height + b.width * b.height - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Greedy NMS: accept the most confident remaining box, drop everything
/// overlapping it past `nms_threshold`, repeat.
pub fn non_max_suppression(mut detections: Vec<Detection>, nms_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut survivors: Vec<Detection> = Vec::new();
    for candidate in detections {
        if survivors
            .iter()
            .all(|kept| iou(&kept.bbox, &candidate.bbox) <= nms_threshold)
        {
            survivors.push(candidate);
        }
    }
    survivors
}

// ============================================================================
// RANKING
// ============================================================================

/// Order by (priority, confidence) descending. A low-confidence person
/// outranks a high-confidence obstacle: safety priority beats raw
/// confidence.
pub fn rank(mut detections: Vec<Detection>) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        priority_of(&b.object_type)
            .cmp(&priority_of(&a.object_type))
            .then(
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    detections
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, confidence: f32, x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection {
            label: label.to_string(),
            object_type: object_type_for(label).to_string(),
            confidence,
            bbox: BoundingBox {
                x,
                y,
                width: w,
                height: h,
            },
        }
    }

    /// One raw row with a single hot class score.
    fn row(cx: f32, cy: f32, w: f32, h: f32, obj: f32, class_id: usize, score: f32) -> Vec<f32> {
        let mut r = vec![cx, cy, w, h, obj];
        let mut classes = vec![0.0; 80];
        classes[class_id] = score;
        r.extend(classes);
        r
    }

    #[test]
    fn test_iou_disjoint_and_identical() {
        let a = BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = BoundingBox { x: 100.0, y: 100.0, width: 10.0, height: 10.0 };
        assert_eq!(iou(&a, &b), 0.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_zero_union() {
        let a = BoundingBox { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
        assert_eq!(iou(&a, &a), 0.0);
    }

    #[test]
    fn test_decode_filters_by_combined_confidence() {
        // objectness 0.9 but class score 0.3 -> combined 0.27 < 0.4
        let data = row(320.0, 320.0, 100.0, 100.0, 0.9, 0, 0.3);
        let dets = decode_boxes(&data, &[1, 1, 85], (640.0, 640.0), (640.0, 640.0), 0.4);
        assert!(dets.is_empty());

        let data = row(320.0, 320.0, 100.0, 100.0, 0.9, 0, 0.8);
        let dets = decode_boxes(&data, &[1, 1, 85], (640.0, 640.0), (640.0, 640.0), 0.4);
        assert_eq!(dets.len(), 1);
        assert!((dets[0].confidence - 0.72).abs() < 1e-6);
        assert_eq!(dets[0].label, "person");
    }

    #[test]
    fn test_decode_scales_each_axis_independently() {
        // 640x640 net, 1280x480 frame: x doubles, y shrinks
        let data = row(320.0, 320.0, 200.0, 200.0, 1.0, 2, 1.0);
        let dets = decode_boxes(&data, &[1, 1, 85], (640.0, 640.0), (1280.0, 480.0), 0.4);
        assert_eq!(dets.len(), 1);
        let b = dets[0].bbox;
        assert!((b.width - 400.0).abs() < 1e-3);
        assert!((b.height - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_discards_degenerate_after_clip() {
        // Box centered past the right edge clips to zero width
        let data = row(700.0, 320.0, 40.0, 40.0, 1.0, 0, 1.0);
        let dets = decode_boxes(&data, &[1, 1, 85], (640.0, 640.0), (640.0, 640.0), 0.4);
        assert!(dets.is_empty());
    }

    #[test]
    fn test_decode_clips_to_frame() {
        let data = row(10.0, 10.0, 100.0, 100.0, 1.0, 0, 1.0);
        let dets = decode_boxes(&data, &[1, 1, 85], (640.0, 640.0), (640.0, 640.0), 0.4);
        let b = dets[0].bbox;
        assert_eq!(b.x, 0.0);
        assert_eq!(b.y, 0.0);
        assert!(b.width > 0.0 && b.height > 0.0);
    }

    #[test]
    fn test_nms_suppresses_overlaps() {
        let dets = vec![
            det("chair", 0.9, 0.0, 0.0, 100.0, 100.0),
            det("chair", 0.8, 5.0, 5.0, 100.0, 100.0),
            det("person", 0.6, 400.0, 400.0, 50.0, 50.0),
        ];
        let survivors = non_max_suppression(dets, 0.45);
        assert_eq!(survivors.len(), 2);
        // pairwise IoU of survivors never exceeds the threshold
        for i in 0..survivors.len() {
            for j in (i + 1)..survivors.len() {
                assert!(iou(&survivors[i].bbox, &survivors[j].bbox) <= 0.45);
            }
        }
        // the top-confidence box always survives
        assert_eq!(survivors[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_keeps_distinct_boxes() {
        let dets = vec![
            det("chair", 0.9, 0.0, 0.0, 50.0, 50.0),
            det("person", 0.6, 300.0, 300.0, 50.0, 50.0),
        ];
        assert_eq!(non_max_suppression(dets, 0.45).len(), 2);
    }

    #[test]
    fn test_rank_priority_beats_confidence() {
        let ranked = rank(vec![
            det("chair", 0.95, 0.0, 0.0, 50.0, 50.0),
            det("person", 0.50, 100.0, 100.0, 50.0, 50.0),
        ]);
        assert_eq!(ranked[0].object_type, "person");
        assert_eq!(ranked[1].object_type, "obstacle");
    }

    #[test]
    fn test_rank_confidence_breaks_ties() {
        let ranked = rank(vec![
            det("chair", 0.5, 0.0, 0.0, 50.0, 50.0),
            det("bench", 0.7, 100.0, 100.0, 50.0, 50.0),
        ]);
        assert_eq!(ranked[0].label, "bench");
    }
}
