use anyhow::{Result, bail};
use ndarray::ArrayViewD;

use super::ClassLabels;
use super::preprocessing::INPUT_SIZE;
use crate::models::{BoundingBox, Detection};

/// Model-default postprocessing thresholds. These mirror what the upstream
/// pretrained runtime applies inside its own inference call; nothing
/// downstream filters detections further.
pub const CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const IOU_THRESHOLD: f32 = 0.45;

struct Candidate {
    class_id: usize,
    confidence: f32,
    bbox: BoundingBox,
}

/// Decode a YOLOv8-style `[1, 4+nc, anchors]` output tensor into detections
/// in original-image coordinates.
///
/// Survivors of the model-default confidence/NMS pass are returned in the
/// model's native anchor order, not score-sorted.
pub fn decode_predictions(
    output: ArrayViewD<'_, f32>,
    orig_w: u32,
    orig_h: u32,
    labels: &ClassLabels,
) -> Result<Vec<Detection>> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
        bail!("Unexpected model output shape: {:?}", shape);
    }

    let num_channels = shape[1];
    let num_anchors = shape[2];
    let single_class = num_channels == 5;

    let scale_x = orig_w as f32 / INPUT_SIZE as f32;
    let scale_y = orig_h as f32 / INPUT_SIZE as f32;

    let mut candidates = Vec::new();

    for i in 0..num_anchors {
        let x_center = output[[0, 0, i]];
        let y_center = output[[0, 1, i]];
        let width = output[[0, 2, i]];
        let height = output[[0, 3, i]];

        // Single-class exports carry one objectness channel; multi-class
        // exports carry one score channel per class.
        let (confidence, class_id) = if single_class {
            (output[[0, 4, i]], 0)
        } else {
            let mut best_score = 0.0f32;
            let mut best_class = 0usize;
            for c in 0..num_channels - 4 {
                let score = output[[0, 4 + c, i]];
                if score > best_score {
                    best_score = score;
                    best_class = c;
                }
            }
            (best_score, best_class)
        };

        if confidence < CONFIDENCE_THRESHOLD {
            continue;
        }

        let x1 = ((x_center - width / 2.0) * scale_x).clamp(0.0, orig_w as f32);
        let y1 = ((y_center - height / 2.0) * scale_y).clamp(0.0, orig_h as f32);
        let x2 = ((x_center + width / 2.0) * scale_x).clamp(0.0, orig_w as f32);
        let y2 = ((y_center + height / 2.0) * scale_y).clamp(0.0, orig_h as f32);

        candidates.push(Candidate {
            class_id,
            confidence,
            bbox: BoundingBox::new(x1, y1, x2, y2),
        });
    }

    let keep = non_max_suppression(&candidates, IOU_THRESHOLD);

    let detections = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| keep[*i])
        .map(|(_, c)| Detection::new(labels.name(c.class_id), c.confidence, c.bbox.clone()))
        .collect();

    Ok(detections)
}

/// Class-aware NMS. Returns a keep-mask over `candidates` so callers can
/// preserve the original anchor order of the survivors.
fn non_max_suppression(candidates: &[Candidate], iou_threshold: f32) -> Vec<bool> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .confidence
            .partial_cmp(&candidates[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = vec![true; candidates.len()];

    for (rank, &i) in order.iter().enumerate() {
        if !keep[i] {
            continue;
        }
        for &j in &order[rank + 1..] {
            if !keep[j] || candidates[j].class_id != candidates[i].class_id {
                continue;
            }
            if candidates[i].bbox.iou(&candidates[j].bbox) > iou_threshold {
                keep[j] = false;
            }
        }
    }

    keep
}
