//! Integration tests for detection pre/postprocessing.
//!
//! The decode path is exercised with synthetic output tensors so results
//! are deterministic and re-derivable without model weights.

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array3;

use clicksim::detection::postprocessing::{CONFIDENCE_THRESHOLD, decode_predictions};
use clicksim::detection::preprocessing::{INPUT_SIZE, image_to_tensor};
use clicksim::detection::ClassLabels;
use clicksim::models::BoundingBox;

/// Anchor = (cx, cy, w, h, per-class scores), in model input coordinates.
fn tensor(num_classes: usize, anchors: &[(f32, f32, f32, f32, Vec<f32>)]) -> Array3<f32> {
    let mut out = Array3::zeros((1, 4 + num_classes, anchors.len()));
    for (i, (cx, cy, w, h, scores)) in anchors.iter().enumerate() {
        out[[0, 0, i]] = *cx;
        out[[0, 1, i]] = *cy;
        out[[0, 2, i]] = *w;
        out[[0, 3, i]] = *h;
        for (c, score) in scores.iter().enumerate() {
            out[[0, 4 + c, i]] = *score;
        }
    }
    out
}

fn labels() -> ClassLabels {
    ClassLabels::from_names(vec!["cat".to_string(), "dog".to_string()])
}

#[test]
fn test_decode_scales_to_original_image() -> anyhow::Result<()> {
    let out = tensor(2, &[(320.0, 320.0, 160.0, 160.0, vec![0.1, 0.8])]);
    let detections = decode_predictions(out.view().into_dyn(), 1280, 960, &labels())?;

    assert_eq!(detections.len(), 1);
    let d = &detections[0];
    assert_eq!(d.class_name, "dog");
    assert!((d.confidence - 0.8).abs() < 1e-6);

    // 640 -> 1280 doubles x, 640 -> 960 is 1.5x on y.
    assert_eq!(d.bbox, BoundingBox::new(480.0, 360.0, 800.0, 600.0));
    assert_eq!(d.center, (640.0, 480.0));
    Ok(())
}

#[test]
fn test_decode_is_deterministic() -> anyhow::Result<()> {
    let out = tensor(
        2,
        &[
            (100.0, 100.0, 50.0, 50.0, vec![0.6, 0.2]),
            (400.0, 400.0, 80.0, 40.0, vec![0.3, 0.7]),
        ],
    );

    let first = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;
    let second = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.class_name, b.class_name);
        assert_eq!(a.bbox, b.bbox);
    }
    Ok(())
}

#[test]
fn test_decode_drops_low_confidence() -> anyhow::Result<()> {
    let below = CONFIDENCE_THRESHOLD - 0.01;
    let out = tensor(
        2,
        &[
            (100.0, 100.0, 50.0, 50.0, vec![below, 0.0]),
            (400.0, 400.0, 50.0, 50.0, vec![0.0, 0.9]),
        ],
    );

    let detections = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_name, "dog");
    Ok(())
}

#[test]
fn test_nms_suppresses_same_class_overlap() -> anyhow::Result<()> {
    // Two near-identical cat boxes; the weaker one goes. The far dog stays.
    let out = tensor(
        2,
        &[
            (100.0, 100.0, 60.0, 60.0, vec![0.5, 0.0]),
            (102.0, 102.0, 60.0, 60.0, vec![0.9, 0.0]),
            (500.0, 500.0, 60.0, 60.0, vec![0.0, 0.8]),
        ],
    );

    let detections = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_name, "cat");
    assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    assert_eq!(detections[1].class_name, "dog");
    Ok(())
}

#[test]
fn test_nms_keeps_different_class_overlap() -> anyhow::Result<()> {
    let out = tensor(
        2,
        &[
            (100.0, 100.0, 60.0, 60.0, vec![0.9, 0.0]),
            (102.0, 102.0, 60.0, 60.0, vec![0.0, 0.8]),
        ],
    );

    let detections = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;
    assert_eq!(detections.len(), 2);
    Ok(())
}

#[test]
fn test_survivors_keep_anchor_order_not_score_order() -> anyhow::Result<()> {
    // Weaker detection first in anchor order; output must not be re-sorted.
    let out = tensor(
        2,
        &[
            (100.0, 100.0, 60.0, 60.0, vec![0.3, 0.0]),
            (500.0, 500.0, 60.0, 60.0, vec![0.0, 0.95]),
        ],
    );

    let detections = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_name, "cat");
    assert_eq!(detections[1].class_name, "dog");
    Ok(())
}

#[test]
fn test_decode_clamps_boxes_to_image() -> anyhow::Result<()> {
    let out = tensor(2, &[(10.0, 10.0, 100.0, 100.0, vec![0.9, 0.0])]);
    let detections = decode_predictions(out.view().into_dyn(), 640, 640, &labels())?;

    let b = &detections[0].bbox;
    assert_eq!(b.x1, 0.0);
    assert_eq!(b.y1, 0.0);
    Ok(())
}

#[test]
fn test_decode_single_class_output() -> anyhow::Result<()> {
    // [1, 5, N] exports carry a single objectness channel.
    let out = tensor(1, &[(320.0, 320.0, 100.0, 100.0, vec![0.7])]);
    let detections =
        decode_predictions(out.view().into_dyn(), 640, 640, &ClassLabels::empty())?;

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_name, "class_0");
    Ok(())
}

#[test]
fn test_decode_rejects_bad_shape() {
    let out = Array3::<f32>::zeros((1, 3, 10));
    let result = decode_predictions(out.view().into_dyn(), 640, 640, &labels());
    assert!(result.is_err());
}

#[test]
fn test_image_to_tensor_shape_and_normalization() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 128, 0])));
    let input = image_to_tensor(&img);

    let size = INPUT_SIZE as usize;
    assert_eq!(input.shape(), &[1, 3, size, size]);

    // Solid-color image survives resampling; channels are normalized 0..1.
    assert!((input[[0, 0, 320, 320]] - 1.0).abs() < 0.02);
    assert!((input[[0, 1, 320, 320]] - 128.0 / 255.0).abs() < 0.02);
    assert!(input[[0, 2, 320, 320]] < 0.02);
}

#[test]
fn test_class_labels_from_file_and_fallback() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("labels.txt");
    std::fs::write(&path, "cat\ndog\n\n  bird  \n")?;

    let labels = ClassLabels::from_file(&path)?;
    assert_eq!(labels.name(0), "cat");
    assert_eq!(labels.name(2), "bird");
    assert_eq!(labels.name(7), "class_7");
    Ok(())
}

#[test]
fn test_bounding_box_geometry() {
    let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let b = BoundingBox::new(50.0, 50.0, 150.0, 150.0);
    let c = BoundingBox::new(200.0, 200.0, 300.0, 300.0);

    assert_eq!(a.center(), (50.0, 50.0));
    assert_eq!(a.area(), 10000.0);

    // 50x50 overlap over (2*10000 - 2500) union.
    assert!((a.iou(&b) - 2500.0 / 17500.0).abs() < 1e-6);
    assert_eq!(a.iou(&c), 0.0);
}
