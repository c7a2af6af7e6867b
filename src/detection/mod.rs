pub mod postprocessing;
pub mod preprocessing;

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use log::{debug, info};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::TensorRef;

use crate::models::Detection;

/// Class-id to class-name table for a detection model.
///
/// Loaded from a plain text file with one name per line; ids without a
/// name render as `class_<id>` so unlabelled models still produce output.
#[derive(Debug, Clone, Default)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read labels file: {}", path.display()))?;
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { names })
    }

    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }
}

/// ONNX object detector, loaded once per process and reused for every image.
pub struct Detector {
    session: Session,
    labels: ClassLabels,
}

impl Detector {
    /// Load a YOLO-family ONNX model from a local weights file.
    pub fn load(model_path: &Path, labels: ClassLabels) -> Result<Self> {
        info!("Loading detection model: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .with_intra_threads(4)
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load model: {}", model_path.display()))?;

        info!("Model loaded");
        Ok(Self { session, labels })
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Run inference on an image and return its detections.
    ///
    /// Output order is the model's native anchor order; no filtering is
    /// applied beyond the model-default confidence/NMS postprocessing.
    pub fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (orig_w, orig_h) = (image.width(), image.height());
        debug!("Running detection on {}x{} image", orig_w, orig_h);

        let input = preprocessing::image_to_tensor(image);

        let tensor_ref = TensorRef::from_array_view(&input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor_ref])
            .context("Inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract model output")?
            .into_owned();
        drop(outputs);

        let detections =
            postprocessing::decode_predictions(output.view(), orig_w, orig_h, &self.labels)?;

        debug!("Detected {} objects", detections.len());
        Ok(detections)
    }
}
