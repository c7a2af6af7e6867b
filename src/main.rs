use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;

use clicksim::{ClassLabels, Detector, annotate};

#[derive(Parser)]
#[command(name = "clicksim")]
#[command(about = "Simulated autoclicker over object detection")]
struct Cli {
    /// Path to an input image; runs one-shot headless detection.
    /// Omit to launch the GUI.
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Path to the ONNX detection weights
    #[arg(long, value_name = "FILE", default_value = "yolo.onnx")]
    model: PathBuf,

    /// Optional class names file (one name per line)
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// Save the annotated image here (headless mode only)
    #[arg(long, value_name = "FILE")]
    annotated_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let labels = match &args.labels {
        Some(path) => ClassLabels::from_file(path)?,
        None => ClassLabels::empty(),
    };

    let Some(image_path) = args.image_path else {
        return run_gui(args.model, labels);
    };

    if args.verbose {
        println!("Loading image: {:?}", image_path);
    }

    let img = ImageReader::open(&image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let mut detector = Detector::load(&args.model, labels)?;
    let detections = detector.detect(&img)?;

    println!("\n=== Detection Results ===");
    println!("Total detections: {}", detections.len());

    if detections.is_empty() {
        println!("No objects detected.");
    } else {
        println!("\nDetected objects:");
        for (i, d) in detections.iter().enumerate() {
            println!(
                "  {}. {} at ({:.0}, {:.0}) - box ({:.0}, {:.0}, {:.0}, {:.0}), confidence: {:.2}",
                i + 1,
                d.class_name,
                d.center.0,
                d.center.1,
                d.bbox.x1,
                d.bbox.y1,
                d.bbox.x2,
                d.bbox.y2,
                d.confidence,
            );
        }
    }

    if let Some(out_path) = args.annotated_out {
        let annotated = annotate(&img, &detections);
        annotated.save(&out_path)?;
        if args.verbose {
            println!("\nAnnotated image saved to {:?}", out_path);
        }
    }

    Ok(())
}

#[cfg(feature = "gui")]
fn run_gui(model: PathBuf, labels: ClassLabels) -> anyhow::Result<()> {
    clicksim::gui::run(model, labels)?;
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn run_gui(_model: PathBuf, _labels: ClassLabels) -> anyhow::Result<()> {
    anyhow::bail!("Built without the gui feature; pass an IMAGE path for headless detection")
}
