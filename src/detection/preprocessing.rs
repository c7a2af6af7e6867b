use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{Array, IxDyn};

/// Model input edge length; YOLO-family exports expect square 640x640 input.
pub const INPUT_SIZE: u32 = 640;

/// Resize to the model input size and convert to a normalized NCHW tensor.
pub fn image_to_tensor(image: &DynamicImage) -> Array<f32, IxDyn> {
    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut input = Array::zeros((1, 3, size, size));

    for y in 0..size {
        for x in 0..size {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            input[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
        }
    }

    input.into_dyn()
}
