use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::Detection;

const BOX_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BOX_WIDTH: u32 = 3;
const LABEL_SCALE: u32 = 2;

/// Draw bounding boxes and class labels onto a copy of the image.
pub fn annotate(image: &DynamicImage, detections: &[Detection]) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    for detection in detections {
        draw_detection(&mut canvas, detection);
    }
    canvas
}

fn draw_detection(canvas: &mut RgbaImage, detection: &Detection) {
    let b = &detection.bbox;
    let x = b.x1.round().max(0.0) as i32;
    let y = b.y1.round().max(0.0) as i32;
    let w = b.width().round() as u32;
    let h = b.height().round() as u32;

    // Thick outline as nested 1px hollow rects; degenerate rings are skipped.
    for inset in 0..BOX_WIDTH {
        let rw = w.saturating_sub(2 * inset);
        let rh = h.saturating_sub(2 * inset);
        if rw == 0 || rh == 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(rw, rh);
        draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    }

    // Label just above the box, clamped into the image.
    let label_height = 8 * LABEL_SCALE as i32;
    let label_y = (y - label_height - 2).max(0);
    draw_label(canvas, &detection.class_name, x, label_y);
}

/// Render text with 8x8 bitmap glyphs; characters outside the basic set
/// fall back to '?'.
fn draw_label(canvas: &mut RgbaImage, text: &str, x: i32, y: i32) {
    let scale = LABEL_SCALE as i32;
    let mut cursor_x = x;

    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += 8 * scale;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            for col_idx in 0..8 {
                if (row >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        let tx = px + sx;
                        let ty = py + sy;
                        if tx >= 0
                            && ty >= 0
                            && (tx as u32) < canvas.width()
                            && (ty as u32) < canvas.height()
                        {
                            canvas.put_pixel(tx as u32, ty as u32, BOX_COLOR);
                        }
                    }
                }
            }
        }
        cursor_x += 8 * scale;
    }
}
