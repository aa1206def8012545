//! Detection outlines drawn onto the camera frame for display.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::qr::Detection;

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// A camera frame with detection boundaries drawn in, plus the detections
/// themselves (carrying the quad/contour hint) for surfaces that render
/// their own geometry.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub image: RgbImage,
    pub detections: Vec<Detection>,
}

/// Draws each detection's boundary as a closed polyline.
pub fn annotate(mut image: RgbImage, detections: &[Detection]) -> AnnotatedFrame {
    for detection in detections {
        draw_polygon(&mut image, &detection.polygon);
    }
    AnnotatedFrame {
        image,
        detections: detections.to_vec(),
    }
}

fn draw_polygon(image: &mut RgbImage, polygon: &[(f64, f64)]) {
    if polygon.len() < 2 {
        return;
    }
    for i in 0..polygon.len() {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % polygon.len()];
        draw_line_segment_mut(
            image,
            (x0 as f32, y0 as f32),
            (x1 as f32, y1 as f32),
            OUTLINE_COLOR,
        );
    }
}
