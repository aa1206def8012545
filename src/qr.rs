//! QR symbol extraction from camera frames.

use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame bytes: {0}")]
    BadFrame(#[from] image::ImageError),
}

/// Rendering hint for a detection boundary, passed through to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    /// Exactly four corner points; drawn as a closed quadrilateral.
    Quad,
    /// Any other point count; drawn as a general contour.
    Contour,
}

/// One decoded QR symbol within a frame.
#[derive(Debug, Clone)]
pub struct Detection {
    pub text: String,
    pub polygon: Vec<(f64, f64)>,
    pub outline: Outline,
}

impl Detection {
    pub fn new(text: String, polygon: Vec<(f64, f64)>) -> Self {
        let outline = if polygon.len() == 4 {
            Outline::Quad
        } else {
            Outline::Contour
        };
        Self { text, polygon, outline }
    }
}

/// Reusable QR decoder; the underlying scanner keeps internal work buffers.
pub struct QrDecoder {
    scanner: quircs::Quirc,
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDecoder {
    pub fn new() -> Self {
        Self {
            scanner: quircs::Quirc::default(),
        }
    }

    /// Decode raw frame bytes into a raster image.
    pub fn read_frame(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Extract every decodable QR symbol from a frame.
    ///
    /// Symbols that are located but fail payload extraction are skipped;
    /// they are indistinguishable from noise at this layer.
    pub fn decode(&mut self, frame: &DynamicImage) -> Vec<Detection> {
        let gray = frame.to_luma8();
        let codes = self
            .scanner
            .identify(gray.width() as usize, gray.height() as usize, &gray);

        let mut detections = Vec::new();
        for code in codes {
            let code = match code {
                Ok(code) => code,
                Err(e) => {
                    tracing::debug!("skipping unextractable symbol: {}", e);
                    continue;
                }
            };
            let data = match code.decode() {
                Ok(data) => data,
                Err(e) => {
                    tracing::debug!("skipping undecodable symbol: {}", e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&data.payload).into_owned();
            let polygon = code
                .corners
                .iter()
                .map(|p| (p.x as f64, p.y as f64))
                .collect();
            detections.push(Detection::new(text, polygon));
        }
        detections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_bytes_are_a_decode_error() {
        let decoder = QrDecoder::new();
        assert!(decoder.read_frame(b"not a jpeg").is_err());
    }

    #[test]
    fn blank_frame_has_no_detections() {
        let mut decoder = QrDecoder::new();
        let frame = DynamicImage::new_rgb8(64, 64);
        assert!(decoder.decode(&frame).is_empty());
    }

    #[test]
    fn outline_hint_follows_point_count() {
        let quad = Detection::new("A".into(), vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(quad.outline, Outline::Quad);

        let tri = Detection::new("A".into(), vec![(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]);
        assert_eq!(tri.outline, Outline::Contour);
    }
}
