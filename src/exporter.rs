// src/exporter.rs
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage};
use std::error::Error;
use std::fmt;
use std::io::Cursor;

/// Artifact name for the enhanced manuscript download.
pub const ENHANCED_FILE_NAME: &str = "enhanced_manuscript.png";
/// Artifact name for the segmentation mask download.
pub const MASK_FILE_NAME: &str = "segmentation_mask.png";

#[derive(Debug)]
pub enum ExportError {
    PngEncode(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::PngEncode(msg) => write!(f, "PNG export error: {}", msg),
        }
    }
}

impl Error for ExportError {}

/// Losslessly encode a produced image as PNG bytes, ready to be written to
/// whatever path the save dialog yields.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let encoder = PngEncoder::new(&mut cursor);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| ExportError::PngEncode(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// PNG is a lossless container: decoding the encoded bytes must give
    /// back the exact pixel data.
    #[test]
    fn png_round_trip_is_pixel_identical() {
        let mut img = RgbImage::new(7, 5);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 36) as u8, (y * 51) as u8, ((x + y) * 20) as u8]);
        }

        let bytes = encode_png(&img).expect("encoding succeeds");
        let decoded = image::load_from_memory(&bytes)
            .expect("valid PNG bytes")
            .to_rgb8();

        assert_eq!(decoded.dimensions(), img.dimensions());
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn artifact_names_are_fixed() {
        assert_eq!(ENHANCED_FILE_NAME, "enhanced_manuscript.png");
        assert_eq!(MASK_FILE_NAME, "segmentation_mask.png");
    }
}
