// src/overlay.rs
use image::RgbImage;

use crate::pipeline::PipelineError;

/// Weight of the enhanced image in the blend.
pub const ENHANCED_WEIGHT: f32 = 0.6;
/// Weight of the color-coded mask in the blend.
pub const MASK_WEIGHT: f32 = 0.4;

/// Blend the color-coded mask over the enhanced image with a fixed 60/40
/// per-channel weighting. Both inputs must have identical dimensions; the
/// pipeline always derives them from the same original, so a mismatch is a
/// wiring bug and fails loudly instead of cropping.
pub fn blend(enhanced: &RgbImage, mask: &RgbImage) -> Result<RgbImage, PipelineError> {
    if enhanced.dimensions() != mask.dimensions() {
        return Err(PipelineError::DimensionMismatch {
            expected: enhanced.dimensions(),
            actual: mask.dimensions(),
        });
    }
    if enhanced.width() == 0 || enhanced.height() == 0 {
        return Err(PipelineError::EmptyImage);
    }

    let mut output = RgbImage::new(enhanced.width(), enhanced.height());
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let e = enhanced.get_pixel(x, y).0;
        let m = mask.get_pixel(x, y).0;
        pixel.0 = [
            blend_channel(e[0], m[0]),
            blend_channel(e[1], m[1]),
            blend_channel(e[2], m[2]),
        ];
    }
    Ok(output)
}

fn blend_channel(enhanced: u8, mask: u8) -> u8 {
    (enhanced as f32 * ENHANCED_WEIGHT + mask as f32 * MASK_WEIGHT)
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 100 × 0.6 + 200 × 0.4 = 140, exactly.
    #[test]
    fn blend_exact_value() {
        let enhanced = RgbImage::from_pixel(3, 2, Rgb([100, 100, 100]));
        let mask = RgbImage::from_pixel(3, 2, Rgb([200, 200, 200]));
        let out = blend(&enhanced, &mask).expect("matching dimensions");
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [140, 140, 140]);
        }
    }

    /// Blending two white images stays white; no channel escapes 0–255.
    #[test]
    fn blend_preserves_range_and_dimensions() {
        let enhanced = RgbImage::from_pixel(5, 4, Rgb([255, 255, 255]));
        let mask = RgbImage::from_pixel(5, 4, Rgb([255, 255, 255]));
        let out = blend(&enhanced, &mask).expect("matching dimensions");
        assert_eq!(out.dimensions(), (5, 4));
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [255, 255, 255]);
        }
    }

    #[test]
    fn blend_rejects_mismatched_dimensions() {
        let enhanced = RgbImage::new(4, 4);
        let mask = RgbImage::new(4, 5);
        match blend(&enhanced, &mask) {
            Err(PipelineError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, (4, 4));
                assert_eq!(actual, (4, 5));
            }
            other => panic!("expected DimensionMismatch, got {:?}", other.map(|_| ())),
        }
    }
}
