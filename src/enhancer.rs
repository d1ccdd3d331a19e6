// src/enhancer.rs
use image::RgbImage;

use crate::pipeline::PipelineError;

/// Fixed contrast multiplier, anchored at the channel midpoint.
pub const CONTRAST_FACTOR: f32 = 1.5;
/// Fixed brightness multiplier, applied after the contrast step.
pub const BRIGHTNESS_FACTOR: f32 = 1.1;

const MIDPOINT: f32 = 128.0;

/// Apply the fixed restoration enhancement: contrast ×1.5 around the
/// midpoint, then brightness ×1.1. The order matters; each step clamps
/// its result to the valid 0–255 range before the next one runs.
pub fn enhance(original: &RgbImage) -> Result<RgbImage, PipelineError> {
    if original.width() == 0 || original.height() == 0 {
        return Err(PipelineError::EmptyImage);
    }

    let mut working = original.clone();
    apply_contrast(&mut working, CONTRAST_FACTOR);
    apply_brightness(&mut working, BRIGHTNESS_FACTOR);
    Ok(working)
}

fn apply_contrast(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b] = pixel.0;
        pixel.0 = [
            (MIDPOINT + (r as f32 - MIDPOINT) * factor).clamp(0.0, 255.0) as u8,
            (MIDPOINT + (g as f32 - MIDPOINT) * factor).clamp(0.0, 255.0) as u8,
            (MIDPOINT + (b as f32 - MIDPOINT) * factor).clamp(0.0, 255.0) as u8,
        ];
    }
}

fn apply_brightness(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let [r, g, b] = pixel.0;
        pixel.0 = [
            (r as f32 * factor).clamp(0.0, 255.0) as u8,
            (g as f32 * factor).clamp(0.0, 255.0) as u8,
            (b as f32 * factor).clamp(0.0, 255.0) as u8,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Mid-gray sits on the contrast anchor, so only the brightness step
    /// moves it: 128 × 1.1 = 140.8, truncated to 140.
    #[test]
    fn enhance_mid_gray_exact_value() {
        let img = RgbImage::from_pixel(4, 4, Rgb([128, 128, 128]));
        let out = enhance(&img).expect("non-empty image");
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [140, 140, 140]);
        }
    }

    /// Dark values are pushed below zero by the contrast step and must
    /// clamp to 0, not wrap around.
    #[test]
    fn enhance_clamps_dark_values() {
        let img = RgbImage::from_pixel(2, 2, Rgb([10, 10, 10]));
        let out = enhance(&img).expect("non-empty image");
        // 128 + (10 - 128) × 1.5 = -49 → 0; 0 × 1.1 = 0.
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [0, 0, 0]);
        }
    }

    /// Bright values saturate at 255 after the brightness step.
    #[test]
    fn enhance_clamps_bright_values() {
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 200, 200]));
        let out = enhance(&img).expect("non-empty image");
        // 128 + 72 × 1.5 = 236; 236 × 1.1 = 259.6 → 255.
        for pixel in out.pixels() {
            assert_eq!(pixel.0, [255, 255, 255]);
        }
    }

    /// The transform is a pure function: two runs over the same input
    /// produce identical output.
    #[test]
    fn enhance_is_deterministic() {
        let mut img = RgbImage::new(8, 8);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 31) as u8, (y * 27) as u8, ((x + y) * 13) as u8]);
        }
        let first = enhance(&img).expect("non-empty image");
        let second = enhance(&img).expect("non-empty image");
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn enhance_rejects_empty_image() {
        let img = RgbImage::new(0, 0);
        assert!(matches!(enhance(&img), Err(PipelineError::EmptyImage)));
    }
}
