// src/pipeline.rs
use eframe::egui::ColorImage;
use image::{DynamicImage, RgbImage};
use std::error::Error;
use std::fmt;
use tracing::info;

use crate::enhancer::enhance;
use crate::overlay::blend;
use crate::segmenter::{segment, LabelMask, ThresholdPair};

#[derive(Debug)]
pub enum PipelineError {
    EmptyImage,
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyImage => write!(f, "Image has no pixels"),
            PipelineError::DimensionMismatch { expected, actual } => write!(
                f,
                "Dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
        }
    }
}

impl Error for PipelineError {}

/// One unit of work for the processing thread: a freshly loaded manuscript.
pub struct ProcessingJob {
    pub image: DynamicImage,
}

/// Everything the pipeline derives from a single manuscript image. The
/// overlay is always computed; the display toggle only selects what gets
/// rendered.
pub struct RestorationOutput {
    pub enhanced: RgbImage,
    pub mask: LabelMask,
    pub mask_image: RgbImage,
    pub overlay: RgbImage,
    pub thresholds: ThresholdPair,
}

pub enum PipelineResult {
    Success(Box<RestorationOutput>),
    Error(String),
}

/// Single-shot restoration pipeline: enhancement and segmentation both run
/// from the original image, then the overlay blends their outputs.
pub struct RestorationPipeline;

impl RestorationPipeline {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, job: ProcessingJob) -> PipelineResult {
        match Self::restore(&job.image) {
            Ok(output) => PipelineResult::Success(Box::new(output)),
            Err(e) => PipelineResult::Error(e.to_string()),
        }
    }

    pub fn restore(image: &DynamicImage) -> Result<RestorationOutput, PipelineError> {
        let original = image.to_rgb8();
        if original.width() == 0 || original.height() == 0 {
            return Err(PipelineError::EmptyImage);
        }

        let enhanced = enhance(&original)?;
        let segmentation = segment(&original)?;
        let overlay = blend(&enhanced, &segmentation.color_mask)?;
        let thresholds = segmentation.thresholds;

        info!(
            width = original.width(),
            height = original.height(),
            median = thresholds.median,
            p75 = thresholds.p75,
            "Restoration pipeline complete"
        );

        Ok(RestorationOutput {
            enhanced,
            mask: segmentation.mask,
            mask_image: segmentation.color_mask,
            overlay,
            thresholds,
        })
    }
}

/// Convert a processed image into an egui texture payload.
pub fn to_color_image(image: &RgbImage) -> ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgb(size, image.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// End-to-end: every derived artifact keeps the original dimensions.
    #[test]
    fn restore_preserves_dimensions() {
        let mut img = RgbImage::new(10, 6);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 25) as u8, (y * 42) as u8, 90]);
        }
        let output = RestorationPipeline::restore(&DynamicImage::ImageRgb8(img))
            .expect("non-empty image");

        assert_eq!(output.enhanced.dimensions(), (10, 6));
        assert_eq!(output.mask.dimensions(), (10, 6));
        assert_eq!(output.mask_image.dimensions(), (10, 6));
        assert_eq!(output.overlay.dimensions(), (10, 6));
        assert_eq!(output.mask.class_counts().total(), 60);
        assert!(output.thresholds.median <= output.thresholds.p75);
    }

    #[test]
    fn restore_rejects_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            RestorationPipeline::restore(&img),
            Err(PipelineError::EmptyImage)
        ));
    }

    /// Grayscale input is accepted; the pipeline normalises it to RGB.
    #[test]
    fn restore_accepts_grayscale_input() {
        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([120]));
        let output = RestorationPipeline::restore(&DynamicImage::ImageLuma8(gray))
            .expect("non-empty image");
        assert_eq!(output.enhanced.dimensions(), (4, 4));
    }
}
