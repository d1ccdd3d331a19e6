// src/segmenter.rs
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::pipeline::PipelineError;

/// One of the three layout classes assigned to every pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Text,
    Illustration,
    Marginalia,
}

impl Label {
    /// Fixed false-color used for this class in the color-coded mask.
    pub fn color(&self) -> Rgb<u8> {
        match self {
            Label::Text => Rgb([255, 100, 100]),
            Label::Illustration => Rgb([100, 255, 100]),
            Label::Marginalia => Rgb([100, 100, 255]),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Label::Text => "Text blocks",
            Label::Illustration => "Illustrations",
            Label::Marginalia => "Marginalia",
        }
    }
}

/// The two luminance cutoffs that drive classification: the 50th and 75th
/// percentiles of the luminance distribution. `median <= p75` holds by
/// construction (percentiles are monotonic in rank).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    pub median: f64,
    pub p75: f64,
}

/// Per-pixel class assignment covering the full image grid.
#[derive(Debug, Clone)]
pub struct LabelMask {
    width: u32,
    height: u32,
    labels: Vec<Label>,
}

/// Pixel totals per class. The three counts always sum to width × height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCounts {
    pub text: usize,
    pub illustration: usize,
    pub marginalia: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.text + self.illustration + self.marginalia
    }
}

impl LabelMask {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Label {
        self.labels[(y * self.width + x) as usize]
    }

    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts {
            text: 0,
            illustration: 0,
            marginalia: 0,
        };
        for label in &self.labels {
            match label {
                Label::Text => counts.text += 1,
                Label::Illustration => counts.illustration += 1,
                Label::Marginalia => counts.marginalia += 1,
            }
        }
        counts
    }
}

/// A complete segmentation result: the label mask, its false-color
/// rendering, and the thresholds that produced it.
pub struct Segmentation {
    pub mask: LabelMask,
    pub color_mask: RgbImage,
    pub thresholds: ThresholdPair,
}

/// Classify every pixel of `original` into text / illustration / marginalia
/// by comparing its luminance against the percentile thresholds.
pub fn segment(original: &RgbImage) -> Result<Segmentation, PipelineError> {
    if original.width() == 0 || original.height() == 0 {
        return Err(PipelineError::EmptyImage);
    }

    let field = luminance_field(original);
    let thresholds = compute_thresholds(&field);
    debug!(
        median = thresholds.median,
        p75 = thresholds.p75,
        "Luminance thresholds computed"
    );

    let labels = field
        .iter()
        .map(|&v| classify(v as f64, &thresholds))
        .collect();
    let mask = LabelMask {
        width: original.width(),
        height: original.height(),
        labels,
    };
    let color_mask = colorize(&mask);
    Ok(Segmentation {
        mask,
        color_mask,
        thresholds,
    })
}

/// Assign a class to a single luminance value. The intervals are half-open
/// and evaluated in order, so the three classes partition the value range.
fn classify(v: f64, thresholds: &ThresholdPair) -> Label {
    if v < thresholds.median {
        Label::Text
    } else if v < thresholds.p75 {
        Label::Illustration
    } else {
        Label::Marginalia
    }
}

/// Per-pixel luminance via ITU-R BT.601 weighting, rounded to the nearest
/// integer. The same conversion feeds both threshold computation and
/// classification, so repeated runs are bit-identical.
pub fn luminance_field(image: &RgbImage) -> Vec<u8> {
    image
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round() as u8
        })
        .collect()
}

/// Compute the (median, p75) threshold pair for a luminance field.
pub fn compute_thresholds(field: &[u8]) -> ThresholdPair {
    let histogram = Histogram::from_values(field);
    ThresholdPair {
        median: histogram.percentile(50.0),
        p75: histogram.percentile(75.0),
    }
}

/// Render a label mask as a 3-channel image using the fixed class colors.
pub fn colorize(mask: &LabelMask) -> RgbImage {
    let mut output = RgbImage::new(mask.width, mask.height);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        *pixel = mask.get(x, y).color();
    }
    output
}

/// 256-bin luminance histogram used for percentile lookups without sorting
/// the full pixel population.
struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    fn from_values(values: &[u8]) -> Self {
        let mut bins = [0u64; 256];
        for &v in values {
            bins[v as usize] += 1;
        }
        Self {
            bins,
            total: values.len() as u64,
        }
    }

    /// Percentile with linear interpolation between closest ranks: the
    /// fractional rank is p/100 × (n−1) and the value is interpolated
    /// between the two bracketing order statistics.
    fn percentile(&self, p: f64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rank = p / 100.0 * (self.total - 1) as f64;
        let lower = rank.floor() as u64;
        let upper = rank.ceil() as u64;
        let fraction = rank - lower as f64;

        let v_lower = self.value_at_rank(lower) as f64;
        if lower == upper {
            return v_lower;
        }
        let v_upper = self.value_at_rank(upper) as f64;
        v_lower + (v_upper - v_lower) * fraction
    }

    /// The value at a 0-based rank in the (implicit) sorted pixel order:
    /// the smallest bin whose cumulative count exceeds the rank.
    fn value_at_rank(&self, rank: u64) -> u8 {
        let mut cumulative = 0u64;
        for (value, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative > rank {
                return value as u8;
            }
        }
        255
    }
}
