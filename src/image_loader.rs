// src/image_loader.rs
use image::DynamicImage;
use std::error::Error;
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum LoadError {
    UnsupportedFormat(String),
    ImageOpenError(String),
    EmptyImage,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnsupportedFormat(ext) => write!(f, "Unsupported format: {}", ext),
            LoadError::ImageOpenError(msg) => write!(f, "Image open error: {}", msg),
            LoadError::EmptyImage => write!(f, "Image has no pixels"),
        }
    }
}

impl Error for LoadError {}

/// Loads manuscript scans from disk. Scans arrive as standard encodings
/// only; decoding is delegated to the `image` crate.
pub struct ImageLoader {
    supported_formats: Vec<&'static str>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self {
            supported_formats: vec!["jpg", "jpeg", "png", "tiff", "tif"],
        }
    }

    pub fn load_image<P: AsRef<Path>>(&self, path: P) -> Result<DynamicImage, LoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .ok_or_else(|| LoadError::UnsupportedFormat("No extension".to_string()))?;

        if !self.is_supported_format(&extension) {
            return Err(LoadError::UnsupportedFormat(extension));
        }

        let image = image::open(path)
            .map_err(|e| LoadError::ImageOpenError(format!("Failed to open image: {}", e)))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(LoadError::EmptyImage);
        }

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Manuscript image loaded"
        );
        Ok(image)
    }

    pub fn is_supported_format(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        self.supported_formats.contains(&ext.as_str())
    }

    pub fn get_supported_extensions(&self) -> Vec<String> {
        self.supported_formats
            .iter()
            .map(|&s| s.to_string())
            .collect()
    }
}
