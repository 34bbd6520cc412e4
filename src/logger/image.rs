//! Pixel buffers accepted by the logger and their PNG encoding.

use std::path::Path;

use ndarray::{Array2, Array3};

use crate::error::{MnemosyneError, Result};

/// An image handed to [`Logger::add_image`](crate::logger::Logger::add_image).
///
/// Grayscale buffers are `(height, width)`, RGB buffers `(height, width, 3)`.
/// Floating-point values are expected in `[0, 1)` and are scaled to the
/// 8-bit range on save; 8-bit values are stored as-is.
#[derive(Debug, Clone)]
pub enum ImageData {
    GrayU8(Array2<u8>),
    GrayF32(Array2<f32>),
    RgbU8(Array3<u8>),
    RgbF32(Array3<f32>),
}

impl ImageData {
    pub fn width(&self) -> usize {
        match self {
            ImageData::GrayU8(a) => a.dim().1,
            ImageData::GrayF32(a) => a.dim().1,
            ImageData::RgbU8(a) => a.dim().1,
            ImageData::RgbF32(a) => a.dim().1,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            ImageData::GrayU8(a) => a.dim().0,
            ImageData::GrayF32(a) => a.dim().0,
            ImageData::RgbU8(a) => a.dim().0,
            ImageData::RgbF32(a) => a.dim().0,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let channels = match self {
            ImageData::RgbU8(a) => Some(a.dim().2),
            ImageData::RgbF32(a) => Some(a.dim().2),
            _ => None,
        };
        if let Some(c) = channels {
            if c != 3 {
                return Err(MnemosyneError::invalid_parameter(
                    "value".to_string(),
                    format!("RGB image must have 3 channels, got {}", c),
                ));
            }
        }
        Ok(())
    }

    /// Encode as a PNG file at `path`.
    pub(crate) fn save_png(&self, path: &Path) -> Result<()> {
        let width = self.width() as u32;
        let height = self.height() as u32;
        match self {
            ImageData::GrayU8(a) => {
                let buf: Vec<u8> = a.iter().copied().collect();
                image::save_buffer(path, &buf, width, height, image::ColorType::L8)?;
            }
            ImageData::GrayF32(a) => {
                let buf: Vec<u8> = a.iter().map(|&v| (v * 255.0) as u8).collect();
                image::save_buffer(path, &buf, width, height, image::ColorType::L8)?;
            }
            ImageData::RgbU8(a) => {
                let buf: Vec<u8> = a.iter().copied().collect();
                image::save_buffer(path, &buf, width, height, image::ColorType::Rgb8)?;
            }
            ImageData::RgbF32(a) => {
                let buf: Vec<u8> = a.iter().map(|&v| (v * 255.0) as u8).collect();
                image::save_buffer(path, &buf, width, height, image::ColorType::Rgb8)?;
            }
        }
        Ok(())
    }
}

impl From<Array2<u8>> for ImageData {
    fn from(a: Array2<u8>) -> Self {
        ImageData::GrayU8(a)
    }
}

impl From<Array2<f32>> for ImageData {
    fn from(a: Array2<f32>) -> Self {
        ImageData::GrayF32(a)
    }
}

impl From<Array3<u8>> for ImageData {
    fn from(a: Array3<u8>) -> Self {
        ImageData::RgbU8(a)
    }
}

impl From<Array3<f32>> for ImageData {
    fn from(a: Array3<f32>) -> Self {
        ImageData::RgbF32(a)
    }
}
