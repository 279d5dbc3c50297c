//! Raster images prepared for embedding as PDF image XObjects.

use std::io::Write as _;

use derive_debug::Dbg;
use flate2::{Compression, write::ZlibEncoder};
use image::{ColorType, DynamicImage, GenericImageView as _, ImageFormat, imageops::FilterType};

/// Longest edge, in pixels, of images re-encoded as samples.
const MAX_RAW_EDGE: u32 = 1600;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
    #[error("empty image")]
    Empty,
    #[error("failed to compress samples: {0}")]
    Compress(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    pub(super) fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::Gray => "/DeviceGray",
            ColorSpace::Rgb => "/DeviceRGB",
        }
    }
}

#[derive(Clone, Dbg, PartialEq)]
pub enum Samples {
    /// Baseline JPEG stream, embedded unchanged.
    Jpeg {
        #[dbg(skip)]
        data: Vec<u8>,
    },
    /// Zlib-compressed samples, 8 bits per component, row-major.
    Flate {
        #[dbg(skip)]
        data: Vec<u8>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub color: ColorSpace,
    pub samples: Samples,
}

impl RasterImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let format = image::guess_format(bytes)?;
        let data = image::load_from_memory_with_format(bytes, format)?;
        let (width, height) = data.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty);
        }
        if format == ImageFormat::Jpeg {
            let color = match data.color() {
                ColorType::L8 => Some(ColorSpace::Gray),
                ColorType::Rgb8 => Some(ColorSpace::Rgb),
                _ => None,
            };
            if let Some(color) = color {
                return Ok(Self {
                    width,
                    height,
                    color,
                    samples: Samples::Jpeg {
                        data: bytes.to_vec(),
                    },
                });
            }
        }
        Self::from_dynamic(data)
    }

    pub fn from_dynamic(data: DynamicImage) -> Result<Self, DecodeError> {
        let (width, height) = data.dimensions();
        let data = if width.max(height) > MAX_RAW_EDGE {
            data.resize(MAX_RAW_EDGE, MAX_RAW_EDGE, FilterType::Triangle)
        } else {
            data
        };
        let rgb = data.to_rgb8();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rgb.as_raw())?;
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            color: ColorSpace::Rgb,
            samples: Samples::Flate {
                data: encoder.finish()?,
            },
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Largest size with this image's aspect ratio that fits the box.
    pub fn fit(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let ratio = self.aspect_ratio();
        if max_width / max_height > ratio {
            (max_height * ratio, max_height)
        } else {
            (max_width, max_width / ratio)
        }
    }
}
