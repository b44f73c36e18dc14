//! Carrier images
//!
//! A [`Carrier`] is the carrier image held as a row-major `Vec<Pixel>`.
//! Any format the `image` crate can decode is accepted as input and
//! converted to RGBA8; output is always PNG, because a lossy format would
//! destroy the embedded deltas.

use crate::codec::{CodecError, Pixel};
use image::{ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Image file failures
#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("failed to open image")]
    Io(#[from] std::io::Error),

    #[error("failed to decode or encode image")]
    Image(#[from] image::ImageError),

    #[error("'{path}' must be a .png file so the embedded program survives")]
    UnsupportedFormat { path: String },

    #[error("pixel buffer of {len} pixels does not match {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, len: usize },
}

/// A rectangular RGBA pixel grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl Carrier {
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, CarrierError> {
        if pixels.len() != width as usize * height as usize {
            return Err(CarrierError::DimensionMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Carrier {
            width,
            height,
            pixels,
        })
    }

    /// A carrier filled with one colour.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Carrier {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    /// Load a carrier from any image file the `image` crate understands.
    pub fn open(path: &Path) -> Result<Self, CarrierError> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .to_rgba8();
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "loaded carrier"
        );
        Ok(Self::from_rgba_image(&image))
    }

    /// Save the carrier as a PNG file.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(CarrierError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }

        self.to_rgba_image()
            .save_with_format(path, ImageFormat::Png)?;
        debug!(path = %path.display(), "saved carrier");
        Ok(())
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        Carrier {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|p| Pixel(p.0)).collect(),
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let index = y as usize * self.width as usize + x as usize;
            image::Rgba(self.pixels[index].0)
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Pixels available for a stream that starts at `origin`.
    pub fn capacity_from(&self, origin: usize) -> Result<usize, CodecError> {
        if origin > self.pixels.len() {
            return Err(CodecError::OriginOutOfBounds {
                origin,
                len: self.pixels.len(),
            });
        }
        Ok(self.pixels.len() - origin)
    }

    /// The pixel a stream starting at `origin` is measured against.
    pub fn base_pixel(&self, origin: usize) -> Pixel {
        origin
            .checked_sub(1)
            .and_then(|i| self.pixels.get(i))
            .copied()
            .unwrap_or(Pixel::SENTINEL)
    }

    /// All pixels from `origin` to the end (empty if out of range).
    pub fn pixels_from(&self, origin: usize) -> &[Pixel] {
        self.pixels.get(origin..).unwrap_or(&[])
    }

    /// Overwrite `pixels.len()` pixels in place, starting at `origin`.
    pub fn overwrite(&mut self, origin: usize, pixels: &[Pixel]) -> Result<(), CodecError> {
        let available = self.capacity_from(origin)?;
        if pixels.len() > available {
            return Err(CodecError::InsufficientCapacity {
                required: pixels.len(),
                available,
            });
        }
        self.pixels[origin..origin + pixels.len()].copy_from_slice(pixels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Carrier {
        let pixels = (0..width * height)
            .map(|i| Pixel::new(i as u8, (i * 3) as u8, 200, 255))
            .collect();
        Carrier::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            Carrier::new(2, 2, vec![Pixel::SENTINEL; 3]),
            Err(CarrierError::DimensionMismatch { len: 3, .. })
        ));
    }

    #[test]
    fn test_base_pixel() {
        let carrier = gradient(4, 2);
        assert_eq!(carrier.base_pixel(0), Pixel::SENTINEL);
        assert_eq!(carrier.base_pixel(1), carrier.pixels()[0]);
        assert_eq!(carrier.base_pixel(8), carrier.pixels()[7]);
    }

    #[test]
    fn test_capacity_and_bounds() {
        let carrier = gradient(4, 2);
        assert_eq!(carrier.capacity_from(0), Ok(8));
        assert_eq!(carrier.capacity_from(8), Ok(0));
        assert_eq!(
            carrier.capacity_from(9),
            Err(CodecError::OriginOutOfBounds { origin: 9, len: 8 })
        );
        assert!(carrier.pixels_from(9).is_empty());
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut carrier = gradient(3, 3);
        let patch = [Pixel::new(1, 1, 1, 1), Pixel::new(2, 2, 2, 2)];

        carrier.overwrite(7, &patch).unwrap();
        assert_eq!(&carrier.pixels()[7..], &patch);

        let before = carrier.clone();
        assert!(carrier.overwrite(8, &patch).is_err());
        assert_eq!(carrier, before);
    }

    #[test]
    fn test_rgba_image_conversion_is_row_major() {
        let carrier = gradient(3, 2);
        let image = carrier.to_rgba_image();
        assert_eq!(image.get_pixel(1, 1).0, carrier.pixels()[4].0);
        assert_eq!(Carrier::from_rgba_image(&image), carrier);
    }

    #[test]
    fn test_open_error_keeps_cause_out_of_message() {
        let err = Carrier::open(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, CarrierError::Io(_)));
        assert_eq!(err.to_string(), "failed to open image");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_empty_carrier_has_no_capacity() {
        let carrier = Carrier::new(0, 0, Vec::new()).unwrap();
        assert!(carrier.is_empty());
        assert_eq!(carrier.capacity_from(0), Ok(0));
    }

    #[test]
    fn test_save_rejects_lossy_extensions() {
        let carrier = gradient(2, 2);
        assert!(matches!(
            carrier.save(Path::new("out.jpg")),
            Err(CarrierError::UnsupportedFormat { .. })
        ));
    }
}
