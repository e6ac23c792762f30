//! Row-major pixel buffers.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{RasterError, Result};

fn pixel_count(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize)
}

/// A W×H buffer holding one alpha value per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaRaster {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaRaster {
    /// Wrap an existing alpha buffer, checking that its length matches the size.
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height);
        if alpha.len() != expected {
            return Err(RasterError::BufferSize {
                width,
                height,
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
        })
    }

    /// A raster where every pixel has the same alpha.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            alpha: vec![value; pixel_count(width, height)],
        }
    }

    /// Extract the alpha plane of a decoded image.
    ///
    /// Images without an alpha channel (typical grayscale masks) use their
    /// luminance instead.
    pub fn from_image(image: &DynamicImage) -> Self {
        let width = image.width();
        let height = image.height();
        let alpha = if image.color().has_alpha() {
            image.to_rgba8().pixels().map(|p| p[3]).collect()
        } else {
            image.to_luma8().into_raw()
        };
        Self {
            width,
            height,
            alpha,
        }
    }

    /// Decode an encoded mask (PNG, JPEG) into an alpha raster.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.alpha
    }

    /// Alpha at (x, y), or `None` outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.alpha
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Like [`get`](Self::get) but accepts neighbor offsets that may go negative.
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> Option<u8> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.get(x, y)
    }
}

/// A W×H RGBA8 buffer, transparent unless painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaRaster {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; pixel_count(width, height) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Paint one pixel. Out-of-bounds writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    pub fn into_image(self) -> Result<RgbaImage> {
        let (width, height) = (self.width, self.height);
        let actual = self.pixels.len();
        RgbaImage::from_raw(width, height, self.pixels).ok_or(RasterError::BufferSize {
            width,
            height,
            expected: pixel_count(width, height) * 4,
            actual,
        })
    }

    /// Encode as PNG, preserving transparency.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = self.clone().into_image()?;
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba};

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = AlphaRaster::new(4, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            RasterError::BufferSize {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let raster = AlphaRaster::filled(3, 2, 255);
        assert_eq!(raster.get(2, 1), Some(255));
        assert_eq!(raster.get(3, 0), None);
        assert_eq!(raster.get_signed(-1, 0), None);
        assert_eq!(raster.get_signed(0, 2), None);
    }

    #[test]
    fn test_from_image_uses_alpha_channel() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 200]));
        let raster = AlphaRaster::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(raster.as_slice(), &[0, 200]);
    }

    #[test]
    fn test_from_image_grayscale_uses_luminance() {
        let img = GrayImage::from_pixel(2, 2, Luma([255]));
        let raster = AlphaRaster::from_image(&DynamicImage::ImageLuma8(img));
        assert!(raster.as_slice().iter().all(|&a| a == 255));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            AlphaRaster::decode(b"definitely not a png"),
            Err(RasterError::Decode(_))
        ));
    }

    #[test]
    fn test_rgba_put_and_count() {
        let mut raster = RgbaRaster::transparent(4, 4);
        raster.put(0, 0, [255, 0, 0, 255]);
        raster.put(3, 3, [0, 255, 0, 128]);
        raster.put(9, 9, [0, 0, 255, 255]);
        assert_eq!(raster.painted_count(), 2);
        assert_eq!(raster.get(3, 3), Some([0, 255, 0, 128]));
        assert_eq!(raster.get(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_encode_png_decodes_back_to_same_size() {
        let mut raster = RgbaRaster::transparent(5, 3);
        raster.put(2, 1, [1, 2, 3, 255]);
        let png = raster.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }
}
