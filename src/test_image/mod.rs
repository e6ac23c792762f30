//! Synthesized test images.
//!
//! Everything is generated in memory so tests need no fixture files.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

/// Encode any image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("PNG encoding of a synthesized image failed");
    cursor.into_inner()
}

/// A flat-colored RGB photo stand-in.
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([196, 172, 148]));
    encode_png(&DynamicImage::ImageRgb8(img))
}

/// An RGB image with per-pixel variation so JPEG output is not trivially small.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 % 256) as u8,
            (y * 13 % 256) as u8,
            ((x ^ y) % 256) as u8,
        ])
    });
    encode_png(&DynamicImage::ImageRgb8(img))
}

/// A fully opaque grayscale mask.
pub fn opaque_mask_png(width: u32, height: u32) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([255]));
    encode_png(&DynamicImage::ImageLuma8(img))
}

/// A full-image mask that is opaque only inside `[x1,x2)×[y1,y2)`.
pub fn rect_mask_png(width: u32, height: u32, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let inside = x >= x1 && x < x2 && y >= y1 && y < y2;
        Luma([if inside { 255 } else { 0 }])
    });
    encode_png(&DynamicImage::ImageLuma8(img))
}
