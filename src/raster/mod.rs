//! Pixel plumbing between ARGB rasters and the codec's bit matrices.
//!
//! [`render`] turns an encoded [`BitMatrix`](crate::BitMatrix) into a [`PixelBuffer`],
//! [`BinaryBitmap`] turns a (possibly cropped) [`PixelBuffer`] into the
//! luminance and binarized views a reader consumes.

mod luminance;
mod render;

pub use luminance::{luminance, BinaryBitmap, CropRegion};
pub use render::render;

use image::{DynamicImage, Rgba, RgbaImage};
use serde::Serialize;

use crate::common::{BarcodeError, BarcodeResult};

pub const OPAQUE_BLACK: u32 = 0xFF00_0000;
pub const TRANSPARENT: u32 = 0x0000_0000;

// Pixel buffer
// Row major ARGB pixels, one u32 per pixel
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    // Fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![TRANSPARENT; (width as usize) * (height as usize)] }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> BarcodeResult<Self> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(BarcodeError::validation(
                "pixels",
                format!("expected {expected} pixels for {width}x{height}, got {}", pixels.len()),
            ));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn put(&mut self, x: u32, y: u32, argb: u32) {
        let w = self.width as usize;
        self.pixels[(y as usize) * w + x as usize] = argb;
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|&Rgba([r, g, b, a])| {
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect();
        Self { width, height, pixels }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.get(x, y);
            Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8])
        })
    }
}

impl From<&DynamicImage> for PixelBuffer {
    fn from(img: &DynamicImage) -> Self {
        Self::from_rgba_image(&img.to_rgba8())
    }
}
