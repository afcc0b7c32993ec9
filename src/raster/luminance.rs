use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use log::trace;

use crate::common::{BarcodeError, BarcodeResult, BitMatrix, DecoderConfig};

use super::PixelBuffer;

// Crop region
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl CropRegion {
    /// Checks the rectangle against a `width` x `height` raster. Origin must lie
    /// inside, size must be non zero and the rectangle must not extend past the
    /// right or bottom edge.
    pub fn checked(x: i64, y: i64, w: i64, h: i64, width: u32, height: u32) -> BarcodeResult<Self> {
        let (width, height) = (i64::from(width), i64::from(height));
        if w <= 0 || w > width {
            return Err(BarcodeError::validation("crop", format!("invalid width {w}")));
        }
        if h <= 0 || h > height {
            return Err(BarcodeError::validation("crop", format!("invalid height {h}")));
        }
        if x < 0 || x >= width {
            return Err(BarcodeError::validation("crop", format!("invalid x {x}")));
        }
        if y < 0 || y >= height {
            return Err(BarcodeError::validation("crop", format!("invalid y {y}")));
        }
        if x + w > width || y + h > height {
            return Err(BarcodeError::validation(
                "crop",
                format!("[{x} {y} {w} {h}] extends beyond {width}x{height}"),
            ));
        }
        // Every component was bounded by a u32 above
        Ok(Self { x: x as u32, y: y as u32, w: w as u32, h: h as u32 })
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, w: width, h: height }
    }
}

// Luminance
// Transparent pixels read as white
//------------------------------------------------------------------------------

pub fn luminance(argb: u32) -> u8 {
    if argb >> 24 == 0 {
        return 0xFF;
    }
    let r = (argb >> 16) & 0xFF;
    let g = (argb >> 8) & 0xFF;
    let b = argb & 0xFF;
    ((306 * r + 601 * g + 117 * b + 0x200) >> 10) as u8
}

fn crop_luminance(buf: &PixelBuffer, crop: CropRegion) -> GrayImage {
    // Work on a private copy, the caller's buffer is never touched
    let pixels = buf.pixels().to_vec();
    let stride = buf.width() as usize;

    let mut luma = Vec::with_capacity((crop.w as usize) * (crop.h as usize));
    for row in 0..crop.h as usize {
        let start = (crop.y as usize + row) * stride + crop.x as usize;
        luma.extend(pixels[start..start + crop.w as usize].iter().map(|&p| luminance(p)));
    }
    GrayImage::from_raw(crop.w, crop.h, luma).unwrap_or_else(|| GrayImage::new(crop.w, crop.h))
}

// Binary bitmap
// Steps:
// 1. Splits the luminance into square blocks and records min, max & mean of each
// 2. Low contrast blocks borrow the black point of their already visited
//    neighbours, or are assumed to be background
// 3. Threshold of a block is the mean of the 5x5 block neighbourhood around it
// 4. A pixel is dark if it is less than or equal to its block threshold
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BinaryBitmap {
    luma: GrayImage,
    matrix: BitMatrix,
}

impl BinaryBitmap {
    pub fn from_buffer(buf: &PixelBuffer, crop: Option<CropRegion>, cfg: &DecoderConfig) -> Self {
        let crop = crop.unwrap_or_else(|| CropRegion::full(buf.width(), buf.height()));
        Self::from_luminance(crop_luminance(buf, crop), cfg)
    }

    pub fn from_luminance(luma: GrayImage, cfg: &DecoderConfig) -> Self {
        let matrix = binarize(&luma, cfg);
        trace!("Binarized {}x{} luminance, {} dark", luma.width(), luma.height(), matrix.count_set());
        Self { luma, matrix }
    }

    pub fn width(&self) -> u32 {
        self.matrix.width()
    }

    pub fn height(&self) -> u32 {
        self.matrix.height()
    }

    pub fn luminance(&self) -> &GrayImage {
        &self.luma
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// Single global threshold picked with Otsu's method, an alternate view for
    /// images with smooth illumination where the block threshold fragments modules.
    pub fn global_threshold(&self) -> BitMatrix {
        let level = otsu_level(&self.luma);
        BitMatrix::from_fn(self.luma.width(), self.luma.height(), |x, y| {
            self.luma.get_pixel(x, y).0[0] <= level
        })
    }

    pub fn inverted(&self) -> BitMatrix {
        let mut m = self.matrix.clone();
        m.flip();
        m
    }
}

struct BlockStats {
    cols: usize,
    rows: usize,
    avg: Vec<u32>,
}

fn block_stats(luma: &GrayImage, cfg: &DecoderConfig) -> BlockStats {
    let (w, h) = luma.dimensions();
    let bs = cfg.block_size.max(1);
    let cols = w.div_ceil(bs) as usize;
    let rows = h.div_ceil(bs) as usize;
    let mut avg = vec![0u32; cols * rows];

    for by in 0..rows {
        for bx in 0..cols {
            let (x0, y0) = (bx as u32 * bs, by as u32 * bs);
            let (x1, y1) = (x0.saturating_add(bs).min(w), y0.saturating_add(bs).min(h));

            // Blocks may hold more than u32::MAX / 255 pixels
            let (mut min, mut max, mut sum, mut n) = (u32::MAX, 0u32, 0u64, 0u64);
            for y in y0..y1 {
                for x in x0..x1 {
                    let Luma([v]) = *luma.get_pixel(x, y);
                    let v = v as u32;
                    min = min.min(v);
                    max = max.max(v);
                    sum += u64::from(v);
                    n += 1;
                }
            }

            let mut mean = (sum / n.max(1)) as u32;
            if max - min <= cfg.min_dynamic_range as u32 {
                // Flat block, background unless the neighbours say otherwise
                mean = min / 2;
                if bx > 0 && by > 0 {
                    let up = avg[(by - 1) * cols + bx];
                    let left = avg[by * cols + bx - 1];
                    let diag = avg[(by - 1) * cols + bx - 1];
                    let neighbour_black = (up + 2 * left + diag) / 4;
                    if min < neighbour_black {
                        mean = neighbour_black;
                    }
                }
            }
            avg[by * cols + bx] = mean;
        }
    }

    BlockStats { cols, rows, avg }
}

fn binarize(luma: &GrayImage, cfg: &DecoderConfig) -> BitMatrix {
    let (w, h) = luma.dimensions();
    if w == 0 || h == 0 {
        return BitMatrix::new(w, h);
    }

    let stats = block_stats(luma, cfg);
    let mut thresholds = vec![0u8; stats.avg.len()];
    for by in 0..stats.rows {
        for bx in 0..stats.cols {
            let (r0, r1) = (by.saturating_sub(2), (by + 2).min(stats.rows - 1));
            let (c0, c1) = (bx.saturating_sub(2), (bx + 2).min(stats.cols - 1));
            let (mut sum, mut n) = (0u32, 0u32);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    sum += stats.avg[r * stats.cols + c];
                    n += 1;
                }
            }
            thresholds[by * stats.cols + bx] = (sum / n) as u8;
        }
    }

    let bs = cfg.block_size.max(1);
    BitMatrix::from_fn(w, h, |x, y| {
        let t = thresholds[(y / bs) as usize * stats.cols + (x / bs) as usize];
        luma.get_pixel(x, y).0[0] <= t
    })
}
