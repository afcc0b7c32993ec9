use serde::{Deserialize, Serialize};

use super::format::BarcodeFormat;

// Encoder configuration
//------------------------------------------------------------------------------

/// Host supplied limits and defaults for [`crate::encode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Upper bound on `width * height` of a request.
    pub max_pixels: u64,
    /// Symbology used when the options carry no `format`.
    pub default_format: BarcodeFormat,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_pixels: 1_000_000,
            default_format: BarcodeFormat::QrCode,
            default_width: 50,
            default_height: 50,
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_pixels(&mut self, max_pixels: u64) -> &mut Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn default_format(&mut self, format: BarcodeFormat) -> &mut Self {
        self.default_format = format;
        self
    }

    pub fn default_size(&mut self, width: u32, height: u32) -> &mut Self {
        self.default_width = width;
        self.default_height = height;
        self
    }
}

// Decoder configuration
//------------------------------------------------------------------------------

/// Tuning of the luminance binarizer used by [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Side of the square blocks whose averages drive the local threshold.
    pub block_size: u32,
    /// Blocks whose min/max spread is below this are treated as flat.
    pub min_dynamic_range: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { block_size: 8, min_dynamic_range: 24 }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_size(&mut self, block_size: u32) -> &mut Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn min_dynamic_range(&mut self, range: u8) -> &mut Self {
        self.min_dynamic_range = range;
        self
    }
}
