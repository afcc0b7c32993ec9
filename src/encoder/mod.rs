mod hints;
mod writer;

pub use hints::{Dimensions, EncodeHintType, EncodeHintValue, EncodeHints, SymbolShape};
pub use writer::BuiltinWriter;

use log::debug;

use crate::common::{
    BarcodeError, BarcodeFormat, BarcodeResult, BitMatrix, EncoderConfig, OptionMap, Value,
};
use crate::raster::{render, PixelBuffer};

pub const FORMAT: &str = "format";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const CONTENT: &str = "content";

// Symbol writer
//------------------------------------------------------------------------------

/// Encoding engine behind [`encode_with`]. The returned matrix may be larger
/// than `width` x `height` when the symbol plus its quiet zone does not fit.
pub trait SymbolWriter {
    fn encode(
        &self,
        content: &str,
        format: BarcodeFormat,
        width: u32,
        height: u32,
        hints: &EncodeHints,
    ) -> BarcodeResult<BitMatrix>;
}

// Encode request
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub content: String,
    pub format: BarcodeFormat,
    pub width: u32,
    pub height: u32,
    pub hints: EncodeHints,
}

fn dimension(options: &OptionMap, key: &str, default: u32) -> BarcodeResult<u32> {
    let Some(val) = options.get(key) else { return Ok(default) };
    let v = val
        .as_i32()
        .ok_or_else(|| BarcodeError::validation(key, format!("expected a number, got {val}")))?;
    u32::try_from(v)
        .ok()
        .filter(|&v| v >= 1)
        .ok_or_else(|| BarcodeError::validation(key, format!("must be at least 1, got {v}")))
}

impl EncodeRequest {
    /// Reads the reserved keys, enforces the pixel budget and then maps the
    /// hints. Nothing is handed to a codec here.
    pub fn from_options(options: &OptionMap, cfg: &EncoderConfig) -> BarcodeResult<Self> {
        let format = match options.get(FORMAT) {
            Some(val) => val
                .to_string()
                .parse::<BarcodeFormat>()
                .map_err(|e| BarcodeError::validation(FORMAT, e.to_string()))?,
            None => cfg.default_format,
        };

        let width = dimension(options, WIDTH, cfg.default_width)?;
        let height = dimension(options, HEIGHT, cfg.default_height)?;
        let pixels = u64::from(width) * u64::from(height);
        if pixels > cfg.max_pixels {
            return Err(BarcodeError::validation(
                "width*height",
                format!("cannot generate code with more than {} pixels, asked {pixels}", cfg.max_pixels),
            ));
        }

        let content = match options.get(CONTENT) {
            Some(Value::Null) | None => {
                return Err(BarcodeError::validation(CONTENT, "missing content"));
            }
            Some(val) => val.to_string(),
        };

        let hints = EncodeHints::from_options(options)?;
        Ok(Self { content, format, width, height, hints })
    }
}

// Encode
//------------------------------------------------------------------------------

/// Encodes with the built in writer. See [`encode_with`].
pub fn encode(options: &OptionMap, cfg: &EncoderConfig) -> BarcodeResult<PixelBuffer> {
    encode_with(&BuiltinWriter, options, cfg)
}

/// Validates `options`, runs `writer` and renders the resulting matrix. The
/// buffer has the matrix's actual size, read it back rather than assuming the
/// requested one.
pub fn encode_with<W: SymbolWriter + ?Sized>(
    writer: &W,
    options: &OptionMap,
    cfg: &EncoderConfig,
) -> BarcodeResult<PixelBuffer> {
    let req = EncodeRequest::from_options(options, cfg)?;
    debug!(
        "Encoding {} char(s) as {} at {}x{} with {} hint(s)",
        req.content.chars().count(),
        req.format,
        req.width,
        req.height,
        req.hints.len()
    );

    let matrix = writer.encode(&req.content, req.format, req.width, req.height, &req.hints)?;
    debug!("Rendering {}x{} matrix", matrix.width(), matrix.height());
    Ok(render(&matrix))
}
