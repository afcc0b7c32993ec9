mod engine;
mod hints;
mod result;

pub use engine::{BuiltinReader, NotFound};
pub use hints::{DecodeHintType, DecodeHintValue, DecodeHints};
pub use result::{
    CodecResult, DecodeOutput, Decoded, MetadataValue, ResultMetadataType, ResultPoint,
};

use log::debug;

use crate::common::{BarcodeError, BarcodeResult, DecoderConfig, OptionMap, Value};
use crate::raster::{BinaryBitmap, CropRegion, PixelBuffer};

pub const CROP: &str = "crop";

// Symbol reader
//------------------------------------------------------------------------------

/// Decoding engine behind [`decode_with`].
pub trait SymbolReader {
    fn decode(&self, bitmap: &BinaryBitmap, hints: &DecodeHints) -> Result<CodecResult, NotFound>;
}

// Decode request
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest<'a> {
    pub buffer: &'a PixelBuffer,
    pub crop: Option<CropRegion>,
    pub hints: DecodeHints,
}

impl<'a> DecodeRequest<'a> {
    /// Maps the hints, then validates the crop against the buffer.
    pub fn from_options(buffer: &'a PixelBuffer, options: Option<&OptionMap>) -> BarcodeResult<Self> {
        let Some(options) = options else {
            return Ok(Self { buffer, crop: None, hints: DecodeHints::new() });
        };

        let hints = DecodeHints::from_options(options)?;
        let crop = match options.get(CROP) {
            Some(val) => Some(parse_crop(val, buffer)?),
            None => None,
        };
        Ok(Self { buffer, crop, hints })
    }
}

fn parse_crop(val: &Value, buffer: &PixelBuffer) -> BarcodeResult<CropRegion> {
    let err = || BarcodeError::validation(CROP, format!("expected a list of 4 LONGs, got {val}"));
    let Some([x, y, w, h]) = val.as_list().and_then(|l| <&[Value; 4]>::try_from(l).ok()) else {
        return Err(err());
    };
    let (Value::Long(x), Value::Long(y), Value::Long(w), Value::Long(h)) = (x, y, w, h) else {
        return Err(err());
    };
    CropRegion::checked(*x, *y, *w, *h, buffer.width(), buffer.height())
}

// Decode
//------------------------------------------------------------------------------

/// Decodes with the built in reader. See [`decode_with`].
pub fn decode(input: &Value, options: Option<&OptionMap>, cfg: &DecoderConfig) -> BarcodeResult<DecodeOutput> {
    decode_with(&BuiltinReader, input, options, cfg)
}

/// Reads a symbol from `input`, which must be an image. Finding nothing is not
/// an error, it yields [`DecodeOutput::Empty`].
pub fn decode_with<R: SymbolReader + ?Sized>(
    reader: &R,
    input: &Value,
    options: Option<&OptionMap>,
    cfg: &DecoderConfig,
) -> BarcodeResult<DecodeOutput> {
    let Value::Image(buffer) = input else {
        return Err(BarcodeError::UnsupportedInput(input.type_name().to_string()));
    };

    let req = DecodeRequest::from_options(buffer, options)?;
    debug!(
        "Decoding {}x{} image, crop {:?}, {} hint(s)",
        buffer.width(),
        buffer.height(),
        req.crop,
        req.hints.len()
    );

    let bitmap = BinaryBitmap::from_buffer(req.buffer, req.crop, cfg);
    match reader.decode(&bitmap, &req.hints) {
        Ok(res) => Ok(DecodeOutput::Found(Decoded::from_codec(&res))),
        Err(e) => {
            debug!("{e}");
            Ok(DecodeOutput::Empty)
        }
    }
}
