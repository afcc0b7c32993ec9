//! # barcode-bridge
//!
//! Glue between a host that speaks loosely typed option maps and barcode codecs.
//! Options become typed encode and decode hints, pixels move between ARGB rasters
//! and bit matrices, and decode results come back as one generic map.
//!
//! ## Features
//!
//! - **Hint mapping**: Validates option maps into typed encode/decode hints, rejecting the first malformed entry
//! - **Raster bridge**: Renders bit matrices as ARGB buffers and turns ARGB buffers (optionally cropped) into binarized bitmaps
//! - **Result normalization**: Flattens a decode result into a map with metadata in a stable order
//! - **Pluggable codecs**: Bring your own writer or reader through [`SymbolWriter`] and [`SymbolReader`]
//!
//! ## Quick Start
//!
//! ### Encoding
//!
//! ```rust
//! use barcode_bridge::{encode, options_from_json, EncoderConfig};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = options_from_json(json!({
//!     "content": "HELLO",
//!     "format": "QR_CODE",
//!     "width": 200,
//!     "height": 200,
//!     "ERROR_CORRECTION": "M",
//! }));
//! let buf = encode(&opts, &EncoderConfig::default())?;
//!
//! // The buffer may be larger than asked for, always read its size back
//! assert!(buf.width() >= 200);
//! # Ok(())
//! # }
//! ```
//!
//! ### Decoding
//!
//! ```rust
//! use barcode_bridge::{decode, encode, options_from_json, DecoderConfig, EncoderConfig, Value};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = options_from_json(json!({ "content": "HELLO", "width": 200, "height": 200 }));
//! let img = Value::Image(encode(&opts, &EncoderConfig::default())?);
//!
//! let out = decode(&img, None, &DecoderConfig::default())?;
//! assert_eq!(out.decoded().map(|d| d.text.as_str()), Some("HELLO"));
//! println!("{}", out.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Configuration
//!
//! ```rust
//! use barcode_bridge::{BarcodeFormat, EncoderConfig};
//!
//! let mut cfg = EncoderConfig::new();
//! cfg.max_pixels(250_000)                     // Largest width * height accepted
//!     .default_format(BarcodeFormat::Code128) // Used when "format" is absent
//!     .default_size(300, 80);                 // Used when "width"/"height" are absent
//! ```
//!
//! ## Option Keys
//!
//! ### Encoding
//! - **format**: Symbology name, defaults to `QR_CODE`
//! - **width**, **height**: Requested size in pixels, default 50 each
//! - **content**: Text to encode, required
//! - Any encode hint name, e.g. `ERROR_CORRECTION`, `MARGIN`, `QR_VERSION`
//!
//! ### Decoding
//! - **crop**: `[x, y, w, h]` rectangle inside the image
//! - Any decode hint name, e.g. `TRY_HARDER`, `POSSIBLE_FORMATS`, `CHARACTER_SET`
//!
//! ## Built in Codecs
//!
//! The built in writer produces QR codes, Code 39 and Code 128. The built in
//! reader reads QR codes. Every other symbology is recognised by name, so its
//! hints validate, but needs a custom codec.

pub(crate) mod common;
pub mod encoder;
pub mod raster;
pub mod reader;

pub use common::{
    options_from_json, BarcodeError, BarcodeFormat, BarcodeResult, BitMatrix, DecoderConfig,
    EncoderConfig, OptionMap, UnknownFormat, Value, ValueMap,
};
pub use encoder::{encode, encode_with, SymbolWriter};
pub use raster::PixelBuffer;
pub use reader::{decode, decode_with, DecodeOutput, SymbolReader};
