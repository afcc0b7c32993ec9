use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, trace};
use thiserror::Error;

use super::hints::{DecodeHintType, DecodeHints};
use super::result::{CodecResult, ResultMetadataType, ResultPoint};
use super::SymbolReader;
use crate::common::{BarcodeFormat, BitMatrix, Value};
use crate::raster::BinaryBitmap;

/// Raised by a [`SymbolReader`] when the bitmap holds no readable symbol. The
/// decode flow turns it into an empty output instead of an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no barcode found: {reason}")]
pub struct NotFound {
    pub reason: String,
}

impl NotFound {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

// Built in reader
// Locates and decodes QR symbols. Views are tried in order:
// 1. Block thresholded matrix
// 2. Otsu thresholded matrix, with TRY_HARDER
// 3. Inverted matrix, with ALSO_INVERTED
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinReader;

impl SymbolReader for BuiltinReader {
    fn decode(&self, bitmap: &BinaryBitmap, hints: &DecodeHints) -> Result<CodecResult, NotFound> {
        if let Some(formats) = hints.possible_formats() {
            if !formats.contains(&BarcodeFormat::QrCode) {
                return Err(NotFound::new("none of the possible formats can be read"));
            }
        }

        let mut views = vec![("block", bitmap.matrix().clone())];
        if hints.flag(DecodeHintType::TryHarder) {
            views.push(("otsu", bitmap.global_threshold()));
        }
        if hints.flag(DecodeHintType::AlsoInverted) {
            views.push(("inverted", bitmap.inverted()));
        }

        let mut last_err = NotFound::new("no finder patterns located");
        for (name, matrix) in &views {
            match read_qr(matrix, hints) {
                Ok(res) => {
                    debug!("Decoded {} byte(s) from {name} view", res.raw_bytes.len());
                    return Ok(res);
                }
                Err(e) => {
                    trace!("Nothing in {name} view: {}", e.reason);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

fn read_qr(matrix: &BitMatrix, hints: &DecodeHints) -> Result<CodecResult, NotFound> {
    let (w, h) = (matrix.width() as usize, matrix.height() as usize);
    let mut img = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| {
        if matrix.get(x as u32, y as u32) {
            0
        } else {
            255
        }
    });

    let grids = img.detect_grids();
    trace!("Located {} candidate grid(s)", grids.len());
    if grids.is_empty() {
        return Err(NotFound::new("no finder patterns located"));
    }

    let mut last_err = NotFound::new("no grid could be decoded");
    for grid in &grids {
        let mut raw = Vec::new();
        let meta = match grid.decode_to(&mut raw) {
            Ok(meta) => meta,
            Err(e) => {
                trace!("Grid rejected: {e}");
                last_err = NotFound::new(e.to_string());
                continue;
            }
        };

        let text = decode_text(&raw, hints.character_set());
        let points = grid.bounds.iter().map(|p| ResultPoint::new(p.x as f32, p.y as f32)).collect();

        let mut res = CodecResult::new(BarcodeFormat::QrCode, text, raw.clone()).with_points(points);
        res.put_metadata(ResultMetadataType::ByteSegments, Value::List(vec![Value::Bytes(raw)]))
            .put_metadata(ResultMetadataType::ErrorCorrectionLevel, Value::from(ec_name(meta.ecc_level)))
            .put_metadata(ResultMetadataType::SymbologyIdentifier, Value::from("]Q1"));
        return Ok(res);
    }
    Err(last_err)
}

// Format bits order the levels M, L, H, Q
fn ec_name(bits: u16) -> &'static str {
    match bits & 0b11 {
        0 => "M",
        1 => "L",
        2 => "H",
        _ => "Q",
    }
}

fn decode_text(raw: &[u8], charset: Option<&str>) -> String {
    if let Some(label) = charset {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(enc) => return enc.decode_without_bom_handling(raw).0.into_owned(),
            None => debug!("Unknown character set '{label}', guessing instead"),
        }
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(raw) {
        Some(text) => text.into_owned(),
        None => WINDOWS_1252.decode_without_bom_handling(raw).0.into_owned(),
    }
}
