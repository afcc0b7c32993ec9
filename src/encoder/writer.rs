use std::borrow::Cow;

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use qrcode::{Color, EcLevel, QrCode};

use crate::common::{BarcodeError, BarcodeFormat, BarcodeResult, BitMatrix, Value};

use super::hints::{EncodeHintType, EncodeHints};
use super::SymbolWriter;

const QR_QUIET_ZONE: u32 = 4;
const ONE_D_SIDES_MARGIN: u32 = 10;

// Built in writer
// QR through qrcode, Code 39 & Code 128 through barcoders
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinWriter;

impl SymbolWriter for BuiltinWriter {
    fn encode(
        &self,
        content: &str,
        format: BarcodeFormat,
        width: u32,
        height: u32,
        hints: &EncodeHints,
    ) -> BarcodeResult<BitMatrix> {
        if content.is_empty() {
            return Err(BarcodeError::codec("found empty contents"));
        }
        match format {
            BarcodeFormat::QrCode => encode_qr(content, width, height, hints),
            BarcodeFormat::Code39 | BarcodeFormat::Code128 => {
                encode_one_d(content, format, width, height, hints)
            }
            _ => Err(BarcodeError::codec(format!("no writer available for {format}"))),
        }
    }
}

fn ignore_unsupported(format: BarcodeFormat, hints: &EncodeHints, supported: &[EncodeHintType]) {
    hints
        .iter()
        .filter(|(ht, _)| !supported.contains(*ht))
        .for_each(|(ht, _)| debug!("Ignoring {ht}, not honoured when writing {format}"));
}

// Parses a pass through hint the way a script value prints, so 7 and "7" agree
fn int_hint(hints: &EncodeHints, ht: EncodeHintType) -> BarcodeResult<Option<i32>> {
    let Some(val) = hints.raw(ht) else { return Ok(None) };
    if let Some(v) = val.as_i32().filter(|_| matches!(val, Value::Long(_))) {
        return Ok(Some(v));
    }
    val.to_string()
        .trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|_| BarcodeError::validation(ht.name(), format!("'{val}' is not an integer")))
}

fn margin(hints: &EncodeHints, default: u32) -> BarcodeResult<u32> {
    match int_hint(hints, EncodeHintType::Margin)? {
        None => Ok(default),
        Some(m) => u32::try_from(m).map_err(|_| {
            BarcodeError::validation(EncodeHintType::Margin.name(), "must not be negative")
        }),
    }
}

fn content_bytes<'a>(content: &'a str, hints: &EncodeHints) -> BarcodeResult<Cow<'a, [u8]>> {
    let Some(label) = hints.raw(EncodeHintType::CharacterSet) else {
        return Ok(Cow::Borrowed(content.as_bytes()));
    };
    let label = label.to_string();
    let enc = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        BarcodeError::validation(
            EncodeHintType::CharacterSet.name(),
            format!("unknown character set '{label}'"),
        )
    })?;
    let (bytes, _, unmappable) = enc.encode(content);
    if unmappable {
        return Err(BarcodeError::codec(format!("content not representable in {}", enc.name())));
    }
    if enc != UTF_8 {
        debug!("Writing {} as plain byte mode, no ECI segment is emitted", enc.name());
    }
    Ok(bytes)
}

// QR
//------------------------------------------------------------------------------

fn ec_level(hints: &EncodeHints) -> BarcodeResult<EcLevel> {
    let Some(val) = hints.raw(EncodeHintType::ErrorCorrection) else { return Ok(EcLevel::L) };
    match val.to_string().as_str() {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => Err(BarcodeError::validation(
            EncodeHintType::ErrorCorrection.name(),
            format!("unknown level '{other}', expected L, M, Q or H"),
        )),
    }
}

fn encode_qr(content: &str, width: u32, height: u32, hints: &EncodeHints) -> BarcodeResult<BitMatrix> {
    use EncodeHintType::*;
    ignore_unsupported(
        BarcodeFormat::QrCode,
        hints,
        &[ErrorCorrection, CharacterSet, Margin, QrVersion],
    );

    let ecl = ec_level(hints)?;
    let quiet = margin(hints, QR_QUIET_ZONE)?;
    let bytes = content_bytes(content, hints)?;

    let code = match int_hint(hints, QrVersion)? {
        Some(v @ 1..=40) => {
            QrCode::with_version(bytes.as_ref(), qrcode::Version::Normal(v as i16), ecl)
        }
        Some(v) => {
            return Err(BarcodeError::validation(QrVersion.name(), format!("{v} not in 1..=40")))
        }
        None => QrCode::with_error_correction_level(bytes.as_ref(), ecl),
    }
    .map_err(|e| BarcodeError::codec(format!("QR encoding failed: {e:?}")))?;

    let side = code.width() as u32;
    let colors = code.to_colors();
    debug!("Encoded {} byte(s) into a {side}x{side} QR", bytes.len());

    let dark = |x: u32, y: u32| colors[(y * side + x) as usize] == Color::Dark;
    Ok(scale_2d(dark, side, side, width, height, quiet))
}

// Centres the symbol and scales modules by the largest integer factor that
// fits, the quiet zone stays light
fn scale_2d<F: Fn(u32, u32) -> bool>(
    dark: F,
    mod_w: u32,
    mod_h: u32,
    width: u32,
    height: u32,
    quiet: u32,
) -> BitMatrix {
    let (in_w, in_h) = (mod_w + 2 * quiet, mod_h + 2 * quiet);
    let (out_w, out_h) = (width.max(in_w), height.max(in_h));
    let multiple = (out_w / in_w).min(out_h / in_h).max(1);
    let left = (out_w - mod_w * multiple) / 2;
    let top = (out_h - mod_h * multiple) / 2;

    let mut matrix = BitMatrix::new(out_w, out_h);
    for y in 0..mod_h {
        for x in 0..mod_w {
            if dark(x, y) {
                matrix.set_region(left + x * multiple, top + y * multiple, multiple, multiple);
            }
        }
    }
    matrix
}

// One dimensional
//------------------------------------------------------------------------------

fn code128_prefix(hints: &EncodeHints) -> BarcodeResult<char> {
    let Some(val) = hints.raw(EncodeHintType::ForceCodeSet) else { return Ok('\u{0181}') };
    match val.to_string().as_str() {
        "A" => Ok('\u{00C0}'),
        "B" => Ok('\u{0181}'),
        "C" => Ok('\u{0106}'),
        other => Err(BarcodeError::validation(
            EncodeHintType::ForceCodeSet.name(),
            format!("unknown code set '{other}', expected A, B or C"),
        )),
    }
}

fn encode_one_d(
    content: &str,
    format: BarcodeFormat,
    width: u32,
    height: u32,
    hints: &EncodeHints,
) -> BarcodeResult<BitMatrix> {
    use EncodeHintType::*;

    let modules = match format {
        BarcodeFormat::Code39 => {
            ignore_unsupported(format, hints, &[Margin]);
            Code39::new(content).map(|c| c.encode())
        }
        _ => {
            ignore_unsupported(format, hints, &[Margin, ForceCodeSet]);
            let data = format!("{}{content}", code128_prefix(hints)?);
            Code128::new(&data).map(|c| c.encode())
        }
    }
    .map_err(|e| BarcodeError::codec(format!("{format} encoding failed: {e:?}")))?;

    let sides = margin(hints, ONE_D_SIDES_MARGIN)?;
    debug!("Encoded {format} into {} module(s)", modules.len());
    Ok(scale_1d(&modules, width, height, sides))
}

fn scale_1d(modules: &[u8], width: u32, height: u32, sides: u32) -> BitMatrix {
    let in_w = modules.len() as u32;
    let full_w = in_w + sides;
    let out_w = width.max(full_w);
    let out_h = height.max(1);
    let multiple = (out_w / full_w.max(1)).max(1);
    let left = (out_w - in_w * multiple) / 2;

    let mut matrix = BitMatrix::new(out_w, out_h);
    for (i, _) in modules.iter().enumerate().filter(|(_, m)| **m == 1) {
        matrix.set_region(left + i as u32 * multiple, 0, multiple, out_h);
    }
    matrix
}

#[cfg(test)]
mod writer_tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{scale_1d, scale_2d, BuiltinWriter};
    use crate::common::{options_from_json, BarcodeError, BarcodeFormat};
    use crate::encoder::{EncodeHints, SymbolWriter};

    fn hints(opts: serde_json::Value) -> EncodeHints {
        EncodeHints::from_options(&options_from_json(opts)).unwrap()
    }

    #[test]
    fn test_scale_2d_centres() {
        // 3x3 all dark symbol, 1 module quiet zone, 12x12 target
        let m = scale_2d(|_, _| true, 3, 3, 12, 12, 1);
        assert_eq!((m.width(), m.height()), (12, 12));
        // multiple = 12 / 5 = 2, padding = (12 - 6) / 2 = 3
        assert_eq!(m.count_set(), 36);
        assert!(m.get(3, 3) && m.get(8, 8));
        assert!(!m.get(2, 3) && !m.get(9, 8));
    }

    #[test]
    fn test_scale_2d_grows_to_fit() {
        let m = scale_2d(|_, _| false, 21, 21, 10, 10, 4);
        assert_eq!((m.width(), m.height()), (29, 29));
    }

    #[test]
    fn test_scale_1d() {
        let m = scale_1d(&[1, 0, 1], 26, 5, 10);
        // multiple = 26 / 13 = 2, padding = (26 - 6) / 2 = 10
        assert_eq!((m.width(), m.height()), (26, 5));
        assert!(m.get(10, 0) && m.get(11, 4));
        assert!(!m.get(12, 0) && !m.get(13, 0));
        assert!(m.get(14, 2) && m.get(15, 2));
        assert_eq!(m.count_set(), 4 * 5);
    }

    #[test]
    fn test_qr_natural_size() {
        let m = BuiltinWriter.encode("HELLO", BarcodeFormat::QrCode, 0, 0, &EncodeHints::new()).unwrap();
        // Version 1 plus the 4 module quiet zone on each side
        assert_eq!((m.width(), m.height()), (29, 29));
    }

    #[test]
    fn test_qr_version_and_margin() {
        let h = hints(json!({ "QR_VERSION": 3, "MARGIN": "0", "ERROR_CORRECTION": "H" }));
        let m = BuiltinWriter.encode("HELLO", BarcodeFormat::QrCode, 1, 1, &h).unwrap();
        assert_eq!(m.width(), 29);
    }

    #[test_case(json!({ "ERROR_CORRECTION": "X" }), "ERROR_CORRECTION"; "bad_ec")]
    #[test_case(json!({ "QR_VERSION": 41 }), "QR_VERSION"; "bad_version")]
    #[test_case(json!({ "MARGIN": -1 }), "MARGIN"; "negative_margin")]
    #[test_case(json!({ "CHARACTER_SET": "NOPE-1" }), "CHARACTER_SET"; "bad_charset")]
    fn test_qr_bad_hint(opts: serde_json::Value, field: &str) {
        let err = BuiltinWriter.encode("HELLO", BarcodeFormat::QrCode, 50, 50, &hints(opts)).unwrap_err();
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_empty_content_fails() {
        let err = BuiltinWriter.encode("", BarcodeFormat::QrCode, 50, 50, &EncodeHints::new());
        assert!(matches!(err, Err(BarcodeError::Codec(_))));
    }

    #[test]
    fn test_unsupported_format_fails() {
        let err = BuiltinWriter.encode("x", BarcodeFormat::Aztec, 50, 50, &EncodeHints::new());
        assert!(matches!(err, Err(BarcodeError::Codec(_))));
    }

    #[test_case(BarcodeFormat::Code39, "HELLO-39"; "code39")]
    #[test_case(BarcodeFormat::Code128, "Hello 128"; "code128")]
    fn test_one_d(format: BarcodeFormat, content: &str) {
        let m = BuiltinWriter.encode(content, format, 10, 20, &EncodeHints::new()).unwrap();
        assert_eq!(m.height(), 20);
        assert!(m.width() > 10);
        assert!(m.count_set() > 0);
        // Side margins stay light
        assert!((0..20).all(|y| !m.get(0, y) && !m.get(m.width() - 1, y)));
    }

    #[test_case("A", "HELLO"; "set_a")]
    #[test_case("B", "Hello"; "set_b")]
    #[test_case("C", "123456"; "set_c")]
    fn test_code128_forced_code_set(set: &str, content: &str) {
        let h = hints(json!({ "FORCE_CODE_SET": set }));
        let m = BuiltinWriter.encode(content, BarcodeFormat::Code128, 10, 10, &h).unwrap();
        assert!(m.count_set() > 0);
    }

    #[test]
    fn test_code128_bad_code_set() {
        let h = hints(json!({ "FORCE_CODE_SET": "D" }));
        let err = BuiltinWriter.encode("123", BarcodeFormat::Code128, 10, 10, &h).unwrap_err();
        assert_eq!(err.field(), Some("FORCE_CODE_SET"));
    }
}
