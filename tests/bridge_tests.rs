#[cfg(test)]
mod bridge_proptests {
    use proptest::prelude::*;
    use serde_json::json;

    use barcode_bridge::*;

    pub fn ec_level_strategy() -> BoxedStrategy<&'static str> {
        prop_oneof![Just("L"), Just("M"), Just("Q"), Just("H")].boxed()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_alphanumeric(ecl in ec_level_strategy(), data in r"[0-9A-Z$%*+\-./:]{1,40}") {
            let opts = options_from_json(json!({
                "content": data.clone(),
                "width": 400,
                "height": 400,
                "ERROR_CORRECTION": ecl,
            }));
            let img = Value::Image(encode(&opts, &EncoderConfig::default()).unwrap());

            let out = decode(&img, None, &DecoderConfig::default()).unwrap();
            let decoded = out.decoded().expect("Failed to read QR");

            prop_assert_eq!(&data, &decoded.text);
            prop_assert_eq!(data.as_bytes(), &decoded.raw_bytes[..]);
        }
    }
}

#[cfg(test)]
mod bridge_tests {
    use serde_json::json;
    use test_case::test_case;

    use barcode_bridge::reader::{MetadataValue, ResultMetadataType};
    use barcode_bridge::*;

    fn encode_qr(opts: serde_json::Value) -> PixelBuffer {
        encode(&options_from_json(opts), &EncoderConfig::default()).unwrap()
    }

    #[test_case("Hello, world!", "L"; "mixed_low")]
    #[test_case("TEST", "M"; "alnum_medium")]
    #[test_case("12345", "Q"; "numeric_quartile")]
    #[test_case("OK", "H"; "short_high")]
    fn test_qr_round_trip(data: &str, ecl: &str) {
        let buf = encode_qr(json!({ "content": data, "width": 200, "height": 200, "ERROR_CORRECTION": ecl }));
        let out = decode(&Value::Image(buf), None, &DecoderConfig::default()).unwrap();
        let decoded = out.decoded().expect("Failed to read QR");

        assert_eq!(decoded.format, BarcodeFormat::QrCode);
        assert_eq!(decoded.text, data);
        assert_eq!(decoded.num_bits, 8 * data.len() as u64);
        assert_eq!(
            decoded.metadata(ResultMetadataType::ErrorCorrectionLevel),
            Some(&MetadataValue::Text(ecl.to_string()))
        );
        assert_eq!(
            decoded.metadata(ResultMetadataType::SymbologyIdentifier),
            Some(&MetadataValue::Text("]Q1".to_string()))
        );
        assert_eq!(decoded.result_points.as_ref().map(|p| p.len()), Some(4));
    }

    #[test]
    fn test_crop_round_trip() {
        let symbol = encode_qr(json!({ "content": "CROPPED", "width": 200, "height": 200 }));
        let (sw, sh) = (symbol.width(), symbol.height());
        let (ox, oy) = (50, 70);

        // Non square canvas so a column-major offset would land elsewhere
        let mut canvas = PixelBuffer::new(sw + 150, sh + 90);
        for y in 0..sh {
            for x in 0..sw {
                canvas.put(x + ox, y + oy, symbol.get(x, y));
            }
        }

        let opts = options_from_json(json!({ "crop": [ox, oy, sw, sh] }));
        let out = decode(&Value::Image(canvas.clone()), Some(&opts), &DecoderConfig::default()).unwrap();
        let decoded = out.decoded().expect("Failed to read QR");
        assert_eq!(decoded.text, "CROPPED");

        // Corners are relative to the crop
        for [x, y] in decoded.result_points.clone().unwrap_or_default() {
            assert!((0.0..=sw as f64).contains(&x) && (0.0..=sh as f64).contains(&y));
        }

        // The caller's buffer is left untouched
        assert_eq!(canvas.get(ox, oy), symbol.get(0, 0));
    }

    #[test]
    fn test_character_set_round_trip() {
        let buf = encode_qr(json!({
            "content": "Grüße aus Köln",
            "width": 200,
            "height": 200,
            "CHARACTER_SET": "ISO-8859-1",
        }));
        let opts = options_from_json(json!({ "CHARACTER_SET": "ISO-8859-1" }));
        let out = decode(&Value::Image(buf), Some(&opts), &DecoderConfig::default()).unwrap();
        let decoded = out.decoded().expect("Failed to read QR");
        assert_eq!(decoded.text, "Grüße aus Köln");
        assert_eq!(decoded.raw_bytes.len(), "Grüße aus Köln".chars().count());
    }

    #[test]
    fn test_also_inverted() {
        let symbol = encode_qr(json!({ "content": "INVERTED", "width": 200, "height": 200 }));
        let pixels = symbol
            .pixels()
            .iter()
            .map(|&p| if p == 0xFF00_0000 { 0xFFFF_FFFF } else { 0xFF00_0000 })
            .collect();
        let inverted = PixelBuffer::from_pixels(symbol.width(), symbol.height(), pixels).unwrap();

        let opts = options_from_json(json!({ "ALSO_INVERTED": true }));
        let out = decode(&Value::Image(inverted), Some(&opts), &DecoderConfig::default()).unwrap();
        assert_eq!(out.decoded().map(|d| d.text.as_str()), Some("INVERTED"));
    }

    #[test]
    fn test_other_formats_excluded() {
        let buf = encode_qr(json!({ "content": "HELLO", "width": 200, "height": 200 }));
        let opts = options_from_json(json!({ "POSSIBLE_FORMATS": ["EAN_13", "CODE_128"] }));
        let out = decode(&Value::Image(buf), Some(&opts), &DecoderConfig::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_blank_image_is_empty_map() {
        let out = decode(&Value::Image(PixelBuffer::new(100, 100)), None, &DecoderConfig::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.to_json().unwrap(), "{}");
        assert_eq!(out.into_value(), Value::Map(Default::default()));
    }

    #[test]
    fn test_found_value_keys() {
        let buf = encode_qr(json!({ "content": "KEYS", "width": 200, "height": 200 }));
        let out = decode(&Value::Image(buf), None, &DecoderConfig::default()).unwrap();
        let Value::Map(map) = out.into_value() else { panic!("expected a map") };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["format", "numbits", "rawbytes", "text", "timestamp", "resultpoints", "metadata"]);

        let Value::Map(metadata) = &map["metadata"] else { panic!("expected a metadata map") };
        let kinds: Vec<_> = metadata.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["BYTE_SEGMENTS", "ERROR_CORRECTION_LEVEL", "SYMBOLOGY_IDENTIFIER"]);
        assert_eq!(map["format"], Value::from("QR_CODE"));
        assert_eq!(map["text"], Value::from("KEYS"));
    }

    #[test_case(json!({ "ALLOWED_LENGTHS": 6 }), "ALLOWED_LENGTHS"; "scalar_allowed_lengths")]
    #[test_case(json!({ "crop": [0, 0, 101, 10] }), "crop"; "crop_too_wide")]
    #[test_case(json!({ "crop": [90, 0, 20, 10] }), "crop"; "crop_past_edge")]
    #[test_case(json!({ "crop": [0, 0, 10] }), "crop"; "crop_three_values")]
    fn test_decode_rejected(opts: serde_json::Value, field: &str) {
        let img = Value::Image(PixelBuffer::new(100, 100));
        let err = decode(&img, Some(&options_from_json(opts)), &DecoderConfig::default()).unwrap_err();
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_decode_needs_image() {
        let err = decode(&Value::Bytes(vec![0; 16]), None, &DecoderConfig::default()).unwrap_err();
        assert_eq!(err, BarcodeError::UnsupportedInput("BYTES".to_string()));
    }

    #[test]
    fn test_encode_budget() {
        let opts = options_from_json(json!({ "content": "x", "width": 1001, "height": 1000 }));
        let err = encode(&opts, &EncoderConfig::default()).unwrap_err();
        assert_eq!(err.field(), Some("width*height"));
    }

    #[test_case("CODE_39", "CODE39"; "code_39")]
    #[test_case("CODE_128", "Code 128"; "code_128")]
    fn test_one_d(format: &str, content: &str) {
        let buf = encode_qr(json!({ "content": content, "format": format, "width": 300, "height": 80 }));
        assert!(buf.width() >= 300);
        assert_eq!(buf.height(), 80);
        // Every row carries the same bars
        let row = |y: u32| (0..buf.width()).map(|x| buf.get(x, y)).collect::<Vec<_>>();
        assert_eq!(row(0), row(79));
    }

    #[test]
    fn test_image_crate_interop() {
        let buf = encode_qr(json!({ "content": "PNG", "width": 100, "height": 100 }));
        let rgba = buf.to_rgba_image();
        assert_eq!(rgba.dimensions(), (buf.width(), buf.height()));
        assert_eq!(PixelBuffer::from_rgba_image(&rgba), buf);
    }
}
