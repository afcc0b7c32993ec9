use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::common::{BarcodeError, BarcodeFormat, BarcodeResult, OptionMap, Value};

// Decode hint identifiers
// Declaration order is the order options are validated in
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeHintType {
    Other,
    PureBarcode,
    PossibleFormats,
    TryHarder,
    CharacterSet,
    AllowedLengths,
    AssumeCode39CheckDigit,
    AssumeGs1,
    ReturnCodabarStartEnd,
    NeedResultPointCallback,
    AllowedEanExtensions,
    AlsoInverted,
}

impl DecodeHintType {
    pub const ALL: [DecodeHintType; 12] = [
        Self::Other,
        Self::PureBarcode,
        Self::PossibleFormats,
        Self::TryHarder,
        Self::CharacterSet,
        Self::AllowedLengths,
        Self::AssumeCode39CheckDigit,
        Self::AssumeGs1,
        Self::ReturnCodabarStartEnd,
        Self::NeedResultPointCallback,
        Self::AllowedEanExtensions,
        Self::AlsoInverted,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::PureBarcode => "PURE_BARCODE",
            Self::PossibleFormats => "POSSIBLE_FORMATS",
            Self::TryHarder => "TRY_HARDER",
            Self::CharacterSet => "CHARACTER_SET",
            Self::AllowedLengths => "ALLOWED_LENGTHS",
            Self::AssumeCode39CheckDigit => "ASSUME_CODE_39_CHECK_DIGIT",
            Self::AssumeGs1 => "ASSUME_GS1",
            Self::ReturnCodabarStartEnd => "RETURN_CODABAR_START_END",
            Self::NeedResultPointCallback => "NEED_RESULT_POINT_CALLBACK",
            Self::AllowedEanExtensions => "ALLOWED_EAN_EXTENSIONS",
            Self::AlsoInverted => "ALSO_INVERTED",
        }
    }

    fn is_flag(&self) -> bool {
        matches!(
            self,
            Self::PureBarcode
                | Self::TryHarder
                | Self::AssumeCode39CheckDigit
                | Self::AssumeGs1
                | Self::ReturnCodabarStartEnd
        )
    }
}

impl Display for DecodeHintType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Decode hint set
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeHintValue {
    Flag(bool),
    Text(String),
    Ints(Vec<i32>),
    Formats(Vec<BarcodeFormat>),
    // Left for the reader to interpret
    Raw(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeHints(BTreeMap<DecodeHintType, DecodeHintValue>);

impl DecodeHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every decode hint present in `options`, in declaration order,
    /// and stops at the first malformed one.
    pub fn from_options(options: &OptionMap) -> BarcodeResult<Self> {
        let mut hints = Self::new();
        for ht in DecodeHintType::ALL {
            if let Some(val) = options.get(ht.name()) {
                hints.insert(ht, map_hint(ht, val)?);
            }
        }
        debug!("Mapped {} decode hint(s)", hints.len());
        Ok(hints)
    }

    pub fn insert(&mut self, ht: DecodeHintType, hv: DecodeHintValue) -> &mut Self {
        self.0.insert(ht, hv);
        self
    }

    pub fn get(&self, ht: DecodeHintType) -> Option<&DecodeHintValue> {
        self.0.get(&ht)
    }

    pub fn contains(&self, ht: DecodeHintType) -> bool {
        self.0.contains_key(&ht)
    }

    // Absent flags read as false
    pub fn flag(&self, ht: DecodeHintType) -> bool {
        match self.0.get(&ht) {
            Some(DecodeHintValue::Flag(b)) => *b,
            Some(DecodeHintValue::Raw(v)) => v.is_true(),
            _ => false,
        }
    }

    pub fn character_set(&self) -> Option<&str> {
        match self.0.get(&DecodeHintType::CharacterSet) {
            Some(DecodeHintValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn ints(&self, ht: DecodeHintType) -> Option<&[i32]> {
        match self.0.get(&ht) {
            Some(DecodeHintValue::Ints(v)) => Some(v),
            _ => None,
        }
    }

    pub fn possible_formats(&self) -> Option<&[BarcodeFormat]> {
        match self.0.get(&DecodeHintType::PossibleFormats) {
            Some(DecodeHintValue::Formats(f)) => Some(f),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn map_hint(ht: DecodeHintType, val: &Value) -> BarcodeResult<DecodeHintValue> {
    let hv = match ht {
        _ if ht.is_flag() => DecodeHintValue::Flag(val.is_true()),
        DecodeHintType::CharacterSet => DecodeHintValue::Text(val.to_string()),
        DecodeHintType::AllowedLengths | DecodeHintType::AllowedEanExtensions => {
            let err = || BarcodeError::validation(ht.name(), "must be a list of LONGs");
            let list = val.as_list().ok_or_else(err)?;
            let ints = list
                .iter()
                .map(|v| match v {
                    Value::Long(l) => i32::try_from(*l).map_err(|_| err()),
                    _ => Err(err()),
                })
                .collect::<BarcodeResult<Vec<_>>>()?;
            DecodeHintValue::Ints(ints)
        }
        DecodeHintType::PossibleFormats => {
            let err = || BarcodeError::validation(ht.name(), "must be a list of STRINGs");
            let list = val.as_list().ok_or_else(err)?;
            let formats = list
                .iter()
                .map(|v| {
                    let name = v.as_str().ok_or_else(err)?;
                    name.parse::<BarcodeFormat>()
                        .map_err(|e| BarcodeError::validation(ht.name(), e.to_string()))
                })
                .collect::<BarcodeResult<Vec<_>>>()?;
            DecodeHintValue::Formats(formats)
        }
        _ => DecodeHintValue::Raw(val.clone()),
    };
    Ok(hv)
}

#[cfg(test)]
mod decode_hint_tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{DecodeHintType, DecodeHintValue, DecodeHints};
    use crate::common::{options_from_json, BarcodeFormat, Value};

    fn hints(opts: serde_json::Value) -> DecodeHints {
        DecodeHints::from_options(&options_from_json(opts)).unwrap()
    }

    #[test]
    fn test_flags_need_literal_true() {
        let h = hints(json!({ "TRY_HARDER": true, "PURE_BARCODE": "true", "ASSUME_GS1": 1 }));
        assert!(h.flag(DecodeHintType::TryHarder));
        assert!(!h.flag(DecodeHintType::PureBarcode));
        assert!(!h.flag(DecodeHintType::AssumeGs1));
        assert!(h.contains(DecodeHintType::AssumeGs1));
        assert!(!h.flag(DecodeHintType::ReturnCodabarStartEnd));
    }

    #[test]
    fn test_character_set_stringified() {
        let h = hints(json!({ "CHARACTER_SET": "ISO-8859-1" }));
        assert_eq!(h.character_set(), Some("ISO-8859-1"));
        let h = hints(json!({ "CHARACTER_SET": 1252 }));
        assert_eq!(h.character_set(), Some("1252"));
    }

    #[test]
    fn test_allowed_lengths() {
        let h = hints(json!({ "ALLOWED_LENGTHS": [6, 8, 10], "ALLOWED_EAN_EXTENSIONS": [] }));
        assert_eq!(h.ints(DecodeHintType::AllowedLengths), Some(&[6, 8, 10][..]));
        assert_eq!(h.ints(DecodeHintType::AllowedEanExtensions), Some(&[][..]));
    }

    #[test_case(json!({ "ALLOWED_LENGTHS": 6 }), "ALLOWED_LENGTHS"; "scalar_lengths")]
    #[test_case(json!({ "ALLOWED_LENGTHS": [6, 8.0] }), "ALLOWED_LENGTHS"; "double_in_lengths")]
    #[test_case(json!({ "ALLOWED_EAN_EXTENSIONS": ["2"] }), "ALLOWED_EAN_EXTENSIONS"; "string_in_extensions")]
    #[test_case(json!({ "ALLOWED_LENGTHS": [4294967296i64] }), "ALLOWED_LENGTHS"; "overflowing_length")]
    #[test_case(json!({ "POSSIBLE_FORMATS": "QR_CODE" }), "POSSIBLE_FORMATS"; "scalar_formats")]
    #[test_case(json!({ "POSSIBLE_FORMATS": ["QR_CODE", "BOGUS"] }), "POSSIBLE_FORMATS"; "unknown_format")]
    #[test_case(json!({ "POSSIBLE_FORMATS": [12] }), "POSSIBLE_FORMATS"; "number_format")]
    fn test_rejected(opts: serde_json::Value, field: &str) {
        let err = DecodeHints::from_options(&options_from_json(opts)).unwrap_err();
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_possible_formats() {
        let h = hints(json!({ "POSSIBLE_FORMATS": ["QR_CODE", "EAN_13"] }));
        assert_eq!(h.possible_formats(), Some(&[BarcodeFormat::QrCode, BarcodeFormat::Ean13][..]));
    }

    #[test]
    fn test_others_raw_and_unknown_ignored() {
        let h = hints(json!({ "ALSO_INVERTED": true, "OTHER": [1, "a"], "crop": [0, 0, 1, 1], "nope": 3 }));
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(DecodeHintType::AlsoInverted), Some(&DecodeHintValue::Raw(Value::Bool(true))));
        assert!(h.flag(DecodeHintType::AlsoInverted));
    }

    #[test]
    fn test_first_invalid_in_declaration_order() {
        // POSSIBLE_FORMATS is declared before ALLOWED_LENGTHS
        let opts = json!({ "ALLOWED_LENGTHS": "x", "POSSIBLE_FORMATS": "y" });
        let err = DecodeHints::from_options(&options_from_json(opts)).unwrap_err();
        assert_eq!(err.field(), Some("POSSIBLE_FORMATS"));
    }
}
