use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;

use crate::common::{BarcodeError, BarcodeResult, OptionMap, Value};

// Encode hint identifiers
// Declaration order is the order options are validated in
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EncodeHintType {
    ErrorCorrection,
    CharacterSet,
    DataMatrixShape,
    DataMatrixCompact,
    MinSize,
    MaxSize,
    Margin,
    Pdf417Compact,
    Pdf417Compaction,
    Pdf417Dimensions,
    Pdf417AutoEci,
    AztecLayers,
    QrVersion,
    QrMaskPattern,
    QrCompact,
    Gs1Format,
    ForceCodeSet,
    ForceC40,
    Code128Compact,
}

impl EncodeHintType {
    pub const ALL: [EncodeHintType; 19] = [
        Self::ErrorCorrection,
        Self::CharacterSet,
        Self::DataMatrixShape,
        Self::DataMatrixCompact,
        Self::MinSize,
        Self::MaxSize,
        Self::Margin,
        Self::Pdf417Compact,
        Self::Pdf417Compaction,
        Self::Pdf417Dimensions,
        Self::Pdf417AutoEci,
        Self::AztecLayers,
        Self::QrVersion,
        Self::QrMaskPattern,
        Self::QrCompact,
        Self::Gs1Format,
        Self::ForceCodeSet,
        Self::ForceC40,
        Self::Code128Compact,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ErrorCorrection => "ERROR_CORRECTION",
            Self::CharacterSet => "CHARACTER_SET",
            Self::DataMatrixShape => "DATA_MATRIX_SHAPE",
            Self::DataMatrixCompact => "DATA_MATRIX_COMPACT",
            Self::MinSize => "MIN_SIZE",
            Self::MaxSize => "MAX_SIZE",
            Self::Margin => "MARGIN",
            Self::Pdf417Compact => "PDF417_COMPACT",
            Self::Pdf417Compaction => "PDF417_COMPACTION",
            Self::Pdf417Dimensions => "PDF417_DIMENSIONS",
            Self::Pdf417AutoEci => "PDF417_AUTO_ECI",
            Self::AztecLayers => "AZTEC_LAYERS",
            Self::QrVersion => "QR_VERSION",
            Self::QrMaskPattern => "QR_MASK_PATTERN",
            Self::QrCompact => "QR_COMPACT",
            Self::Gs1Format => "GS1_FORMAT",
            Self::ForceCodeSet => "FORCE_CODE_SET",
            Self::ForceC40 => "FORCE_C40",
            Self::Code128Compact => "CODE128_COMPACT",
        }
    }
}

impl Display for EncodeHintType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Data matrix shape
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolShape {
    ForceNone,
    ForceSquare,
    ForceRectangle,
}

impl FromStr for SymbolShape {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORCE_NONE" => Ok(Self::ForceNone),
            "FORCE_SQUARE" => Ok(Self::ForceSquare),
            "FORCE_RECTANGLE" => Ok(Self::ForceRectangle),
            _ => Err(()),
        }
    }
}

// PDF417 dimensions
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub min_cols: i32,
    pub max_cols: i32,
    pub min_rows: i32,
    pub max_rows: i32,
}

// Encode hint set
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EncodeHintValue {
    Shape(SymbolShape),
    Dimensions(Dimensions),
    // Left for the writer to interpret
    Raw(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeHints(BTreeMap<EncodeHintType, EncodeHintValue>);

impl EncodeHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every encode hint present in `options`, in declaration order,
    /// and stops at the first malformed one.
    pub fn from_options(options: &OptionMap) -> BarcodeResult<Self> {
        let mut hints = Self::new();
        for ht in EncodeHintType::ALL {
            let Some(val) = options.get(ht.name()) else { continue };
            if let Some(hv) = map_hint(ht, val)? {
                hints.insert(ht, hv);
            }
        }
        debug!("Mapped {} encode hint(s)", hints.len());
        Ok(hints)
    }

    pub fn insert(&mut self, ht: EncodeHintType, hv: EncodeHintValue) -> &mut Self {
        self.0.insert(ht, hv);
        self
    }

    pub fn get(&self, ht: EncodeHintType) -> Option<&EncodeHintValue> {
        self.0.get(&ht)
    }

    pub fn contains(&self, ht: EncodeHintType) -> bool {
        self.0.contains_key(&ht)
    }

    pub fn raw(&self, ht: EncodeHintType) -> Option<&Value> {
        match self.0.get(&ht) {
            Some(EncodeHintValue::Raw(v)) => Some(v),
            _ => None,
        }
    }

    pub fn shape(&self) -> Option<SymbolShape> {
        match self.0.get(&EncodeHintType::DataMatrixShape) {
            Some(EncodeHintValue::Shape(s)) => Some(*s),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        match self.0.get(&EncodeHintType::Pdf417Dimensions) {
            Some(EncodeHintValue::Dimensions(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EncodeHintType, &EncodeHintValue)> {
        self.0.iter()
    }
}

fn map_hint(ht: EncodeHintType, val: &Value) -> BarcodeResult<Option<EncodeHintValue>> {
    let hv = match ht {
        EncodeHintType::DataMatrixShape => {
            let name = val.to_string();
            let shape = name.parse::<SymbolShape>().map_err(|_| {
                BarcodeError::validation(
                    ht.name(),
                    format!("unknown shape '{name}', expected FORCE_NONE, FORCE_SQUARE or FORCE_RECTANGLE"),
                )
            })?;
            EncodeHintValue::Shape(shape)
        }
        EncodeHintType::Pdf417Dimensions => {
            // Anything but a 4 element list is dropped, not rejected
            let Some([a, b, c, d]) = val.as_list().and_then(|l| <&[Value; 4]>::try_from(l).ok())
            else {
                debug!("Skipping {ht}, expected a list of 4 numbers, got {val}");
                return Ok(None);
            };
            let dim = |v: &Value| {
                v.as_i32().ok_or_else(|| {
                    BarcodeError::validation(ht.name(), format!("'{v}' is not a number"))
                })
            };
            EncodeHintValue::Dimensions(Dimensions {
                min_cols: dim(a)?,
                max_cols: dim(b)?,
                min_rows: dim(c)?,
                max_rows: dim(d)?,
            })
        }
        _ => EncodeHintValue::Raw(val.clone()),
    };
    Ok(Some(hv))
}
