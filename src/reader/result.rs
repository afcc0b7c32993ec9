use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::common::{BarcodeFormat, Value, ValueMap};

pub const FORMAT: &str = "format";
pub const NUMBITS: &str = "numbits";
pub const RAWBYTES: &str = "rawbytes";
pub const TEXT: &str = "text";
pub const TIMESTAMP: &str = "timestamp";
pub const RESULTPOINTS: &str = "resultpoints";
pub const METADATA: &str = "metadata";

// Result metadata kinds
// Declaration order is the order they appear in a normalized result
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultMetadataType {
    Other,
    Orientation,
    ByteSegments,
    ErrorCorrectionLevel,
    ErrorsCorrected,
    ErasuresCorrected,
    IssueNumber,
    SuggestedPrice,
    PossibleCountry,
    UpcEanExtension,
    Pdf417ExtraMetadata,
    StructuredAppendSequence,
    StructuredAppendParity,
    SymbologyIdentifier,
}

impl ResultMetadataType {
    pub const ALL: [ResultMetadataType; 14] = [
        Self::Other,
        Self::Orientation,
        Self::ByteSegments,
        Self::ErrorCorrectionLevel,
        Self::ErrorsCorrected,
        Self::ErasuresCorrected,
        Self::IssueNumber,
        Self::SuggestedPrice,
        Self::PossibleCountry,
        Self::UpcEanExtension,
        Self::Pdf417ExtraMetadata,
        Self::StructuredAppendSequence,
        Self::StructuredAppendParity,
        Self::SymbologyIdentifier,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::Orientation => "ORIENTATION",
            Self::ByteSegments => "BYTE_SEGMENTS",
            Self::ErrorCorrectionLevel => "ERROR_CORRECTION_LEVEL",
            Self::ErrorsCorrected => "ERRORS_CORRECTED",
            Self::ErasuresCorrected => "ERASURES_CORRECTED",
            Self::IssueNumber => "ISSUE_NUMBER",
            Self::SuggestedPrice => "SUGGESTED_PRICE",
            Self::PossibleCountry => "POSSIBLE_COUNTRY",
            Self::UpcEanExtension => "UPC_EAN_EXTENSION",
            Self::Pdf417ExtraMetadata => "PDF417_EXTRA_METADATA",
            Self::StructuredAppendSequence => "STRUCTURED_APPEND_SEQUENCE",
            Self::StructuredAppendParity => "STRUCTURED_APPEND_PARITY",
            Self::SymbologyIdentifier => "SYMBOLOGY_IDENTIFIER",
        }
    }
}

impl Display for ResultMetadataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Codec result
// What a reader hands back for a located symbol, metadata in the order the
// reader produced it
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultPoint {
    pub x: f32,
    pub y: f32,
}

impl ResultPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodecResult {
    pub format: BarcodeFormat,
    pub text: String,
    pub raw_bytes: Vec<u8>,
    pub num_bits: u64,
    pub points: Option<Vec<ResultPoint>>,
    pub metadata: Vec<(ResultMetadataType, Value)>,
    pub timestamp: i64,
}

impl CodecResult {
    pub fn new(format: BarcodeFormat, text: String, raw_bytes: Vec<u8>) -> Self {
        let num_bits = 8 * raw_bytes.len() as u64;
        Self { format, text, raw_bytes, num_bits, points: None, metadata: Vec::new(), timestamp: now_millis() }
    }

    pub fn with_points(mut self, points: Vec<ResultPoint>) -> Self {
        self.points = Some(points);
        self
    }

    // Later entries of the same kind replace earlier ones
    pub fn put_metadata(&mut self, kind: ResultMetadataType, val: Value) -> &mut Self {
        self.metadata.retain(|(k, _)| *k != kind);
        self.metadata.push((kind, val));
        self
    }

    fn metadata_value(&self, kind: ResultMetadataType) -> Option<&Value> {
        self.metadata.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

// Normalized metadata
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Text(String),
    ByteSegments(Vec<Vec<u8>>),
    Opaque(Value),
}

impl MetadataValue {
    fn normalize(kind: ResultMetadataType, val: &Value) -> Self {
        use ResultMetadataType::*;
        match kind {
            ByteSegments => match byte_segments(val) {
                Some(segs) => Self::ByteSegments(segs),
                None => Self::Opaque(val.clone()),
            },
            PossibleCountry | SuggestedPrice | UpcEanExtension => Self::Opaque(val.clone()),
            IssueNumber | Orientation => match val.as_i64() {
                Some(v) => Self::Integer(v),
                None => {
                    warn!("{kind} metadata '{val}' is not numeric, keeping it as text");
                    Self::Text(val.to_string())
                }
            },
            _ => Self::Text(val.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Integer(v) => Value::Long(v),
            Self::Text(s) => Value::String(s),
            Self::ByteSegments(segs) => Value::List(segs.into_iter().map(Value::Bytes).collect()),
            Self::Opaque(v) => v,
        }
    }
}

fn byte_segments(val: &Value) -> Option<Vec<Vec<u8>>> {
    val.as_list()?
        .iter()
        .map(|seg| match seg {
            Value::Bytes(b) => Some(b.clone()),
            _ => None,
        })
        .collect()
}

// Decoded symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub format: BarcodeFormat,
    pub num_bits: u64,
    pub raw_bytes: Vec<u8>,
    pub text: String,
    pub timestamp: i64,
    pub result_points: Option<Vec<[f64; 2]>>,
    pub metadata: Vec<(ResultMetadataType, MetadataValue)>,
}

impl Decoded {
    /// Walks the metadata kinds once in declaration order, so the output order
    /// never depends on how the reader inserted them.
    pub fn from_codec(res: &CodecResult) -> Self {
        let metadata = ResultMetadataType::ALL
            .into_iter()
            .filter_map(|kind| {
                res.metadata_value(kind).map(|v| (kind, MetadataValue::normalize(kind, v)))
            })
            .collect();

        let result_points = res
            .points
            .as_ref()
            .map(|pts| pts.iter().map(|p| [f64::from(p.x), f64::from(p.y)]).collect());

        Self {
            format: res.format,
            num_bits: res.num_bits,
            raw_bytes: res.raw_bytes.clone(),
            text: res.text.clone(),
            timestamp: res.timestamp,
            result_points,
            metadata,
        }
    }

    pub fn metadata(&self, kind: ResultMetadataType) -> Option<&MetadataValue> {
        self.metadata.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }
}

struct MetadataMap<'a>(&'a [(ResultMetadataType, MetadataValue)]);

impl Serialize for MetadataMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k.name(), v)?;
        }
        map.end()
    }
}

impl Serialize for Decoded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.result_points.is_some() { 7 } else { 6 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(FORMAT, self.format.name())?;
        map.serialize_entry(NUMBITS, &self.num_bits)?;
        map.serialize_entry(RAWBYTES, &self.raw_bytes)?;
        map.serialize_entry(TEXT, &self.text)?;
        map.serialize_entry(TIMESTAMP, &self.timestamp)?;
        if let Some(pts) = &self.result_points {
            map.serialize_entry(RESULTPOINTS, pts)?;
        }
        map.serialize_entry(METADATA, &MetadataMap(&self.metadata))?;
        map.end()
    }
}

// Decode output
// Empty is the ordinary outcome when no symbol is found
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DecodeOutput {
    #[default]
    Empty,
    Found(Decoded),
}

impl DecodeOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn decoded(&self) -> Option<&Decoded> {
        match self {
            Self::Found(d) => Some(d),
            Self::Empty => None,
        }
    }

    /// Keys come out in the same order as [`DecodeOutput::to_json`] writes them.
    pub fn into_value(self) -> Value {
        let Self::Found(d) = self else { return Value::Map(ValueMap::new()) };

        let mut out = ValueMap::new();
        out.insert(FORMAT.to_string(), Value::from(d.format.name()));
        out.insert(NUMBITS.to_string(), Value::Long(i64::try_from(d.num_bits).unwrap_or(i64::MAX)));
        out.insert(RAWBYTES.to_string(), Value::Bytes(d.raw_bytes));
        out.insert(TEXT.to_string(), Value::String(d.text));
        out.insert(TIMESTAMP.to_string(), Value::Long(d.timestamp));
        if let Some(pts) = d.result_points {
            let pts = pts
                .into_iter()
                .map(|[x, y]| Value::List(vec![Value::Double(x), Value::Double(y)]))
                .collect();
            out.insert(RESULTPOINTS.to_string(), Value::List(pts));
        }
        let metadata =
            d.metadata.into_iter().map(|(k, v)| (k.name().to_string(), v.into_value())).collect();
        out.insert(METADATA.to_string(), Value::Map(metadata));
        Value::Map(out)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for DecodeOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_map(Some(0))?.end(),
            Self::Found(d) => d.serialize(serializer),
        }
    }
}
