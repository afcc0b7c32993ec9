use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    // Malformed or out of range option, crop or size
    #[error("invalid '{field}': {message}")]
    Validation { field: String, message: String },

    // Decode input that does not carry pixels
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    // Encoder could not produce a symbol
    #[error("codec failure: {0}")]
    Codec(String),
}

impl BarcodeError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Name of the offending option for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type BarcodeResult<T> = Result<T, BarcodeError>;

#[cfg(test)]
mod error_tests {
    use super::BarcodeError;

    #[test]
    fn test_validation_message_names_field() {
        let err = BarcodeError::validation("ALLOWED_LENGTHS", "must be a list of LONGs");
        assert_eq!(err.to_string(), "invalid 'ALLOWED_LENGTHS': must be a list of LONGs");
        assert_eq!(err.field(), Some("ALLOWED_LENGTHS"));
    }

    #[test]
    fn test_field_absent_for_other_kinds() {
        assert_eq!(BarcodeError::codec("boom").field(), None);
        assert_eq!(BarcodeError::UnsupportedInput("LONG".into()).field(), None);
    }
}
