//! Error types for event ingestion
//!
//! Row-level parse failures are warned and dropped by the reader; they
//! never reach a book. Domain failures (unknown id, zero-fill market) are
//! not errors at all — they surface as REJECTED result records.

use thiserror::Error;

/// A single input row failed schema validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("mandatory field '{0}' missing or empty")]
    MissingField(&'static str),

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = ParseError::MissingField("price");
        assert_eq!(err.to_string(), "mandatory field 'price' missing or empty");
    }

    #[test]
    fn test_invalid_field_display() {
        let err = ParseError::InvalidField {
            field: "side",
            value: "HOLD".to_string(),
        };
        assert!(err.to_string().contains("side"));
        assert!(err.to_string().contains("HOLD"));
    }
}
