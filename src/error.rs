// src/error.rs
//! Error types for the GPS decoder

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GpsError>;

/// Crate-level errors: configuration and I/O around the decoder.
#[derive(Debug, Error)]
pub enum GpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for GpsError {
    fn from(error: anyhow::Error) -> Self {
        GpsError::Other(error.to_string())
    }
}

/// Why a single candidate sentence was rejected.
///
/// Never returned from [`NmeaDecoder::feed`](crate::NmeaDecoder::feed); every
/// variant ends up as an `InvalidSentence` notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing '*' checksum delimiter")]
    MissingChecksum,
    #[error("malformed checksum trailer {0:?}")]
    MalformedChecksum(String),
    #[error("checksum mismatch: calculated {calculated:02X}, found {found:02X}")]
    ChecksumMismatch { calculated: u8, found: u8 },
    #[error("sentence contains non-ASCII bytes")]
    NonAscii,
    #[error("malformed sentence header")]
    BadHeader,
    #[error("unknown sentence type {0:?}")]
    UnknownType(String),
    #[error("{sentence} expects {expected} fields, found {found}")]
    FieldCount {
        sentence: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("field {field} is empty")]
    EmptyField { field: &'static str },
    #[error("field {field} has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl DecodeError {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        DecodeError::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_renders_hex() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 0x05,
            found: 0xFF,
        };
        assert_eq!(err.to_string(), "checksum mismatch: calculated 05, found FF");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: GpsError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, GpsError::Other(ref msg) if msg == "boom"));
    }
}
