// src/gps/sentence.rs
//! Sentence framing: checksum validation, header split and field tokenizing

use crate::error::DecodeError;
use std::fmt;

/// Sentence types this crate decodes, keyed by the 3-letter type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceType {
    Gga,
    Gll,
    Rmc,
    Gsv,
    Gsa,
}

impl SentenceType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GGA" => Some(SentenceType::Gga),
            "GLL" => Some(SentenceType::Gll),
            "RMC" => Some(SentenceType::Rmc),
            "GSV" => Some(SentenceType::Gsv),
            "GSA" => Some(SentenceType::Gsa),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SentenceType::Gga => "GGA",
            SentenceType::Gll => "GLL",
            SentenceType::Rmc => "RMC",
            SentenceType::Gsv => "GSV",
            SentenceType::Gsa => "GSA",
        }
    }
}

impl fmt::Display for SentenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A checksum-verified sentence split into header and fields.
///
/// Borrows from the decoder's pending buffer, so it only lives for one
/// decode step.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentence<'a> {
    /// Two-letter source, e.g. `GP` or `GN`
    pub talker: &'a str,
    /// Three-letter type code, e.g. `GGA`
    pub type_code: &'a str,
    pub fields: Vec<&'a str>,
    pub checksum: u8,
}

impl<'a> RawSentence<'a> {
    /// Validate and tokenize a candidate running from `$` up to, not including, CR LF.
    pub fn parse(candidate: &'a [u8]) -> Result<Self, DecodeError> {
        let body = candidate.strip_prefix(b"$").ok_or(DecodeError::BadHeader)?;

        let star = body
            .iter()
            .position(|&b| b == b'*')
            .ok_or(DecodeError::MissingChecksum)?;
        let (payload, trailer) = (&body[..star], &body[star + 1..]);

        let found = parse_hex_pair(trailer).ok_or_else(|| {
            DecodeError::MalformedChecksum(String::from_utf8_lossy(trailer).into_owned())
        })?;
        let calculated = checksum(payload);
        if calculated != found {
            return Err(DecodeError::ChecksumMismatch { calculated, found });
        }

        let payload = std::str::from_utf8(payload)
            .ok()
            .filter(|s| s.is_ascii())
            .ok_or(DecodeError::NonAscii)?;

        if payload.len() < 5 || !payload[..5].bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DecodeError::BadHeader);
        }
        let (header, rest) = payload.split_at(5);

        let fields = if rest.is_empty() {
            Vec::new()
        } else {
            rest.strip_prefix(',')
                .ok_or(DecodeError::BadHeader)?
                .split(',')
                .collect()
        };

        Ok(Self {
            talker: &header[..2],
            type_code: &header[2..],
            fields,
            checksum: found,
        })
    }

    pub fn sentence_type(&self) -> Option<SentenceType> {
        SentenceType::from_code(self.type_code)
    }
}

/// XOR of every byte between `$` and `*`.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, b| acc ^ b)
}

/// Frame a payload as a complete sentence, `$<payload>*HH\r\n`.
pub fn format_sentence(payload: &str) -> String {
    format!("${}*{:02X}\r\n", payload, checksum(payload.as_bytes()))
}

// Only the two characters after `*` are significant
fn parse_hex_pair(trailer: &[u8]) -> Option<u8> {
    let pair = trailer.get(..2)?;
    if !pair.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let text = std::str::from_utf8(pair).ok()?;
    u8::from_str_radix(text, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_sentences() {
        assert_eq!(checksum(b"GPGSV,1,1,1,8,0,0,0"), 0x40);
        assert_eq!(checksum(b"GPGSA,A,1,,,,,,,,,,,,,50.0,50.0,50.0"), 0x05);
    }

    #[test]
    fn test_hex_trailer() {
        assert_eq!(parse_hex_pair(b"F0"), Some(240));
        assert_eq!(parse_hex_pair(b"f0"), Some(240));
        assert_eq!(parse_hex_pair(b"+F"), None);
        assert_eq!(parse_hex_pair(b"F"), None);
        assert_eq!(parse_hex_pair(b"F00"), Some(240));
        assert_eq!(parse_hex_pair(b"40 "), Some(0x40));
    }

    #[test]
    fn test_bytes_after_checksum_ignored() {
        let raw = RawSentence::parse(b"$GPGSV,1,1,1,8,0,0,0*40 ").unwrap();
        assert_eq!(raw.checksum, 0x40);
        assert_eq!(raw.fields.len(), 7);
    }

    #[test]
    fn test_parse_splits_header_and_fields() {
        let raw = RawSentence::parse(b"$GPGSV,1,1,1,8,0,0,0*40").unwrap();
        assert_eq!(raw.talker, "GP");
        assert_eq!(raw.type_code, "GSV");
        assert_eq!(raw.sentence_type(), Some(SentenceType::Gsv));
        assert_eq!(raw.fields, vec!["1", "1", "1", "8", "0", "0", "0"]);
        assert_eq!(raw.checksum, 0x40);
    }

    #[test]
    fn test_parse_keeps_empty_fields() {
        let raw = RawSentence::parse(b"$GPGSA,A,1,,,,,,,,,,,,,50.0,50.0,50.0*05").unwrap();
        assert_eq!(raw.fields.len(), 17);
        assert!(raw.fields[2..14].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_lowercase_checksum_accepted() {
        let raw = RawSentence::parse(b"$GPGGA,191630.609,3848.2905,N,09018.4239,W,1,06,1.3,132.0,M,-33.7,M,0.0,0000*48");
        assert!(raw.is_ok());
        let sentence = b"$GPGSV,3,1,10,18,62,311,37,15,47,49,40,14,16,218,30,29,11,186,28*4a";
        assert!(RawSentence::parse(sentence).is_ok());
    }

    #[test]
    fn test_checksum_failures() {
        assert_eq!(
            RawSentence::parse(b"$not a valid sentence"),
            Err(DecodeError::MissingChecksum)
        );
        assert_eq!(
            RawSentence::parse(b"$GPGSA,A,1,,,,,,,,,,,,,50.0,50.0,50.0*FF"),
            Err(DecodeError::ChecksumMismatch {
                calculated: 0x05,
                found: 0xFF
            })
        );
        assert!(matches!(
            RawSentence::parse(b"$GPGSV,1,1,1,8,0,0,0*"),
            Err(DecodeError::MalformedChecksum(_))
        ));
    }

    #[test]
    fn test_bad_header() {
        let framed = format_sentence("GP");
        let candidate = framed.trim_end().as_bytes();
        assert_eq!(RawSentence::parse(candidate), Err(DecodeError::BadHeader));

        let framed = format_sentence("GPGGAX,1");
        let candidate = framed.trim_end().as_bytes();
        assert_eq!(RawSentence::parse(candidate), Err(DecodeError::BadHeader));
    }

    #[test]
    fn test_format_sentence() {
        assert_eq!(format_sentence("GPGSV,1,1,1,8,0,0,0"), "$GPGSV,1,1,1,8,0,0,0*40\r\n");
    }
}
