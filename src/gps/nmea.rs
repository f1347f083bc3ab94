// src/gps/nmea.rs
//! NMEA sentence decoding

use super::convert::{parse_coordinate, parse_date, parse_or, parse_time, Axis};
use super::data::{
    ActiveSatellites, AltitudeFix, CourseFix, FixStatus, NmeaEvent, PositionFix,
    SatelliteInfo, SatelliteVisibility,
};
use super::decoder::EventSink;
use super::sentence::{RawSentence, SentenceType};
use crate::error::DecodeError;
use std::str::FromStr;

/// The typed result of decoding one sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedSentence {
    Gga(PositionFix, AltitudeFix),
    Gll(PositionFix),
    Rmc(PositionFix, CourseFix),
    Gsv(SatelliteVisibility),
    Gsa(ActiveSatellites),
}

impl DecodedSentence {
    pub fn sentence_type(&self) -> SentenceType {
        match self {
            DecodedSentence::Gga(..) => SentenceType::Gga,
            DecodedSentence::Gll(_) => SentenceType::Gll,
            DecodedSentence::Rmc(..) => SentenceType::Rmc,
            DecodedSentence::Gsv(_) => SentenceType::Gsv,
            DecodedSentence::Gsa(_) => SentenceType::Gsa,
        }
    }

    /// Emit the events for this sentence, position first
    pub fn deliver<S: EventSink + ?Sized>(self, sink: &mut S) {
        match self {
            DecodedSentence::Gga(position, altitude) => {
                sink.position_fix(position);
                sink.altitude_fix(altitude);
            }
            DecodedSentence::Gll(position) => sink.position_fix(position),
            DecodedSentence::Rmc(position, course) => {
                sink.position_fix(position);
                sink.course_fix(course);
            }
            DecodedSentence::Gsv(view) => sink.satellite_visibility(view),
            DecodedSentence::Gsa(active) => sink.active_satellites(active),
        }
    }

    pub fn into_events(self) -> Vec<NmeaEvent> {
        let mut events = Vec::with_capacity(2);
        self.deliver(&mut events);
        events
    }
}

/// Decode a single sentence, `$` through checksum, without the line terminator.
pub fn parse_nmea_sentence(line: &[u8]) -> Result<DecodedSentence, DecodeError> {
    let raw = RawSentence::parse(line)?;
    let kind = raw
        .sentence_type()
        .ok_or_else(|| DecodeError::UnknownType(raw.type_code.to_string()))?;
    decode_fields(kind, &raw.fields)
}

/// Route a tokenized field list to its type decoder
pub fn decode_fields(kind: SentenceType, fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    match kind {
        SentenceType::Gga => parse_gga(fields),
        SentenceType::Gll => parse_gll(fields),
        SentenceType::Rmc => parse_rmc(fields),
        SentenceType::Gsv => parse_gsv(fields),
        SentenceType::Gsa => parse_gsa(fields),
    }
}

/// Parse GGA (Global Positioning System Fix Data) sentence
pub fn parse_gga(fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    check_count("GGA", "14", fields, |n| n == 14)?;

    let time = parse_time(fields[0])?;
    let latitude = parse_coordinate(fields[1], fields[2], Axis::Latitude)?;
    let longitude = parse_coordinate(fields[3], fields[4], Axis::Longitude)?;
    let quality = required(fields[5], "fix quality")?;
    let satellites = parse_or(fields[6], 0);
    let hdop = parse_or(fields[7], 0.0);
    let altitude = required(fields[8], "altitude")?;
    let geoid_separation = fields[10].parse().ok();

    Ok(DecodedSentence::Gga(
        PositionFix {
            time,
            date: None,
            latitude,
            longitude,
            status: FixStatus::Gga {
                quality,
                satellites,
                hdop,
            },
        },
        AltitudeFix {
            time,
            altitude,
            geoid_separation,
        },
    ))
}

/// Parse GLL (Geographic Position) sentence
pub fn parse_gll(fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    // NMEA 2.3 appends a mode indicator
    check_count("GLL", "6 or 7", fields, |n| n == 6 || n == 7)?;

    let latitude = parse_coordinate(fields[0], fields[1], Axis::Latitude)?;
    let longitude = parse_coordinate(fields[2], fields[3], Axis::Longitude)?;
    let time = parse_time(fields[4])?;
    let validity = flag(fields[5], "validity")?;

    Ok(DecodedSentence::Gll(PositionFix {
        time,
        date: None,
        latitude,
        longitude,
        status: FixStatus::Flag(validity),
    }))
}

/// Parse RMC (Recommended Minimum Course) sentence
pub fn parse_rmc(fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    // 12 with the NMEA 2.3 mode indicator, 13 with the 4.1 navigational status
    check_count("RMC", "11 to 13", fields, |n| (11..=13).contains(&n))?;

    let time = parse_time(fields[0])?;
    let validity = flag(fields[1], "validity")?;
    let latitude = parse_coordinate(fields[2], fields[3], Axis::Latitude)?;
    let longitude = parse_coordinate(fields[4], fields[5], Axis::Longitude)?;
    let speed_knots = parse_or(fields[6], 0.0);
    let course = parse_or(fields[7], 0.0);
    let date = parse_date(fields[8])?;

    Ok(DecodedSentence::Rmc(
        PositionFix {
            time,
            date: Some(date),
            latitude,
            longitude,
            status: FixStatus::Flag(validity),
        },
        CourseFix {
            time,
            date: Some(date),
            speed_knots,
            course,
            status: FixStatus::Flag(validity),
        },
    ))
}

/// Parse GSV (Satellites in View) sentence
pub fn parse_gsv(fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    // Header, up to four satellites, and an optional NMEA 4.1 signal id
    check_count("GSV", "3 + 4n (+1), n <= 4", fields, |n| {
        n >= 3 && (n - 3) / 4 <= 4 && (n - 3) % 4 <= 1
    })?;

    let total_messages = required(fields[0], "total messages")?;
    let message_number = required(fields[1], "message number")?;
    let total_in_view = required(fields[2], "satellites in view")?;

    let mut satellites = Vec::with_capacity(4);
    for tuple in fields[3..].chunks_exact(4) {
        // An empty PRN marks an unused slot
        if tuple[0].is_empty() {
            continue;
        }
        satellites.push(SatelliteInfo {
            prn: required(tuple[0], "satellite prn")?,
            elevation: optional(tuple[1], "elevation")?,
            azimuth: optional(tuple[2], "azimuth")?,
            snr: optional(tuple[3], "snr")?,
        });
    }

    Ok(DecodedSentence::Gsv(SatelliteVisibility {
        total_messages,
        message_number,
        total_in_view,
        satellites,
    }))
}

/// Parse GSA (DOP and Active Satellites) sentence
pub fn parse_gsa(fields: &[&str]) -> Result<DecodedSentence, DecodeError> {
    // NMEA 4.1 appends a GNSS system id
    check_count("GSA", "17 or 18", fields, |n| n == 17 || n == 18)?;

    let mode = flag(fields[0], "mode")?;
    let fix_type = required(fields[1], "fix type")?;
    let satellite_ids = fields[2..14]
        .iter()
        .filter(|id| !id.is_empty())
        .map(|id| required(id, "satellite id"))
        .collect::<Result<Vec<u16>, _>>()?;

    Ok(DecodedSentence::Gsa(ActiveSatellites {
        mode,
        fix_type,
        satellite_ids,
        pdop: parse_or(fields[14], 0.0),
        hdop: parse_or(fields[15], 0.0),
        vdop: parse_or(fields[16], 0.0),
    }))
}

fn check_count(
    sentence: &'static str,
    expected: &'static str,
    fields: &[&str],
    accept: impl Fn(usize) -> bool,
) -> Result<(), DecodeError> {
    if accept(fields.len()) {
        Ok(())
    } else {
        Err(DecodeError::FieldCount {
            sentence,
            expected,
            found: fields.len(),
        })
    }
}

fn required<T: FromStr>(value: &str, field: &'static str) -> Result<T, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::EmptyField { field });
    }
    value
        .parse()
        .map_err(|_| DecodeError::invalid(field, value))
}

fn optional<T: FromStr>(value: &str, field: &'static str) -> Result<Option<T>, DecodeError> {
    if value.is_empty() {
        Ok(None)
    } else {
        required(value, field).map(Some)
    }
}

fn flag(value: &str, field: &'static str) -> Result<char, DecodeError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c),
        (None, _) => Err(DecodeError::EmptyField { field }),
        _ => Err(DecodeError::invalid(field, value)),
    }
}
