// src/gps/convert.rs
//! Coordinate, time and date conversions shared by the sentence decoders

use crate::error::DecodeError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compass hemisphere of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parse an NMEA hemisphere code (`N`, `S`, `E`, `W`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(Hemisphere::North),
            "S" => Some(Hemisphere::South),
            "E" => Some(Hemisphere::East),
            "W" => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    /// Multiplier applied to the unsigned magnitude
    pub fn sign(&self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }

    fn is_latitude(&self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::South)
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Degrees, minutes and whole seconds with an explicit hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreesMinutesSeconds {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub hemisphere: Hemisphere,
}

/// Degrees and decimal minutes to signed decimal degrees.
pub fn dm_to_decimal(degrees: u32, minutes: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (degrees as f64 + minutes / 60.0)
}

/// Degrees, minutes and seconds to signed decimal degrees.
pub fn dms_to_decimal(degrees: u32, minutes: u32, seconds: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (degrees as f64 + minutes as f64 / 60.0 + seconds / 3600.0)
}

/// Split signed decimal degrees into a latitude (N/S), rounded to the nearest second.
pub fn lat_to_dms(decimal: f64) -> DegreesMinutesSeconds {
    let hemisphere = if decimal < 0.0 {
        Hemisphere::South
    } else {
        Hemisphere::North
    };
    split_dms(decimal, hemisphere)
}

/// Split signed decimal degrees into a longitude (E/W), rounded to the nearest second.
pub fn lon_to_dms(decimal: f64) -> DegreesMinutesSeconds {
    let hemisphere = if decimal < 0.0 {
        Hemisphere::West
    } else {
        Hemisphere::East
    };
    split_dms(decimal, hemisphere)
}

fn split_dms(decimal: f64, hemisphere: Hemisphere) -> DegreesMinutesSeconds {
    let total_seconds = (decimal.abs() * 3600.0).round() as u64;
    DegreesMinutesSeconds {
        degrees: (total_seconds / 3600) as u32,
        minutes: ((total_seconds % 3600) / 60) as u32,
        seconds: (total_seconds % 60) as u32,
        hemisphere,
    }
}

/// Which axis a position field encodes; fixes the integer-degree width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn degree_digits(&self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    fn hemisphere_field(&self) -> &'static str {
        match self {
            Axis::Latitude => "latitude hemisphere",
            Axis::Longitude => "longitude hemisphere",
        }
    }
}

/// Decode a `DDMM.MMMM` / `DDDMM.MMMM` field and its hemisphere into decimal degrees.
///
/// The value is not range checked; see [`PositionFix::in_range`].
///
/// [`PositionFix::in_range`]: super::data::PositionFix::in_range
pub fn parse_coordinate(value: &str, hemisphere: &str, axis: Axis) -> Result<f64, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::EmptyField { field: axis.field() });
    }
    if hemisphere.is_empty() {
        return Err(DecodeError::EmptyField {
            field: axis.hemisphere_field(),
        });
    }

    let hemi = Hemisphere::from_code(hemisphere)
        .filter(|h| h.is_latitude() == (axis == Axis::Latitude))
        .ok_or_else(|| DecodeError::invalid(axis.hemisphere_field(), hemisphere))?;

    let digits = axis.degree_digits();
    if !value.is_ascii() || value.len() <= digits {
        return Err(DecodeError::invalid(axis.field(), value));
    }
    let (deg_part, min_part) = value.split_at(digits);
    if !deg_part.bytes().all(|b| b.is_ascii_digit())
        || !min_part.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return Err(DecodeError::invalid(axis.field(), value));
    }

    let degrees: u32 = deg_part
        .parse()
        .map_err(|_| DecodeError::invalid(axis.field(), value))?;
    let minutes: f64 = min_part
        .parse()
        .map_err(|_| DecodeError::invalid(axis.field(), value))?;

    Ok(dm_to_decimal(degrees, minutes, hemi))
}

/// Parse `HHMMSS[.sss]` into a time of day with millisecond resolution.
pub fn parse_time(value: &str) -> Result<NaiveTime, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::EmptyField { field: "time" });
    }
    let bad = || DecodeError::invalid("time", value);
    if !value.is_ascii() || value.len() < 6 {
        return Err(bad());
    }

    let (hms, rest) = value.split_at(6);
    let hour = two_digits(&hms[0..2]).ok_or_else(bad)?;
    let minute = two_digits(&hms[2..4]).ok_or_else(bad)?;
    let second = two_digits(&hms[4..6]).ok_or_else(bad)?;

    let millis = match rest.strip_prefix('.') {
        None if rest.is_empty() => 0,
        None => return Err(bad()),
        Some(fraction) => {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            // First three digits, right-padded: ".4" is 400 ms
            fraction
                .bytes()
                .chain(std::iter::repeat(b'0'))
                .take(3)
                .fold(0u32, |acc, b| acc * 10 + (b - b'0') as u32)
        }
    };

    NaiveTime::from_hms_milli_opt(hour, minute, second, millis).ok_or_else(bad)
}

/// Parse `DDMMYY`; two-digit years always land in `20YY`.
pub fn parse_date(value: &str) -> Result<NaiveDate, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::EmptyField { field: "date" });
    }
    let bad = || DecodeError::invalid("date", value);
    if !value.is_ascii() || value.len() != 6 {
        return Err(bad());
    }

    let day = two_digits(&value[0..2]).ok_or_else(bad)?;
    let month = two_digits(&value[2..4]).ok_or_else(bad)?;
    let year = two_digits(&value[4..6]).ok_or_else(bad)?;

    NaiveDate::from_ymd_opt(2000 + year as i32, month, day).ok_or_else(bad)
}

fn two_digits(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() == 2 && bytes.iter().all(u8::is_ascii_digit) {
        Some(((bytes[0] - b'0') * 10 + (bytes[1] - b'0')) as u32)
    } else {
        None
    }
}

/// Parse `value` as `T`, falling back to `default` when empty or unparseable.
pub fn parse_or<T: FromStr>(value: &str, default: T) -> T {
    value.trim().parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dm_to_decimal() {
        let value = dm_to_decimal(79, 56.93172, Hemisphere::West);
        assert!((value - -79.948862).abs() < 1e-5);
    }

    #[test]
    fn test_dms_to_decimal() {
        let value = dms_to_decimal(87, 43, 41.0, Hemisphere::West);
        assert!((value - -87.728056).abs() < 1e-5);
    }

    #[test]
    fn test_lon_round_trip() {
        let decimal = dms_to_decimal(87, 43, 41.0, Hemisphere::West);
        let dms = lon_to_dms(decimal);
        assert_eq!(dms.degrees, 87);
        assert_eq!(dms.minutes, 43);
        assert_eq!(dms.seconds, 41);
        assert_eq!(dms.hemisphere, Hemisphere::West);
    }

    #[test]
    fn test_lat_round_trip() {
        let decimal = dms_to_decimal(87, 43, 41.0, Hemisphere::South);
        let dms = lat_to_dms(decimal);
        assert_eq!(dms.degrees, 87);
        assert_eq!(dms.minutes, 43);
        assert_eq!(dms.seconds, 41);
        assert_eq!(dms.hemisphere, Hemisphere::South);
    }

    #[test]
    fn test_round_trip_sweep() {
        for degrees in [0u32, 1, 38, 89] {
            for minutes in [0u32, 17, 59] {
                for seconds in [0u32, 1, 30, 59] {
                    let decimal = dms_to_decimal(degrees, minutes, seconds as f64, Hemisphere::North);
                    let dms = lat_to_dms(decimal);
                    assert_eq!(
                        (dms.degrees, dms.minutes, dms.seconds),
                        (degrees, minutes, seconds)
                    );
                }
            }
        }
    }

    #[test]
    fn test_dms_rounds_to_nearest_second() {
        // 10 degrees plus 29.6 seconds
        let dms = lon_to_dms(10.0 + 29.6 / 3600.0);
        assert_eq!((dms.degrees, dms.minutes, dms.seconds), (10, 0, 30));
        assert_eq!(dms.hemisphere, Hemisphere::East);
    }

    #[test]
    fn test_parse_coordinate_fixed_width() {
        let lat = parse_coordinate("3848.2905", "N", Axis::Latitude).unwrap();
        assert!((lat - (38.0 + 48.2905 / 60.0)).abs() < 1e-9);

        let lon = parse_coordinate("09018.4239", "W", Axis::Longitude).unwrap();
        assert!((lon + (90.0 + 18.4239 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_coordinate_rejects_wrong_hemisphere() {
        assert!(parse_coordinate("3848.2905", "E", Axis::Latitude).is_err());
        assert!(parse_coordinate("09018.4239", "N", Axis::Longitude).is_err());
        assert!(parse_coordinate("3848.2905", "", Axis::Latitude).is_err());
    }

    #[test]
    fn test_parse_coordinate_placeholder_values() {
        // Initializing receivers report positions no fix could have
        assert_eq!(parse_coordinate("36000.0000", "N", Axis::Latitude).unwrap(), 36.0);
        assert_eq!(parse_coordinate("72000.0000", "E", Axis::Longitude).unwrap(), 720.0);
        assert_eq!(parse_coordinate("9100.0000", "S", Axis::Latitude).unwrap(), -91.0);
        assert!(parse_coordinate("38xx.0000", "N", Axis::Latitude).is_err());
        assert!(parse_coordinate("38", "N", Axis::Latitude).is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("010203.4").unwrap(),
            NaiveTime::from_hms_milli_opt(1, 2, 3, 400).unwrap()
        );
        assert_eq!(
            parse_time("191630.609").unwrap(),
            NaiveTime::from_hms_milli_opt(19, 16, 30, 609).unwrap()
        );
        assert_eq!(
            parse_time("123519").unwrap(),
            NaiveTime::from_hms_opt(12, 35, 19).unwrap()
        );
    }

    #[test]
    fn test_parse_time_invalid() {
        assert!(parse_time("").is_err());
        assert!(parse_time("1235").is_err());
        assert!(parse_time("256000").is_err());
        assert!(parse_time("123519,5").is_err());
        assert!(parse_time("12a519").is_err());
    }

    #[test]
    fn test_parse_date_century_pivot() {
        assert_eq!(
            parse_date("101102").unwrap(),
            NaiveDate::from_ymd_opt(2002, 11, 10).unwrap()
        );
        assert_eq!(
            parse_date("230394").unwrap(),
            NaiveDate::from_ymd_opt(2094, 3, 23).unwrap()
        );
        assert!(parse_date("320199").is_err());
        assert!(parse_date("1011").is_err());
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or::<i32>("", 3), 3);
        assert_eq!(parse_or::<i32>("Fred", 3), 3);
        assert_eq!(parse_or::<i32>("9", 3), 9);
        assert_eq!(parse_or::<f64>("50.0", 0.0), 50.0);
    }
}
