// src/lib.rs
//! GPS Decoder Library
//!
//! Streaming NMEA-0183 decoder: feed it raw receiver bytes in any chunking and
//! receive typed position, altitude, course and satellite events.

pub mod config;
pub mod error;
pub mod gps;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use error::{DecodeError, GpsError, Result};
pub use gps::data::{
    ActiveSatellites, AltitudeFix, CourseFix, FixStatus, NmeaEvent, PositionFix, SatelliteInfo,
    SatelliteVisibility,
};
pub use gps::{EventSink, GpsData, NmeaDecoder};
