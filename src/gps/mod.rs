// src/gps/mod.rs
//! NMEA-0183 decoding and GPS data handling

pub mod convert;
pub mod data;
pub mod decoder;
pub mod nmea;
pub mod sentence;

pub use data::GpsData;
pub use decoder::{EventSink, NmeaDecoder};
