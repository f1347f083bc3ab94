// src/gps/decoder.rs
//! Streaming sentence decoder: turns an arbitrarily chunked byte stream into events

use super::data::{
    ActiveSatellites, AltitudeFix, CourseFix, NmeaEvent, PositionFix, SatelliteVisibility,
};
use super::nmea::parse_nmea_sentence;
use crate::config::DecoderConfig;
use tracing::{debug, trace, warn};

/// Receives decoded events. Every method defaults to a no-op.
pub trait EventSink {
    /// A sentence failed checksum, header, type or field decoding.
    /// `raw` runs from `$` through the checksum, without CR LF.
    fn invalid_sentence(&mut self, _raw: &str) {}
    fn position_fix(&mut self, _fix: PositionFix) {}
    fn altitude_fix(&mut self, _fix: AltitudeFix) {}
    fn course_fix(&mut self, _fix: CourseFix) {}
    fn satellite_visibility(&mut self, _view: SatelliteVisibility) {}
    fn active_satellites(&mut self, _active: ActiveSatellites) {}
}

/// Collects events in arrival order.
impl EventSink for Vec<NmeaEvent> {
    fn invalid_sentence(&mut self, raw: &str) {
        self.push(NmeaEvent::InvalidSentence(raw.to_string()));
    }

    fn position_fix(&mut self, fix: PositionFix) {
        self.push(NmeaEvent::Position(fix));
    }

    fn altitude_fix(&mut self, fix: AltitudeFix) {
        self.push(NmeaEvent::Altitude(fix));
    }

    fn course_fix(&mut self, fix: CourseFix) {
        self.push(NmeaEvent::Course(fix));
    }

    fn satellite_visibility(&mut self, view: SatelliteVisibility) {
        self.push(NmeaEvent::SatelliteVisibility(view));
    }

    fn active_satellites(&mut self, active: ActiveSatellites) {
        self.push(NmeaEvent::ActiveSatellites(active));
    }
}

const TERMINATOR: &[u8] = b"\r\n";

/// Incremental NMEA-0183 decoder.
///
/// Holds only the bytes of a not yet terminated sentence. `feed` takes
/// `&mut self`, so one decoder serves one reader loop at a time.
#[derive(Debug, Default)]
pub struct NmeaDecoder {
    pending: Vec<u8>,
    // Where the next terminator search starts within `pending`
    scan_from: usize,
    max_pending: Option<usize>,
}

impl NmeaDecoder {
    /// Create a decoder with no bound on pending bytes
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &DecoderConfig) -> Self {
        Self {
            max_pending: config.max_pending_bytes,
            ..Self::default()
        }
    }

    /// Number of bytes buffered while waiting for a terminator
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Discard any partially received sentence
    pub fn reset(&mut self) {
        self.pending.clear();
        self.scan_from = 0;
    }

    /// Append `bytes` and emit an event for every sentence they complete.
    ///
    /// Bytes before the last `$` of a terminated line are dropped silently.
    pub fn feed<S: EventSink + ?Sized>(&mut self, bytes: &[u8], sink: &mut S) {
        self.pending.extend_from_slice(bytes);

        let mut consumed = 0;
        let mut search = self.scan_from;
        while let Some(offset) = find_terminator(&self.pending[search..]) {
            let end = search + offset;
            let line = &self.pending[consumed..end];
            if let Some(start) = line.iter().rposition(|&b| b == b'$') {
                process_candidate(&line[start..], sink);
            }
            consumed = end + TERMINATOR.len();
            search = consumed;
        }

        self.pending.drain(..consumed);
        // A trailing CR may be the first half of the next terminator
        self.scan_from = self.pending.len().saturating_sub(1);
        self.enforce_limit();
    }

    /// Decode `bytes` and return the produced events
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<NmeaEvent> {
        let mut events = Vec::new();
        self.feed(bytes, &mut events);
        events
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_pending else {
            return;
        };
        if self.pending.len() <= max {
            return;
        }

        let before = self.pending.len();
        match self.pending.iter().rposition(|&b| b == b'$') {
            Some(start) if before - start <= max => {
                self.pending.drain(..start);
            }
            _ => self.pending.clear(),
        }
        self.scan_from = self.pending.len().saturating_sub(1);
        warn!(
            dropped = before - self.pending.len(),
            max_pending = max,
            "pending NMEA bytes exceeded limit without a terminator"
        );
    }
}

fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR)
}

fn process_candidate<S: EventSink + ?Sized>(candidate: &[u8], sink: &mut S) {
    match parse_nmea_sentence(candidate) {
        Ok(decoded) => {
            trace!(sentence = %decoded.sentence_type(), "decoded NMEA sentence");
            decoded.deliver(sink);
        }
        Err(error) => {
            let raw = String::from_utf8_lossy(candidate);
            debug!(%error, sentence = %raw, "invalid NMEA sentence");
            sink.invalid_sentence(&raw);
        }
    }
}
