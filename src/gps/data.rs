// src/gps/data.rs
//! Decoded GPS events and the latest-fix snapshot built from them

use super::decoder::EventSink;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One satellite entry from a GSV sentence. `None` means the field was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub prn: u16,
    pub elevation: Option<i16>, // degrees
    pub azimuth: Option<u16>,   // degrees true
    pub snr: Option<u8>,        // dB-Hz
}

/// Receiver-reported quality attached to a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FixStatus {
    /// GGA fix quality indicator, satellites in use and horizontal dilution
    Gga { quality: u8, satellites: u8, hdop: f64 },
    /// GLL/RMC status flag: `'A'` active, `'V'` void
    Flag(char),
}

impl FixStatus {
    /// Whether the receiver considers this a usable fix
    pub fn is_valid(&self) -> bool {
        match self {
            FixStatus::Gga { quality, .. } => *quality != 0,
            FixStatus::Flag(flag) => *flag == 'A',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub time: NaiveTime,
    /// Only RMC carries a date
    pub date: Option<NaiveDate>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: FixStatus,
}

impl PositionFix {
    /// Whether the coordinates lie within [-90, 90] and [-180, 180].
    ///
    /// Initializing receivers emit placeholder positions such as 720 degrees
    /// of longitude; these decode normally and fail this check.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.date.map(|date| date.and_time(self.time))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeFix {
    pub time: NaiveTime,
    /// Meters above mean sea level
    pub altitude: f64,
    pub geoid_separation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFix {
    pub time: NaiveTime,
    pub date: Option<NaiveDate>,
    pub speed_knots: f64,
    /// Degrees true
    pub course: f64,
    pub status: FixStatus,
}

impl CourseFix {
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.date.map(|date| date.and_time(self.time))
    }
}

/// Satellites listed in a single GSV sentence; groups are not merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteVisibility {
    pub total_messages: u8,
    pub message_number: u8,
    pub total_in_view: u16,
    pub satellites: Vec<SatelliteInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSatellites {
    /// `'A'` automatic or `'M'` manual 2D/3D selection
    pub mode: char,
    /// 1 = no fix, 2 = 2D, 3 = 3D
    pub fix_type: u8,
    pub satellite_ids: Vec<u16>,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
}

/// Every notification the decoder can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NmeaEvent {
    InvalidSentence(String),
    Position(PositionFix),
    Altitude(AltitudeFix),
    Course(CourseFix),
    SatelliteVisibility(SatelliteVisibility),
    ActiveSatellites(ActiveSatellites),
}

impl NmeaEvent {
    /// Hand this event to the matching sink method
    pub fn deliver<S: EventSink + ?Sized>(self, sink: &mut S) {
        match self {
            NmeaEvent::InvalidSentence(raw) => sink.invalid_sentence(&raw),
            NmeaEvent::Position(fix) => sink.position_fix(fix),
            NmeaEvent::Altitude(fix) => sink.altitude_fix(fix),
            NmeaEvent::Course(fix) => sink.course_fix(fix),
            NmeaEvent::SatelliteVisibility(view) => sink.satellite_visibility(view),
            NmeaEvent::ActiveSatellites(active) => sink.active_satellites(active),
        }
    }
}

/// A satellite in the snapshot, with fix usage and constellation
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedSatellite {
    pub info: SatelliteInfo,
    pub used: bool,
    pub constellation: &'static str,
}

impl TrackedSatellite {
    pub fn new(info: SatelliteInfo) -> Self {
        let constellation = Self::determine_constellation(info.prn);
        Self {
            info,
            used: false,
            constellation,
        }
    }

    fn determine_constellation(prn: u16) -> &'static str {
        match prn {
            1..=32 => "GPS",
            33..=64 => "SBAS",
            65..=96 => "GLONASS",
            120..=158 => "SBAS",
            193..=197 => "QZSS",
            201..=237 => "BEIDOU",
            301..=336 => "GALILEO",
            _ => "UNKNOWN",
        }
    }

    pub fn signal_strength_description(&self) -> &'static str {
        match self.info.snr {
            Some(snr) if snr >= 40 => "Excellent",
            Some(snr) if snr >= 35 => "Good",
            Some(snr) if snr >= 25 => "Fair",
            Some(snr) if snr >= 15 => "Poor",
            Some(_) => "Very Poor",
            None => "Unknown",
        }
    }
}

/// Latest known receiver state, folded from decoder events.
///
/// Positions, altitudes and courses are only taken from fixes the receiver
/// marks valid; everything else is recorded as reported.
#[derive(Debug, Clone, Default)]
pub struct GpsData {
    pub updated: Option<DateTime<Utc>>,
    pub fix_time: Option<NaiveTime>,
    pub fix_date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,  // km/h
    pub course: Option<f64>, // degrees
    pub satellites: Option<u8>,
    pub fix_quality: Option<u8>,
    pub fix_type: Option<u8>,
    pub hdop: Option<f64>,
    pub pdop: Option<f64>,
    pub vdop: Option<f64>,
    pub invalid_sentences: u64,
    pub raw_history: Vec<String>, // Recent rejected sentences
    pub satellites_info: Vec<TrackedSatellite>,
    active_ids: Vec<u16>,
}

impl GpsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the GPS data represents a valid position fix
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Get the age of the GPS data in seconds
    pub fn age_seconds(&self) -> Option<i64> {
        self.updated
            .map(|ts| Utc::now().signed_duration_since(ts).num_seconds())
    }

    /// Check if the GPS data is recent (within 10 seconds)
    pub fn is_recent(&self) -> bool {
        self.age_seconds().map_or(false, |age| age < 10)
    }

    fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }

    /// Add a rejected sentence to history (keep last 5)
    fn add_raw_sentence(&mut self, sentence: &str) {
        self.raw_history.push(sentence.to_string());
        if self.raw_history.len() > 5 {
            self.raw_history.remove(0);
        }
    }

    /// Get fix type description
    pub fn get_fix_description(&self) -> String {
        if let Some(quality) = self.fix_quality {
            match quality {
                0 => "No fix".to_string(),
                1 => "GPS".to_string(),
                2 => "DGPS".to_string(),
                3 => "PPS".to_string(),
                4 => "RTK".to_string(),
                5 => "Float RTK".to_string(),
                6 => "Estimated".to_string(),
                7 => "Manual".to_string(),
                8 => "Simulation".to_string(),
                _ => format!("Unknown ({})", quality),
            }
        } else if let Some(fix_type) = self.fix_type {
            match fix_type {
                1 => "No fix".to_string(),
                2 => "2D fix".to_string(),
                3 => "3D fix".to_string(),
                _ => format!("Mode {}", fix_type),
            }
        } else {
            "Unknown".to_string()
        }
    }

    /// Get count of satellites being used in the fix
    pub fn satellites_used(&self) -> usize {
        self.satellites_info.iter().filter(|sat| sat.used).count()
    }

    /// Get satellites grouped by constellation
    pub fn satellites_by_constellation(&self) -> HashMap<&'static str, Vec<&TrackedSatellite>> {
        let mut grouped = HashMap::new();
        for sat in &self.satellites_info {
            grouped
                .entry(sat.constellation)
                .or_insert_with(Vec::new)
                .push(sat);
        }
        grouped
    }

    fn mark_used(&mut self) {
        for sat in &mut self.satellites_info {
            sat.used = self.active_ids.contains(&sat.info.prn);
        }
    }
}

impl EventSink for GpsData {
    fn invalid_sentence(&mut self, raw: &str) {
        self.invalid_sentences += 1;
        self.add_raw_sentence(raw);
    }

    fn position_fix(&mut self, fix: PositionFix) {
        self.touch();
        if let FixStatus::Gga {
            quality,
            satellites,
            hdop,
        } = fix.status
        {
            self.fix_quality = Some(quality);
            self.satellites = Some(satellites);
            self.hdop = Some(hdop);
        }
        if !fix.status.is_valid() || !fix.in_range() {
            return;
        }
        self.fix_time = Some(fix.time);
        if fix.date.is_some() {
            self.fix_date = fix.date;
        }
        self.latitude = Some(fix.latitude);
        self.longitude = Some(fix.longitude);
    }

    fn altitude_fix(&mut self, fix: AltitudeFix) {
        self.touch();
        // Altitude follows the GGA position that carried the quality
        if self.fix_quality.map_or(false, |q| q != 0) {
            self.altitude = Some(fix.altitude);
        }
    }

    fn course_fix(&mut self, fix: CourseFix) {
        self.touch();
        if fix.status.is_valid() {
            self.speed = Some(fix.speed_knots * 1.852); // Convert knots to km/h
            self.course = Some(fix.course);
        }
    }

    fn satellite_visibility(&mut self, view: SatelliteVisibility) {
        self.touch();
        let incoming: Vec<TrackedSatellite> =
            view.satellites.into_iter().map(TrackedSatellite::new).collect();

        // First message of a group replaces only its own constellations
        if view.message_number == 1 {
            self.satellites_info.retain(|sat| {
                !incoming
                    .iter()
                    .any(|new| new.constellation == sat.constellation)
            });
        }
        for sat in incoming {
            if let Some(existing) = self
                .satellites_info
                .iter_mut()
                .find(|s| s.info.prn == sat.info.prn)
            {
                *existing = sat;
            } else {
                self.satellites_info.push(sat);
            }
        }
        self.mark_used();
    }

    fn active_satellites(&mut self, active: ActiveSatellites) {
        self.touch();
        self.fix_type = Some(active.fix_type);
        self.pdop = Some(active.pdop);
        self.hdop = Some(active.hdop);
        self.vdop = Some(active.vdop);
        self.active_ids = active.satellite_ids;
        self.mark_used();
    }
}
