use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::atmosphere;
use crate::flight::Flight;

/// Constant `source` tag marking events as simulator-generated.
pub const SOURCE: &str = "simulator";

/// One telemetry record, a flat snapshot of a flight plus derived avionics
/// fields. Serialized as a single JSON object per sink line. Values are
/// rounded at build time so the wire format is stable regardless of sink.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub timestamp: String,
    pub icao: String,
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub speed_knots: f64,
    pub gs_knots: f64,
    pub heading: f64,
    pub vertical_rate: f64,
    pub baro_altitude: f64,
    pub ias_knots: f64,
    pub mach: f64,
    pub bank_deg: f64,
    pub turn_rate_dps: f64,
    pub qnh_hpa: f64,
    pub nic: u8,
    pub nacp: u8,
    pub sil: u8,
    pub squawk: String,
    pub on_ground: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<String>,
    pub source: &'static str,
}

/// Round to `digits` decimal places.
pub fn round_to(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

impl Event {
    /// Snapshot a flight, deriving Mach and IAS from the atmosphere model and
    /// stamping the current UTC time.
    pub fn from_flight(fl: &Flight) -> Self {
        let (mach, ias_knots) = atmosphere::derive(fl.altitude, fl.speed);
        Event {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            icao: fl.icao.clone(),
            callsign: fl.callsign.clone(),
            lat: round_to(fl.lat, 6),
            lon: round_to(fl.lon, 6),
            altitude: round_to(fl.altitude, 1),
            speed_knots: round_to(fl.speed, 1),
            gs_knots: round_to(fl.ground_speed, 1),
            heading: round_to(fl.heading, 1),
            vertical_rate: round_to(fl.vertical_rate, 1),
            baro_altitude: round_to(fl.baro_altitude, 1),
            ias_knots: round_to(ias_knots, 1),
            mach: round_to(mach, 3),
            bank_deg: round_to(fl.bank_deg, 1),
            turn_rate_dps: round_to(fl.turn_rate_dps, 2),
            qnh_hpa: round_to(fl.qnh_hpa, 1),
            nic: fl.nic,
            nacp: fl.nacp,
            sil: fl.sil,
            squawk: fl.squawk.clone(),
            on_ground: fl.on_ground,
            anomaly: fl.anomaly.clone(),
            source: SOURCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::default_catalog;
    use crate::geo::BoundingBox;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rounding_helper() {
        assert_eq!(round_to(47.123456789, 6), 47.123457);
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(-0.0004, 3), -0.0);
    }

    #[test]
    fn event_fields_are_rounded_and_tagged() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut fl = Flight::spawn(&mut rng, &BoundingBox::EUROPE, &default_catalog());
        fl.lat = 47.1234567;
        fl.turn_rate_dps = 1.23456;
        let evt = Event::from_flight(&fl);
        assert_eq!(evt.lat, 47.123457);
        assert_eq!(evt.turn_rate_dps, 1.23);
        assert_eq!(evt.source, "simulator");
        assert_eq!(evt.icao, fl.icao);
    }

    #[test]
    fn anomaly_field_is_omitted_when_clear() {
        let mut rng = StdRng::seed_from_u64(5);
        let fl = Flight::spawn(&mut rng, &BoundingBox::EUROPE, &default_catalog());
        let evt = Event::from_flight(&fl);
        let json = serde_json::to_string(&evt).unwrap();
        assert!(!json.contains("\"anomaly\""));

        let mut tagged = evt.clone();
        tagged.anomaly = Some("EMERGENCY".to_string());
        let json = serde_json::to_string(&tagged).unwrap();
        assert!(json.contains("\"anomaly\":\"EMERGENCY\""));
    }

    #[test]
    fn timestamp_is_utc_iso8601() {
        let mut rng = StdRng::seed_from_u64(5);
        let fl = Flight::spawn(&mut rng, &BoundingBox::EUROPE, &default_catalog());
        let evt = Event::from_flight(&fl);
        assert!(evt.timestamp.ends_with('Z'));
        assert!(evt.timestamp.contains('T'));
    }
}
