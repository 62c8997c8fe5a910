use std::collections::VecDeque;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::geo::BoundingBox;

/// Most recent position samples kept per flight.
pub const TRAIL_CAP: usize = 60;

/// Standard pressure (hPa) the barometric offset is referenced to.
pub const STD_PRESSURE_HPA: f64 = 1013.25;
/// Approximate barometric altitude change per hPa of QNH deviation (ft).
pub const FT_PER_HPA: f64 = 27.0;

const CALLSIGN_PREFIXES: [&str; 11] = [
    "IBE", "RYR", "AIB", "SWR", "DAL", "BAW", "KLM", "AFR", "SAS", "VLG", "EZY",
];

const NORMAL_SQUAWKS: [&str; 3] = ["7000", "1200", "2000"];

// --- Aircraft-type catalog ---

/// Maneuvering limits for one aircraft type.
#[derive(Debug, Clone)]
pub struct AircraftType {
    pub name: String,
    pub max_bank_deg: f64,
    pub max_turn_rate_dps: f64,
}

impl AircraftType {
    pub fn new(name: &str, max_bank_deg: f64, max_turn_rate_dps: f64) -> Self {
        Self {
            name: name.to_string(),
            max_bank_deg,
            max_turn_rate_dps,
        }
    }
}

/// Built-in catalog: narrowbody jets plus a regional with tighter limits.
pub fn default_catalog() -> Vec<AircraftType> {
    vec![
        AircraftType::new("A320", 25.0, 3.0),
        AircraftType::new("B738", 25.0, 3.0),
        AircraftType::new("E190", 20.0, 2.5),
    ]
}

// --- Flight state ---

/// One simulated aircraft. Owned exclusively by the orchestrator's registry,
/// mutated in place every tick it is selected.
#[derive(Debug, Clone)]
pub struct Flight {
    // identity
    pub icao: String,
    pub callsign: String,
    pub ac_type: String,

    // kinematics
    pub lat: f64,           // degrees
    pub lon: f64,           // degrees
    pub altitude: f64,      // ft, true
    pub speed: f64,         // kt, TAS
    pub heading: f64,       // degrees [0, 360)
    pub vertical_rate: f64, // ft/min
    pub ground_speed: f64,  // kt, derived

    // derived / avionics
    pub bank_deg: f64,
    pub turn_rate_dps: f64,
    pub baro_altitude: f64,
    pub qnh_hpa: f64,
    pub squawk: String,
    pub nic: u8,
    pub nacp: u8,
    pub sil: u8,
    pub on_ground: bool,

    // navigation
    pub route: Vec<(f64, f64)>,
    pub wp_index: usize,
    pub vnav_target_alt: Option<f64>,

    // limits
    pub max_bank_deg: f64,
    pub max_turn_rate_dps: f64,

    // history
    pub trail: VecDeque<(f64, f64)>,
    pub anomaly: Option<String>,

    pub(crate) last_heading: f64,
}

impl Flight {
    /// Spawn a flight with random initial state drawn from `rng`. All
    /// randomness is injected so runs are reproducible given a seed.
    pub fn spawn(rng: &mut StdRng, bbox: &BoundingBox, catalog: &[AircraftType]) -> Self {
        let icao = format!("{:06X}", rng.gen_range(0u32..1 << 24));
        let prefix = CALLSIGN_PREFIXES.choose(rng).unwrap_or(&"IBE");
        let callsign = format!("{}{}", prefix, rng.gen_range(100..=9999));

        let lat = rng.gen_range(bbox.lat_min..bbox.lat_max);
        let lon = rng.gen_range(bbox.lon_min..bbox.lon_max);
        let altitude = rng.gen_range(3_500.0..35_000.0);
        let speed = rng.gen_range(250.0..350.0);
        let heading = rng.gen_range(0.0..360.0);
        let qnh_hpa = rng.gen_range(985.0..1030.0);
        let squawk = NORMAL_SQUAWKS.choose(rng).unwrap_or(&"7000").to_string();

        let ac = catalog
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| AircraftType::new("A320", 25.0, 3.0));

        let mut fl = Flight {
            icao,
            callsign,
            ac_type: ac.name,
            lat,
            lon,
            altitude,
            speed,
            heading,
            vertical_rate: 0.0,
            ground_speed: 0.0,
            bank_deg: 0.0,
            turn_rate_dps: 0.0,
            baro_altitude: 0.0,
            qnh_hpa,
            squawk,
            nic: rng.gen_range(6..=9),
            nacp: rng.gen_range(8..=10),
            sil: rng.gen_range(2..=3),
            on_ground: false,
            route: Vec::new(),
            wp_index: 0,
            vnav_target_alt: None,
            max_bank_deg: ac.max_bank_deg,
            max_turn_rate_dps: ac.max_turn_rate_dps,
            trail: VecDeque::with_capacity(TRAIL_CAP),
            anomaly: None,
            last_heading: heading,
        };
        fl.update_derived();
        fl
    }

    /// Give this flight a random 2-3 waypoint route inside the box (2 degree
    /// margin) and a VNAV cruise target. Roughly 40% of spawned flights get
    /// one; the rest drift unguided.
    pub fn assign_random_route(&mut self, rng: &mut StdRng, bbox: &BoundingBox) {
        let n = rng.gen_range(2..=3);
        self.route = (0..n)
            .map(|_| {
                (
                    rng.gen_range(bbox.lat_min + 2.0..bbox.lat_max - 2.0),
                    rng.gen_range(bbox.lon_min + 2.0..bbox.lon_max - 2.0),
                )
            })
            .collect();
        self.wp_index = 0;
        const CRUISE_ALTS: [f64; 4] = [12_000.0, 18_000.0, 24_000.0, 28_000.0];
        self.vnav_target_alt = CRUISE_ALTS.choose(rng).copied();
    }

    /// Recompute fields derived from true altitude / speed / QNH.
    pub fn update_derived(&mut self) {
        self.baro_altitude = self.altitude + (STD_PRESSURE_HPA - self.qnh_hpa) * FT_PER_HPA;
        self.on_ground = self.altitude < 50.0 && self.speed < 50.0;
    }

    /// Append a position sample, evicting the oldest past capacity.
    pub fn push_trail(&mut self, lat: f64, lon: f64) {
        if self.trail.len() == TRAIL_CAP {
            self.trail.pop_front();
        }
        self.trail.push_back((lat, lon));
    }
}
