use std::collections::HashMap;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::event::{round_to, Event};
use crate::flight::Flight;

/// Seconds a flight stays ineligible for another injection.
pub const INJECT_COOLDOWN_SEC: f64 = 12.0;
/// Trigger probability per eligible tick.
pub const INJECT_PROBABILITY: f64 = 0.01;

// Detector thresholds
const OVERSPEED_BELOW_FT: f64 = 10_000.0;
const OVERSPEED_IAS_KT: f64 = 260.0;
const VRATE_ABNORMAL_FPM: f64 = 6_000.0;
const ALT_MISMATCH_FT: f64 = 400.0;
const STALL_ABOVE_FT: f64 = 20_000.0;
const STALL_IAS_KT: f64 = 140.0;
const SPEED_JUMP_KT: f64 = 180.0;

const EMERGENCY_SQUAWKS: [&str; 3] = ["7500", "7600", "7700"];

// --- Injection ---

/// Fault kinds the injector can apply. Each carries its effect on the
/// outgoing event and, where the fault is persistent (position, identity),
/// on the flight itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    NegativeAltitude,
    ImpossibleSpeed,
    DuplicateIcao,
    Teleport,
}

impl AnomalyKind {
    /// Parse a CLI kind name. Unknown names are reported, not ignored.
    pub fn parse(name: &str) -> Result<Self, String> {
        match name {
            "alt_neg" => Ok(AnomalyKind::NegativeAltitude),
            "speed_impossible" => Ok(AnomalyKind::ImpossibleSpeed),
            "dup_icao" => Ok(AnomalyKind::DuplicateIcao),
            "teleport" => Ok(AnomalyKind::Teleport),
            other => Err(format!(
                "unknown anomaly kind '{other}' (expected alt_neg, speed_impossible, dup_icao, teleport)"
            )),
        }
    }

    /// Apply the fault to the event and flight. `dup_victim` is the
    /// run-constant identity used for duplicate-ICAO faults.
    pub fn apply(
        self,
        evt: &mut Event,
        fl: &mut Flight,
        rng: &mut StdRng,
        dup_victim: Option<&str>,
    ) {
        match self {
            AnomalyKind::NegativeAltitude => {
                evt.altitude = -evt.altitude.abs();
                fl.anomaly = Some("ALT<0".to_string());
            }
            AnomalyKind::ImpossibleSpeed => {
                evt.speed_knots = round_to(rng.gen_range(1_500.0..3_000.0), 1);
                fl.anomaly = Some("SPD>1500".to_string());
            }
            AnomalyKind::DuplicateIcao => {
                if let Some(victim) = dup_victim {
                    evt.icao = victim.to_string();
                    fl.anomaly = Some("DUP ICAO".to_string());
                }
            }
            AnomalyKind::Teleport => {
                let lat = rng.gen_range(-60.0..80.0);
                let lon = rng.gen_range(-180.0..180.0);
                evt.lat = round_to(lat, 6);
                evt.lon = round_to(lon, 6);
                fl.lat = lat;
                fl.lon = lon;
                fl.trail.clear();
                fl.anomaly = Some("TELEPORT".to_string());
            }
        }
    }
}

/// Probabilistic fault injection with a per-flight cooldown. Empty kind set
/// makes every call a no-op.
pub struct Injector {
    kinds: Vec<AnomalyKind>,
    dup_victim: Option<String>,
    last_inject: HashMap<String, f64>,
}

impl Injector {
    pub fn new(kinds: Vec<AnomalyKind>, dup_victim: Option<String>) -> Self {
        Self {
            kinds,
            dup_victim,
            last_inject: HashMap::new(),
        }
    }

    /// Roll the dice for one flight at simulation time `now` (seconds).
    /// Returns the injected kind, if any. The cooldown restarts on trigger.
    pub fn maybe_inject(
        &mut self,
        now: f64,
        evt: &mut Event,
        fl: &mut Flight,
        rng: &mut StdRng,
    ) -> Option<AnomalyKind> {
        if self.kinds.is_empty() {
            return None;
        }
        let last = self.last_inject.get(&fl.icao).copied().unwrap_or(f64::MIN);
        if now - last <= INJECT_COOLDOWN_SEC {
            return None;
        }
        if rng.gen::<f64>() >= INJECT_PROBABILITY {
            return None;
        }
        let kind = *self.kinds.choose(rng)?;
        kind.apply(evt, fl, rng, self.dup_victim.as_deref());
        self.last_inject.insert(fl.icao.clone(), now);
        Some(kind)
    }
}

// --- Detection ---

/// Run the ordered rule set against an event (and the previous event for the
/// same identifier, for the delta rule). Matching tags are joined with ';'
/// and written to both the event and the flight. Stateless apart from the
/// caller-provided predecessor.
pub fn detect(evt: &mut Event, fl: &mut Flight, last: Option<&Event>) {
    let mut tags: Vec<&str> = Vec::new();

    if evt.baro_altitude < OVERSPEED_BELOW_FT && evt.ias_knots > OVERSPEED_IAS_KT {
        tags.push("250@10k");
    }
    if evt.vertical_rate.abs() > VRATE_ABNORMAL_FPM {
        tags.push("VRATE_ABN");
    }
    if (evt.altitude - evt.baro_altitude).abs() > ALT_MISMATCH_FT {
        tags.push("ALT_MISMATCH");
    }
    if evt.altitude > STALL_ABOVE_FT && evt.ias_knots < STALL_IAS_KT {
        tags.push("LOW_IAS_HIGH_ALT");
    }
    if evt.nic < 5 || evt.nacp < 7 || evt.sil < 2 {
        tags.push("LOW_QOS");
    }
    if EMERGENCY_SQUAWKS.contains(&evt.squawk.as_str()) {
        tags.push("EMERGENCY");
    }
    if let Some(prev) = last {
        if (evt.speed_knots - prev.speed_knots).abs() > SPEED_JUMP_KT {
            tags.push("SPEED_JUMP");
        }
    }

    if !tags.is_empty() {
        let tag = tags.join(";");
        evt.anomaly = Some(tag.clone());
        fl.anomaly = Some(tag);
    }
}

// --- Severity ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Critical,
}

/// Ordered first-match classification table. Kept as data so the ordering is
/// an inspectable artifact rather than implicit control flow.
const SEVERITY_RULES: &[(Severity, &[&str])] = &[
    (
        Severity::Critical,
        &["EMERGENCY", "LOW_IAS_HIGH_ALT", "VRATE_ABN"],
    ),
    (
        Severity::Warning,
        &[
            "250@10k",
            "ALT_MISMATCH",
            "LOW_QOS",
            "SPEED_JUMP",
            "ALT<0",
            "SPD>1500",
            "DUP ICAO",
            "TELEPORT",
        ],
    ),
];

/// Classify an anomaly tag string. Empty text carries no severity; non-empty
/// text with no recognized token still rates a warning.
pub fn severity_of(anomaly_text: &str) -> Option<Severity> {
    if anomaly_text.is_empty() {
        return None;
    }
    for (severity, tokens) in SEVERITY_RULES {
        if tokens.iter().any(|t| anomaly_text.contains(t)) {
            return Some(*severity);
        }
    }
    Some(Severity::Warning)
}
