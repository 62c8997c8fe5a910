use glam::DVec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::flight::Flight;
use crate::guidance::Guidance;

const G: f64 = 9.80665; // gravity (m/s^2)
const KT_TO_MPS: f64 = 0.514444;

/// Flat-plane conversion: knots of ground speed to degrees of lat/lon per
/// second. Small-angle approximation, not valid at extreme latitudes.
const KT_TO_DEG_PER_S: f64 = 0.00026;

/// Floor for dt divisions.
const MIN_DT: f64 = 1e-6;

/// VNAV shaping: climb/descend rate and the error band for the linear
/// deceleration toward the target.
const VNAV_RATE_FPM: f64 = 1_500.0;
const VNAV_DEADBAND_FT: f64 = 100.0;
const VNAV_TAPER_FT: f64 = 1_000.0;

/// Unguided flights wander up to this many degrees of heading per step.
const DRIFT_DEG: f64 = 1.0;

/// Ambient wind, direction is where it blows *from* (degrees). Owned by the
/// orchestrator; the stepper only reads it.
#[derive(Debug, Clone, Copy)]
pub struct Wind {
    pub dir_deg: f64,
    pub speed_kt: f64,
}

impl Wind {
    /// Wind velocity as a (east, north) vector in knots, i.e. the direction
    /// it blows *toward*.
    pub fn velocity(&self) -> DVec2 {
        let to_dir = (self.dir_deg + 180.0).to_radians();
        DVec2::new(to_dir.sin(), to_dir.cos()) * self.speed_kt
    }
}

/// Signed shortest angular difference `a - b`, wrapped into [-180, 180).
pub fn wrap_angle_diff(a: f64, b: f64) -> f64 {
    (a - b + 540.0).rem_euclid(360.0) - 180.0
}

/// Advance one flight by `dt` seconds, in place.
///
/// Order matters: steer, shape the vertical rate, compose ground speed with
/// wind, integrate position/altitude, then derive turn rate and bank from the
/// heading change. Invariants on exit: heading in [0, 360), |turn_rate| and
/// |bank| within the aircraft limits, trail bounded.
pub fn step(fl: &mut Flight, dt: f64, wind: &Wind, guidance: &Guidance, rng: &mut StdRng) {
    // lateral steering
    if let Some(bearing) = guidance.commanded_bearing {
        let diff = wrap_angle_diff(bearing, fl.heading);
        let max_change = fl.max_turn_rate_dps * dt;
        let change = diff.clamp(-max_change, max_change);
        fl.heading = (fl.heading + change).rem_euclid(360.0);
    } else {
        fl.heading = (fl.heading + rng.gen_range(-DRIFT_DEG..DRIFT_DEG)).rem_euclid(360.0);
    }

    // vertical shaping
    if let Some(target) = guidance.vnav_target_alt {
        let delta = target - fl.altitude;
        if delta.abs() > VNAV_DEADBAND_FT {
            let mut rate = VNAV_RATE_FPM * delta.signum();
            if delta.abs() < VNAV_TAPER_FT {
                rate *= delta.abs() / VNAV_TAPER_FT;
            }
            fl.vertical_rate = rate;
        } else {
            fl.vertical_rate = 0.0;
        }
    }

    // ground speed = TAS vector + wind vector, (east, north) in knots
    let hdg = fl.heading.to_radians();
    let tas = DVec2::new(hdg.sin(), hdg.cos()) * fl.speed;
    let gs = tas + wind.velocity();
    fl.ground_speed = gs.length();

    // position/altitude integration
    fl.lon += gs.x * KT_TO_DEG_PER_S * dt;
    fl.lat += gs.y * KT_TO_DEG_PER_S * dt;
    fl.altitude += fl.vertical_rate / 60.0 * dt;

    // instantaneous turn rate and coordinated-turn bank
    let dh = wrap_angle_diff(fl.heading, fl.last_heading);
    fl.turn_rate_dps =
        (dh / dt.max(MIN_DT)).clamp(-fl.max_turn_rate_dps, fl.max_turn_rate_dps);

    let v_mps = fl.speed * KT_TO_MPS;
    let omega = fl.turn_rate_dps.to_radians();
    fl.bank_deg = (v_mps * omega)
        .atan2(G)
        .to_degrees()
        .clamp(-fl.max_bank_deg, fl.max_bank_deg);

    fl.last_heading = fl.heading;

    fl.update_derived();
    let (lat, lon) = (fl.lat, fl.lon);
    fl.push_trail(lat, lon);
}
