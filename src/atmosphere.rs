// Simplified ISA atmosphere: linear lapse troposphere below 11 km, isothermal
// above. Only what the event snapshot needs (Mach and indicated airspeed).

const T0: f64 = 288.15; // sea-level temperature (K)
const L: f64 = 0.0065; // troposphere lapse rate (K/m)
const R: f64 = 287.052; // specific gas constant (J/(kg*K))
const GAMMA: f64 = 1.4; // ratio of specific heats
const G: f64 = 9.80665; // gravity (m/s^2)

const FT_TO_M: f64 = 0.3048;
const KT_TO_MPS: f64 = 0.514444;

/// Derive (mach, ias_knots) from true altitude (ft) and true airspeed (kt).
///
/// Pure and total: degenerate inputs are clamped, never an error. IAS comes
/// from the density ratio sigma = (T/T0)^(g/(L*R) - 1), floored so the square
/// root stays real.
pub fn derive(altitude_ft: f64, tas_knots: f64) -> (f64, f64) {
    let alt_m = (altitude_ft * FT_TO_M).max(0.0);

    let t = if alt_m <= 11_000.0 {
        T0 - L * alt_m
    } else {
        T0 - L * 11_000.0
    };

    let a = (GAMMA * R * t).sqrt(); // local speed of sound (m/s)
    let tas_mps = tas_knots * KT_TO_MPS;
    let mach = (tas_mps / a.max(1e-6)).max(0.0);

    let expo = G / (L * R) - 1.0; // barometric exponent
    let sigma = (t / T0).powf(expo);
    let ias_mps = tas_mps * sigma.max(0.1).sqrt();
    let ias_knots = ias_mps / KT_TO_MPS;

    (mach, ias_knots)
}
