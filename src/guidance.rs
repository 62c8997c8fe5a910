use crate::flight::Flight;
use crate::geo::bearing_to;

/// Waypoint capture threshold, degrees per axis. Deliberately a rectangular
/// per-axis test rather than a geodesic radius; downstream consumers depend
/// on the exact capture behavior.
const CAPTURE_DEG: f64 = 0.15;

/// Lateral/vertical guidance for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Guidance {
    /// Bearing to steer toward, degrees. `None` when the flight has no route
    /// (the stepper falls back to random drift).
    pub commanded_bearing: Option<f64>,
    /// Altitude to shape the vertical rate toward, ft.
    pub vnav_target_alt: Option<f64>,
}

/// Compute guidance for a flight and advance its waypoint index when the
/// active waypoint is captured. The index wraps, so routes are flown as
/// closed loops.
pub fn update(fl: &mut Flight) -> Guidance {
    let mut g = Guidance {
        commanded_bearing: None,
        vnav_target_alt: fl.vnav_target_alt,
    };

    if fl.route.is_empty() {
        return g;
    }

    let (wp_lat, wp_lon) = fl.route[fl.wp_index % fl.route.len()];
    g.commanded_bearing = Some(bearing_to(fl.lat, fl.lon, wp_lat, wp_lon));

    if (fl.lat - wp_lat).abs() < CAPTURE_DEG && (fl.lon - wp_lon).abs() < CAPTURE_DEG {
        fl.wp_index = (fl.wp_index + 1) % fl.route.len();
    }

    g
}
