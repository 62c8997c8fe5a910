/// Geographic bounding box for the simulated airspace, degrees.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Western-Europe default region.
    pub const EUROPE: BoundingBox = BoundingBox {
        lat_min: 30.0,
        lat_max: 60.0,
        lon_min: -20.0,
        lon_max: 40.0,
    };

    pub fn clamp(&self, lat: f64, lon: f64) -> (f64, f64) {
        (
            lat.clamp(self.lat_min, self.lat_max),
            lon.clamp(self.lon_min, self.lon_max),
        )
    }
}

/// Maps geographic coordinates onto a bounded display grid and back.
/// Row 0 / last row and col 0 / last col are reserved for a border, so
/// positions land in `[1, rows-2] x [1, cols-2]`.
#[derive(Debug, Clone, Copy)]
pub struct GeoProjector {
    pub bbox: BoundingBox,
}

impl GeoProjector {
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox }
    }

    /// (lat, lon) -> (row, col). Out-of-range coordinates are clamped to the
    /// box edge, never rejected. Latitude grows downward on the grid.
    pub fn to_grid(&self, lat: f64, lon: f64, rows: usize, cols: usize) -> (usize, usize) {
        let b = &self.bbox;
        let (lat, lon) = b.clamp(lat, lon);
        let yf = (b.lat_max - lat) / (b.lat_max - b.lat_min);
        let xf = (lon - b.lon_min) / (b.lon_max - b.lon_min);
        let row = (yf * (rows as f64 - 2.0)) as usize + 1;
        let col = (xf * (cols as f64 - 2.0)) as usize + 1;
        (row.min(rows - 2), col.min(cols - 2))
    }

    /// (row, col) -> (lat, lon). Inverse linear map. Not a true inverse of
    /// `to_grid`: integer truncation makes the round trip lossy within one
    /// cell. Used only for background computation.
    pub fn to_geo(&self, row: usize, col: usize, rows: usize, cols: usize) -> (f64, f64) {
        let b = &self.bbox;
        let yf = (row as f64 - 1.0) / (rows as f64 - 2.0);
        let xf = (col as f64 - 1.0) / (cols as f64 - 2.0);
        let lat = b.lat_max - yf * (b.lat_max - b.lat_min);
        let lon = b.lon_min + xf * (b.lon_max - b.lon_min);
        (lat, lon)
    }
}

/// Bearing in degrees [0, 360) from (lat1, lon1) to (lat2, lon2), spherical
/// formula. 0 = north, clockwise positive.
pub fn bearing_to(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: usize = 40;
    const COLS: usize = 120;

    fn projector() -> GeoProjector {
        GeoProjector::new(BoundingBox::EUROPE)
    }

    #[test]
    fn grid_stays_inside_border() {
        let p = projector();
        let corners = [
            (30.0, -20.0),
            (30.0, 40.0),
            (60.0, -20.0),
            (60.0, 40.0),
            (45.0, 10.0),
        ];
        for (lat, lon) in corners {
            let (r, c) = p.to_grid(lat, lon, ROWS, COLS);
            assert!((1..=ROWS - 2).contains(&r), "row {r} for ({lat},{lon})");
            assert!((1..=COLS - 2).contains(&c), "col {c} for ({lat},{lon})");
        }
    }

    #[test]
    fn out_of_range_is_clamped_not_rejected() {
        let p = projector();
        let inside = p.to_grid(89.0, 170.0, ROWS, COLS);
        let corner = p.to_grid(60.0, 40.0, ROWS, COLS);
        assert_eq!(inside, corner);
        let low = p.to_grid(-90.0, -179.0, ROWS, COLS);
        let low_corner = p.to_grid(30.0, -20.0, ROWS, COLS);
        assert_eq!(low, low_corner);
    }

    #[test]
    fn north_maps_to_top_row() {
        let p = projector();
        let (top, _) = p.to_grid(60.0, 10.0, ROWS, COLS);
        let (bottom, _) = p.to_grid(30.0, 10.0, ROWS, COLS);
        assert!(top < bottom);
        assert_eq!(top, 1);
    }

    #[test]
    fn round_trip_is_lossy_within_one_cell() {
        let p = projector();
        let (lat, lon) = (47.3, 8.5);
        let (r, c) = p.to_grid(lat, lon, ROWS, COLS);
        let (lat2, lon2) = p.to_geo(r, c, ROWS, COLS);
        let cell_lat = (60.0 - 30.0) / (ROWS as f64 - 2.0);
        let cell_lon = (40.0 - -20.0) / (COLS as f64 - 2.0);
        assert!((lat - lat2).abs() <= cell_lat);
        assert!((lon - lon2).abs() <= cell_lon);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert!((bearing_to(40.0, 0.0, 41.0, 0.0) - 0.0).abs() < 0.01);
        assert!((bearing_to(40.0, 0.0, 39.0, 0.0) - 180.0).abs() < 0.01);
        let east = bearing_to(0.0, 0.0, 0.0, 1.0);
        assert!((east - 90.0).abs() < 0.01, "east bearing {east}");
        let west = bearing_to(0.0, 0.0, 0.0, -1.0);
        assert!((west - 270.0).abs() < 0.01, "west bearing {west}");
    }
}
