use rayon::prelude::*;

/// Longitude [-180, 180] to a [0, 360) grid coordinate
#[inline(always)]
fn grid_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0)
}

/// Latitude [-90, 90] to a [0, 180) grid coordinate
#[inline(always)]
fn grid_lat(lat: f64) -> f64 {
    (lat + 90.0).clamp(0.0, 179.999)
}

/// Coarse land grid (1° cells = 360×180) for O(1) land lookups while texturing
pub struct LandMask {
    cells: Vec<bool>,
}

/// Axis-aligned bounds of a ring, used to skip most point-in-polygon tests
struct RingBounds<'a> {
    ring: &'a [(f64, f64)],
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
}

impl LandMask {
    const WIDTH: usize = 360;
    const HEIGHT: usize = 180;

    /// Rasterize land rings; returns None when there are no rings
    pub fn build(rings: &[Vec<(f64, f64)>]) -> Option<Self> {
        let bounds: Vec<RingBounds> = rings
            .iter()
            .filter(|r| r.len() >= 3)
            .map(|ring| {
                let mut b = RingBounds {
                    ring,
                    min_lon: f64::MAX,
                    max_lon: f64::MIN,
                    min_lat: f64::MAX,
                    max_lat: f64::MIN,
                };
                for &(lon, lat) in ring.iter() {
                    b.min_lon = b.min_lon.min(lon);
                    b.max_lon = b.max_lon.max(lon);
                    b.min_lat = b.min_lat.min(lat);
                    b.max_lat = b.max_lat.max(lat);
                }
                b
            })
            .collect();

        if bounds.is_empty() {
            return None;
        }

        let mut cells = vec![false; Self::WIDTH * Self::HEIGHT];

        // Rows are independent, so rasterize them in parallel
        cells
            .par_chunks_mut(Self::WIDTH)
            .enumerate()
            .for_each(|(lat_idx, row)| {
                let lat = lat_idx as f64 - 90.0 + 0.5; // Cell center
                for (lon_idx, cell) in row.iter_mut().enumerate() {
                    let lon = lon_idx as f64 - 180.0 + 0.5;
                    *cell = bounds.iter().any(|b| {
                        lon >= b.min_lon
                            && lon <= b.max_lon
                            && lat >= b.min_lat
                            && lat <= b.max_lat
                            && point_in_ring(lon, lat, b.ring)
                    });
                }
            });

        Some(Self { cells })
    }

    #[inline(always)]
    fn index(lon: f64, lat: f64) -> usize {
        let lon_idx = (grid_lon(lon) as usize).min(Self::WIDTH - 1);
        let lat_idx = grid_lat(lat) as usize;
        lat_idx * Self::WIDTH + lon_idx
    }

    /// Fast O(1) land check
    #[inline(always)]
    pub fn is_land(&self, lon: f64, lat: f64) -> bool {
        self.cells[Self::index(lon, lat)]
    }

    #[cfg(test)]
    fn land_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Distance in whole degrees (Chebyshev, up to `max`) from (lon, lat) to the
    /// nearest cell of the opposite kind. Used as a cheap relief proxy.
    pub fn coast_distance(&self, lon: f64, lat: f64, max: u8) -> u8 {
        let here = self.is_land(lon, lat);
        for d in 1..=max {
            let r = d as f64;
            let mut k = -r;
            while k <= r {
                if self.is_land(lon + k, lat - r) != here
                    || self.is_land(lon + k, lat + r) != here
                    || self.is_land(lon - r, lat + k) != here
                    || self.is_land(lon + r, lat + k) != here
                {
                    return d;
                }
                k += 1.0;
            }
        }
        max
    }
}

/// Even-odd ray cast point-in-polygon
fn point_in_ring(lon: f64, lat: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Vec<(f64, f64)> {
        vec![(lon0, lat0), (lon1, lat0), (lon1, lat1), (lon0, lat1), (lon0, lat0)]
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_ring(5.0, 5.0, &ring));
        assert!(!point_in_ring(15.0, 5.0, &ring));
        assert!(!point_in_ring(5.0, -1.0, &ring));
    }

    #[test]
    fn test_mask_lookup() {
        let mask = LandMask::build(&[square(0.0, 0.0, 10.0, 10.0)]).unwrap();
        assert!(mask.is_land(5.0, 5.0));
        assert!(!mask.is_land(-20.0, 5.0));
        assert!(!mask.is_land(5.0, 50.0));
        assert_eq!(mask.land_cells(), 100);
    }

    #[test]
    fn test_mask_edges_do_not_panic() {
        let mask = LandMask::build(&[square(-180.0, -90.0, 180.0, 90.0)]).unwrap();
        assert!(mask.is_land(180.0, 90.0));
        assert!(mask.is_land(-180.0, -90.0));
    }

    #[test]
    fn test_empty_mask() {
        assert!(LandMask::build(&[]).is_none());
        assert!(LandMask::build(&[vec![(0.0, 0.0), (1.0, 1.0)]]).is_none());
    }

    #[test]
    fn test_coast_distance() {
        let mask = LandMask::build(&[square(0.0, 0.0, 20.0, 20.0)]).unwrap();
        assert_eq!(mask.coast_distance(0.5, 10.5, 6), 1);
        assert_eq!(mask.coast_distance(10.5, 10.5, 6), 6);
        assert_eq!(mask.coast_distance(-2.5, 10.5, 6), 3);
    }
}
