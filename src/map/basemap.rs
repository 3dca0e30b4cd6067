/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Vector layers of the world map
#[derive(Clone, Default)]
pub struct Basemap {
    pub coastlines: Vec<LineString>,
    pub borders: Vec<LineString>,
    /// Exterior rings of land polygons (used for continent fill and textures)
    pub land: Vec<LineString>,
}

impl Basemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_coastline(&mut self, line: LineString) {
        if line.len() >= 2 {
            self.coastlines.push(line);
        }
    }

    pub fn add_border(&mut self, line: LineString) {
        if line.len() >= 2 {
            self.borders.push(line);
        }
    }

    pub fn add_land(&mut self, ring: LineString) {
        if ring.len() >= 3 {
            self.land.push(ring);
        }
    }

    /// Check if any coastline or land data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines.is_empty() || !self.land.is_empty()
    }
}
