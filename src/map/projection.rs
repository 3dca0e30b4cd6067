use std::f64::consts::{FRAC_PI_4, PI};

/// Earth radius used for map-plane coordinates (metres)
pub const EARTH_RADIUS_M: f64 = 6_370_997.0;

/// Miller cylindrical forward projection: (lon, lat) degrees to map-plane metres.
/// x = R·λ, y = 1.25·R·ln(tan(π/4 + 0.4·φ))
#[inline(always)]
pub fn miller_forward(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.clamp(-180.0, 180.0).to_radians();
    let phi = lat.clamp(-90.0, 90.0).to_radians();
    let x = EARTH_RADIUS_M * lambda;
    let y = 1.25 * EARTH_RADIUS_M * (FRAC_PI_4 + 0.4 * phi).tan().ln();
    (x, y)
}

/// Inverse Miller: map-plane metres back to (lon, lat) degrees
#[inline(always)]
pub fn miller_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.5 * (0.8 * y / EARTH_RADIUS_M).exp().atan() - 0.625 * PI).to_degrees();
    (lon, lat)
}

/// Whole-world Miller map fitted into a pixel canvas, letterboxed to keep
/// the projection's aspect ratio
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Pixels per map-plane metre
    scale: f64,
    /// Pixel offset of the map's left edge
    offset_x: f64,
    /// Pixel offset of the map's top edge
    offset_y: f64,
    /// Half extents of the projected world in metres
    half_w: f64,
    half_h: f64,
}

impl Viewport {
    /// Fit the full -180..180 / -90..90 world into the canvas
    pub fn world(width: usize, height: usize) -> Self {
        let (half_w, half_h) = miller_forward(180.0, 90.0);
        let scale_x = width as f64 / (2.0 * half_w);
        let scale_y = height as f64 / (2.0 * half_h);
        let scale = scale_x.min(scale_y);

        let map_w = 2.0 * half_w * scale;
        let map_h = 2.0 * half_h * scale;

        Self {
            width,
            height,
            scale,
            offset_x: (width as f64 - map_w) / 2.0,
            offset_y: (height as f64 - map_h) / 2.0,
            half_w,
            half_h,
        }
    }

    /// Map-plane metres to pixel coordinates
    #[inline(always)]
    pub fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let px = self.offset_x + (x + self.half_w) * self.scale;
        let py = self.offset_y + (self.half_h - y) * self.scale;
        (px.floor() as i32, py.floor() as i32)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    #[inline(always)]
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = miller_forward(lon, lat);
        self.to_pixel(x, y)
    }

    /// Unproject a pixel centre back to (lon, lat); None outside the map area
    pub fn unproject(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let x = (px - self.offset_x) / self.scale - self.half_w;
        let y = self.half_h - (py - self.offset_y) / self.scale;
        if x.abs() > self.half_w || y.abs() > self.half_h {
            return None;
        }
        Some(miller_inverse(x, y))
    }

    /// Pixel rectangle (x0, y0, x1, y1) covered by the map, inclusive
    pub fn map_bounds(&self) -> (i32, i32, i32, i32) {
        let (x0, y0) = self.to_pixel(-self.half_w, self.half_h);
        let (x1, y1) = self.to_pixel(self.half_w, -self.half_h);
        let (x0, y0) = (x0.max(0), y0.max(0));
        let x1 = x1.min(self.width as i32 - 1);
        let y1 = y1.min(self.height as i32 - 1);
        (x0, y0, x1, y1)
    }

    /// Check if a projected point is on the canvas
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}
