use crate::hash::{hash2, rand_simple};
use crate::map::land::LandMask;
use ratatui::style::Color;
use std::fmt;
use tracing::warn;

/// Background treatment for the world map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MapStyle {
    /// Coastlines over a satellite-like texture
    #[default]
    BlueMarble,
    /// Relief/terrain texture
    Etopo,
    /// Solid continent fill with a map boundary
    Plain,
}

impl MapStyle {
    pub const ALL: [MapStyle; 3] = [MapStyle::BlueMarble, MapStyle::Etopo, MapStyle::Plain];

    pub fn name(&self) -> &'static str {
        match self {
            MapStyle::BlueMarble => "Blue Marble",
            MapStyle::Etopo => "Etopo",
            MapStyle::Plain => "Plain",
        }
    }

    /// Resolve a style name. Anything that is not one of the three names
    /// renders as Plain; the fallback is logged.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Blue Marble" => MapStyle::BlueMarble,
            "Etopo" => MapStyle::Etopo,
            "Plain" => MapStyle::Plain,
            other => {
                warn!(style = %other, "unknown map style, falling back to Plain");
                MapStyle::Plain
            }
        }
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solid fill used by the Plain style for continents
pub const CONTINENT_FILL: Color = Color::Rgb(205, 190, 160);

#[inline(always)]
fn jitter(base: (u8, u8, u8), seed: u64, amount: f64) -> Color {
    let j = (rand_simple(seed) - 0.5) * 2.0 * amount;
    let ch = |c: u8| (c as f64 + j).clamp(0.0, 255.0) as u8;
    Color::Rgb(ch(base.0), ch(base.1), ch(base.2))
}

/// Satellite-like colour for one cell: deep ocean, vegetation, desert belts, ice
pub fn blue_marble_color(mask: &LandMask, lon: f64, lat: f64, seed: u64) -> Color {
    let speckle = hash2(seed, (lon * 7.0 + lat * 13.0).to_bits());
    if !mask.is_land(lon, lat) {
        return jitter((8, 28, 66), speckle, 6.0);
    }
    let abs_lat = lat.abs();
    let base = if abs_lat >= 66.0 {
        (225, 230, 238) // ice
    } else if abs_lat >= 55.0 {
        (70, 88, 62) // boreal
    } else if (15.0..=32.0).contains(&abs_lat) {
        (168, 140, 96) // desert belt
    } else {
        (38, 84, 40) // vegetation
    };
    jitter(base, speckle, 10.0)
}

/// Relief colour for one cell. Distance from the coast stands in for depth and
/// elevation: shallow shelf near land, deep ocean far away, lowland green
/// near the coast rising to brown uplands inland.
pub fn etopo_color(mask: &LandMask, lon: f64, lat: f64) -> Color {
    let d = mask.coast_distance(lon, lat, 6);
    if !mask.is_land(lon, lat) {
        return match d {
            1 => Color::Rgb(96, 150, 196),
            2 | 3 => Color::Rgb(52, 100, 160),
            _ => Color::Rgb(22, 52, 112),
        };
    }
    if lat.abs() >= 70.0 {
        return Color::Rgb(236, 240, 244);
    }
    match d {
        1 => Color::Rgb(72, 136, 72),
        2 => Color::Rgb(128, 160, 88),
        3 | 4 => Color::Rgb(178, 158, 104),
        _ => Color::Rgb(140, 100, 66),
    }
}
