use crate::braille::BrailleCanvas;
use crate::data::{DataSelector, YearInterval};
use crate::error::{Error, Result};
use crate::map::basemap::{Basemap, LineString};
use crate::map::figure::{figure_title, Figure, FigureSize};
use crate::map::geometry::{draw_circle, draw_line, draw_rect, fill_polygon};
use crate::map::land::LandMask;
use crate::map::projection::Viewport;
use crate::map::style::{blue_marble_color, etopo_color, MapStyle};
use std::time::Instant;
use tracing::{debug, info};

/// Default marker opacity
pub const DEFAULT_MARKER_ALPHA: f64 = 0.8;

/// Marker radius in braille pixels
const MARKER_RADIUS: i32 = 1;

/// Renders incident density figures over a Miller world map
pub struct MapRenderer {
    basemap: Basemap,
    land_mask: Option<LandMask>,
    marker_alpha: f64,
}

impl MapRenderer {
    pub fn new(basemap: Basemap) -> Self {
        let land_mask = LandMask::build(&basemap.land);
        Self {
            basemap,
            land_mask,
            marker_alpha: DEFAULT_MARKER_ALPHA,
        }
    }

    /// Marker opacity, clamped to [0, 1]; non-finite values keep the default
    pub fn with_marker_alpha(mut self, alpha: f64) -> Self {
        if alpha.is_finite() {
            self.marker_alpha = alpha.clamp(0.0, 1.0);
        }
        self
    }

    /// Render the incidents within `interval` with the named background style.
    /// Unknown style names render as Plain.
    pub fn render(
        &self,
        selector: &dyn DataSelector,
        interval: YearInterval,
        style_name: &str,
        size: FigureSize,
    ) -> Result<Figure> {
        let started = Instant::now();
        let subset = selector.select_by_year_range(interval);
        let style = MapStyle::from_name(style_name);

        let title = figure_title(interval.start(), interval.end());
        let mut figure = Figure::new(size, style, title, self.marker_alpha);
        figure.incident_count = subset.len();

        let viewport = Viewport::world(size.pixel_width(), size.pixel_height());

        for line in &self.basemap.borders {
            draw_linestring(&mut figure.borders, line, &viewport);
        }

        match style {
            MapStyle::BlueMarble => {
                for line in &self.basemap.coastlines {
                    draw_linestring(&mut figure.coastlines, line, &viewport);
                }
                let mask = self.require_land_mask()?;
                paint_background(&mut figure, &viewport, |lon, lat, seed| {
                    blue_marble_color(mask, lon, lat, seed)
                });
            }
            MapStyle::Etopo => {
                let mask = self.require_land_mask()?;
                paint_background(&mut figure, &viewport, |lon, lat, _| etopo_color(mask, lon, lat));
            }
            MapStyle::Plain => {
                for ring in &self.basemap.land {
                    let projected: Vec<(i32, i32)> =
                        ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect();
                    fill_polygon(&mut figure.land_fill, &projected);
                }
                let (x0, y0, x1, y1) = viewport.map_bounds();
                draw_rect(&mut figure.boundary, x0, y0, x1, y1);
            }
        }

        let lat = selector.extract_column(&subset, "latitude")?;
        let lon = selector.extract_column(&subset, "longitude")?;

        for (&lon, &lat) in lon.iter().zip(lat.iter()) {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let (px, py) = viewport.project(lon, lat);
            if viewport.is_visible(px, py) {
                draw_circle(&mut figure.markers, px, py, MARKER_RADIUS);
                figure.add_marker_hit(px, py);
            }
        }

        info!(
            start = interval.start(),
            end = interval.end(),
            style = %style,
            incidents = figure.incident_count,
            markers = figure.marker_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered figure"
        );
        Ok(figure)
    }

    fn require_land_mask(&self) -> Result<&LandMask> {
        self.land_mask
            .as_ref()
            .ok_or(Error::MissingAsset("land polygons for textured background"))
    }
}

/// Fill every cell inside the map area with a texture colour
fn paint_background<F>(figure: &mut Figure, viewport: &Viewport, mut color_at: F)
where
    F: FnMut(f64, f64, u64) -> ratatui::style::Color,
{
    let cols = figure.size.cols;
    for row in 0..figure.size.rows {
        for col in 0..cols {
            // Sample at the centre of the 2x4 pixel cell
            let px = col as f64 * 2.0 + 1.0;
            let py = row as f64 * 4.0 + 2.0;
            if let Some((lon, lat)) = viewport.unproject(px, py) {
                let seed = (row * cols + col) as u64;
                figure.background[row * cols + col] = Some(color_at(lon, lat, seed));
            }
        }
    }
    debug!(cols, rows = figure.size.rows, "painted background texture");
}

/// Draw a linestring, skipping segments that wrap around the antimeridian
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = (px - prev_x).unsigned_abs() as usize;
            if dist < viewport.width / 2 && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_simple_world, IncidentRecord, IncidentTable};

    fn renderer() -> MapRenderer {
        let mut basemap = Basemap::new();
        generate_simple_world(&mut basemap);
        MapRenderer::new(basemap)
    }

    fn incidents() -> IncidentTable {
        IncidentTable::new(vec![
            IncidentRecord::new(1996, 51.50, -0.12),
            IncidentRecord::new(1997, 40.71, -74.00),
            IncidentRecord::new(1997, 40.72, -74.01),
            IncidentRecord::new(1999, 33.31, 44.36),
            IncidentRecord::new(2000, -33.92, 18.42),
            IncidentRecord {
                year: 2000,
                latitude: None,
                longitude: None,
            },
            IncidentRecord::new(2010, 34.52, 69.18),
        ])
    }

    fn defaults() -> (YearInterval, FigureSize) {
        (YearInterval::new(1996, 2000).unwrap(), FigureSize::new(90, 25))
    }

    /// Selector whose columns cannot be found
    struct NoCoordinates;

    impl DataSelector for NoCoordinates {
        fn select_by_year_range(&self, _interval: YearInterval) -> IncidentTable {
            IncidentTable::default()
        }

        fn extract_column(&self, _subset: &IncidentTable, column: &str) -> Result<Vec<f64>> {
            Err(Error::MissingColumn(column.to_string()))
        }
    }

    #[test]
    fn test_default_title() {
        let (interval, size) = defaults();
        let fig = renderer().render(&incidents(), interval, "Blue Marble", size).unwrap();
        assert_eq!(fig.title, "Global Attack Density Dot Plot: 1996-2000");
    }

    #[test]
    fn test_every_style_renders() {
        let (interval, size) = defaults();
        let r = renderer();
        for style in MapStyle::ALL {
            let fig = r.render(&incidents(), interval, style.name(), size).unwrap();
            assert_eq!(fig.style, style);
            assert_eq!(fig.size, size);
            assert!(!fig.borders.is_blank());
        }
    }

    #[test]
    fn test_textured_styles_paint_background() {
        let (interval, size) = defaults();
        let r = renderer();
        let marble = r.render(&incidents(), interval, "Blue Marble", size).unwrap();
        assert!(marble.background.iter().any(|c| c.is_some()));
        assert!(!marble.coastlines.is_blank());
        assert!(marble.land_fill.is_blank());

        let etopo = r.render(&incidents(), interval, "Etopo", size).unwrap();
        assert!(etopo.background.iter().any(|c| c.is_some()));
        assert!(etopo.coastlines.is_blank());
    }

    #[test]
    fn test_unknown_style_uses_plain_path() {
        let (interval, size) = defaults();
        let fig = renderer().render(&incidents(), interval, "Foo", size).unwrap();
        assert_eq!(fig.style, MapStyle::Plain);
        assert!(!fig.land_fill.is_blank());
        assert!(!fig.boundary.is_blank());
        assert!(fig.background.iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_markers_only_for_interval() {
        let (interval, size) = defaults();
        let fig = renderer().render(&incidents(), interval, "Plain", size).unwrap();
        // Six rows in range, one without coordinates
        assert_eq!(fig.incident_count, 6);
        assert_eq!(fig.marker_count, 5);
        assert!(!fig.markers.is_blank());
    }

    #[test]
    fn test_empty_interval_has_no_markers() {
        let size = FigureSize::new(90, 25);
        let interval = YearInterval::new(1970, 1975).unwrap();
        let fig = renderer().render(&incidents(), interval, "Etopo", size).unwrap();
        assert_eq!(fig.incident_count, 0);
        assert_eq!(fig.marker_count, 0);
        assert!(fig.markers.is_blank());
    }

    #[test]
    fn test_marker_lands_where_projected() {
        let size = FigureSize::new(90, 25);
        let interval = YearInterval::new(1996, 1996).unwrap();
        let fig = renderer().render(&incidents(), interval, "Plain", size).unwrap();
        let vp = Viewport::world(size.pixel_width(), size.pixel_height());
        let (px, py) = vp.project(-0.12, 51.50);
        assert!(fig.markers.is_set(px as usize, py as usize));
        assert_eq!(fig.hits_at(px as usize / 2, py as usize / 4), 1);
    }

    #[test]
    fn test_missing_column_propagates() {
        let (interval, size) = defaults();
        let err = renderer().render(&NoCoordinates, interval, "Plain", size).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "latitude"));
    }

    #[test]
    fn test_textured_style_needs_land() {
        let (interval, size) = defaults();
        let mut basemap = Basemap::new();
        basemap.add_coastline(vec![(0.0, 0.0), (10.0, 10.0)]);
        let r = MapRenderer::new(basemap);
        let err = r.render(&incidents(), interval, "Blue Marble", size).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(_)));
        assert!(r.render(&incidents(), interval, "Plain", size).is_ok());
    }

    #[test]
    fn test_marker_alpha_ignores_nan() {
        let r = renderer().with_marker_alpha(f64::NAN);
        assert_eq!(r.marker_alpha, DEFAULT_MARKER_ALPHA);
        let r = renderer().with_marker_alpha(3.0);
        assert_eq!(r.marker_alpha, 1.0);
    }

    #[test]
    fn test_render_is_repeatable() {
        let (interval, size) = defaults();
        let r = renderer();
        let a = r.render(&incidents(), interval, "Blue Marble", size).unwrap();
        let b = r.render(&incidents(), interval, "Blue Marble", size).unwrap();
        assert_eq!(a.background, b.background);
        assert_eq!(a.marker_hits, b.marker_hits);
        assert_eq!(a.markers.to_string(), b.markers.to_string());
    }
}
