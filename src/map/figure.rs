use crate::braille::{braille_char, BrailleCanvas};
use crate::map::style::{MapStyle, CONTINENT_FILL};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};

/// Width:height of a figure in (roughly square) braille pixels
pub const FIGURE_ASPECT: f64 = 18.0 / 10.0;

/// Figure dimensions in character cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FigureSize {
    pub cols: usize,
    pub rows: usize,
}

impl FigureSize {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Largest 18:10 figure that fits in `cols` x `rows` cells.
    /// Braille gives 2x4 pixels per cell, which is close to square on most terminals.
    pub fn fit(cols: usize, rows: usize) -> Self {
        let avail_w = (cols * 2) as f64;
        let avail_h = (rows * 4) as f64;
        let (w, h) = if avail_w / avail_h.max(1.0) > FIGURE_ASPECT {
            (avail_h * FIGURE_ASPECT, avail_h)
        } else {
            (avail_w, avail_w / FIGURE_ASPECT)
        };
        Self {
            cols: ((w / 2.0) as usize).min(cols),
            rows: ((h / 4.0) as usize).min(rows),
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.cols * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.rows * 4
    }
}

/// Title shown above a rendered map
pub fn figure_title(start: i32, end: i32) -> String {
    format!("Global Attack Density Dot Plot: {}-{}", start, end)
}

/// One rendered map. Owned by the caller; every render builds a fresh one.
#[derive(Debug)]
pub struct Figure {
    pub title: String,
    pub size: FigureSize,
    pub style: MapStyle,
    /// Per-cell background colour (textured styles only)
    pub background: Vec<Option<Color>>,
    pub land_fill: BrailleCanvas,
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    pub boundary: BrailleCanvas,
    pub markers: BrailleCanvas,
    /// Marker hits per cell, drives the density colour
    pub marker_hits: Vec<u32>,
    /// Incidents in the selected interval
    pub incident_count: usize,
    /// Incidents actually plotted (finite, on canvas)
    pub marker_count: usize,
    pub marker_alpha: f64,
}

impl Figure {
    pub fn new(size: FigureSize, style: MapStyle, title: String, marker_alpha: f64) -> Self {
        let blank = BrailleCanvas::new(size.cols, size.rows);
        Self {
            title,
            size,
            style,
            background: vec![None; size.cols * size.rows],
            land_fill: blank.clone(),
            coastlines: blank.clone(),
            borders: blank.clone(),
            boundary: blank.clone(),
            markers: blank,
            marker_hits: vec![0; size.cols * size.rows],
            incident_count: 0,
            marker_count: 0,
            marker_alpha,
        }
    }

    /// Record one marker centred on pixel (px, py)
    pub fn add_marker_hit(&mut self, px: i32, py: i32) {
        if px < 0 || py < 0 {
            return;
        }
        let (col, row) = (px as usize / 2, py as usize / 4);
        if col < self.size.cols && row < self.size.rows {
            self.marker_hits[row * self.size.cols + col] += 1;
            self.marker_count += 1;
        }
    }

    pub fn hits_at(&self, col: usize, row: usize) -> u32 {
        self.marker_hits
            .get(row * self.size.cols + col)
            .copied()
            .unwrap_or(0)
    }

    /// Marker colour for a cell: red composited `hits` times at `marker_alpha`
    /// over the cell background, so overlap reads as density
    pub fn marker_color(&self, col: usize, row: usize) -> Color {
        let hits = self.hits_at(col, row).max(1);
        let coverage = 1.0 - (1.0 - self.marker_alpha).powi(hits as i32);
        let (br, bg, bb) = match self.background[row * self.size.cols + col] {
            Some(Color::Rgb(r, g, b)) => (r, g, b),
            _ => (0, 0, 0),
        };
        let mix = |base: u8, top: u8| (base as f64 + (top as f64 - base as f64) * coverage).round() as u8;
        Color::Rgb(mix(br, 255), mix(bg, 0), mix(bb, 0))
    }

    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..canvas.height().min(area.height as usize) {
            for col in 0..canvas.width().min(area.width as usize) {
                let bits = canvas.cell(col, row);
                // Skip empty braille characters (U+2800)
                if bits == 0 {
                    continue;
                }
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                buf[(x, y)].set_char(braille_char(bits)).set_fg(color);
            }
        }
    }
}

impl Widget for &Figure {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.size.rows.min(area.height as usize);
        let cols = self.size.cols.min(area.width as usize);

        // Background texture first, as cell colours
        for row in 0..rows {
            for col in 0..cols {
                if let Some(color) = self.background[row * self.size.cols + col] {
                    let (x, y) = (area.x + col as u16, area.y + row as u16);
                    buf[(x, y)].set_char(' ').set_bg(color);
                }
            }
        }

        // Then layers from back to front
        Figure::render_layer(&self.land_fill, CONTINENT_FILL, area, buf);
        Figure::render_layer(&self.coastlines, Color::Rgb(16, 16, 16), area, buf);
        Figure::render_layer(&self.borders, Color::White, area, buf);
        Figure::render_layer(&self.boundary, Color::Gray, area, buf);

        // Markers last, merged with whatever dots the cell already shows
        for row in 0..rows {
            for col in 0..cols {
                let bits = self.markers.cell(col, row);
                if bits == 0 {
                    continue;
                }
                let under = self.coastlines.cell(col, row)
                    | self.borders.cell(col, row)
                    | self.boundary.cell(col, row);
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                buf[(x, y)]
                    .set_char(braille_char(bits | under))
                    .set_fg(self.marker_color(col, row));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect() {
        // 200x50 cells = 400x200 px, wider than 18:10 so height limits
        let size = FigureSize::fit(200, 50);
        assert_eq!(size.rows, 50);
        assert_eq!(size.cols, 180);

        // 100x80 cells = 200x320 px, width limits
        let size = FigureSize::fit(100, 80);
        assert_eq!(size.cols, 100);
        assert_eq!(size.rows, 27);
    }

    #[test]
    fn test_fit_empty_area() {
        let size = FigureSize::fit(0, 0);
        assert_eq!(size, FigureSize::new(0, 0));
    }

    #[test]
    fn test_title() {
        assert_eq!(figure_title(1996, 2000), "Global Attack Density Dot Plot: 1996-2000");
    }

    #[test]
    fn test_marker_color_saturates_with_overlap() {
        let mut fig = Figure::new(FigureSize::new(2, 1), MapStyle::Plain, String::new(), 0.8);
        fig.add_marker_hit(0, 0);
        let one = fig.marker_color(0, 0);
        fig.add_marker_hit(1, 1);
        fig.add_marker_hit(0, 3);
        let three = fig.marker_color(0, 0);
        assert_eq!(one, Color::Rgb(204, 0, 0));
        assert_eq!(three, Color::Rgb(253, 0, 0));
        assert_eq!(fig.marker_count, 3);
    }

    #[test]
    fn test_off_canvas_hits_ignored() {
        let mut fig = Figure::new(FigureSize::new(2, 1), MapStyle::Plain, String::new(), 0.8);
        fig.add_marker_hit(-1, 0);
        fig.add_marker_hit(4, 0);
        fig.add_marker_hit(0, 4);
        assert_eq!(fig.marker_count, 0);
    }

    #[test]
    fn test_widget_draws_markers_in_red() {
        let mut fig = Figure::new(FigureSize::new(2, 1), MapStyle::Plain, String::new(), 0.8);
        fig.markers.set_pixel(0, 0);
        fig.add_marker_hit(0, 0);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        (&fig).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "⠁");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(204, 0, 0));
        assert_eq!(buf[(1, 0)].symbol(), " ");
    }
}
