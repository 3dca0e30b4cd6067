use crate::controls::{bind, StyleDropdown, Thumb, YearRangeSlider};
use crate::data::{IncidentTable, YearInterval};
use crate::map::{Figure, FigureSize, MapRenderer};
use crate::ui::{self, LayoutAreas};
use ratatui::layout::Rect;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::error;

/// Which control keyboard input goes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    YearStart,
    YearEnd,
    Style,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::YearStart => Focus::YearEnd,
            Focus::YearEnd => Focus::Style,
            Focus::Style => Focus::YearStart,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::YearStart => Focus::Style,
            Focus::YearEnd => Focus::YearStart,
            Focus::Style => Focus::YearEnd,
        }
    }
}

/// Rendering side of the app: owns the renderer, the data, and the latest figure
pub struct MapView {
    renderer: MapRenderer,
    incidents: IncidentTable,
    pub size: FigureSize,
    pub figure: Option<Figure>,
    pub error: Option<String>,
    /// Number of completed render calls
    pub renders: u64,
    last_request: Option<(YearInterval, String)>,
}

impl MapView {
    pub fn new(renderer: MapRenderer, incidents: IncidentTable, size: FigureSize) -> Self {
        Self {
            renderer,
            incidents,
            size,
            figure: None,
            error: None,
            renders: 0,
            last_request: None,
        }
    }

    /// Render and keep the new figure. On failure the previous figure stays
    /// and the error is kept for the status bar.
    pub fn render(&mut self, interval: YearInterval, style: &str) {
        self.last_request = Some((interval, style.to_string()));
        self.renders += 1;
        match self.renderer.render(&self.incidents, interval, style, self.size) {
            Ok(figure) => {
                self.figure = Some(figure);
                self.error = None;
            }
            Err(e) => {
                error!(error = %e, style, "render failed");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Re-render the last request at the current size
    pub fn rerender(&mut self) {
        if let Some((interval, style)) = self.last_request.take() {
            self.render(interval, &style);
        }
    }

    pub fn incident_total(&self) -> usize {
        self.incidents.len()
    }
}

/// Application state
pub struct App {
    pub year_slider: YearRangeSlider,
    pub style_picker: StyleDropdown,
    pub view: Rc<RefCell<MapView>>,
    pub focus: Focus,
    pub should_quit: bool,
    /// Layout regions for mouse hit-testing
    pub areas: LayoutAreas,
    /// Thumb being dragged with the mouse
    mouse_thumb: Option<Thumb>,
    default_years: YearInterval,
    default_style: String,
}

impl App {
    pub fn new(
        renderer: MapRenderer,
        incidents: IncidentTable,
        width: u16,
        height: u16,
        default_years: YearInterval,
        default_style: &str,
    ) -> Self {
        let areas = ui::layout(Rect::new(0, 0, width, height));
        let size = FigureSize::fit(areas.map_inner.width as usize, areas.map_inner.height as usize);
        let view = Rc::new(RefCell::new(MapView::new(renderer, incidents, size)));

        let mut year_slider = YearRangeSlider::new().with_value(default_years);
        let mut style_picker = StyleDropdown::new();
        style_picker.select_name(default_style);

        // Renders the initial map right away
        let sink = Rc::clone(&view);
        bind(&mut year_slider, &mut style_picker, move |interval, style| {
            sink.borrow_mut().render(interval, style);
        });

        Self {
            year_slider,
            style_picker,
            view,
            focus: Focus::YearStart,
            should_quit: false,
            areas,
            mouse_thumb: None,
            default_years,
            default_style: default_style.to_string(),
        }
    }

    /// Update layout and figure size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.areas = ui::layout(Rect::new(0, 0, width, height));
        let size = FigureSize::fit(
            self.areas.map_inner.width as usize,
            self.areas.map_inner.height as usize,
        );
        let mut view = self.view.borrow_mut();
        if view.size != size {
            view.size = size;
            view.rerender();
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    /// Leaving the slider counts as releasing it
    fn set_focus(&mut self, focus: Focus) {
        if focus == Focus::Style {
            self.year_slider.release();
        }
        self.focus = focus;
    }

    /// Left/right on the focused control. Slider moves are pending until release.
    pub fn step(&mut self, delta: i32) {
        match self.focus {
            Focus::YearStart => self.year_slider.drag(Thumb::Start, delta),
            Focus::YearEnd => self.year_slider.drag(Thumb::End, delta),
            Focus::Style => {
                if delta > 0 {
                    self.style_picker.next();
                } else {
                    self.style_picker.prev();
                }
            }
        }
    }

    /// Up/down: cycle the style, only while the dropdown has focus
    pub fn cycle_style(&mut self, delta: i32) {
        if self.focus == Focus::Style {
            self.step(delta);
        }
    }

    /// Enter/space: commit the slider drag
    pub fn release(&mut self) {
        self.year_slider.release();
    }

    /// Restore the initial control values
    pub fn reset(&mut self) {
        self.year_slider.set_value(self.default_years);
        self.style_picker.select_name(&self.default_style);
    }

    /// Year under a terminal column on the slider track, if any
    fn year_at(&self, col: u16, row: u16) -> Option<i32> {
        let track = self.areas.slider_track;
        if row != track.y || col < track.x || col >= track.x + track.width || track.width < 2 {
            return None;
        }
        Some(self.year_for_offset(col - track.x))
    }

    fn year_for_offset(&self, offset: u16) -> i32 {
        let span = (self.year_slider.max - self.year_slider.min) as f64;
        let last = self.areas.slider_track.width.saturating_sub(1).max(1);
        let frac = (offset.min(last)) as f64 / last as f64;
        self.year_slider.min + (frac * span).round() as i32
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        if let Some(year) = self.year_at(col, row) {
            let thumb = self.year_slider.nearest_thumb(year);
            self.focus = match thumb {
                Thumb::Start => Focus::YearStart,
                Thumb::End => Focus::YearEnd,
            };
            self.year_slider.drag_to(thumb, year);
            self.mouse_thumb = Some(thumb);
        } else if ui::contains(self.areas.dropdown, col, row) {
            self.set_focus(Focus::Style);
            self.style_picker.next();
        }
    }

    pub fn mouse_drag(&mut self, col: u16) {
        if let Some(thumb) = self.mouse_thumb {
            let track = self.areas.slider_track;
            // A resize mid-drag can shrink the track to nothing
            if track.width < 2 {
                return;
            }
            let offset = col.clamp(track.x, track.x + track.width.saturating_sub(1)) - track.x;
            let year = self.year_for_offset(offset);
            self.year_slider.drag_to(thumb, year);
        }
    }

    pub fn mouse_up(&mut self) {
        if self.mouse_thumb.take().is_some() {
            self.year_slider.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_simple_world, IncidentRecord};
    use crate::map::Basemap;

    fn app() -> App {
        let mut basemap = Basemap::new();
        generate_simple_world(&mut basemap);
        let incidents = IncidentTable::new(vec![
            IncidentRecord::new(1997, 51.5, -0.1),
            IncidentRecord::new(2005, 40.7, -74.0),
        ]);
        App::new(
            MapRenderer::new(basemap),
            incidents,
            120,
            40,
            YearInterval::default(),
            "Blue Marble",
        )
    }

    #[test]
    fn test_initial_render() {
        let app = app();
        let view = app.view.borrow();
        assert_eq!(view.renders, 1);
        let figure = view.figure.as_ref().unwrap();
        assert_eq!(figure.title, "Global Attack Density Dot Plot: 1996-2000");
        assert_eq!(figure.incident_count, 1);
    }

    #[test]
    fn test_keyboard_drag_renders_on_release() {
        let mut app = app();
        app.focus_next(); // end thumb
        for _ in 0..5 {
            app.step(1);
        }
        assert_eq!(app.view.borrow().renders, 1);
        app.release();
        let view = app.view.borrow();
        assert_eq!(view.renders, 2);
        let figure = view.figure.as_ref().unwrap();
        assert_eq!(figure.title, "Global Attack Density Dot Plot: 1996-2005");
        assert_eq!(figure.incident_count, 2);
    }

    #[test]
    fn test_leaving_slider_releases() {
        let mut app = app();
        app.step(-1);
        app.focus_next();
        assert_eq!(app.view.borrow().renders, 1);
        app.focus_next();
        assert_eq!(app.focus, Focus::Style);
        assert_eq!(app.view.borrow().renders, 2);
    }

    #[test]
    fn test_style_step_renders_immediately() {
        let mut app = app();
        app.focus_prev();
        assert_eq!(app.focus, Focus::Style);
        app.step(1);
        let view = app.view.borrow();
        assert_eq!(view.renders, 2);
        assert_eq!(view.figure.as_ref().unwrap().style.name(), "Etopo");
    }

    #[test]
    fn test_mouse_drag_on_track() {
        let mut app = app();
        let track = app.areas.slider_track;
        app.mouse_down(track.x, track.y);
        app.mouse_drag(track.x + 2);
        assert_eq!(app.view.borrow().renders, 1);
        app.mouse_up();
        assert_eq!(app.view.borrow().renders, 2);
        assert_eq!(app.year_slider.value().start(), app.year_for_offset(2));
    }

    #[test]
    fn test_drag_after_shrinking_terminal() {
        let mut app = app();
        let track = app.areas.slider_track;
        app.mouse_down(track.x + 3, track.y);
        let pending = app.year_slider.displayed();
        app.resize(20, 40);
        assert_eq!(app.areas.slider_track.width, 0);
        app.mouse_drag(5);
        assert_eq!(app.year_slider.displayed(), pending);
        app.mouse_up();
        assert_eq!(app.year_slider.value(), pending);
    }

    #[test]
    fn test_year_for_offset_on_narrow_track() {
        let mut app = app();
        app.areas.slider_track.width = 1;
        assert_eq!(app.year_for_offset(0), app.year_slider.min);
        app.areas.slider_track.width = 0;
        assert_eq!(app.year_for_offset(3), app.year_slider.max);
    }

    #[test]
    fn test_cycle_style_ignored_on_slider() {
        let mut app = app();
        app.cycle_style(1);
        assert_eq!(app.year_slider.displayed(), YearInterval::default());
        assert_eq!(app.style_picker.value(), "Blue Marble");

        app.focus_prev();
        app.cycle_style(-1);
        assert_eq!(app.style_picker.value(), "Plain");
        assert_eq!(app.view.borrow().renders, 2);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut app = app();
        app.focus_prev();
        app.step(1);
        app.reset();
        assert_eq!(app.style_picker.value(), "Blue Marble");
        assert_eq!(app.year_slider.value(), YearInterval::default());
    }

    #[test]
    fn test_resize_rerenders_at_new_size() {
        let mut app = app();
        app.resize(60, 20);
        let view = app.view.borrow();
        assert_eq!(view.renders, 2);
        assert_eq!(view.figure.as_ref().unwrap().size, view.size);
    }
}
