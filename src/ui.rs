use crate::app::{App, Focus};
use crate::controls::{StyleDropdown, YearRangeSlider};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the "Year: " label before the slider track
const SLIDER_LABEL_WIDTH: u16 = 6;
/// Width of the " 1996-2000 " readout after the track
const SLIDER_READOUT_WIDTH: u16 = 12;

/// Screen regions, recomputed on resize and used for mouse hit-testing
#[derive(Default, Clone, Copy, Debug)]
pub struct LayoutAreas {
    pub slider: Rect,
    pub slider_track: Rect,
    pub dropdown: Rect,
    pub map: Rect,
    /// Inside the map border
    pub map_inner: Rect,
    pub status_bar: Rect,
}

pub fn layout(area: Rect) -> LayoutAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Controls
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(rows[0]);

    let slider = controls[0];
    let track_width = slider
        .width
        .saturating_sub(SLIDER_LABEL_WIDTH + SLIDER_READOUT_WIDTH);
    let slider_track = Rect::new(slider.x + SLIDER_LABEL_WIDTH.min(slider.width), slider.y, track_width, 1);

    let map = rows[1];
    let map_inner = Block::default().borders(Borders::ALL).inner(map);

    LayoutAreas {
        slider,
        slider_track,
        dropdown: controls[1],
        map,
        map_inner,
        status_bar: rows[2],
    }
}

pub fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());

    render_slider(frame, &app.year_slider, app.focus, areas);
    render_dropdown(frame, &app.style_picker, app.focus == Focus::Style, areas.dropdown);
    render_map(frame, app, areas);
    render_status_bar(frame, app, areas.status_bar);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Track characters for the slider: filled between the thumbs
fn slider_track(slider: &YearRangeSlider, width: usize) -> Vec<(char, bool)> {
    if width == 0 {
        return Vec::new();
    }
    let value = slider.displayed();
    let span = (slider.max - slider.min).max(1) as f64;
    let pos = |year: i32| (((year - slider.min) as f64 / span) * (width - 1) as f64).round() as usize;
    let (a, b) = (pos(value.start()), pos(value.end()));

    (0..width)
        .map(|i| {
            if i == a || i == b {
                ('●', true)
            } else if i > a && i < b {
                ('━', true)
            } else {
                ('─', false)
            }
        })
        .collect()
}

fn render_slider(frame: &mut Frame, slider: &YearRangeSlider, focus: Focus, areas: LayoutAreas) {
    let focused = matches!(focus, Focus::YearStart | Focus::YearEnd);
    let value = slider.displayed();
    let thumb_color = if slider.is_dragging() { Color::Magenta } else { Color::Cyan };

    let mut spans = vec![Span::styled(
        format!("{:<width$}", slider.description, width = SLIDER_LABEL_WIDTH as usize),
        focus_style(focused),
    )];
    for (ch, filled) in slider_track(slider, areas.slider_track.width as usize) {
        let color = if filled { thumb_color } else { Color::DarkGray };
        spans.push(Span::styled(ch.to_string(), Style::default().fg(color)));
    }

    let start_style = focus_style(focus == Focus::YearStart);
    let end_style = focus_style(focus == Focus::YearEnd);
    spans.push(Span::raw(" "));
    spans.push(Span::styled(value.start().to_string(), start_style));
    spans.push(Span::raw("-"));
    spans.push(Span::styled(value.end().to_string(), end_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), areas.slider);
}

fn render_dropdown(frame: &mut Frame, dropdown: &StyleDropdown, focused: bool, area: Rect) {
    let line = Line::from(vec![
        Span::styled(format!("{} ", dropdown.description), focus_style(focused)),
        Span::styled(
            format!("[{} ▾]", dropdown.value()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_map(frame: &mut Frame, app: &App, areas: LayoutAreas) {
    let view = app.view.borrow();
    let title = view
        .figure
        .as_ref()
        .map(|f| f.title.as_str())
        .unwrap_or("Global Attack Density Dot Plot");

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(ratatui::layout::Alignment::Center);

    let inner = block.inner(areas.map);
    frame.render_widget(block, areas.map);

    if let Some(figure) = view.figure.as_ref() {
        // Centre the fixed-aspect figure inside the block
        let w = (figure.size.cols as u16).min(inner.width);
        let h = (figure.size.rows as u16).min(inner.height);
        let area = Rect::new(
            inner.x + (inner.width - w) / 2,
            inner.y + (inner.height - h) / 2,
            w,
            h,
        );
        frame.render_widget(figure, area);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view.borrow();
    let (shown, plotted, style) = match view.figure.as_ref() {
        Some(f) => (f.incident_count, f.marker_count, f.style.name()),
        None => (0, 0, "-"),
    };

    let mut spans = vec![
        Span::styled(" Incidents: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}/{}", shown, view.incident_total()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" Plotted: ", Style::default().fg(Color::DarkGray)),
        Span::styled(plotted.to_string(), Style::default().fg(Color::Red)),
        Span::styled(" Style: ", Style::default().fg(Color::DarkGray)),
        Span::styled(style, Style::default().fg(Color::Magenta)),
        Span::styled(
            " | tab:focus ←→:move ↑↓:style enter:apply r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(err) = view.error.as_ref() {
        spans.push(Span::styled(
            format!(" | error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_slider_takes_most_of_row() {
        let areas = layout(Rect::new(0, 0, 100, 30));
        assert_eq!(areas.slider.width, 80);
        assert_eq!(areas.dropdown.width, 20);
        assert_eq!(areas.slider_track, Rect::new(6, 0, 62, 1));
        assert_eq!(areas.map, Rect::new(0, 1, 100, 28));
        assert_eq!(areas.map_inner, Rect::new(1, 2, 98, 26));
        assert_eq!(areas.status_bar, Rect::new(0, 29, 100, 1));
    }

    #[test]
    fn test_track_fill_between_thumbs() {
        let slider = YearRangeSlider::new();
        let track = slider_track(&slider, 46);
        // One column per year: 1996 and 2000 sit at offsets 26 and 30
        assert_eq!(track[26], ('●', true));
        assert_eq!(track[30], ('●', true));
        assert_eq!(track[28], ('━', true));
        assert_eq!(track[0], ('─', false));
        assert!(slider_track(&slider, 0).is_empty());
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(2, 2, 3, 1);
        assert!(contains(r, 2, 2));
        assert!(contains(r, 4, 2));
        assert!(!contains(r, 5, 2));
        assert!(!contains(r, 2, 3));
    }
}
