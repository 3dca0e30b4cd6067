use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use gtd_map::app::App;
use gtd_map::config::Config;
use gtd_map::data::{self, IncidentTable, YearInterval};
use gtd_map::map::{Basemap, MapRenderer, MapStyle};
use gtd_map::ui;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Global attack density map for the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON array of incidents (fields: iyear, latitude, longitude)
    #[arg(short, long)]
    incidents: Option<PathBuf>,

    /// Directory with Natural Earth GeoJSON layers
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial year range, e.g. 1996-2000
    #[arg(short, long)]
    years: Option<String>,

    /// Initial map style: "Blue Marble", "Etopo" or "Plain"
    #[arg(short, long)]
    style: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = cli.incidents {
        config.incidents = path;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(style) = cli.style {
        config.default_style = style;
    }
    let default_years = match &cli.years {
        Some(years) => YearInterval::parse(years).with_context(|| format!("parsing --years {}", years))?,
        None => config.default_interval()?,
    };

    init_logging(&config, cli.verbose)?;

    if MapStyle::ALL.iter().all(|s| s.name() != config.default_style) {
        warn!(style = %config.default_style, "unknown default style, using Blue Marble");
    }

    // Load all available GeoJSON data
    let mut basemap = Basemap::new();
    if config.data_dir.exists() {
        data::load_all_geojson(&mut basemap, &config.data_dir)?;
    }

    // Fall back to simple world if no data loaded
    if !basemap.has_data() {
        info!("no basemap data found, using built-in world outline");
        data::generate_simple_world(&mut basemap);
    }

    let incidents = IncidentTable::load(&config.incidents)
        .with_context(|| format!("loading incidents from {}", config.incidents.display()))?;
    let renderer = MapRenderer::new(basemap).with_marker_alpha(config.marker_alpha);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, renderer, incidents, default_years, &config.default_style);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Mouse drives the year slider: press picks the nearest thumb, release commits
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    renderer: MapRenderer,
    incidents: IncidentTable,
    default_years: YearInterval,
    default_style: &str,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(renderer, incidents, size.width, size.height, default_years, default_style);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            KeyCode::Tab => app.focus_next(),
                            KeyCode::BackTab => app.focus_prev(),

                            KeyCode::Left | KeyCode::Char('h') => app.step(-1),
                            KeyCode::Right | KeyCode::Char('l') => app.step(1),
                            KeyCode::Up | KeyCode::Char('k') => app.cycle_style(-1),
                            KeyCode::Down | KeyCode::Char('j') => app.cycle_style(1),

                            KeyCode::Enter | KeyCode::Char(' ') => app.release(),

                            KeyCode::Char('r') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
