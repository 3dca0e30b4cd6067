use crate::data::YearInterval;
use crate::error::{Error, Result};
use crate::map::{MapStyle, DEFAULT_MARKER_ALPHA};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime settings from an optional YAML file. Missing fields take their
/// defaults; command-line flags override the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON array of incident records
    pub incidents: PathBuf,
    /// Directory holding Natural Earth GeoJSON layers
    pub data_dir: PathBuf,
    /// Log output; stdout belongs to the terminal UI
    pub log_file: PathBuf,
    /// Initial year interval, [start, end]
    pub default_years: [i32; 2],
    /// Initial map style name
    pub default_style: String,
    /// Marker opacity in [0, 1]
    pub marker_alpha: f64,
}

impl Default for Config {
    fn default() -> Self {
        let years = YearInterval::default();
        Self {
            incidents: PathBuf::from("data/gtd.json"),
            data_dir: PathBuf::from("data"),
            log_file: PathBuf::from("gtd-map.log"),
            default_years: [years.start(), years.end()],
            default_style: MapStyle::default().name().to_string(),
            marker_alpha: DEFAULT_MARKER_ALPHA,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.default_interval()?;
        if !(0.0..=1.0).contains(&config.marker_alpha) {
            return Err(Error::InvalidMarkerAlpha(config.marker_alpha));
        }
        Ok(config)
    }

    pub fn default_interval(&self) -> Result<YearInterval> {
        YearInterval::new(self.default_years[0], self.default_years[1])
    }
}
