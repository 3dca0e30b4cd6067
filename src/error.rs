use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading data or rendering a figure
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode incidents: {0}")]
    Json(#[from] simd_json::Error),

    #[error("failed to parse GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid year interval {start}-{end} (bounds {min}-{max})")]
    InvalidInterval { start: i32, end: i32, min: i32, max: i32 },

    #[error("cannot parse year range '{0}' (expected START-END, e.g. 1996-2000)")]
    UnparsableYears(String),

    #[error("marker_alpha must be a number in [0, 1], got {0}")]
    InvalidMarkerAlpha(f64),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("missing map asset: {0}")]
    MissingAsset(&'static str),

    #[error("no incident records loaded")]
    EmptyDataset,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
