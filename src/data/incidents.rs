use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Earliest year covered by the dataset
pub const YEAR_MIN: i32 = 1970;
/// Latest year covered by the dataset
pub const YEAR_MAX: i32 = 2015;

/// Inclusive year range used to filter incidents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearInterval {
    start: i32,
    end: i32,
}

impl YearInterval {
    /// Build an interval, rejecting reversed or out-of-range years
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end || start < YEAR_MIN || end > YEAR_MAX {
            return Err(Error::InvalidInterval {
                start,
                end,
                min: YEAR_MIN,
                max: YEAR_MAX,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    #[inline(always)]
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Parse "START-END" (or a single year)
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::UnparsableYears(s.to_string());
        let (a, b) = match s.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s.trim(), s.trim()),
        };
        let start = a.parse().map_err(|_| invalid())?;
        let end = b.parse().map_err(|_| invalid())?;
        Self::new(start, end)
    }
}

impl Default for YearInterval {
    fn default() -> Self {
        Self {
            start: 1996,
            end: 2000,
        }
    }
}

/// One incident row: year and location
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentRecord {
    #[serde(alias = "iyear")]
    pub year: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl IncidentRecord {
    pub fn new(year: i32, latitude: f64, longitude: f64) -> Self {
        Self {
            year,
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// Selects incidents by year and extracts columns as flat arrays
pub trait DataSelector {
    /// Records whose year lies within `interval` (inclusive)
    fn select_by_year_range(&self, interval: YearInterval) -> IncidentTable;

    /// Extract one named column from a subset.
    /// Missing coordinates come back as NaN.
    fn extract_column(&self, subset: &IncidentTable, column: &str) -> Result<Vec<f64>>;
}

/// In-memory incident dataset
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    records: Vec<IncidentRecord>,
}

impl IncidentTable {
    pub fn new(records: Vec<IncidentRecord>) -> Self {
        Self { records }
    }

    /// Load incidents from a JSON array of objects
    pub fn load(path: &Path) -> Result<Self> {
        let mut bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let table = Self::from_json_bytes(&mut bytes)?;
        info!(path = %path.display(), records = table.len(), "loaded incidents");
        Ok(table)
    }

    /// Decode in place (simd-json mutates its input buffer)
    pub fn from_json_bytes(bytes: &mut [u8]) -> Result<Self> {
        let records: Vec<IncidentRecord> = simd_json::serde::from_slice(bytes)?;
        if records.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }
}

impl DataSelector for IncidentTable {
    fn select_by_year_range(&self, interval: YearInterval) -> IncidentTable {
        let records: Vec<IncidentRecord> = self
            .records
            .iter()
            .filter(|r| interval.contains(r.year))
            .cloned()
            .collect();
        debug!(
            start = interval.start(),
            end = interval.end(),
            selected = records.len(),
            "selected incidents"
        );
        IncidentTable { records }
    }

    fn extract_column(&self, subset: &IncidentTable, column: &str) -> Result<Vec<f64>> {
        let rows = subset.records.iter();
        let values = match column {
            "year" | "iyear" => rows.map(|r| r.year as f64).collect(),
            "latitude" => rows.map(|r| r.latitude.unwrap_or(f64::NAN)).collect(),
            "longitude" => rows.map(|r| r.longitude.unwrap_or(f64::NAN)).collect(),
            other => return Err(Error::MissingColumn(other.to_string())),
        };
        Ok(values)
    }
}
