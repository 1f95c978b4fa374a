//! Bar repository: every `<root>/<category>/<segment>.csv` file loaded into
//! memory once, looked up by [`DataLabel`].
//!
//! CSV columns: `timestamp,open,high,low,close,preclose,volume,contract_id`.
//! Timestamps may be `YYYY-MM-DD HH:MM:SS`, ISO `YYYY-MM-DDTHH:MM:SS` or a
//! bare date (taken as midnight).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use futlab_core::{Bar, BarTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' row {row}: unparseable timestamp '{value}'")]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("'{path}' row {row}: timestamps must be strictly increasing")]
    Unordered { path: PathBuf, row: usize },

    #[error("'{path}' row {row}: bar fails sanity checks (NaN, non-positive or inverted range)")]
    InsaneBar { path: PathBuf, row: usize },

    #[error("'{path}' contains no bars")]
    Empty { path: PathBuf },

    #[error("data root '{0}' contains no <category>/<segment>.csv files")]
    NoSeries(PathBuf),
}

/// Identifies one bar series: a product category and a segment of its
/// history (a contract chain, a date slice, a venue).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataLabel {
    pub category: String,
    pub segment: String,
}

impl DataLabel {
    pub fn new(category: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            segment: segment.into(),
        }
    }
}

impl fmt::Display for DataLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.segment)
    }
}

/// In-memory store of bar tables keyed by label.
#[derive(Debug, Clone, Default)]
pub struct BarRepository {
    tables: BTreeMap<DataLabel, BarTable>,
}

impl BarRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<root>/<category>/<segment>.csv`. Files at other depths
    /// and non-CSV files are ignored.
    pub fn open(root: &Path) -> Result<Self, LoadError> {
        let mut repo = Self::new();
        for category_dir in sorted_entries(root)? {
            if !category_dir.is_dir() {
                continue;
            }
            let Some(category) = category_dir.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            for file in sorted_entries(&category_dir)? {
                if file.extension().and_then(|e| e.to_str()) != Some("csv") {
                    continue;
                }
                let Some(segment) = file_stem(&file) else {
                    continue;
                };
                let bars = read_bars(&file)?;
                debug!(category = %category, segment = %segment, bars = bars.len(), "loaded series");
                repo.insert(DataLabel::new(category, segment), bars);
            }
        }

        if repo.is_empty() {
            return Err(LoadError::NoSeries(root.to_path_buf()));
        }
        info!(series = repo.len(), root = %root.display(), "bar repository loaded");
        Ok(repo)
    }

    pub fn insert(&mut self, label: DataLabel, bars: Vec<Bar>) {
        self.tables.insert(label, BarTable::new(bars));
    }

    pub fn get(&self, label: &DataLabel) -> Option<&BarTable> {
        self.tables.get(label)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> Vec<DataLabel> {
        self.tables.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DataLabel, &BarTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.sort();
    Ok(paths)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    preclose: f64,
    #[serde(default)]
    volume: u64,
    contract_id: String,
}

/// Read and validate one bar CSV file.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bars(file, path)
}

/// Parse bar CSV from any reader. `path` only labels errors.
pub fn parse_bars<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars: Vec<Bar> = Vec::new();

    for (i, row) in rdr.deserialize::<BarRow>().enumerate() {
        let row_no = i + 1;
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: path.to_path_buf(),
            row: row_no,
            value: row.timestamp.clone(),
        })?;
        if bars.last().is_some_and(|prev| prev.timestamp >= timestamp) {
            return Err(LoadError::Unordered {
                path: path.to_path_buf(),
                row: row_no,
            });
        }

        let bar = Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            preclose: row.preclose,
            volume: row.volume,
            contract_id: row.contract_id,
        };
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar {
                path: path.to_path_buf(),
                row: row_no,
            });
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(bars)
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp in any of the accepted CSV formats.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
