mod bundled;
pub mod label;
mod parser;

pub use label::{AgeBound, AgeWindow};

use super::domain::{IntervalBucket, MeasurementKind, Sex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 5th, 50th, and 95th percentile of the increment for one age window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRecord {
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

impl ThresholdRecord {
    /// Returns `None` unless the values are finite and `p5 <= p50 <= p95`.
    pub fn new(p5: f64, p50: f64, p95: f64) -> Option<Self> {
        let record = Self { p5, p50, p95 };
        record.is_monotonic().then_some(record)
    }

    pub fn is_monotonic(&self) -> bool {
        [self.p5, self.p50, self.p95].iter().all(|value| value.is_finite())
            && self.p5 <= self.p50
            && self.p50 <= self.p95
    }
}

/// Coordinates of one reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableKey {
    pub kind: MeasurementKind,
    pub sex: Sex,
    pub bucket: IntervalBucket,
}

impl TableKey {
    pub fn new(kind: MeasurementKind, sex: Sex, bucket: IntervalBucket) -> Self {
        Self { kind, sex, bucket }
    }

    /// Whether WHO publishes a velocity standard for this combination.
    pub fn is_published(&self) -> bool {
        !(self.kind == MeasurementKind::Length && self.bucket == IntervalBucket::OneMonth)
    }

    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.kind.key(), self.sex.key(), self.bucket.key())
    }

    /// Parses a `{kind}_{sex}_{interval}` file stem such as `weight_female_3mo`.
    pub fn from_file_stem(stem: &str) -> Result<Self, ReferenceDataError> {
        let unrecognized = || ReferenceDataError::UnrecognizedTable(stem.to_string());
        let mut parts = stem.split('_');
        let (Some(kind), Some(sex), Some(bucket), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unrecognized());
        };

        let key = TableKey {
            kind: kind.parse().map_err(|_| unrecognized())?,
            sex: sex.parse().map_err(|_| unrecognized())?,
            bucket: bucket.parse().map_err(|_| unrecognized())?,
        };

        if key.is_published() {
            Ok(key)
        } else {
            Err(ReferenceDataError::UnpublishedTable(key.to_string()))
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind.key(), self.sex.key(), self.bucket)
    }
}

/// Percentile bands for one (kind, sex, interval) combination, keyed by canonical window.
#[derive(Debug, Clone)]
pub struct AgeWindowTable {
    key: TableKey,
    rows: BTreeMap<AgeWindow, ThresholdRecord>,
}

impl AgeWindowTable {
    pub(crate) fn new(key: TableKey, rows: BTreeMap<AgeWindow, ThresholdRecord>) -> Self {
        Self { key, rows }
    }

    pub fn key(&self) -> TableKey {
        self.key
    }

    pub fn get(&self, window: &AgeWindow) -> Option<&ThresholdRecord> {
        self.rows.get(window)
    }

    /// Looks a label up after normalizing it the same way table rows were normalized.
    pub fn lookup(&self, label: &str) -> Option<(AgeWindow, &ThresholdRecord)> {
        let window = label.parse::<AgeWindow>().ok()?;
        self.rows.get(&window).map(|record| (window, record))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&AgeWindow, &ThresholdRecord)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Where a store's tables were read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReferenceOrigin {
    /// Readers handed to [`ReferenceTableStore::from_sources`].
    #[default]
    Inline,
    /// Tables compiled into the crate.
    Bundled,
    Directory(PathBuf),
}

impl ReferenceOrigin {
    /// Bundled values are not yet checked row by row against the WHO release.
    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::Bundled)
    }
}

impl fmt::Display for ReferenceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline tables"),
            Self::Bundled => f.write_str("bundled WHO 2006 tables (provisional)"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Immutable set of velocity tables, built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTableStore {
    tables: HashMap<TableKey, AgeWindowTable>,
    origin: ReferenceOrigin,
}

impl ReferenceTableStore {
    /// Loads the WHO 2006 tables compiled into the crate.
    pub fn load_bundled() -> Result<Self, ReferenceDataError> {
        let sources = bundled::WHO_2006_TABLES
            .iter()
            .map(|(stem, source)| (*stem, Cursor::new(source.as_bytes())));
        let mut store = Self::from_sources(sources)?;
        store.origin = ReferenceOrigin::Bundled;
        warn!(
            tables = store.len(),
            "loaded provisional bundled WHO 2006 velocity tables; set GROWTH_REFERENCE_DIR to the published tables"
        );
        Ok(store)
    }

    /// Loads every `{kind}_{sex}_{interval}.csv` file in `dir`.
    ///
    /// Files with other extensions are ignored. Missing combinations are logged and later
    /// degrade evaluations to `unknown` rather than failing the load.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ReferenceDataError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ReferenceDataError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| ReferenceDataError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let stem = stem.to_string();
            let file = std::fs::File::open(&path).map_err(|source| ReferenceDataError::Io {
                path: path.clone(),
                source,
            })?;
            files.push((stem, file));
        }
        files.sort_by(|left, right| left.0.cmp(&right.0));

        let mut store = Self::from_sources(files)?;
        store.origin = ReferenceOrigin::Directory(dir.to_path_buf());
        for missing in store.missing_tables() {
            warn!(table = %missing, dir = %dir.display(), "reference table missing");
        }
        info!(tables = store.len(), dir = %dir.display(), "loaded velocity tables from directory");
        Ok(store)
    }

    /// Builds a store from `(file stem, reader)` pairs.
    pub fn from_sources<I, S, R>(sources: I) -> Result<Self, ReferenceDataError>
    where
        I: IntoIterator<Item = (S, R)>,
        S: AsRef<str>,
        R: Read,
    {
        let mut tables = HashMap::new();

        for (stem, reader) in sources {
            let key = TableKey::from_file_stem(stem.as_ref())?;
            if tables.contains_key(&key) {
                return Err(ReferenceDataError::DuplicateTable(key.to_string()));
            }
            let table = parser::parse_table(key, reader)?;
            tables.insert(key, table);
        }

        if tables.is_empty() {
            return Err(ReferenceDataError::EmptyStore);
        }

        Ok(Self {
            tables,
            origin: ReferenceOrigin::Inline,
        })
    }

    pub fn origin(&self) -> &ReferenceOrigin {
        &self.origin
    }

    pub fn table(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        bucket: IntervalBucket,
    ) -> Option<&AgeWindowTable> {
        self.tables.get(&TableKey::new(kind, sex, bucket))
    }

    /// Tables in a stable (kind, sex, interval) order.
    pub fn tables(&self) -> Vec<&AgeWindowTable> {
        let mut tables: Vec<&AgeWindowTable> = self.tables.values().collect();
        tables.sort_by_key(|table| table.key());
        tables
    }

    /// Published combinations that have no table in this store.
    pub fn missing_tables(&self) -> Vec<TableKey> {
        published_keys()
            .filter(|key| !self.tables.contains_key(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Every (kind, sex, interval) combination WHO publishes a table for.
pub fn published_keys() -> impl Iterator<Item = TableKey> {
    MeasurementKind::ordered().into_iter().flat_map(|kind| {
        Sex::ordered().into_iter().flat_map(move |sex| {
            IntervalBucket::ordered()
                .into_iter()
                .map(move |bucket| TableKey::new(kind, sex, bucket))
                .filter(TableKey::is_published)
        })
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to read reference data at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV in reference table {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error("reference table {table} has an unrecognized age window label '{label}'")]
    InvalidLabel { table: String, label: String },
    #[error("reference table {table} lists age window {window} more than once")]
    DuplicateWindow { table: String, window: String },
    #[error(
        "reference table {table}, window {window}: percentiles must satisfy p5 <= p50 <= p95 (found {p5}, {p50}, {p95})"
    )]
    NonMonotonic {
        table: String,
        window: String,
        p5: f64,
        p50: f64,
        p95: f64,
    },
    #[error("reference table {0} has no rows")]
    EmptyTable(String),
    #[error("'{0}' is not a reference table name (expected {{kind}}_{{sex}}_{{interval}})")]
    UnrecognizedTable(String),
    #[error("WHO publishes no velocity standard for {0}")]
    UnpublishedTable(String),
    #[error("reference table {0} supplied more than once")]
    DuplicateTable(String),
    #[error("no reference tables found")]
    EmptyStore,
}
