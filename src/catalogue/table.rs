//! Tabular source container for catalogue files.
//!
//! A [`Table`] is the raw material the coordinate normalizer works on: a
//! header row plus string cells, read through the `csv` crate with a
//! per-source delimiter. Comment lines are **not** stripped; pre-cleaned
//! input is a precondition of the loader.
//!
//! Each table carries an explicit [`SourceState`] classifying it as raw
//! source data or as the already-normalized output of a previous run. The
//! state is decided once at load time from the derived-column set: none
//! present → [`SourceState::Raw`], all present → [`SourceState::Normalized`],
//! a partial set → a dirty, half-processed file that is rejected outright.

use camino::Utf8Path;

use crate::almanac_errors::AlmanacError;
use crate::constants::FastHashMap;

/// Internal columns created by the normalizer. Their joint presence marks a
/// table as already normalized; partial presence marks a dirty source.
pub(crate) const DERIVED_COLUMNS: [&str; 9] = [
    "__name",
    "__ra_deg",
    "__dec_deg",
    "__ra_hours",
    "__magnitude",
    "__norm_mag",
    "__sizes",
    "__brightness",
    "__target_type",
];

/// Normalization state of a tabular source, decided at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Plain source data: the normalizer must run.
    Raw,
    /// All derived columns already present: the normalizer passes through.
    Normalized,
}

/// A header row plus string cells, as read from one catalogue file.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    index: FastHashMap<String, usize>,
    rows: Vec<Vec<String>>,
    state: SourceState,
}

impl Table {
    /// Read a table from a delimited text file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: file to read.
    /// * `delimiter`: field delimiter (`b','` or `b';'` for the stock sources).
    ///
    /// Return
    /// ----------
    /// * The loaded [`Table`], or an [`AlmanacError`] on I/O failure, ragged
    ///   rows, or a dirty derived-column set.
    pub fn from_csv_path(path: &Utf8Path, delimiter: u8) -> Result<Self, AlmanacError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            // Short rows are padded so blank trailing cells behave like empty values.
            row.resize(width, String::new());
            row.truncate(width);
            rows.push(row);
        }

        Self::assemble(headers, rows)
    }

    /// Build a table from in-memory rows (ephemeris catalogue, tests).
    pub fn from_rows(headers: &[&str], rows: Vec<Vec<String>>) -> Result<Self, AlmanacError> {
        Self::assemble(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    fn assemble(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AlmanacError> {
        let index: FastHashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let state = classify(&headers)?;

        Ok(Table {
            headers,
            index,
            rows,
            state,
        })
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column index by header name.
    pub fn column(&self, name: &str) -> Result<usize, AlmanacError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| AlmanacError::MissingColumn(name.to_string()))
    }

    /// Cell value for `(row, column_index)`.
    pub fn value(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }
}

/// Classify a header set into its [`SourceState`].
///
/// All-or-nothing rule: a partial derived-column set, or leftover internal
/// working columns, signal a file that was half-processed by an earlier run
/// and cannot be trusted.
fn classify(headers: &[String]) -> Result<SourceState, AlmanacError> {
    let present: Vec<&str> = DERIVED_COLUMNS
        .iter()
        .copied()
        .filter(|c| headers.iter().any(|h| h == c))
        .collect();

    if present.is_empty() {
        if let Some(stray) = headers
            .iter()
            .find(|h| h.starts_with("__") && !DERIVED_COLUMNS.contains(&h.as_str()))
        {
            return Err(AlmanacError::DirtySource(format!(
                "internal working column {stray:?} already exists"
            )));
        }
        Ok(SourceState::Raw)
    } else if present.len() == DERIVED_COLUMNS.len() {
        Ok(SourceState::Normalized)
    } else {
        Err(AlmanacError::DirtySource(format!(
            "partial presence of derived columns {present:?}"
        )))
    }
}
