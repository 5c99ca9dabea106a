//! Delimited-text loading with case-insensitive column access.
//!
//! Headers are trimmed and lowercased once at load time; every lookup goes
//! through [`Row::get`], which lowercases the requested column the same way.

use crate::error::{CifttError, Result};
use std::path::Path;
use std::sync::Arc;

pub const TITLE_COLUMN: &str = "title";

/// Bytes inspected when sniffing the delimiter of a file with no known extension.
pub const SNIFF_LIMIT: usize = 4096;

const SNIFF_CANDIDATES: &[u8] = b",\t;|";
const SNIFF_MAX_LINES: usize = 10;

// ---------------------------------------------------------------------------
// Row / Table
// ---------------------------------------------------------------------------

/// One data line of the source file.
#[derive(Debug, Clone)]
pub struct Row {
    position: usize,
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    pub fn new(position: usize, headers: Arc<[String]>, values: Vec<String>) -> Self {
        Self {
            position,
            headers,
            values,
        }
    }

    /// 1-indexed position among the data rows (the header is not counted).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Value of `column`, or `None` when the column is missing or the cell is blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        let key = normalize_header(column);
        let idx = self.headers.iter().position(|h| *h == key)?;
        let value = self.values.get(idx)?.as_str();
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    headers: Arc<[String]>,
    rows: Vec<Row>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        let key = normalize_header(column);
        self.headers.iter().any(|h| *h == key)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate a delimited file.
///
/// Delimiter resolution: `delimiter` if given, then the file extension
/// (`.tsv` tab, `.csv` comma), then sniffing the first [`SNIFF_LIMIT`] bytes,
/// then comma.
pub fn load(path: &Path, delimiter: Option<u8>) -> Result<Table> {
    let data = std::fs::read(path).map_err(|e| CifttError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let delimiter = delimiter.unwrap_or_else(|| resolve_delimiter(path, &data));
    tracing::debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "loading table");

    let table = parse(&data, delimiter).map_err(|message| CifttError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    validate_titles(&table)?;
    Ok(table)
}

/// Parse raw bytes into a [`Table`] without validating required columns.
pub fn parse(data: &[u8], delimiter: u8) -> std::result::Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let headers: Arc<[String]> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        // Short records leave their trailing cells absent; extra fields have no column.
        if record.len() > headers.len() {
            return Err(format!(
                "row {} has {} fields, but the header has {}",
                idx + 1,
                record.len(),
                headers.len()
            ));
        }
        let values = record.iter().map(str::to_string).collect();
        rows.push(Row::new(idx + 1, Arc::clone(&headers), values));
    }

    Ok(Table { headers, rows })
}

fn validate_titles(table: &Table) -> Result<()> {
    if !table.has_column(TITLE_COLUMN) {
        return Err(CifttError::MissingTitleColumn);
    }
    let blank: Vec<usize> = table
        .rows
        .iter()
        .filter(|row| row.get(TITLE_COLUMN).is_none())
        .map(Row::position)
        .collect();
    if !blank.is_empty() {
        return Err(CifttError::BlankTitles { rows: blank });
    }
    Ok(())
}

pub fn normalize_header(value: &str) -> String {
    value.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Delimiter detection
// ---------------------------------------------------------------------------

fn resolve_delimiter(path: &Path, data: &[u8]) -> u8 {
    if let Some(d) = delimiter_for_extension(path) {
        return d;
    }
    let sample = &data[..data.len().min(SNIFF_LIMIT)];
    match sniff_delimiter(sample, data.len() > SNIFF_LIMIT) {
        Some(d) => d,
        None => {
            tracing::warn!(
                path = %path.display(),
                "could not detect delimiter, falling back to comma"
            );
            b','
        }
    }
}

pub fn delimiter_for_extension(path: &Path) -> Option<u8> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "tsv" => Some(b'\t'),
        "csv" => Some(b','),
        _ => None,
    }
}

/// Pick the candidate delimiter that splits every sampled line into the same,
/// non-zero number of fields. Quoted sections are ignored. When `truncated`,
/// the last (possibly partial) line of `sample` is not considered.
pub fn sniff_delimiter(sample: &[u8], truncated: bool) -> Option<u8> {
    let text = String::from_utf8_lossy(sample);
    let mut lines: Vec<&str> = text.lines().collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    let lines: Vec<&str> = lines
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_MAX_LINES)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &candidate in SNIFF_CANDIDATES {
        let first = count_unquoted(lines[0], candidate);
        if first == 0 {
            continue;
        }
        if lines[1..]
            .iter()
            .any(|l| count_unquoted(l, candidate) != first)
        {
            continue;
        }
        if best.map_or(true, |(_, n)| first > n) {
            best = Some((candidate, first));
        }
    }
    best.map(|(d, _)| d)
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
