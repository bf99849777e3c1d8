//! In-memory tabular dataset with per-column type inference.
//!
//! A dataset is loaded atomically from CSV bytes: any parse failure aborts
//! the whole load and exposes no partial table. Column count and names are
//! fixed after load; filtering produces a derived copy, never a mutation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::error::PipelineError;

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Numeric,
    Temporal,
}

/// A single named column. Cells are `None` where the source field was empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
    Temporal(Vec<Option<NaiveDateTime>>),
}

impl Column {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Numeric(_) => ColumnType::Numeric,
            Self::Temporal(_) => ColumnType::Temporal,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Numeric(v) => v.len(),
            Self::Temporal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            Self::Text(v) => v.iter().filter(|c| c.is_none()).count(),
            Self::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Self::Temporal(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Canonical string form of one cell, `None` when the cell is null.
    pub fn cell_to_string(&self, row: usize) -> Option<String> {
        match self {
            Self::Text(v) => v.get(row)?.clone(),
            Self::Numeric(v) => v.get(row)?.map(|n| format!("{}", n)),
            Self::Temporal(v) => v.get(row)?.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// How to read CSV bytes into a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub has_header: bool,

    /// Lines skipped from the top of the input before parsing starts.
    pub skip_rows: usize,

    pub drop_empty_rows: bool,
    pub drop_empty_columns: bool,

    /// Run all-or-nothing column type inference after load.
    pub infer_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            skip_rows: 0,
            drop_empty_rows: true,
            drop_empty_columns: false,
            infer_types: true,
        }
    }
}

/// A table of rows by named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Dataset {
    /// Load a dataset from raw CSV bytes.
    ///
    /// The load is atomic: a malformed record, invalid UTF-8, or an uneven
    /// row anywhere fails the whole call.
    pub fn from_csv(bytes: &[u8], options: &LoadOptions) -> Result<Self, PipelineError> {
        let bytes = skip_lines(bytes, options.skip_rows);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(options.has_header)
            .from_reader(bytes);

        let mut names: Vec<String> = if options.has_header {
            let headers = reader
                .headers()
                .map_err(|e| PipelineError::Parse(e.to_string()))?;
            headers.iter().map(|h| h.trim().to_string()).collect()
        } else {
            Vec::new()
        };

        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineError::Parse(e.to_string()))?;
            let row: Vec<Option<String>> = record
                .iter()
                .map(|field| {
                    let trimmed = field.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
                .collect();
            if options.drop_empty_rows && row.iter().all(|c| c.is_none()) {
                continue;
            }
            rows.push(row);
        }

        if names.is_empty() {
            let width = rows.first().map(|r| r.len()).unwrap_or(0);
            names = (1..=width).map(|i| format!("column_{}", i)).collect();
        }
        if names.is_empty() {
            return Err(PipelineError::Parse("no columns in input".into()));
        }

        // Columnar layout, text-typed until inference runs.
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for row in rows {
            for (i, cell) in row.into_iter().enumerate() {
                columns[i].push(cell);
            }
        }

        if options.drop_empty_columns {
            let keep: Vec<bool> = columns
                .iter()
                .map(|col| col.iter().any(|c| c.is_some()))
                .collect();
            names = names
                .into_iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(n, _)| n)
                .collect();
            columns = columns
                .into_iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(c, _)| c)
                .collect();
        }

        let mut dataset = Self {
            names,
            columns: columns.into_iter().map(Column::Text).collect(),
        };
        if options.infer_types {
            dataset.infer_types();
        }
        Ok(dataset)
    }

    /// Coerce text columns to numeric or temporal where possible.
    ///
    /// All-or-nothing per column: the coercion applies only when every
    /// non-null cell succeeds; a single failing cell leaves the whole column
    /// text. Numeric is tried first, then temporal. Idempotent: columns that
    /// are already typed are left alone.
    pub fn infer_types(&mut self) {
        for column in &mut self.columns {
            let Column::Text(cells) = column else {
                continue;
            };
            if cells.iter().all(|c| c.is_none()) {
                continue;
            }

            let numeric: Option<Vec<Option<f64>>> = cells
                .iter()
                .map(|c| match c {
                    None => Some(None),
                    Some(s) => s.parse::<f64>().ok().map(Some),
                })
                .collect();
            if let Some(values) = numeric {
                *column = Column::Numeric(values);
                continue;
            }

            let temporal: Option<Vec<Option<NaiveDateTime>>> = cells
                .iter()
                .map(|c| match c {
                    None => Some(None),
                    Some(s) => parse_temporal(s).map(Some),
                })
                .collect();
            if let Some(values) = temporal {
                *column = Column::Temporal(values);
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }

    /// Rough in-memory footprint, used as the record size for table captures.
    pub fn approx_size_bytes(&self) -> u64 {
        let mut total = 0u64;
        for column in &self.columns {
            total += match column {
                Column::Text(v) => v
                    .iter()
                    .map(|c| c.as_ref().map(|s| s.len() as u64).unwrap_or(0))
                    .sum(),
                Column::Numeric(v) => v.len() as u64 * 8,
                Column::Temporal(v) => v.len() as u64 * 8,
            };
        }
        total
    }

    /// Rows whose cells in `columns` (all columns when empty) contain `term`,
    /// case-insensitively. Returns a derived dataset; `self` is untouched.
    pub fn filter_contains(&self, term: &str, columns: &[&str]) -> Dataset {
        let needle = term.to_lowercase();
        let search_all = columns.is_empty();
        let searched: Vec<usize> = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, n)| search_all || columns.contains(&n.as_str()))
            .map(|(i, _)| i)
            .collect();

        let keep: Vec<usize> = (0..self.row_count())
            .filter(|&row| {
                searched.iter().any(|&col| {
                    self.columns[col]
                        .cell_to_string(row)
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            })
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|col| match col {
                Column::Text(v) => Column::Text(keep.iter().map(|&r| v[r].clone()).collect()),
                Column::Numeric(v) => Column::Numeric(keep.iter().map(|&r| v[r]).collect()),
                Column::Temporal(v) => Column::Temporal(keep.iter().map(|&r| v[r]).collect()),
            })
            .collect();

        Dataset {
            names: self.names.clone(),
            columns,
        }
    }
}

/// Temporal formats accepted by inference, most specific first.
fn parse_temporal(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Drop the first `count` lines from raw bytes. Treats both LF and CRLF
/// endings as line breaks.
fn skip_lines(bytes: &[u8], count: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..count {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &[],
        }
    }
    rest
}
