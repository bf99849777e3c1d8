//! Descriptive statistics over a loaded dataset.
//!
//! Everything here is recomputed from the dataset on demand; nothing is
//! cached that could drift from the table itself.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::dataset::{Column, ColumnType, Dataset};

/// Whole-table overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
}

/// Statistics for a numeric column, over its non-null cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 in the denominator).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

/// Statistics for a text column, over its non-null cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStats {
    pub avg_length: f64,
    pub max_length: usize,
    pub most_common: Option<String>,
}

/// Per-column profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(skip)]
    pub column_type: ColumnType,
    pub non_null: usize,
    pub nulls: usize,
    pub unique: usize,
    pub numeric: Option<NumericStats>,
    pub text: Option<TextStats>,
}

/// Summarize the whole table.
pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let rows = dataset.row_count();
    let missing_cells = dataset.columns().iter().map(Column::null_count).sum();

    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(rows);
    let mut duplicate_rows = 0;
    for row in 0..rows {
        let key: Vec<Option<String>> = dataset
            .columns()
            .iter()
            .map(|col| col.cell_to_string(row))
            .collect();
        if !seen.insert(key) {
            duplicate_rows += 1;
        }
    }

    DatasetSummary {
        rows,
        columns: dataset.column_count(),
        missing_cells,
        duplicate_rows,
    }
}

/// Profile every column in the dataset, in column order.
pub fn column_summaries(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .names()
        .iter()
        .zip(dataset.columns())
        .map(|(name, column)| summarize_column(name, column))
        .collect()
}

fn summarize_column(name: &str, column: &Column) -> ColumnSummary {
    let nulls = column.null_count();
    let non_null = column.len() - nulls;

    let (unique, numeric, text) = match column {
        Column::Numeric(cells) => {
            let values: Vec<f64> = cells.iter().flatten().copied().collect();
            let unique: HashSet<u64> = values.iter().map(|v| v.to_bits()).collect();
            (unique.len(), numeric_stats(&values), None)
        }
        Column::Temporal(cells) => {
            let unique: HashSet<_> = cells.iter().flatten().collect();
            (unique.len(), None, None)
        }
        Column::Text(cells) => {
            let values: Vec<&String> = cells.iter().flatten().collect();
            let unique: HashSet<_> = values.iter().collect();
            (unique.len(), None, text_stats(&values))
        }
    };

    ColumnSummary {
        name: name.to_string(),
        column_type: column.column_type(),
        non_null,
        nulls,
        unique,
        numeric,
        text,
    }
}

fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    } else {
        0.0
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Some(NumericStats {
        mean,
        median: quantile(&sorted, 0.5),
        std,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        q25: quantile(&sorted, 0.25),
        q75: quantile(&sorted, 0.75),
    })
}

fn text_stats(values: &[&String]) -> Option<TextStats> {
    if values.is_empty() {
        return None;
    }
    let lengths: Vec<usize> = values.iter().map(|s| s.chars().count()).collect();
    let avg_length = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let max_length = lengths.iter().copied().max().unwrap_or(0);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    // Ties break toward the lexicographically smaller value, keeping the
    // result deterministic.
    let most_common = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(v, _)| v.to_string());

    Some(TextStats {
        avg_length,
        max_length,
        most_common,
    })
}

/// Linear-interpolated quantile over an already sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Pearson correlation matrix over the numeric columns.
///
/// Each pair is computed over the rows where both cells are non-null.
/// Undefined entries (fewer than two complete pairs, or zero variance)
/// come back as NaN. Returns the numeric column names with the matrix.
pub fn correlation_matrix(dataset: &Dataset) -> (Vec<String>, Vec<Vec<f64>>) {
    let numeric: Vec<(&String, &Vec<Option<f64>>)> = dataset
        .names()
        .iter()
        .zip(dataset.columns())
        .filter_map(|(name, col)| match col {
            Column::Numeric(cells) => Some((name, cells)),
            _ => None,
        })
        .collect();

    let names: Vec<String> = numeric.iter().map(|(n, _)| (*n).clone()).collect();
    let k = numeric.len();
    let mut matrix = vec![vec![f64::NAN; k]; k];

    for i in 0..k {
        matrix[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = pearson(numeric[i].1, numeric[j].1);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    (names, matrix)
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
