//! Lossless serializers for a loaded dataset.
//!
//! Every format is a plain projection of the in-memory table; no cell is
//! transformed beyond serialization.

use rust_xlsxwriter::Workbook;
use serde_json::{Map, Number, Value};

use super::dataset::{Column, Dataset};
use crate::models::error::PipelineError;

/// Export format for a dataset download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

/// Serialize the dataset in the requested format.
pub fn export(dataset: &Dataset, format: ExportFormat) -> Result<Vec<u8>, PipelineError> {
    match format {
        ExportFormat::Csv => to_csv(dataset),
        ExportFormat::Xlsx => to_xlsx(dataset),
        ExportFormat::Json => to_json(dataset),
    }
}

/// UTF-8 CSV with a header row. Null cells become empty fields.
pub fn to_csv(dataset: &Dataset) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(dataset.names())
        .map_err(|e| PipelineError::Encoding(e.to_string()))?;

    for row in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|col| col.cell_to_string(row).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| PipelineError::Encoding(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Encoding(e.to_string()))
}

/// Newline-free JSON array of row objects. Null cells become JSON null.
pub fn to_json(dataset: &Dataset) -> Result<Vec<u8>, PipelineError> {
    let mut rows = Vec::with_capacity(dataset.row_count());
    for row in 0..dataset.row_count() {
        let mut object = Map::new();
        for (name, column) in dataset.names().iter().zip(dataset.columns()) {
            let value = match column {
                Column::Numeric(cells) => cells[row]
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                _ => column
                    .cell_to_string(row)
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            };
            object.insert(name.clone(), value);
        }
        rows.push(Value::Object(object));
    }

    serde_json::to_vec(&Value::Array(rows)).map_err(|e| PipelineError::Encoding(e.to_string()))
}

/// Single-sheet XLSX workbook: header row, then one row per record.
pub fn to_xlsx(dataset: &Dataset) -> Result<Vec<u8>, PipelineError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in dataset.names().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .map_err(|e| PipelineError::Encoding(e.to_string()))?;
    }

    for row in 0..dataset.row_count() {
        for (col, column) in dataset.columns().iter().enumerate() {
            let (r, c) = ((row + 1) as u32, col as u16);
            match column {
                Column::Numeric(cells) => {
                    if let Some(n) = cells[row] {
                        worksheet
                            .write_number(r, c, n)
                            .map_err(|e| PipelineError::Encoding(e.to_string()))?;
                    }
                }
                _ => {
                    if let Some(s) = column.cell_to_string(row) {
                        worksheet
                            .write_string(r, c, &s)
                            .map_err(|e| PipelineError::Encoding(e.to_string()))?;
                    }
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| PipelineError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dataset::LoadOptions;

    fn load(csv: &str) -> Dataset {
        Dataset::from_csv(csv.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn csv_round_trips_through_loader() {
        let ds = load("name,score\nJane,4\nBob,\n");
        let bytes = to_csv(&ds).unwrap();
        let reloaded = Dataset::from_csv(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded, ds);
    }

    #[test]
    fn json_is_newline_free_array_of_objects() {
        let ds = load("name,score\nJane,4\nBob,\n");
        let bytes = to_json(&ds).unwrap();
        assert!(!bytes.contains(&b'\n'));

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Jane");
        assert_eq!(rows[0]["score"], 4.0);
        assert!(rows[1]["score"].is_null());
    }

    #[test]
    fn xlsx_produces_a_zip_container() {
        let ds = load("a\n1\n");
        let bytes = to_xlsx(&ds).unwrap();
        // XLSX is a ZIP archive; check the local-file magic.
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn format_metadata() {
        assert_eq!(ExportFormat::Csv.mime(), "text/csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert!(ExportFormat::Xlsx.mime().contains("spreadsheetml"));
    }
}
