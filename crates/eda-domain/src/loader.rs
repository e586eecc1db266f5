//! Carga de datasets desde disco con inferencia de tipos por columna.
//!
//! Formatos soportados: CSV (con cabecera) y JSON (arreglo de registros).
//! Excel y Parquet se rechazan con `UnsupportedFormat`.
//!
//! Reglas de inferencia (sobre los valores no faltantes):
//! - todos numéricos -> `Numerical`
//! - todos fecha/fecha-hora -> `Datetime`
//! - ninguno presente -> `Unknown`
//! - cualquier otro caso -> `Categorical`
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::{Column, Dataset, DomainError};

/// Marcadores textuales tratados como valor faltante.
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let ext = path.extension()
                      .and_then(|e| e.to_str())
                      .map(str::to_lowercase)
                      .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            other => Err(DomainError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Lee un dataset eligiendo el formato por extensión.
pub fn read_dataset(path: &Path) -> Result<Dataset, DomainError> {
    let format = DataFormat::from_path(path)?;
    log::info!("reading {:?} dataset from {}", format, path.display());
    let file = File::open(path)?;
    let ds = match format {
        DataFormat::Csv => read_csv(file)?,
        DataFormat::Json => read_json_records(file)?,
    };
    log::info!("loaded dataset: {} rows x {} columns", ds.n_rows(), ds.n_columns());
    Ok(ds)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DomainError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true)
                                           .trim(csv::Trim::All)
                                           .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record?;
        for (i, field) in record.iter().enumerate() {
            if let Some(col) = raw.get_mut(i) {
                col.push(normalise_cell(field));
            }
        }
    }
    Dataset::new(headers.into_iter().zip(raw).map(|(name, cells)| infer_column(name, cells)).collect())
}

/// JSON con forma `[{"col": valor, ...}, ...]`. El orden de columnas es el de
/// primera aparición de cada clave; claves ausentes en un registro cuentan
/// como faltantes.
pub fn read_json_records<R: Read>(reader: R) -> Result<Dataset, DomainError> {
    let records: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
    let mut names: Vec<String> = Vec::new();
    for rec in &records {
        for key in rec.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }
    let columns = names.into_iter()
                       .map(|name| {
                           let cells = records.iter().map(|rec| rec.get(&name).and_then(json_cell)).collect();
                           infer_column(name, cells)
                       })
                       .collect();
    Dataset::new(columns)
}

fn json_cell(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => normalise_cell(s),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn normalise_cell(raw: &str) -> Option<String> {
    let t = raw.trim();
    if MISSING_MARKERS.contains(&t) {
        None
    } else {
        Some(t.to_string())
    }
}

/// Intenta interpretar un texto como fecha u hora.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Construye una columna tipada a partir de celdas de texto normalizadas.
pub fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present: Vec<&String> = cells.iter().flatten().collect();
    if present.is_empty() {
        return Column::unknown(name, cells);
    }
    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return Column::numerical(name, cells.iter().map(|c| c.as_ref().and_then(|s| s.parse::<f64>().ok())));
    }
    if present.iter().all(|s| parse_datetime(s).is_some()) {
        return Column::datetime(name, cells.iter().map(|c| c.as_deref().and_then(parse_datetime)));
    }
    Column::categorical(name, cells)
}
