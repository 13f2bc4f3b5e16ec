//! Record loading. Every backing format ends up as a `Vec<serde_json::Value>`
//! in file order.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info};
use parquet::errors::ParquetError;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::schema::printer::print_schema;
use parquet::schema::types::Type;
use serde_json::Value;

use crate::error::{InspectError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Parquet,
    /// one top-level JSON array
    Json,
    /// one JSON value per line
    Ndjson,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("parquet") => Ok(Self::Parquet),
            Some("json") => Ok(Self::Json),
            Some("jsonl") | Some("ndjson") => Ok(Self::Ndjson),
            _ => Err(InspectError::malformed(
                path,
                "unsupported extension (expected .parquet, .json, .jsonl or .ndjson)",
            )),
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(InspectError::NotFound(path.to_path_buf()))
    }
}

/// Load all records from `path`, dispatching on its extension.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    ensure_exists(path)?;
    let records = match SourceFormat::from_path(path)? {
        SourceFormat::Parquet => read_parquet(path)?.rows,
        SourceFormat::Json => read_json_array(path)?,
        SourceFormat::Ndjson => read_ndjson(path)?,
    };
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// A file that must hold a top-level JSON array.
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    ensure_exists(path)?;
    let text = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&text)
        .map_err(|e| InspectError::malformed(path, format!("invalid JSON: {e}")))?;
    match json {
        Value::Array(items) => Ok(items),
        other => Err(InspectError::malformed(
            path,
            format!("expected a list, found {}", kind_of(&other)),
        )),
    }
}

pub fn read_ndjson(path: &Path) -> Result<Vec<Value>> {
    ensure_exists(path)?;
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|e| {
            InspectError::malformed(path, format!("line {}: {e}", lineno + 1))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: String,
    pub nulls: usize,
}

/// Everything `inspect_records` shows about one input file.
#[derive(Clone, Debug)]
pub struct RecordSummary {
    pub path: PathBuf,
    pub columns: Vec<ColumnSummary>,
    /// printed parquet schema; `None` for JSON inputs
    pub schema: Option<String>,
    pub metadata: Vec<(String, Option<String>)>,
    pub rows: Vec<Value>,
}

impl RecordSummary {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// `n` is 1-based.
    pub fn row(&self, n: usize) -> Result<&Value> {
        n.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .ok_or(InspectError::RowOutOfRange {
                row: n,
                total: self.rows.len(),
            })
    }
}

pub fn summarize(path: &Path) -> Result<RecordSummary> {
    ensure_exists(path)?;
    match SourceFormat::from_path(path)? {
        SourceFormat::Parquet => read_parquet(path),
        SourceFormat::Json => Ok(summarize_json(path, read_json_array(path)?)),
        SourceFormat::Ndjson => Ok(summarize_json(path, read_ndjson(path)?)),
    }
}

fn read_parquet(path: &Path) -> Result<RecordSummary> {
    let parquet_err = |source: ParquetError| InspectError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let reader = SerializedFileReader::new(File::open(path)?).map_err(parquet_err)?;
    let file_meta = reader.metadata().file_metadata();
    let schema = file_meta.schema();

    let mut schema_text = Vec::new();
    print_schema(&mut schema_text, schema);

    let metadata = file_meta
        .key_value_metadata()
        .map(|kvs| {
            kvs.iter()
                .map(|kv| (kv.key.clone(), kv.value.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(usize::try_from(file_meta.num_rows()).unwrap_or_default());
    for row in reader.get_row_iter(None).map_err(parquet_err)? {
        rows.push(row.map_err(parquet_err)?.to_json_value());
    }
    debug!("read {} parquet rows from {}", rows.len(), path.display());

    let columns = schema
        .get_fields()
        .iter()
        .map(|field| ColumnSummary {
            name: field.name().to_owned(),
            kind: describe_type(field),
            nulls: count_nulls(&rows, field.name()),
        })
        .collect();

    Ok(RecordSummary {
        path: path.to_path_buf(),
        columns,
        schema: Some(String::from_utf8_lossy(&schema_text).into_owned()),
        metadata,
        rows,
    })
}

fn describe_type(field: &Type) -> String {
    let info = field.get_basic_info();
    if field.is_primitive() {
        match info.logical_type() {
            Some(logical) => format!("{:?} ({logical:?})", field.get_physical_type()),
            None => format!("{:?}", field.get_physical_type()),
        }
    } else {
        match info.logical_type() {
            Some(logical) => format!("group ({logical:?})"),
            None => "group".to_owned(),
        }
    }
}

fn count_nulls(rows: &[Value], column: &str) -> usize {
    rows.iter()
        .filter(|row| row.get(column).map_or(true, Value::is_null))
        .count()
}

// JSON inputs have no schema; columns are top-level keys in first-seen order.
fn summarize_json(path: &Path, rows: Vec<Value>) -> RecordSummary {
    let mut names: Vec<String> = Vec::new();
    for row in &rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let kind = rows
                .iter()
                .filter_map(|r| r.get(&name))
                .find(|v| !v.is_null())
                .map_or("null", kind_of)
                .to_owned();
            let nulls = count_nulls(&rows, &name);
            ColumnSummary { name, kind, nulls }
        })
        .collect();

    RecordSummary {
        path: path.to_path_buf(),
        columns,
        schema: None,
        metadata: Vec::new(),
        rows,
    }
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
