//! Rendering of analysis results: console text plus JSON / NDJSON / CSV files.
//!
//! Console renderers write into any `io::Write` so binaries pass a locked
//! stdout and tests pass a `Vec<u8>`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::analyzer::{AllowedSet, AnalysisResult, Extracted, ValidationResult, MISSING_SENTINEL};
use crate::compare::Comparison;
use crate::distribution::LengthDistribution;
use crate::error::Result;
use crate::path::FieldPath;
use crate::source::RecordSummary;

/// Header written when a CSV export has no rows to take column names from.
pub const FALLBACK_CSV_HEADER: [&str; 3] = ["doc", "metric", "model_response"];

// ----------------------------------------------------------------------------
// file writers
// ----------------------------------------------------------------------------

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    fs::write(path, pretty)?;
    Ok(())
}

/// One compact JSON value per line.
pub fn write_ndjson(path: &Path, rows: &[Value]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Header comes from the first row's keys. Every cell holds the compact JSON
/// of that field; a key absent from a row leaves its cell empty.
pub fn write_csv(path: &Path, rows: &[Value]) -> Result<()> {
    let header: Vec<String> = match rows.first().and_then(Value::as_object) {
        Some(first) => first.keys().cloned().collect(),
        None => FALLBACK_CSV_HEADER.iter().map(|s| s.to_string()).collect(),
    };

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&header)?;
    for row in rows {
        let cells: Vec<String> = header
            .iter()
            .map(|key| row.get(key).map(Value::to_string).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

// ----------------------------------------------------------------------------
// serializable reports
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BucketReport<'a> {
    pub key: &'a str,
    pub count: usize,
    pub rows: &'a [usize],
    pub value: Option<&'a Value>,
    pub missing: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub field: String,
    pub total: usize,
    pub unique: usize,
    pub buckets: Vec<BucketReport<'a>>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(field: &FieldPath, result: &'a AnalysisResult<'a>) -> Self {
        Self {
            field: field.to_string(),
            total: result.total,
            unique: result.unique(),
            buckets: result
                .buckets
                .iter()
                .map(|b| BucketReport {
                    key: b.key.as_str(),
                    count: b.len(),
                    rows: &b.indices,
                    value: b.representative.value(),
                    missing: b.representative.is_missing(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViolationEntry<'a> {
    pub number: usize,
    pub value: &'a Value,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub field: String,
    pub allowed: Vec<&'a str>,
    pub total: usize,
    pub violating: usize,
    pub violations: Vec<ViolationEntry<'a>>,
}

impl<'a> ValidationReport<'a> {
    pub fn new(field: &FieldPath, allowed: &'a AllowedSet, result: &'a ValidationResult<'a>) -> Self {
        Self {
            field: field.to_string(),
            allowed: allowed.labels(),
            total: result.total,
            violating: result.violating(),
            violations: result
                .violations
                .iter()
                .map(|v| ViolationEntry {
                    number: v.index,
                    value: v.value,
                })
                .collect(),
        }
    }
}

// ----------------------------------------------------------------------------
// console
// ----------------------------------------------------------------------------

/// "1, 2, 3..." when there are more than `limit` indices.
pub fn sample_rows(indices: &[usize], limit: usize) -> String {
    let shown: Vec<String> = indices.iter().take(limit).map(usize::to_string).collect();
    let more = if indices.len() > limit { "..." } else { "" };
    format!("{}{more}", shown.join(", "))
}

fn display_value(value: &Extracted<'_>) -> String {
    match value.value() {
        Some(v) => v.to_string(),
        None => MISSING_SENTINEL.to_owned(),
    }
}

fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Bucket lines shared by the deviation and consistency reports.
pub fn render_buckets<W: Write>(out: &mut W, result: &AnalysisResult<'_>, show: usize) -> io::Result<()> {
    for bucket in &result.buckets {
        writeln!(
            out,
            "- Occurs in {} rows ({}): {}",
            bucket.len(),
            sample_rows(&bucket.indices, show),
            bucket.key
        )?;
    }
    Ok(())
}

pub fn render_deviations<W: Write>(
    out: &mut W,
    field: &FieldPath,
    result: &AnalysisResult<'_>,
    show: usize,
) -> io::Result<()> {
    writeln!(out, "Checked field: {field}")?;
    writeln!(out, "Total rows: {}", result.total)?;
    writeln!(out, "Unique values: {}", result.unique())?;

    match result.buckets.as_slice() {
        [] => writeln!(out, "No rows to check.")?,
        [only] => {
            writeln!(out, "No deviations; all rows share the same value.")?;
            writeln!(out, "Value: {}", only.key)?;
        }
        _ => {
            writeln!(out, "\nDeviations found:")?;
            render_buckets(out, result, show)?;
        }
    }
    Ok(())
}

/// Short form used after the membership check.
pub fn render_consistency<W: Write>(
    out: &mut W,
    field: &FieldPath,
    result: &AnalysisResult<'_>,
    show: usize,
) -> io::Result<()> {
    if result.is_consistent() {
        writeln!(out, "\n{field}: consistent across all rows.")
    } else {
        writeln!(out, "\n{field} deviations: {} unique values found.", result.unique())?;
        render_buckets(out, result, show)
    }
}

pub fn render_violations<W: Write>(
    out: &mut W,
    allowed: &AllowedSet,
    result: &ValidationResult<'_>,
) -> io::Result<()> {
    writeln!(out, "Total rows: {}", result.total)?;
    writeln!(
        out,
        "Rows with choices outside {{{}}}: {}",
        allowed.labels().join(", "),
        result.violating()
    )?;
    if !result.violations.is_empty() {
        writeln!(out, "\nListing all deviating rows:")?;
        for v in &result.violations {
            writeln!(out, "#{}: {}", v.index, v.value)?;
        }
    }
    Ok(())
}

pub fn render_distribution<W: Write>(out: &mut W, dist: &LengthDistribution<'_>) -> io::Result<()> {
    writeln!(out, "Total rows: {}", dist.total)?;
    writeln!(out, "Choice count distribution (choices -> rows):")?;
    for (len, freq) in &dist.counts {
        writeln!(out, "- {len}: {freq}")?;
    }

    if let Some(mode) = dist.mode() {
        let outliers = dist.outliers();
        writeln!(out, "\nRows differing from mode ({mode} choices): {}", outliers.len())?;
        for row in outliers {
            writeln!(out, "#{}: {} choices -> {}", row.index, row.len, display_value(&row.value))?;
        }
    }
    Ok(())
}

pub fn render_comparison<W: Write>(out: &mut W, cmp: &Comparison, show: usize) -> io::Result<()> {
    writeln!(out, "Total: {}", cmp.total)?;
    writeln!(out, "Matches: {}", cmp.matches)?;
    writeln!(out, "Mismatches: {}", cmp.mismatches.len())?;
    writeln!(out, "Accuracy: {:.4}", cmp.accuracy())?;

    if !cmp.mismatches.is_empty() {
        writeln!(out, "\nExamples of mismatches (up to {show}):")?;
        for m in cmp.mismatches.iter().take(show) {
            let number = m.number.as_ref().map_or_else(|| "-".to_owned(), Value::to_string);
            writeln!(out, "#{number}: gold={} pred={}", m.golds, m.predictions)?;
        }
    }
    Ok(())
}

pub fn render_summary<W: Write>(out: &mut W, summary: &RecordSummary, preview: usize) -> io::Result<()> {
    writeln!(out, "File: {}", summary.path.display())?;
    writeln!(
        out,
        "Rows: {} | Columns: {}",
        with_thousands(summary.num_rows()),
        summary.columns.len()
    )?;

    if let Some(schema) = &summary.schema {
        writeln!(out, "\nSchema:")?;
        write!(out, "{schema}")?;
        if !schema.ends_with('\n') {
            writeln!(out)?;
        }
    }

    writeln!(out, "\nColumns:")?;
    for col in &summary.columns {
        writeln!(out, "- {}: type={}, nulls={}", col.name, col.kind, col.nulls)?;
    }

    if !summary.metadata.is_empty() {
        writeln!(out, "\nMetadata:")?;
        for (key, value) in &summary.metadata {
            writeln!(out, "- {key}: {}", value.as_deref().unwrap_or(""))?;
        }
    }

    let count = preview.min(summary.num_rows());
    if count > 0 {
        writeln!(out, "\nFirst {count} rows:")?;
        for (idx, row) in summary.rows.iter().take(count).enumerate() {
            writeln!(out, "{idx}: {row}")?;
        }
    } else {
        writeln!(out, "\nNo rows to preview.")?;
    }
    Ok(())
}
