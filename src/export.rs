//! Per-record export of answer choices and gold/prediction pairs.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::analyzer::traverse;
use crate::error::Result;
use crate::path::FieldPath;
use crate::report::write_json;

pub const CHOICES_FILE: &str = "choices.json";
pub const GOLDS_PREDICTIONS_FILE: &str = "golds_predictions.json";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceEntry {
    pub number: usize,
    pub choices: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoldPredictionEntry {
    pub number: usize,
    pub extracted_golds: Value,
    pub extracted_predictions: Value,
}

// unresolved paths export as []
fn list_at(record: &Value, path: &FieldPath) -> Value {
    traverse(record, path)
        .value()
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

pub fn choice_entries(records: &[Value]) -> Vec<ChoiceEntry> {
    let path = FieldPath::parse("doc.choices");
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| ChoiceEntry {
            number: i + 1,
            choices: list_at(rec, &path),
        })
        .collect()
}

/// Reads from `doc.specific`; a null or absent `specific` yields empty lists.
pub fn gold_prediction_entries(records: &[Value]) -> Vec<GoldPredictionEntry> {
    let golds = FieldPath::parse("doc.specific.extracted_golds");
    let preds = FieldPath::parse("doc.specific.extracted_predictions");
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| GoldPredictionEntry {
            number: i + 1,
            extracted_golds: list_at(rec, &golds),
            extracted_predictions: list_at(rec, &preds),
        })
        .collect()
}

/// Paths of the two files written by [`write_answers`].
#[derive(Clone, Debug)]
pub struct ExportedFiles {
    pub choices: PathBuf,
    pub golds_predictions: PathBuf,
    pub count: usize,
}

pub fn write_answers(records: &[Value], out_dir: &Path) -> Result<ExportedFiles> {
    fs::create_dir_all(out_dir)?;

    let choices = out_dir.join(CHOICES_FILE);
    write_json(&choices, &choice_entries(records))?;
    info!("wrote {} choice entries to {}", records.len(), choices.display());

    let golds_predictions = out_dir.join(GOLDS_PREDICTIONS_FILE);
    write_json(&golds_predictions, &gold_prediction_entries(records))?;
    info!(
        "wrote {} gold/prediction entries to {}",
        records.len(),
        golds_predictions.display()
    );

    Ok(ExportedFiles {
        choices,
        golds_predictions,
        count: records.len(),
    })
}
