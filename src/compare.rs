//! Exact-match comparison of extracted golds against extracted predictions.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub number: Option<Value>,
    #[serde(rename = "extracted_golds")]
    pub golds: Value,
    #[serde(rename = "extracted_predictions")]
    pub predictions: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub total: usize,
    pub matches: usize,
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    /// 0.0 for an empty comparison.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matches as f64 / self.total as f64
        }
    }
}

fn list_field(record: &Value, key: &str) -> Value {
    record
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// Absent `extracted_golds` / `extracted_predictions` count as empty lists.
pub fn compare_pairs(records: &[Value]) -> Comparison {
    let mut out = Comparison {
        total: records.len(),
        ..Comparison::default()
    };

    for rec in records {
        let golds = list_field(rec, "extracted_golds");
        let predictions = list_field(rec, "extracted_predictions");
        if golds == predictions {
            out.matches += 1;
        } else {
            out.mismatches.push(Mismatch {
                number: rec.get("number").cloned(),
                golds,
                predictions,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_pairs_matching_is_full_accuracy() {
        let records = vec![
            json!({"number": 1, "extracted_golds": ["A"], "extracted_predictions": ["A"]}),
            json!({"number": 2, "extracted_golds": ["C"], "extracted_predictions": ["C"]}),
        ];
        let cmp = compare_pairs(&records);
        assert_eq!(cmp.total, 2);
        assert_eq!(cmp.matches, 2);
        assert!(cmp.mismatches.is_empty());
        assert_eq!(cmp.accuracy(), 1.0);
    }

    #[test]
    fn mismatches_keep_number_and_both_sides() {
        let records = vec![
            json!({"number": 1, "extracted_golds": ["A"], "extracted_predictions": ["A"]}),
            json!({"number": 2, "extracted_golds": ["B"], "extracted_predictions": ["D"]}),
            json!({"number": 3, "extracted_golds": ["A", "B"], "extracted_predictions": ["B", "A"]}),
        ];
        let cmp = compare_pairs(&records);
        assert_eq!(cmp.matches, 1);
        assert_eq!(cmp.mismatches.len(), 2);
        assert_eq!(
            cmp.mismatches[0],
            Mismatch {
                number: Some(json!(2)),
                golds: json!(["B"]),
                predictions: json!(["D"]),
            }
        );
        assert!((cmp.accuracy() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn absent_lists_default_to_empty() {
        let records = vec![
            json!({"number": 1}),
            json!({"number": 2, "extracted_golds": []}),
            json!({"extracted_golds": ["A"]}),
        ];
        let cmp = compare_pairs(&records);
        assert_eq!(cmp.matches, 2);
        assert_eq!(cmp.mismatches[0].number, None);
        assert_eq!(cmp.mismatches[0].predictions, json!([]));
    }

    #[test]
    fn empty_input_has_zero_accuracy() {
        let cmp = compare_pairs(&[]);
        assert_eq!(cmp.total, 0);
        assert_eq!(cmp.accuracy(), 0.0);
    }
}
