//! Field deviation analysis over loaded records.
//!
//! Records are grouped by the canonical form of the value found at a
//! [`FieldPath`]. An unresolved path is not an error: it yields
//! [`Extracted::Missing`], which takes part in grouping like any other value.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use serde_json::Value;

use crate::path::FieldPath;

/// Canonical rendering of [`Extracted::Missing`]. Not valid JSON, so it can
/// never equal the canonical form of a present value.
pub const MISSING_SENTINEL: &str = "<missing>";

/// Value found at a field path, or the marker for an unresolved path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extracted<'a> {
    Present(&'a Value),
    Missing,
}

impl<'a> Extracted<'a> {
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Extracted::Present(v) => Some(v),
            Extracted::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Extracted::Missing)
    }
}

/// Walk `path` through nested mappings. Stops with `Missing` as soon as a
/// segment is absent or the current node is not a mapping.
pub fn traverse<'a>(record: &'a Value, path: &FieldPath) -> Extracted<'a> {
    let mut cur = record;
    for key in path.segments() {
        match cur {
            Value::Object(map) => match map.get(key) {
                Some(next) => cur = next,
                None => return Extracted::Missing,
            },
            _ => return Extracted::Missing,
        }
    }
    Extracted::Present(cur)
}

/// Grouping key: equal keys if and only if the values are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compact JSON with mapping keys sorted at every depth. List order is kept.
pub fn canonicalize(value: &Extracted<'_>) -> CanonicalKey {
    match value {
        Extracted::Missing => CanonicalKey(MISSING_SENTINEL.to_owned()),
        Extracted::Present(v) => {
            let mut out = String::new();
            write_canonical(v, &mut out);
            CanonicalKey(out)
        }
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(k, out);
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // scalars: serde_json's compact form
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_owned()).to_string());
}

/// Records sharing one canonical value.
#[derive(Clone, Debug)]
pub struct Bucket<'a> {
    pub key: CanonicalKey,
    /// 1-based record indices, in input order
    pub indices: Vec<usize>,
    /// first value seen for this key
    pub representative: Extracted<'a>,
}

impl Bucket<'_> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AnalysisResult<'a> {
    pub total: usize,
    /// ordered by first occurrence
    pub buckets: Vec<Bucket<'a>>,
}

impl AnalysisResult<'_> {
    pub fn unique(&self) -> usize {
        self.buckets.len()
    }

    /// True when every record shares one value (or there are no records).
    pub fn is_consistent(&self) -> bool {
        self.buckets.len() <= 1
    }
}

/// Group records by the canonical value at `path`.
pub fn analyze<'a>(records: &'a [Value], path: &FieldPath) -> AnalysisResult<'a> {
    let mut slots: HashMap<CanonicalKey, usize> = HashMap::new();
    let mut buckets: Vec<Bucket<'a>> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let value = traverse(record, path);
        let key = canonicalize(&value);
        match slots.get(&key) {
            Some(&slot) => buckets[slot].indices.push(i + 1),
            None => {
                slots.insert(key.clone(), buckets.len());
                buckets.push(Bucket {
                    key,
                    indices: vec![i + 1],
                    representative: value,
                });
            }
        }
    }

    debug!(
        "analyzed {} records at {path}: {} unique values",
        records.len(),
        buckets.len()
    );
    AnalysisResult {
        total: records.len(),
        buckets,
    }
}

/// Labels compare after [`normalize_label`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedSet(HashSet<String>);

impl AllowedSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(labels.into_iter().map(|l| normalize_label(l.as_ref())).collect())
    }

    /// Multiple-choice letters A to E.
    pub fn choice_letters() -> Self {
        Self::new(["A", "B", "C", "D", "E"])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(&normalize_label(label))
    }

    /// Sorted, for display.
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.0.iter().map(String::as_str).collect();
        out.sort_unstable();
        out
    }
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Violation<'a> {
    pub index: usize,
    /// the list as stored, before normalization
    pub value: &'a Value,
}

#[derive(Clone, Debug)]
pub struct ValidationResult<'a> {
    pub total: usize,
    pub violations: Vec<Violation<'a>>,
}

impl ValidationResult<'_> {
    pub fn violating(&self) -> usize {
        self.violations.len()
    }
}

/// Flag records whose list at `path` holds a string outside `allowed`.
///
/// Non-string elements are skipped. A value that is not a list, or is
/// missing entirely, has nothing to violate and passes.
pub fn validate_membership<'a>(
    records: &'a [Value],
    path: &FieldPath,
    allowed: &AllowedSet,
) -> ValidationResult<'a> {
    let violations = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let value = traverse(record, path).value()?;
            let items = value.as_array()?;
            items
                .iter()
                .filter_map(Value::as_str)
                .any(|label| !allowed.contains(label))
                .then_some(Violation {
                    index: i + 1,
                    value,
                })
        })
        .collect();

    ValidationResult {
        total: records.len(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s)
    }

    #[test]
    fn traverse_descends_nested_mappings() {
        let rec = json!({"doc": {"specific": {"extracted_golds": ["B"]}}});
        assert_eq!(
            traverse(&rec, &path("doc.specific.extracted_golds")),
            Extracted::Present(&json!(["B"]))
        );
    }

    #[test]
    fn traverse_empty_path_returns_record() {
        for rec in [json!({"a": 1}), json!(null), json!([1, 2]), json!("x")] {
            assert_eq!(traverse(&rec, &FieldPath::default()), Extracted::Present(&rec));
        }
    }

    #[test]
    fn traverse_absent_key_and_non_mapping_are_missing() {
        let rec = json!({"a": 1, "b": [ {"c": 1} ]});
        assert!(traverse(&rec, &path("z")).is_missing());
        assert!(traverse(&rec, &path("a.c")).is_missing());
        // lists are not indexed into
        assert!(traverse(&rec, &path("b.0")).is_missing());
    }

    #[test]
    fn present_null_is_not_missing() {
        let rec = json!({"a": null});
        assert_eq!(traverse(&rec, &path("a")), Extracted::Present(&Value::Null));
        assert!(traverse(&rec, &path("b")).is_missing());
    }

    #[test]
    fn canonical_key_ignores_mapping_insertion_order() {
        let mut first = serde_json::Map::new();
        first.insert("x".into(), json!(1));
        first.insert("y".into(), json!({"q": true, "p": null}));
        let mut second = serde_json::Map::new();
        second.insert("y".into(), json!({"p": null, "q": true}));
        second.insert("x".into(), json!(1));

        let (a, b) = (Value::Object(first), Value::Object(second));
        assert_eq!(
            canonicalize(&Extracted::Present(&a)),
            canonicalize(&Extracted::Present(&b))
        );
        assert_eq!(
            canonicalize(&Extracted::Present(&a)).as_str(),
            r#"{"x":1,"y":{"p":null,"q":true}}"#
        );
    }

    #[test]
    fn canonical_key_is_list_order_sensitive() {
        let (a, b) = (json!([1, 2]), json!([2, 1]));
        assert_ne!(
            canonicalize(&Extracted::Present(&a)),
            canonicalize(&Extracted::Present(&b))
        );
    }

    #[test]
    fn missing_never_collides_with_present_values() {
        let missing = canonicalize(&Extracted::Missing);
        let lookalike = json!(MISSING_SENTINEL);
        for v in [json!(null), json!(""), json!([]), json!({}), lookalike] {
            assert_ne!(missing, canonicalize(&Extracted::Present(&v)), "collides with {v}");
        }
    }

    #[test]
    fn canonical_strings_keep_non_ascii_and_escape_quotes() {
        let v = json!({"ä": "say \"hi\""});
        assert_eq!(
            canonicalize(&Extracted::Present(&v)).as_str(),
            r#"{"ä":"say \"hi\""}"#
        );
    }

    #[test]
    fn analyze_groups_by_first_occurrence() {
        let records = vec![
            json!({"doc": {"x": "A"}}),
            json!({"doc": {"x": "B"}}),
            json!({"doc": {"x": "A"}}),
        ];
        let result = analyze(&records, &path("doc.x"));
        assert_eq!(result.total, 3);
        assert_eq!(result.unique(), 2);
        assert_eq!(result.buckets[0].indices, vec![1, 3]);
        assert_eq!(result.buckets[0].representative, Extracted::Present(&json!("A")));
        assert_eq!(result.buckets[1].indices, vec![2]);
        assert_eq!(result.buckets[1].representative, Extracted::Present(&json!("B")));
    }

    #[test]
    fn analyze_collapses_unresolvable_paths_into_missing() {
        let records = vec![json!({"a": 1}), json!({"b": 2})];
        let result = analyze(&records, &path("a.c"));
        assert_eq!(result.unique(), 1);
        assert_eq!(result.buckets[0].indices, vec![1, 2]);
        assert!(result.buckets[0].representative.is_missing());
        assert_eq!(result.buckets[0].key.as_str(), MISSING_SENTINEL);
    }

    #[test]
    fn analyze_single_value_is_one_bucket() {
        let records: Vec<Value> = (0..7).map(|_| json!({"fewshot": []})).collect();
        let result = analyze(&records, &path("fewshot"));
        assert!(result.is_consistent());
        assert_eq!(result.buckets[0].indices, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn analyze_partitions_all_indices() {
        let records = vec![
            json!({"v": 1}),
            json!({"v": null}),
            json!({}),
            json!({"v": [1, 2]}),
            json!({"v": 1}),
            json!({"v": [2, 1]}),
            json!("scalar record"),
            json!({"v": {"b": 1, "a": 2}}),
            json!({"v": {"a": 2, "b": 1}}),
        ];
        let result = analyze(&records, &path("v"));

        let mut seen: Vec<usize> = result
            .buckets
            .iter()
            .flat_map(|b| b.indices.iter().copied())
            .collect();
        let sum: usize = result.buckets.iter().map(Bucket::len).sum();
        assert_eq!(sum, result.total);
        seen.sort_unstable();
        assert_eq!(seen, (1..=records.len()).collect::<Vec<_>>());
        // 1, null, missing, [1,2], [2,1], {a,b}
        assert_eq!(result.unique(), 6);
    }

    #[test]
    fn analyze_empty_input() {
        let result = analyze(&[], &path("doc"));
        assert_eq!(result.total, 0);
        assert!(result.is_consistent());
        assert!(result.buckets.is_empty());
    }

    #[test]
    fn membership_flags_labels_outside_allowed_set() {
        let records = vec![
            json!({"doc": {"choices": ["A", "b ", " c"]}}),
            json!({"doc": {"choices": ["a", " F "]}}),
        ];
        let result = validate_membership(&records, &path("doc.choices"), &AllowedSet::choice_letters());
        assert_eq!(result.total, 2);
        assert_eq!(result.violating(), 1);
        assert_eq!(result.violations[0].index, 2);
        assert_eq!(result.violations[0].value, &json!(["a", " F "]));
    }

    #[test]
    fn membership_skips_non_string_elements() {
        let records = vec![json!({"choices": ["A", 7, null, {"x": "Z"}]})];
        let result = validate_membership(&records, &path("choices"), &AllowedSet::choice_letters());
        assert_eq!(result.violating(), 0);
    }

    #[test]
    fn membership_passes_non_list_and_missing_values() {
        // A record with no choices at all, or a scalar in place of the list,
        // is not reported. This can hide a malformed record.
        let records = vec![
            json!({"doc": {}}),
            json!({"doc": {"choices": "Z"}}),
            json!({"doc": {"choices": null}}),
            json!({"doc": "not a mapping"}),
        ];
        let result = validate_membership(&records, &path("doc.choices"), &AllowedSet::choice_letters());
        assert_eq!(result.total, 4);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn allowed_set_normalizes_its_own_labels() {
        let allowed = AllowedSet::new([" yes", "no "]);
        assert!(allowed.contains("YES"));
        assert!(allowed.contains(" No"));
        assert!(!allowed.contains("maybe"));
        assert_eq!(allowed.labels(), vec!["NO", "YES"]);
    }
}
