//! Distribution of list lengths at a field path (e.g. how many answer
//! choices each document offers).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::analyzer::{traverse, Extracted};
use crate::path::FieldPath;

#[derive(Clone, Debug)]
pub struct RowLength<'a> {
    pub index: usize,
    pub len: usize,
    pub value: Extracted<'a>,
}

#[derive(Clone, Debug)]
pub struct LengthDistribution<'a> {
    pub total: usize,
    /// list length -> number of rows
    pub counts: BTreeMap<usize, usize>,
    pub rows: Vec<RowLength<'a>>,
    // lengths in order of first appearance, for mode tie-breaking
    first_seen: Vec<usize>,
}

impl<'a> LengthDistribution<'a> {
    /// Most common length. Ties go to the length that appeared first.
    pub fn mode(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for &len in &self.first_seen {
            let freq = self.counts[&len];
            if best.map_or(true, |(_, f)| freq > f) {
                best = Some((len, freq));
            }
        }
        best.map(|(len, _)| len)
    }

    /// Rows whose length differs from the mode.
    pub fn outliers(&self) -> Vec<&RowLength<'a>> {
        let Some(mode) = self.mode() else {
            return Vec::new();
        };
        self.rows.iter().filter(|r| r.len != mode).collect()
    }
}

/// Anything other than a list counts as length 0.
pub fn length_distribution<'a>(records: &'a [Value], path: &FieldPath) -> LengthDistribution<'a> {
    let mut counts = BTreeMap::new();
    let mut first_seen = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let value = traverse(record, path);
        let len = value.value().and_then(Value::as_array).map_or(0, Vec::len);
        let freq = counts.entry(len).or_insert(0usize);
        if *freq == 0 {
            first_seen.push(len);
        }
        *freq += 1;
        rows.push(RowLength {
            index: i + 1,
            len,
            value,
        });
    }

    LengthDistribution {
        total: records.len(),
        counts,
        rows,
        first_seen,
    }
}
