//! Sample ID lookup and subset ordering.
//!
//! Pedigree rows reference samples by IID; the genotype reader returns
//! dosages in its own sample order. These helpers translate between the two.

use std::collections::HashMap;

/// IID -> position lookup over an ordered list of sample IDs.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    positions: HashMap<String, usize>,
}

impl SampleIndex {
    /// Build the lookup. Later duplicates do not override the first occurrence.
    pub fn new(ids: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            positions.entry(id.clone()).or_insert(i);
        }
        Self { positions }
    }

    /// Position of `id`, if present.
    pub fn get(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }
}

/// Restrict `wanted` to IDs present in `available`, returned in the order
/// they appear in `available` and without duplicates.
pub fn subset_in_file_order(available: &[String], wanted: &[String]) -> Vec<String> {
    let wanted = SampleIndex::new(wanted);
    available
        .iter()
        .filter(|id| wanted.contains(id))
        .cloned()
        .collect()
}
