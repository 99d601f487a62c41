use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::processor::{
    AnalysisError, Result,
    group::{AggregateTable, GroupKey, TableRow, key_positions},
};

/// What to do with an aggregate entry whose shared key has no total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTotalPolicy {
    /// Fail with [`AnalysisError::MissingTotal`]
    #[default]
    Error,
    /// Leave the entry out of the result
    Skip,
}

/// An aggregate rescaled to proportions of a per-key total
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    keys: Vec<String>,
    shared_keys: Vec<String>,
    entries: BTreeMap<GroupKey, f64>,
}

impl NormalizedTable {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Key columns the totals were looked up by
    pub fn shared_keys(&self) -> &[String] {
        &self.shared_keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[&str]) -> Option<f64> {
        let key: GroupKey = key.iter().map(|k| k.to_string()).collect();
        self.entries.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &f64)> {
        self.entries.iter()
    }

    pub fn to_rows(&self) -> Vec<TableRow> {
        self.entries
            .iter()
            .map(|(key, value)| TableRow {
                key: key.clone(),
                value: *value,
            })
            .collect()
    }

    /// Sum of the proportions per shared key
    pub fn sums_by_shared_key(&self) -> BTreeMap<GroupKey, f64> {
        let positions: Vec<usize> = self
            .shared_keys
            .iter()
            .filter_map(|s| self.keys.iter().position(|k| k == s))
            .collect();
        let mut sums = BTreeMap::new();
        for (key, v) in &self.entries {
            let sub: GroupKey = positions.iter().map(|&p| key[p].clone()).collect();
            *sums.entry(sub).or_insert(0.0) += v;
        }
        sums
    }
}

/// Divides every entry of `aggregate` by the total of its shared key
///
/// `totals` must be keyed by a subset of `aggregate`'s key columns; each
/// aggregate key is projected onto those columns to find its total.
///
/// # Errors
/// - [`AnalysisError::ColumnNotFound`] if a totals key column is not an
///   aggregate key column
/// - [`AnalysisError::MissingTotal`] under [`MissingTotalPolicy::Error`]
/// - [`AnalysisError::ZeroTotal`] if a looked-up total is zero
pub fn normalize(
    aggregate: &AggregateTable,
    totals: &AggregateTable,
    missing: MissingTotalPolicy,
) -> Result<NormalizedTable> {
    let shared: Vec<&str> = totals.keys().iter().map(String::as_str).collect();
    let positions = key_positions(aggregate.keys(), &shared)?;

    let mut entries = BTreeMap::new();
    for (key, value) in aggregate.iter() {
        let total_key: Vec<&str> = positions.iter().map(|&p| key[p].as_str()).collect();
        let total = match (totals.get(&total_key), missing) {
            (Some(t), _) => t.as_f64(),
            (None, MissingTotalPolicy::Error) => {
                return Err(AnalysisError::MissingTotal {
                    key: owned(&total_key),
                });
            }
            (None, MissingTotalPolicy::Skip) => {
                warn!("no total for {total_key:?}, skipping {key:?}");
                continue;
            }
        };
        if total == 0.0 {
            return Err(AnalysisError::ZeroTotal {
                key: owned(&total_key),
            });
        }
        entries.insert(key.clone(), value.as_f64() / total);
    }

    debug!(
        "normalized {} entries of {:?} by {:?}",
        entries.len(),
        aggregate.keys(),
        shared
    );
    Ok(NormalizedTable {
        keys: aggregate.keys().to_vec(),
        shared_keys: totals.keys().to_vec(),
        entries,
    })
}

/// Normalizes by totals rolled up from the aggregate itself
///
/// Proportions within each shared key then sum to 1.
pub fn normalize_within(
    aggregate: &AggregateTable,
    shared_keys: &[&str],
) -> Result<NormalizedTable> {
    let totals = aggregate.rollup(shared_keys)?;
    normalize(aggregate, &totals, MissingTotalPolicy::Error)
}

fn owned(key: &[&str]) -> Vec<String> {
    key.iter().map(|k| k.to_string()).collect()
}
