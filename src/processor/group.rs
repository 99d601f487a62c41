use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    helpers::stats_helpers::{aggregate_f64, aggregate_i64},
    processor::{
        AggregateOp, AggregateResult, AnalysisError, Result, column::Column, dataset::Dataset,
    },
};

/// Values of the key columns for one group, in key-column order
pub type GroupKey = Vec<String>;

/// One entry of a derived table, flattened for serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: GroupKey,
    pub value: f64,
}

/// Group key tuple → aggregate, kept sorted by key tuple
///
/// Only observed key combinations have an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    keys: Vec<String>,
    measure: String,
    entries: BTreeMap<GroupKey, AggregateResult>,
}

impl AggregateTable {
    /// Builds a table from explicit entries, e.g. totals from another source
    ///
    /// # Errors
    /// [`AnalysisError::InvalidArgument`] if there are no key columns or an
    /// entry's key length differs from the number of key columns.
    pub fn from_entries<I>(keys: &[&str], measure: &str, entries: I) -> Result<AggregateTable>
    where
        I: IntoIterator<Item = (GroupKey, AggregateResult)>,
    {
        if keys.is_empty() {
            return Err(AnalysisError::InvalidArgument(
                "at least one key column is required".into(),
            ));
        }
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            if key.len() != keys.len() {
                return Err(AnalysisError::InvalidArgument(format!(
                    "key {key:?} does not match key columns {keys:?}"
                )));
            }
            map.insert(key, value);
        }
        Ok(AggregateTable {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            measure: measure.to_string(),
            entries: map,
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn measure(&self) -> &str {
        &self.measure
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[&str]) -> Option<AggregateResult> {
        let key: GroupKey = key.iter().map(|k| k.to_string()).collect();
        self.entries.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &AggregateResult)> {
        self.entries.iter()
    }

    pub fn to_rows(&self) -> Vec<TableRow> {
        self.entries
            .iter()
            .map(|(key, value)| TableRow {
                key: key.clone(),
                value: value.as_f64(),
            })
            .collect()
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.entries.values().map(AggregateResult::as_f64).sum()
    }

    /// Re-aggregates onto a subset of the key columns by summing
    ///
    /// Rolling a count table up to its first key gives the per-key totals used
    /// for normalization.
    pub fn rollup(&self, keys: &[&str]) -> Result<AggregateTable> {
        let positions = key_positions(&self.keys, keys)?;
        let mut entries: BTreeMap<GroupKey, AggregateResult> = BTreeMap::new();
        for (key, value) in &self.entries {
            let sub: GroupKey = positions.iter().map(|&p| key[p].clone()).collect();
            entries
                .entry(sub)
                .and_modify(|acc| *acc = acc.add(*value))
                .or_insert(*value);
        }
        Ok(AggregateTable {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            measure: self.measure.clone(),
            entries,
        })
    }
}

/// Positions of `wanted` within `keys`
pub(crate) fn key_positions(keys: &[String], wanted: &[&str]) -> Result<Vec<usize>> {
    if wanted.is_empty() {
        return Err(AnalysisError::InvalidArgument(
            "at least one key column is required".into(),
        ));
    }
    wanted
        .iter()
        .map(|w| {
            keys.iter()
                .position(|k| k == w)
                .ok_or_else(|| AnalysisError::ColumnNotFound(w.to_string()))
        })
        .collect()
}

/// Counts rows per distinct combination of the key columns
///
/// # Example
/// ```rust,no_run
/// # use electoral_explorer::processor::{dataset::Dataset, group::group_count};
/// # let dataset = Dataset::load_csv("candidatos.csv".as_ref()).unwrap();
/// let by_state = group_count(&dataset, &["sigla_uf", "genero"]).unwrap();
/// for (key, count) in by_state.iter() {
///     println!("{key:?} => {count:?}");
/// }
/// ```
pub fn group_count(dataset: &Dataset, keys: &[&str]) -> Result<AggregateTable> {
    let groups = group_rows(dataset, keys)?;
    let entries = groups
        .into_iter()
        .map(|(k, rows)| (k, AggregateResult::Int(rows.len() as i64)))
        .collect();
    Ok(AggregateTable {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        measure: "count".to_string(),
        entries,
    })
}

/// Group-by aggregation of `agg_col` over the key columns
///
/// Nulls in `agg_col` are skipped. `Count` works on any column type, the
/// other ops need a numeric column.
pub fn group_aggregate(
    dataset: &Dataset,
    keys: &[&str],
    agg_col: &str,
    op: AggregateOp,
) -> Result<AggregateTable> {
    let acol = dataset.get_col(agg_col)?;
    if op != AggregateOp::Count && !acol.col_type().is_numeric() {
        return Err(AnalysisError::TypeMismatch {
            column: agg_col.to_string(),
            expected: format!("a numeric column for {op}"),
        });
    }
    let groups = group_rows(dataset, keys)?;

    let mut entries = BTreeMap::new();
    for (key, rows) in groups {
        let result = match (op, acol) {
            (AggregateOp::Count, _) => {
                AggregateResult::Int(rows.iter().filter(|&&i| !acol.is_null(i)).count() as i64)
            }
            (_, Column::Int64(values)) => {
                let group_values: Vec<i64> = rows.iter().filter_map(|&i| values[i]).collect();
                aggregate_i64(&group_values, op)
            }
            (_, Column::Float64(values)) => {
                let group_values: Vec<f64> = rows.iter().filter_map(|&i| values[i]).collect();
                aggregate_f64(&group_values, op)
            }
            (_, Column::Str(_)) => {
                return Err(AnalysisError::TypeMismatch {
                    column: agg_col.to_string(),
                    expected: format!("a numeric column for {op}"),
                });
            }
        };
        entries.insert(key, result);
    }

    Ok(AggregateTable {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        measure: format!("{agg_col}_{op}"),
        entries,
    })
}

fn group_rows(dataset: &Dataset, keys: &[&str]) -> Result<BTreeMap<GroupKey, Vec<usize>>> {
    if keys.is_empty() {
        return Err(AnalysisError::InvalidArgument(
            "at least one key column is required".into(),
        ));
    }
    let cols = keys
        .iter()
        .map(|k| dataset.get_col(k))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for row in 0..dataset.row_count() {
        let mut key = Vec::with_capacity(cols.len());
        for (name, col) in keys.iter().zip(&cols) {
            let k = col.key_at(row).ok_or_else(|| AnalysisError::NullValue {
                column: name.to_string(),
                row,
            })?;
            key.push(k);
        }
        groups.entry(key).or_default().push(row);
    }

    if groups.is_empty() {
        warn!("group by {keys:?} produced no groups");
    } else {
        debug!("group by {keys:?}: {} groups", groups.len());
    }
    Ok(groups)
}
