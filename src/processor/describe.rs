use serde::Serialize;
use std::collections::HashMap;

use crate::{
    helpers::stats_helpers::{mean, quantile_sorted, sample_std, sorted},
    processor::{Result, dataset::Dataset},
};

/// Summary statistics of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Summarizes every numeric column, in schema order
///
/// Nulls are not counted. A column without values gets `count == 0` and NaN
/// statistics.
pub fn describe(dataset: &Dataset) -> Vec<NumericSummary> {
    dataset
        .schema()
        .into_iter()
        .filter(|(_, t)| t.is_numeric())
        .filter_map(|(name, _)| {
            let col = dataset.get_col(name).ok()?;
            let values = sorted(col.iter_f64());
            Some(NumericSummary {
                column: name.to_string(),
                count: values.len(),
                mean: mean(&values),
                std: sample_std(&values),
                min: values.first().copied().unwrap_or(f64::NAN),
                p25: quantile_sorted(&values, 0.25),
                p50: quantile_sorted(&values, 0.5),
                p75: quantile_sorted(&values, 0.75),
                max: values.last().copied().unwrap_or(f64::NAN),
            })
        })
        .collect()
}

/// Frequencies of the categories of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCounts {
    pub column: String,
    pub normalized: bool,
    /// Most frequent first; ties ordered by category
    pub counts: Vec<(String, f64)>,
}

impl ValueCounts {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.counts
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().map(|(_, v)| v).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Counts each distinct value of `column`
///
/// With `normalize`, counts are divided by the number of counted cells, so
/// the proportions sum to 1. Null cells are not counted.
pub fn value_counts(dataset: &Dataset, column: &str, normalize: bool) -> Result<ValueCounts> {
    let col = dataset.get_col(column)?;
    let mut tally: HashMap<String, usize> = HashMap::new();
    for i in 0..col.len() {
        if let Some(k) = col.key_at(i) {
            *tally.entry(k).or_insert(0) += 1;
        }
    }
    let counted: usize = tally.values().sum();

    let mut counts: Vec<(String, usize)> = tally.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ValueCounts {
        column: column.to_string(),
        normalized: normalize,
        counts: counts
            .into_iter()
            .map(|(k, n)| {
                let v = if normalize {
                    n as f64 / counted as f64
                } else {
                    n as f64
                };
                (k, v)
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::AnalysisError;

    fn dataset() -> Dataset {
        let csv = "genero,idade,raca\nfeminino,20,parda\nmasculino,30,branca\nmasculino,40,parda\nmasculino,,preta\n";
        Dataset::from_csv_bytes(csv.as_bytes()).unwrap().0
    }

    #[test]
    fn test_describe_numeric_only() {
        let summary = describe(&dataset());
        assert_eq!(summary.len(), 1);
        let age = &summary[0];
        assert_eq!(age.column, "idade");
        assert_eq!(age.count, 3);
        assert_eq!(age.mean, 30.0);
        assert_eq!(age.std, 10.0);
        assert_eq!(age.min, 20.0);
        assert_eq!(age.p25, 25.0);
        assert_eq!(age.p50, 30.0);
        assert_eq!(age.p75, 35.0);
        assert_eq!(age.max, 40.0);
    }

    #[test]
    fn test_value_counts() {
        let counts = value_counts(&dataset(), "genero", false).unwrap();
        assert_eq!(
            counts.counts,
            vec![("masculino".to_string(), 3.0), ("feminino".to_string(), 1.0)]
        );

        let shares = value_counts(&dataset(), "raca", true).unwrap();
        assert_eq!(shares.counts[0], ("parda".to_string(), 0.5));
        // ties by category
        assert_eq!(shares.counts[1].0, "branca");
        assert!((shares.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_value_counts_unknown_column() {
        assert!(matches!(
            value_counts(&dataset(), "ocupacao", true),
            Err(AnalysisError::ColumnNotFound(_))
        ));
    }
}
