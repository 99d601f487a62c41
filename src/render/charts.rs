use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    helpers::stats_helpers::{quantile_sorted, sorted},
    processor::{
        AnalysisError, Result,
        column::Column,
        dataset::Dataset,
        describe::ValueCounts,
        group::{AggregateTable, GroupKey},
        normalize::NormalizedTable,
    },
    render::ChartData,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Five-number summary plus Tukey whiskers for one box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub group: Option<String>,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBar {
    pub x: String,
    pub hue: String,
    pub value: f64,
}

fn numeric_column<'a>(dataset: &'a Dataset, column: &str) -> Result<&'a Column> {
    let col = dataset.get_col(column)?;
    if !col.col_type().is_numeric() {
        return Err(AnalysisError::TypeMismatch {
            column: column.to_string(),
            expected: "a numeric column".into(),
        });
    }
    Ok(col)
}

/// Equal-width histogram of a numeric column over `[min, max]`
///
/// Every bin is half-open except the last, which also holds `max`. Nulls are
/// skipped.
pub fn histogram(dataset: &Dataset, column: &str, bins: usize) -> Result<ChartData> {
    if bins == 0 {
        return Err(AnalysisError::InvalidArgument(
            "histogram needs at least one bin".into(),
        ));
    }
    let values = sorted(numeric_column(dataset, column)?.iter_f64());
    let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
        return Ok(ChartData::Histogram(Vec::new()));
    };
    if min == max {
        return Ok(ChartData::Histogram(vec![HistogramBin {
            lo: min,
            hi: max,
            count: values.len(),
        }]));
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lo: min + width * i as f64,
            hi: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    Ok(ChartData::Histogram(out))
}

fn box_of(group: Option<String>, sorted_values: &[f64]) -> BoxStats {
    let q1 = quantile_sorted(sorted_values, 0.25);
    let q3 = quantile_sorted(sorted_values, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let inside: Vec<f64> = sorted_values
        .iter()
        .copied()
        .filter(|v| *v >= lo_fence && *v <= hi_fence)
        .collect();
    BoxStats {
        group,
        count: sorted_values.len(),
        min: sorted_values.first().copied().unwrap_or(f64::NAN),
        q1,
        median: quantile_sorted(sorted_values, 0.5),
        q3,
        max: sorted_values.last().copied().unwrap_or(f64::NAN),
        lower_whisker: inside.first().copied().unwrap_or(f64::NAN),
        upper_whisker: inside.last().copied().unwrap_or(f64::NAN),
        outliers: sorted_values
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect(),
    }
}

/// Box plot statistics of `value_column`, optionally one box per group
///
/// Rows with a null value or a null group are skipped; boxes are ordered by
/// group.
pub fn box_stats(
    dataset: &Dataset,
    value_column: &str,
    group_column: Option<&str>,
) -> Result<ChartData> {
    let values = numeric_column(dataset, value_column)?;
    let Some(group_column) = group_column else {
        let all = sorted(values.iter_f64());
        if all.is_empty() {
            return Ok(ChartData::BoxPlot(Vec::new()));
        }
        return Ok(ChartData::BoxPlot(vec![box_of(None, &all)]));
    };

    let groups = dataset.get_col(group_column)?;
    let mut by_group: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for i in 0..dataset.row_count() {
        if let (Some(g), Some(v)) = (groups.key_at(i), values.f64_at(i)) {
            by_group.entry(g).or_default().push(v);
        }
    }
    Ok(ChartData::BoxPlot(
        by_group
            .into_iter()
            .map(|(g, vs)| box_of(Some(g), &sorted(vs.into_iter())))
            .collect(),
    ))
}

pub fn bars_from_counts(counts: &ValueCounts) -> ChartData {
    ChartData::Bar(counts.counts.clone())
}

fn grouped<'a, I>(keys: &[String], entries: I) -> Result<ChartData>
where
    I: Iterator<Item = (&'a GroupKey, f64)>,
{
    let [x_column, hue_column] = keys else {
        return Err(AnalysisError::InvalidArgument(format!(
            "grouped bars need exactly two key columns, got {keys:?}"
        )));
    };
    Ok(ChartData::GroupedBar {
        x_column: x_column.clone(),
        hue_column: hue_column.clone(),
        bars: entries
            .map(|(k, value)| GroupedBar {
                x: k[0].clone(),
                hue: k[1].clone(),
                value,
            })
            .collect(),
    })
}

/// First key column on the x axis, second as hue
pub fn grouped_bars_from_table(table: &AggregateTable) -> Result<ChartData> {
    grouped(table.keys(), table.iter().map(|(k, v)| (k, v.as_f64())))
}

pub fn grouped_bars_from_normalized(table: &NormalizedTable) -> Result<ChartData> {
    grouped(table.keys(), table.iter().map(|(k, v)| (k, *v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::group::group_count;
    use crate::processor::normalize::normalize_within;

    fn dataset() -> Dataset {
        let csv = "idade,raca,sigla_uf,genero\n20,parda,SP,F\n30,parda,SP,M\n40,branca,RJ,F\n50,parda,SP,M\n120,branca,RJ,M\n,parda,SP,F\n";
        Dataset::from_csv_bytes(csv.as_bytes()).unwrap().0
    }

    #[test]
    fn test_histogram_bins() {
        let ChartData::Histogram(bins) = histogram(&dataset(), "idade", 4).unwrap() else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lo, 20.0);
        assert_eq!(bins[3].hi, 120.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![3, 1, 0, 1]);
    }

    #[test]
    fn test_histogram_errors() {
        assert!(histogram(&dataset(), "idade", 0).is_err());
        assert!(matches!(
            histogram(&dataset(), "raca", 3),
            Err(AnalysisError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_box_stats_outliers() {
        let ChartData::BoxPlot(boxes) = box_stats(&dataset(), "idade", None).unwrap() else {
            panic!("expected box plot");
        };
        let b = &boxes[0];
        assert_eq!(b.count, 5);
        assert_eq!(b.median, 40.0);
        assert_eq!((b.q1, b.q3), (30.0, 50.0));
        assert_eq!(b.upper_whisker, 50.0);
        assert_eq!(b.outliers, vec![120.0]);
    }

    #[test]
    fn test_box_stats_by_group() {
        let ChartData::BoxPlot(boxes) = box_stats(&dataset(), "idade", Some("raca")).unwrap()
        else {
            panic!("expected box plot");
        };
        let groups: Vec<Option<String>> = boxes.iter().map(|b| b.group.clone()).collect();
        assert_eq!(
            groups,
            vec![Some("branca".to_string()), Some("parda".to_string())]
        );
        assert_eq!(boxes[1].count, 3);
    }

    #[test]
    fn test_grouped_bars() {
        let dataset = dataset();
        let table = group_count(&dataset, &["sigla_uf", "genero"]).unwrap();
        let ChartData::GroupedBar { x_column, bars, .. } = grouped_bars_from_table(&table).unwrap()
        else {
            panic!("expected grouped bars");
        };
        assert_eq!(x_column, "sigla_uf");
        assert_eq!(bars.len(), 4);

        let normalized = normalize_within(&table, &["sigla_uf"]).unwrap();
        assert!(grouped_bars_from_normalized(&normalized).is_ok());

        let one_key = group_count(&dataset, &["genero"]).unwrap();
        assert!(grouped_bars_from_table(&one_key).is_err());
    }
}
