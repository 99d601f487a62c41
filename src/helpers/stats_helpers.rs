use crate::processor::{AggregateOp, AggregateResult};

/// Aggregates integer values, staying integral where the op allows it
///
/// An empty slice yields 0 for `Sum`/`Count` and NaN for `Avg`/`Min`/`Max`.
pub fn aggregate_i64(values: &[i64], op: AggregateOp) -> AggregateResult {
    match op {
        AggregateOp::Sum => AggregateResult::Int(values.iter().sum()),
        AggregateOp::Count => AggregateResult::Int(values.len() as i64),
        AggregateOp::Avg if values.is_empty() => AggregateResult::Float(f64::NAN),
        AggregateOp::Avg => {
            let sum: i64 = values.iter().sum();
            AggregateResult::Float(sum as f64 / values.len() as f64)
        }
        AggregateOp::Min => values
            .iter()
            .min()
            .map_or(AggregateResult::Float(f64::NAN), |&v| AggregateResult::Int(v)),
        AggregateOp::Max => values
            .iter()
            .max()
            .map_or(AggregateResult::Float(f64::NAN), |&v| AggregateResult::Int(v)),
    }
}

/// Aggregates float values
///
/// An empty slice yields 0 for `Sum`/`Count` and NaN for `Avg`/`Min`/`Max`.
pub fn aggregate_f64(values: &[f64], op: AggregateOp) -> AggregateResult {
    match op {
        AggregateOp::Sum => AggregateResult::Float(values.iter().sum()),
        AggregateOp::Count => AggregateResult::Int(values.len() as i64),
        AggregateOp::Avg => AggregateResult::Float(mean(values)),
        AggregateOp::Min if values.is_empty() => AggregateResult::Float(f64::NAN),
        AggregateOp::Min => {
            AggregateResult::Float(values.iter().fold(f64::INFINITY, |a, &b| a.min(b)))
        }
        AggregateOp::Max if values.is_empty() => AggregateResult::Float(f64::NAN),
        AggregateOp::Max => {
            AggregateResult::Float(values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)))
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 in the denominator)
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of already sorted values, linear interpolation between closest ranks
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

pub fn sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}
