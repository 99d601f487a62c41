use serde::Serialize;
use std::fmt;

use crate::processor::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::Str => write!(f, "str"),
        }
    }
}

/// Typed column storage; `None` is a null cell
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
}

impl Column {
    pub fn with_capacity(col_type: ColumnType, capacity: usize) -> Self {
        match col_type {
            ColumnType::Int64 => Column::Int64(Vec::with_capacity(capacity)),
            ColumnType::Float64 => Column::Float64(Vec::with_capacity(capacity)),
            ColumnType::Str => Column::Str(Vec::with_capacity(capacity)),
        }
    }

    pub fn col_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Str(_) => ColumnType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, idx: usize) -> bool {
        match self {
            Column::Int64(v) => v[idx].is_none(),
            Column::Float64(v) => v[idx].is_none(),
            Column::Str(v) => v[idx].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_null(i)).count()
    }

    /// Cell at `idx`, `None` for nulls
    pub fn get(&self, idx: usize) -> Option<Value> {
        match self {
            Column::Int64(v) => v[idx].map(Value::Int),
            Column::Float64(v) => v[idx].map(Value::Float),
            Column::Str(v) => v[idx].clone().map(Value::Str),
        }
    }

    /// Display form of a cell, as used in group keys
    pub fn key_at(&self, idx: usize) -> Option<String> {
        match self {
            Column::Int64(v) => v[idx].map(|x| x.to_string()),
            Column::Float64(v) => v[idx].map(|x| x.to_string()),
            Column::Str(v) => v[idx].clone(),
        }
    }

    /// Numeric cell as f64; `None` for nulls and string columns
    pub fn f64_at(&self, idx: usize) -> Option<f64> {
        match self {
            Column::Int64(v) => v[idx].map(|x| x as f64),
            Column::Float64(v) => v[idx],
            Column::Str(_) => None,
        }
    }

    /// Non-null numeric values in row order; empty for string columns
    pub fn iter_f64(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).filter_map(|i| self.f64_at(i))
    }

    pub fn push(&mut self, value: Option<Value>) -> Result<(), Value> {
        match (self, value) {
            (Column::Int64(v), None) => v.push(None),
            (Column::Float64(v), None) => v.push(None),
            (Column::Str(v), None) => v.push(None),
            (Column::Int64(v), Some(Value::Int(x))) => v.push(Some(x)),
            (Column::Float64(v), Some(Value::Float(x))) => v.push(Some(x)),
            (Column::Float64(v), Some(Value::Int(x))) => v.push(Some(x as f64)),
            (Column::Str(v), Some(Value::Str(x))) => v.push(Some(x)),
            (_, Some(other)) => return Err(other),
        }
        Ok(())
    }

    /// Gathers the given rows, in the given order, into a new column
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Int64(v) => Column::Int64(rows.iter().map(|&i| v[i]).collect()),
            Column::Float64(v) => Column::Float64(rows.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Replaces every null with `value`; fails if `value` does not fit the column type
    pub fn fill_nulls(&self, value: &Value) -> Result<Column, Value> {
        let mut out = Column::with_capacity(self.col_type(), self.len());
        for i in 0..self.len() {
            let cell = self.get(i).or_else(|| Some(value.clone()));
            out.push(cell)?;
        }
        Ok(out)
    }
}
