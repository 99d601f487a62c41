use itertools::Itertools;
use log::{debug, info, warn};
use memmap2::Mmap;
use serde::Serialize;
use std::{collections::HashSet, fs::File, path::Path};

use crate::processor::{
    AnalysisError, Condition, FilterPredicate, NullPolicy, ParseError, ParseSummary, Result,
    Value,
    column::{Column, ColumnType},
};

/// An immutable, column-oriented table loaded from a CSV file
///
/// Filtering never mutates a `Dataset`; it produces a new one with the same
/// schema and the matching rows in their original order.
///
/// # Examples
///
/// ```rust,no_run
/// # use electoral_explorer::processor::{FilterPredicate, NullPolicy, Value, dataset::Dataset};
/// let dataset = Dataset::load_csv("candidatos.csv".as_ref()).unwrap();
/// let young = dataset
///     .filter("idade", &FilterPredicate::LessThan(Value::Int(80)), &NullPolicy::Drop)
///     .unwrap();
/// println!("{} of {} rows", young.row_count(), dataset.row_count());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

/// Per-column overview, the equivalent of a dataframe `info()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: ColumnType,
    pub non_null: usize,
}

/// Read-only view of a single row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    dataset: &'a Dataset,
    idx: usize,
}

impl<'a> Row<'a> {
    /// Position of the row in its dataset
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Cell value; `None` for nulls and unknown columns
    pub fn get(&self, column: &str) -> Option<Value> {
        self.dataset.get_col(column).ok()?.get(self.idx)
    }

    pub fn f64(&self, column: &str) -> Option<f64> {
        self.dataset.get_col(column).ok()?.f64_at(self.idx)
    }

    pub fn str(&self, column: &str) -> Option<&'a str> {
        match self.dataset.get_col(column).ok()? {
            Column::Str(v) => v[self.idx].as_deref(),
            _ => None,
        }
    }
}

impl Dataset {
    /// Loads a CSV file into memory using memory mapping
    ///
    /// Column types are inferred from the whole column (Int, Float, Str);
    /// empty cells are nulls. Tokens such as `nan` or `inf` keep a column
    /// textual. Rows whose field count does not match the header
    /// are skipped and logged.
    ///
    /// # Errors
    /// Returns an [`AnalysisError`] if the file cannot be opened or mapped, or
    /// if the header is missing or repeats a column name.
    pub fn load_csv(path: &Path) -> Result<Dataset> {
        let (dataset, summary) = Self::load_csv_with_summary(path)?;
        for e in &summary.errors {
            warn!("skipped line {}: {}", e.row, e.value);
        }
        Ok(dataset)
    }

    /// Like [`Dataset::load_csv`], also returning what was skipped
    pub fn load_csv_with_summary(path: &Path) -> Result<(Dataset, ParseSummary)> {
        info!("read: {}", path.display());
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(AnalysisError::Parse("Missing header line".into()));
        }
        let mmap = unsafe { Mmap::map(&file)? };
        let (dataset, summary) = Self::from_csv_bytes(&mmap[..])?;
        info!(
            "loaded {} rows x {} columns ({} lines skipped)",
            dataset.row_count,
            dataset.headers.len(),
            summary.errors.len()
        );
        Ok((dataset, summary))
    }

    /// Parses CSV text held in memory
    pub fn from_csv_bytes(buf: &[u8]) -> Result<(Dataset, ParseSummary)> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(buf);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::Parse("Missing header line".into()));
        }

        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != headers.len() {
                errors.push(ParseError {
                    row: record
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(i + 2),
                    value: format!("Expected {} fields, got {}", headers.len(), record.len()),
                });
                continue;
            }
            records.push(record);
        }

        let schema: Vec<ColumnType> = (0..headers.len())
            .map(|col_idx| Self::infer_type(&records, col_idx))
            .collect();
        debug!(
            "schema: {}",
            headers
                .iter()
                .zip(&schema)
                .map(|(h, t)| format!("{h}:{t}"))
                .join(", ")
        );

        let mut columns: Vec<Column> = schema
            .iter()
            .map(|&t| Column::with_capacity(t, records.len()))
            .collect();

        for record in &records {
            for (col_idx, column) in columns.iter_mut().enumerate() {
                let cell = Self::parse_cell(&record[col_idx], schema[col_idx])?;
                column
                    .push(cell)
                    .map_err(|v| AnalysisError::Parse(format!("unexpected value {v}")))?;
            }
        }

        let dataset = Self::from_columns(headers.into_iter().zip(columns).collect())?;
        Ok((
            dataset,
            ParseSummary {
                rows_processed: records.len(),
                errors,
            },
        ))
    }

    fn infer_type(records: &[csv::StringRecord], col_idx: usize) -> ColumnType {
        let mut inferred = None;
        for record in records {
            let field = record[col_idx].trim();
            if field.is_empty() {
                continue;
            }
            if inferred != Some(ColumnType::Float64)
                && atoi_simd::parse::<i64>(field.as_bytes()).is_ok()
            {
                inferred = Some(ColumnType::Int64);
            } else if fast_float::parse::<f64, _>(field).is_ok_and(f64::is_finite) {
                inferred = Some(ColumnType::Float64);
            } else {
                return ColumnType::Str;
            }
        }
        inferred.unwrap_or(ColumnType::Str)
    }

    fn parse_cell(field: &str, col_type: ColumnType) -> Result<Option<Value>> {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value = match col_type {
            ColumnType::Int64 => Value::Int(
                atoi_simd::parse::<i64>(trimmed.as_bytes())
                    .map_err(|e| AnalysisError::Parse(format!("'{trimmed}': {e}")))?,
            ),
            ColumnType::Float64 => Value::Float(
                fast_float::parse::<f64, _>(trimmed)
                    .map_err(|e| AnalysisError::Parse(format!("'{trimmed}': {e}")))?,
            ),
            ColumnType::Str => Value::Str(field.to_string()),
        };
        Ok(Some(value))
    }

    /// Builds a dataset from named columns of equal length
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Dataset> {
        let row_count = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for (name, col) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AnalysisError::Parse(format!("duplicate column '{name}'")));
            }
            if col.len() != row_count {
                return Err(AnalysisError::Parse(format!(
                    "column '{name}' has {} rows, expected {row_count}",
                    col.len()
                )));
            }
        }
        let (headers, columns) = columns.into_iter().unzip();
        Ok(Dataset {
            headers,
            columns,
            row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.headers.len())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn schema(&self) -> Vec<(&str, ColumnType)> {
        self.headers
            .iter()
            .zip(&self.columns)
            .map(|(h, c)| (h.as_str(), c.col_type()))
            .collect()
    }

    pub fn info(&self) -> Vec<ColumnInfo> {
        self.headers
            .iter()
            .zip(&self.columns)
            .map(|(name, col)| ColumnInfo {
                name: name.clone(),
                dtype: col.col_type(),
                non_null: col.len() - col.null_count(),
            })
            .collect()
    }

    pub fn get_col(&self, col_name: &str) -> Result<&Column> {
        let col_pos = self
            .headers
            .iter()
            .position(|cn| cn == col_name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(col_name.to_string()))?;

        self.columns
            .get(col_pos)
            .ok_or_else(|| AnalysisError::ColumnNotFound(col_name.to_string()))
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        (idx < self.row_count).then_some(Row { dataset: self, idx })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.row_count).map(move |idx| Row { dataset: self, idx })
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Dataset {
        let rows: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&rows)
    }

    /// Distinct non-null values of a column, in first-seen order
    pub fn distinct(&self, column: &str) -> Result<Vec<Value>> {
        let col = self.get_col(column)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for v in (0..col.len()).filter_map(|i| col.get(i)) {
            if seen.insert(v.clone()) {
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Mean of the non-null values of a numeric column; NaN when there are none
    pub fn mean_of(&self, column: &str) -> Result<f64> {
        let col = self.get_col(column)?;
        if !col.col_type().is_numeric() {
            return Err(AnalysisError::TypeMismatch {
                column: column.to_string(),
                expected: "a numeric column".into(),
            });
        }
        let (sum, n) = col.iter_f64().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        Ok(if n == 0 { f64::NAN } else { sum / n as f64 })
    }

    /// Keeps the rows where `column` satisfies `predicate`
    ///
    /// Nulls in `column` are handled according to `nulls`. The result keeps the
    /// schema and the original row order; an empty result is not an error.
    ///
    /// # Errors
    /// - [`AnalysisError::ColumnNotFound`] for an unknown column
    /// - [`AnalysisError::TypeMismatch`] when the predicate's values cannot be
    ///   compared with the column
    /// - [`AnalysisError::NullValue`] under [`NullPolicy::Error`]
    pub fn filter(
        &self,
        column: &str,
        predicate: &FilterPredicate,
        nulls: &NullPolicy,
    ) -> Result<Dataset> {
        let rows = self.matching_rows(column, predicate, nulls)?;
        let out = self.take_rows(&rows);
        if out.is_empty() {
            warn!("filter on '{column}' ({predicate:?}) matched no rows");
        }
        Ok(out)
    }

    /// Keeps the rows satisfying every condition
    pub fn filter_all(&self, conditions: &[Condition], nulls: &NullPolicy) -> Result<Dataset> {
        let mut filtered_rows: Option<Vec<usize>> = None;
        for cond in conditions {
            let current = self.matching_rows(&cond.column, &cond.predicate, nulls)?;
            filtered_rows = Some(match filtered_rows {
                None => current,
                Some(existing) => intersect_sorted_vecs(existing, current),
            });
        }
        let rows = filtered_rows.unwrap_or_else(|| (0..self.row_count).collect());
        let out = self.take_rows(&rows);
        if out.is_empty() {
            warn!("{} conditions matched no rows", conditions.len());
        }
        Ok(out)
    }

    /// Keeps the rows for which `keep` returns true
    pub fn filter_rows<F>(&self, keep: F) -> Dataset
    where
        F: Fn(&Row) -> bool,
    {
        let rows: Vec<usize> = self
            .rows()
            .filter(|row| keep(row))
            .map(|row| row.idx)
            .collect();
        let out = self.take_rows(&rows);
        if out.is_empty() {
            warn!("row filter matched no rows");
        }
        out
    }

    /// Applies a null policy to the listed columns
    ///
    /// `Drop` removes rows with a null in any listed column, `Error` fails on
    /// the first one, `Impute` fills the nulls with the value for the column's
    /// type.
    pub fn handle_nulls(&self, columns: &[&str], policy: &NullPolicy) -> Result<Dataset> {
        let cols = columns
            .iter()
            .map(|&name| self.get_col(name).map(|c| (name, c)))
            .collect::<Result<Vec<_>>>()?;

        match policy {
            NullPolicy::Drop => {
                let rows: Vec<usize> = (0..self.row_count)
                    .filter(|&i| cols.iter().all(|(_, c)| !c.is_null(i)))
                    .collect();
                if rows.len() < self.row_count {
                    debug!("dropped {} rows with nulls", self.row_count - rows.len());
                }
                Ok(self.take_rows(&rows))
            }
            NullPolicy::Error => {
                for i in 0..self.row_count {
                    if let Some((name, _)) = cols.iter().find(|(_, c)| c.is_null(i)) {
                        return Err(AnalysisError::NullValue {
                            column: name.to_string(),
                            row: i,
                        });
                    }
                }
                Ok(self.clone())
            }
            NullPolicy::Impute { .. } => {
                let mut out = self.clone();
                for (name, col) in cols {
                    let Some(value) = policy.fill_for(col.col_type()) else {
                        continue;
                    };
                    let filled = col.fill_nulls(value).map_err(|v| AnalysisError::TypeMismatch {
                        column: name.to_string(),
                        expected: format!("a column that can hold {v:?}"),
                    })?;
                    let pos = out
                        .headers
                        .iter()
                        .position(|h| h == name)
                        .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))?;
                    out.columns[pos] = filled;
                }
                Ok(out)
            }
        }
    }

    fn matching_rows(
        &self,
        column: &str,
        predicate: &FilterPredicate,
        nulls: &NullPolicy,
    ) -> Result<Vec<usize>> {
        let col = self.get_col(column)?;
        check_operands(column, col.col_type(), predicate)?;
        let fill = nulls.fill_for(col.col_type());

        let mut out = Vec::with_capacity(self.row_count);
        for i in 0..self.row_count {
            let cell = match (col.get(i), fill, nulls) {
                (Some(v), _, _) => v,
                (None, Some(v), _) => v.clone(),
                (None, None, NullPolicy::Error) => {
                    return Err(AnalysisError::NullValue {
                        column: column.to_string(),
                        row: i,
                    });
                }
                (None, None, _) => continue,
            };
            match predicate.matches(&cell) {
                Some(true) => out.push(i),
                Some(false) => {}
                None => {
                    return Err(AnalysisError::TypeMismatch {
                        column: column.to_string(),
                        expected: format!("operand of {predicate:?} (imputed {cell:?})"),
                    });
                }
            }
        }
        Ok(out)
    }

    fn take_rows(&self, rows: &[usize]) -> Dataset {
        Dataset {
            headers: self.headers.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            row_count: rows.len(),
        }
    }
}

fn check_operands(column: &str, col_type: ColumnType, predicate: &FilterPredicate) -> Result<()> {
    let ok = predicate.operands().iter().all(|v| match v {
        Value::Str(_) => col_type == ColumnType::Str,
        Value::Int(_) | Value::Float(_) => col_type.is_numeric(),
    });
    if ok {
        Ok(())
    } else {
        Err(AnalysisError::TypeMismatch {
            column: column.to_string(),
            expected: format!("{col_type} operand in {predicate:?}"),
        })
    }
}

/// Helper function to intersect sorted vectors
fn intersect_sorted_vecs(a: Vec<usize>, b: Vec<usize>) -> Vec<usize> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dataset_from_str(csv: &'_ str) -> Dataset {
        use std::io::Write;
        use tempfile::NamedTempFile;

        // write CSV to temp file
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{}", csv).unwrap();

        Dataset::load_csv(tmp.path()).unwrap()
    }

    fn impute_zero_or_unknown() -> NullPolicy {
        NullPolicy::Impute {
            numeric: Value::Int(0),
            text: Value::from("não informado"),
        }
    }

    fn ages(dataset: &Dataset) -> Vec<i64> {
        dataset
            .rows()
            .map(|r| match r.get("idade") {
                Some(Value::Int(a)) => a,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_row_count_and_schema() {
        let csv = "idade,genero,renda\n25,feminino,1.5\n95,masculino,2\n";
        let dataset = make_dataset_from_str(csv);
        assert_eq!(dataset.shape(), (2, 3));
        assert_eq!(
            dataset.schema(),
            vec![
                ("idade", ColumnType::Int64),
                ("genero", ColumnType::Str),
                ("renda", ColumnType::Float64),
            ]
        );
    }

    #[test]
    fn test_non_finite_tokens_stay_text() {
        let csv = "situacao,renda\nnan,1.5\ninf,inf\n";
        let (dataset, _) = Dataset::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(
            dataset.schema(),
            vec![("situacao", ColumnType::Str), ("renda", ColumnType::Str)]
        );
        assert_eq!(dataset.row(0).unwrap().str("situacao"), Some("nan"));
    }

    #[test]
    fn test_quoted_fields_and_nulls() {
        let csv = "ocupacao,idade\n\"professor, ensino medio\",40\n,\n";
        let dataset = make_dataset_from_str(csv);
        assert_eq!(dataset.row_count(), 2);
        let first = dataset.row(0).unwrap();
        assert_eq!(first.str("ocupacao"), Some("professor, ensino medio"));
        let second = dataset.row(1).unwrap();
        assert_eq!(second.get("ocupacao"), None);
        assert_eq!(second.get("idade"), None);
        assert_eq!(dataset.info()[1].non_null, 1);
    }

    #[test]
    fn test_ragged_rows_are_reported() {
        let csv = "a,b\n1,2\n3\n4,5\n";
        let (dataset, summary) = Dataset::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 3);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            Dataset::load_csv(tmp.path()),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn test_filter_age_preserves_order() {
        let csv = "idade\n25\n95\n40\n81\n79\n";
        let dataset = make_dataset_from_str(csv);
        let young = dataset
            .filter(
                "idade",
                &FilterPredicate::LessThan(Value::Int(80)),
                &NullPolicy::Drop,
            )
            .unwrap();
        assert_eq!(ages(&young), vec![25, 40, 79]);
    }

    #[test]
    fn test_filter_is_idempotent_and_subset() {
        let csv = "cargo,idade\nvereador,30\nprefeito,50\nvereador,61\n";
        let dataset = make_dataset_from_str(csv);
        let pred = FilterPredicate::Equals(Value::from("vereador"));
        let once = dataset.filter("cargo", &pred, &NullPolicy::Drop).unwrap();
        let twice = once.filter("cargo", &pred, &NullPolicy::Drop).unwrap();
        assert_eq!(once, twice);
        assert_eq!(ages(&once), vec![30, 61]);
        assert!(once.rows().all(|r| r.str("cargo") == Some("vereador")));
    }

    #[test]
    fn test_filter_unknown_column() {
        let dataset = make_dataset_from_str("idade\n1\n");
        let err = dataset
            .filter(
                "sigla_uf",
                &FilterPredicate::Equals(Value::from("SP")),
                &NullPolicy::Drop,
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(c) if c == "sigla_uf"));
    }

    #[test]
    fn test_filter_type_mismatch() {
        let dataset = make_dataset_from_str("idade\n1\n");
        let err = dataset
            .filter(
                "idade",
                &FilterPredicate::Equals(Value::from("um")),
                &NullPolicy::Drop,
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn test_filter_empty_result() {
        let dataset = make_dataset_from_str("cargo\nvereador\n");
        let out = dataset
            .filter(
                "cargo",
                &FilterPredicate::Equals(Value::from("senador")),
                &NullPolicy::Drop,
            )
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(out.headers(), dataset.headers());
    }

    #[test]
    fn test_filter_null_policies() {
        let dataset = make_dataset_from_str("idade,uf\n30,SP\n,RJ\n90,MG\n");
        let pred = FilterPredicate::LessThan(Value::Int(80));

        let dropped = dataset.filter("idade", &pred, &NullPolicy::Drop).unwrap();
        assert_eq!(dropped.row_count(), 1);

        let err = dataset.filter("idade", &pred, &NullPolicy::Error).unwrap_err();
        assert!(matches!(err, AnalysisError::NullValue { row: 1, .. }));

        let imputed = dataset
            .filter("idade", &pred, &impute_zero_or_unknown())
            .unwrap();
        assert_eq!(imputed.row_count(), 2);
        // the stored cell stays null
        assert_eq!(imputed.row(1).unwrap().get("idade"), None);
    }

    #[test]
    fn test_handle_nulls() {
        let dataset = make_dataset_from_str("uf,genero\nSP,\nRJ,feminino\n");
        let dropped = dataset
            .handle_nulls(&["uf", "genero"], &NullPolicy::Drop)
            .unwrap();
        assert_eq!(dropped.row_count(), 1);

        assert!(dataset
            .handle_nulls(&["genero"], &NullPolicy::Error)
            .is_err());
        assert!(dataset.handle_nulls(&["uf"], &NullPolicy::Error).is_ok());

        let filled = dataset
            .handle_nulls(&["genero"], &impute_zero_or_unknown())
            .unwrap();
        assert_eq!(filled.row(0).unwrap().str("genero"), Some("não informado"));
    }

    #[test]
    fn test_impute_picks_value_by_column_type() {
        let dataset = make_dataset_from_str("idade,genero,renda
,feminino,
40,,1.5
");
        let filled = dataset
            .handle_nulls(&["idade", "genero", "renda"], &impute_zero_or_unknown())
            .unwrap();
        assert_eq!(filled.row(0).unwrap().get("idade"), Some(Value::Int(0)));
        assert_eq!(filled.row(0).unwrap().get("renda"), Some(Value::Float(0.0)));
        assert_eq!(filled.row(1).unwrap().str("genero"), Some("não informado"));

        let unknown = dataset
            .filter(
                "genero",
                &FilterPredicate::Equals("não informado".into()),
                &impute_zero_or_unknown(),
            )
            .unwrap();
        assert_eq!(unknown.row_count(), 1);
        assert_eq!(unknown.row(0).unwrap().get("idade"), Some(Value::Int(40)));

        let bad = NullPolicy::Impute {
            numeric: Value::from("zero"),
            text: Value::from("não informado"),
        };
        assert!(matches!(
            dataset.handle_nulls(&["idade"], &bad),
            Err(AnalysisError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_filter_all_and_rows() {
        let dataset = make_dataset_from_str("cargo,idade\nvereador,30\nvereador,85\nprefeito,40\n");
        let out = dataset
            .filter_all(
                &[
                    Condition::new("cargo", FilterPredicate::Equals("vereador".into())),
                    Condition::new("idade", FilterPredicate::LessThan(Value::Int(80))),
                ],
                &NullPolicy::Drop,
            )
            .unwrap();
        assert_eq!(ages(&out), vec![30]);

        let all = dataset.filter_rows(|_| true);
        assert_eq!(all, dataset);
        let old = dataset.filter_rows(|r| r.f64("idade").is_some_and(|a| a >= 40.0));
        assert_eq!(ages(&old), vec![85, 40]);
    }

    #[test]
    fn test_distinct_and_mean() {
        let dataset = make_dataset_from_str(
            "tipo_eleicao,idade\neleicao ordinaria,20\nsuplementar,40\neleicao ordinaria,\n",
        );
        assert_eq!(
            dataset.distinct("tipo_eleicao").unwrap(),
            vec![Value::from("eleicao ordinaria"), Value::from("suplementar")]
        );
        assert_eq!(dataset.mean_of("idade").unwrap(), 30.0);
        assert!(dataset.mean_of("tipo_eleicao").is_err());
        assert_eq!(dataset.head(1).row_count(), 1);
    }
}
