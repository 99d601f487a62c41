//! Exploratory analysis of candidate records.
//!
//! Each step is independent: it reads the loaded [`Dataset`], derives a
//! table, hands a chart to the [`Renderer`] and records the numbers in the
//! [`ExplorationReport`].

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::{
    processor::{
        FilterPredicate, NullPolicy, Result, Value,
        dataset::{ColumnInfo, Dataset},
        describe::{NumericSummary, ValueCounts, describe, value_counts},
        group::{TableRow, group_count},
        normalize::{MissingTotalPolicy, normalize},
    },
    render::{
        ChartSpec, RenderConfig, Renderer,
        charts::{
            bars_from_counts, box_stats, grouped_bars_from_normalized, grouped_bars_from_table,
            histogram,
        },
    },
};

pub const IDADE: &str = "idade";
pub const GENERO: &str = "genero";
pub const SIGLA_UF: &str = "sigla_uf";
pub const CARGO: &str = "cargo";
pub const INSTRUCAO: &str = "instrucao";
pub const OCUPACAO: &str = "ocupacao";
pub const RACA: &str = "raca";
pub const TIPO_ELEICAO: &str = "tipo_eleicao";

pub const VEREADOR: &str = "vereador";
pub const DEPUTADO_FEDERAL: &str = "deputado federal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    /// Ages at or above this are treated as outliers
    pub max_age: i64,
    pub age_bins: usize,
    pub null_policy: NullPolicy,
    pub missing_total: MissingTotalPolicy,
    /// Roles broken down by state and gender; free text matched against `cargo`
    pub roles: Vec<String>,
    pub render: RenderConfig,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        ExplorationConfig {
            max_age: 80,
            age_bins: 11,
            null_policy: NullPolicy::Drop,
            missing_total: MissingTotalPolicy::Error,
            roles: vec![VEREADOR.to_string(), DEPUTADO_FEDERAL.to_string()],
            render: RenderConfig::default(),
        }
    }
}

impl ExplorationConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        info!("read config: {}", path.display());
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorationReport {
    pub shape: (usize, usize),
    pub info: Vec<ColumnInfo>,
    pub summary: Vec<NumericSummary>,
    pub roles: Vec<String>,
    pub election_types: Vec<String>,
    pub mean_age: f64,
    pub mean_age_below_max: f64,
    pub rows_below_max_age: usize,
    /// Mean of every numeric column
    pub column_means: BTreeMap<String, f64>,
    /// Same, over the rows below `max_age`
    pub column_means_below_max: BTreeMap<String, f64>,
    pub gender_shares: ValueCounts,
    pub gender_by_state: Vec<TableRow>,
    pub gender_by_state_normalized: Vec<TableRow>,
    pub gender_by_state_per_role: BTreeMap<String, Vec<TableRow>>,
    pub occupation_shares: ValueCounts,
    pub education_shares: ValueCounts,
    pub role_counts: ValueCounts,
    pub race_counts: ValueCounts,
}

fn column_means(dataset: &Dataset) -> BTreeMap<String, f64> {
    describe(dataset)
        .into_iter()
        .map(|s| (s.column, s.mean))
        .collect()
}

/// Age statistics before and after dropping the oldest candidates
struct AgeSummary {
    mean: f64,
    mean_below_max: f64,
    rows_below_max: usize,
    column_means_below_max: BTreeMap<String, f64>,
}

fn distinct_strings(dataset: &Dataset, column: &str) -> Result<Vec<String>> {
    Ok(dataset
        .distinct(column)?
        .into_iter()
        .map(|v| v.to_string())
        .collect())
}

/// File-name friendly form of a free-text value
pub fn slug(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

struct Explorer<'a> {
    dataset: &'a Dataset,
    config: &'a ExplorationConfig,
    renderer: &'a mut dyn Renderer,
}

impl Explorer<'_> {
    fn chart(&mut self, name: &str, chart: ChartSpec) -> Result<()> {
        debug!("render {name}");
        self.renderer.render(name, &chart)
    }

    fn age(&mut self) -> Result<AgeSummary> {
        let config = self.config;
        let cfg = &config.render;
        let hist = histogram(self.dataset, IDADE, self.config.age_bins)?;
        self.chart(
            "age_histogram",
            ChartSpec::new("Candidate age", hist, cfg).labels(IDADE, "candidates"),
        )?;
        let boxes = box_stats(self.dataset, IDADE, None)?;
        self.chart(
            "age_box",
            ChartSpec::new("Candidate age", boxes, cfg).labels(IDADE, ""),
        )?;

        let below = self.dataset.filter(
            IDADE,
            &FilterPredicate::LessThan(Value::Int(self.config.max_age)),
            &self.config.null_policy,
        )?;
        let title = format!("Candidate age below {}", self.config.max_age);
        let boxes = box_stats(&below, IDADE, None)?;
        self.chart(
            &format!("age_box_below_{}", self.config.max_age),
            ChartSpec::new(&title, boxes, cfg).labels(IDADE, ""),
        )?;

        let mean_age = self.dataset.mean_of(IDADE)?;
        let mean_below = below.mean_of(IDADE)?;
        info!("mean age {mean_age:.2}, {mean_below:.2} below {}", self.config.max_age);
        Ok(AgeSummary {
            mean: mean_age,
            mean_below_max: mean_below,
            rows_below_max: below.row_count(),
            column_means_below_max: column_means(&below),
        })
    }

    fn gender(&mut self) -> Result<(ValueCounts, Vec<TableRow>, Vec<TableRow>)> {
        let shares = value_counts(self.dataset, GENERO, true)?;
        let counts = value_counts(self.dataset, GENERO, false)?;
        self.chart(
            "gender_bar",
            ChartSpec::new(
                "Candidate gender",
                bars_from_counts(&counts),
                &self.config.render.clone().with_rotation(0),
            )
            .labels(GENERO, "candidates"),
        )?;

        let clean = self
            .dataset
            .handle_nulls(&[SIGLA_UF, GENERO], &self.config.null_policy)?;
        let by_state = group_count(&clean, &[SIGLA_UF, GENERO])?;
        self.chart(
            "gender_by_state",
            ChartSpec::new(
                "Gender by state",
                grouped_bars_from_table(&by_state)?,
                &self.config.render,
            )
            .labels("state", "candidates"),
        )?;

        let totals = group_count(&clean, &[SIGLA_UF])?;
        let normalized = normalize(&by_state, &totals, self.config.missing_total)?;
        self.chart(
            "gender_by_state_normalized",
            ChartSpec::new(
                "Gender by state (share of state candidates)",
                grouped_bars_from_normalized(&normalized)?,
                &self.config.render,
            )
            .labels("state", "share"),
        )?;

        Ok((shares, by_state.to_rows(), normalized.to_rows()))
    }

    fn gender_for_role(&mut self, role: &str) -> Result<Vec<TableRow>> {
        let for_role = self
            .dataset
            .filter(
                CARGO,
                &FilterPredicate::Equals(Value::from(role)),
                &self.config.null_policy,
            )?
            .handle_nulls(&[SIGLA_UF, GENERO], &self.config.null_policy)?;
        let by_state = group_count(&for_role, &[SIGLA_UF, GENERO])?;
        let title = format!("Gender by state, {role}");
        self.chart(
            &format!("gender_by_state_{}", slug(role)),
            ChartSpec::new(&title, grouped_bars_from_table(&by_state)?, &self.config.render)
                .labels("state", "candidates"),
        )?;
        Ok(by_state.to_rows())
    }

    fn age_by(&mut self, column: &str, name: &str) -> Result<()> {
        let clean = self
            .dataset
            .handle_nulls(&[IDADE, column], &self.config.null_policy)?;
        let boxes = box_stats(&clean, IDADE, Some(column))?;
        let title = format!("Age by {column}");
        self.chart(
            name,
            ChartSpec::new(&title, boxes, &self.config.render).labels(IDADE, column),
        )
    }
}

/// Runs every exploration step over `dataset`
///
/// # Errors
/// The first failing step aborts the run, e.g. with
/// [`crate::processor::AnalysisError::ColumnNotFound`] when the file lacks one
/// of the candidate columns.
pub fn explore(
    dataset: &Dataset,
    config: &ExplorationConfig,
    renderer: &mut dyn Renderer,
) -> Result<ExplorationReport> {
    let (rows, cols) = dataset.shape();
    info!("shape: {rows} rows x {cols} columns");

    let mut explorer = Explorer {
        dataset,
        config,
        renderer,
    };

    let roles = distinct_strings(dataset, CARGO)?;
    let election_types = distinct_strings(dataset, TIPO_ELEICAO)?;
    debug!("roles: {}", roles.join(", "));

    let ages = explorer.age()?;
    let (gender_shares, gender_by_state, gender_by_state_normalized) = explorer.gender()?;

    let mut gender_by_state_per_role = BTreeMap::new();
    for role in &config.roles {
        let rows = explorer.gender_for_role(role)?;
        gender_by_state_per_role.insert(role.clone(), rows);
    }

    let occupation_shares = value_counts(dataset, OCUPACAO, true)?;
    let education_shares = value_counts(dataset, INSTRUCAO, true)?;
    explorer.chart(
        "education_bar",
        ChartSpec::new(
            "Candidate education",
            bars_from_counts(&education_shares),
            &config.render,
        )
        .labels(INSTRUCAO, "share"),
    )?;
    let role_counts = value_counts(dataset, CARGO, false)?;
    let race_counts = value_counts(dataset, RACA, false)?;

    explorer.age_by(RACA, "age_by_race")?;
    explorer.age_by(INSTRUCAO, "age_by_education")?;

    Ok(ExplorationReport {
        shape: dataset.shape(),
        info: dataset.info(),
        summary: describe(dataset),
        roles,
        election_types,
        mean_age: ages.mean,
        mean_age_below_max: ages.mean_below_max,
        rows_below_max_age: ages.rows_below_max,
        column_means: column_means(dataset),
        column_means_below_max: ages.column_means_below_max,
        gender_shares,
        gender_by_state,
        gender_by_state_normalized,
        gender_by_state_per_role,
        occupation_shares,
        education_shares,
        role_counts,
        race_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ChartData, MemoryRenderer};

    const CSV: &str = "\
ano,tipo_eleicao,sigla_uf,cargo,idade,genero,instrucao,ocupacao,raca
2018,eleicao ordinaria,SP,deputado federal,45,masculino,superior completo,advogado,branca
2018,eleicao ordinaria,SP,deputado federal,38,feminino,superior completo,professor,parda
2020,eleicao ordinaria,SP,vereador,29,feminino,ensino medio completo,comerciante,parda
2020,eleicao ordinaria,RJ,vereador,91,masculino,ensino fundamental completo,aposentado,preta
2020,eleicao suplementar,RJ,vereador,52,masculino,ensino medio completo,,branca
";

    fn dataset() -> Dataset {
        Dataset::from_csv_bytes(CSV.as_bytes()).unwrap().0
    }

    /// Adds one candidate without an age and one without a gender
    fn dataset_with_nulls() -> Dataset {
        let csv = format!(
            "{CSV}\
2020,eleicao ordinaria,RJ,vereador,,feminino,ensino medio completo,comerciante,parda
2020,eleicao ordinaria,SP,vereador,33,,superior completo,advogado,branca
"
        );
        Dataset::from_csv_bytes(csv.as_bytes()).unwrap().0
    }

    fn share(rows: &[TableRow], key: [&str; 2]) -> Option<f64> {
        rows.iter().find(|r| r.key == key).map(|r| r.value)
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Deputado Federal"), "deputado_federal");
    }

    #[test]
    fn test_explore_report() {
        let mut renderer = MemoryRenderer::new();
        let report = explore(&dataset(), &ExplorationConfig::default(), &mut renderer).unwrap();

        assert_eq!(report.shape, (5, 9));
        assert_eq!(report.roles, vec!["deputado federal", "vereador"]);
        assert_eq!(report.election_types.len(), 2);
        assert_eq!(report.rows_below_max_age, 4);
        assert_eq!(report.mean_age, 51.0);
        assert_eq!(report.mean_age_below_max, 41.0);
        assert_eq!(report.column_means["ano"], 2019.2);
        assert_eq!(report.column_means_below_max["ano"], 2019.0);
        assert_eq!(report.column_means_below_max["idade"], 41.0);
        assert_eq!(report.gender_shares.get("masculino"), Some(0.6));

        let sp_f = report
            .gender_by_state_normalized
            .iter()
            .find(|r| r.key == ["SP", "feminino"])
            .unwrap();
        assert!((sp_f.value - 2.0 / 3.0).abs() < 1e-12);

        let vereador = &report.gender_by_state_per_role["vereador"];
        assert_eq!(vereador.len(), 2);
        assert_eq!(report.occupation_shares.total(), 1.0);

        assert!(renderer.get("gender_by_state_deputado_federal").is_some());
        let Some(ChartSpec {
            data: ChartData::BoxPlot(boxes),
            ..
        }) = renderer.get("age_by_race")
        else {
            panic!("missing age_by_race");
        };
        assert_eq!(boxes.len(), 3);
    }

    #[test]
    fn test_explore_imputes_by_column_type() {
        let config = ExplorationConfig {
            null_policy: NullPolicy::Impute {
                numeric: Value::Int(0),
                text: Value::from("não informado"),
            },
            ..ExplorationConfig::default()
        };
        let mut renderer = MemoryRenderer::new();
        let report = explore(&dataset_with_nulls(), &config, &mut renderer).unwrap();

        // the missing age reads as 0 and passes the age filter
        assert_eq!(report.rows_below_max_age, 6);
        assert_eq!(report.mean_age_below_max, 39.4);
        assert_eq!(
            share(&report.gender_by_state_normalized, ["SP", "não informado"]),
            Some(0.25)
        );
        assert_eq!(report.gender_by_state_per_role["vereador"].len(), 4);
        assert!(renderer.get("age_by_race").is_some());
    }

    #[test]
    fn test_explore_drop_and_error_policies() {
        let dataset = dataset_with_nulls();
        let report =
            explore(&dataset, &ExplorationConfig::default(), &mut MemoryRenderer::new()).unwrap();
        assert_eq!(report.rows_below_max_age, 5);
        let sp_f = share(&report.gender_by_state_normalized, ["SP", "feminino"]).unwrap();
        assert!((sp_f - 2.0 / 3.0).abs() < 1e-12);

        let config = ExplorationConfig {
            null_policy: NullPolicy::Error,
            ..ExplorationConfig::default()
        };
        let err = explore(&dataset, &config, &mut MemoryRenderer::new()).unwrap_err();
        assert!(matches!(
            err,
            crate::processor::AnalysisError::NullValue { column, row: 5 } if column == IDADE
        ));
    }

    #[test]
    fn test_unknown_role_renders_nothing() {
        let config = ExplorationConfig {
            roles: vec!["senador".to_string()],
            ..ExplorationConfig::default()
        };
        let mut renderer = MemoryRenderer::new();
        let report = explore(&dataset(), &config, &mut renderer).unwrap();
        assert!(report.gender_by_state_per_role["senador"].is_empty());
        assert!(renderer.get("gender_by_state_senador").is_none());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "sigla_uf,genero\nSP,feminino\n";
        let dataset = Dataset::from_csv_bytes(csv.as_bytes()).unwrap().0;
        let err = explore(&dataset, &ExplorationConfig::default(), &mut MemoryRenderer::new())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::processor::AnalysisError::ColumnNotFound(c) if c == CARGO
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ExplorationConfig =
            serde_json::from_str(r#"{"max_age": 70, "null_policy": "error"}"#).unwrap();
        assert_eq!(config.max_age, 70);
        assert_eq!(config.null_policy, NullPolicy::Error);
        assert_eq!(config.age_bins, 11);
        assert_eq!(config.roles.len(), 2);
    }
}
