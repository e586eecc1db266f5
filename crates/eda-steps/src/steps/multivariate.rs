//! Multivariate: matriz de correlación de Pearson y su heatmap.
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eda_core::{ArtifactPayload, ArtifactSink, ConfigError, ExecutionContext, ItemOutcome, MetricValue, StatsTable,
               StepError, StepExecution};
use eda_domain::{Column, ColumnKind, Dataset};

use super::{draw, parse_options, ChartSlot, Prepared};
use crate::charts::{ChartRenderer, ChartSpec};
use crate::stats::correlation_matrix;

pub const KIND: &str = "multivariate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultivariateOptions {
    /// Columnas a correlacionar; vacío = todas las numéricas.
    pub correlation_cols: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MultivariateStep {
    options: MultivariateOptions,
    renderer: Arc<dyn ChartRenderer>,
}

impl MultivariateStep {
    pub fn new(options: MultivariateOptions, renderer: Arc<dyn ChartRenderer>) -> Self { Self { options, renderer } }

    pub fn from_options(options: &Value, renderer: Arc<dyn ChartRenderer>) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_options(KIND, options)?, renderer))
    }

    pub fn base_params(&self) -> Value { serde_json::to_value(&self.options).unwrap_or_default() }

    /// Columnas numéricas a usar, en el orden configurado (o del dataset).
    /// Los nombres inexistentes o no numéricos se descartan con un aviso.
    fn selected_columns<'a>(&self, ds: &'a Dataset) -> Vec<&'a Column> {
        if self.options.correlation_cols.is_empty() {
            return ds.columns_of_kind(ColumnKind::Numerical).collect();
        }
        let mut selected: Vec<&Column> = Vec::new();
        for name in &self.options.correlation_cols {
            match ds.column(name) {
                Some(col) if col.kind() == ColumnKind::Numerical => {
                    if !selected.iter().any(|c| c.name() == name) {
                        selected.push(col);
                    }
                }
                Some(col) => log::warn!("multivariate: column '{name}' is {} and is ignored", col.kind()),
                None => log::warn!("multivariate: column '{name}' not found and is ignored"),
            }
        }
        selected
    }

    pub fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        let columns = self.selected_columns(ctx.dataset);
        if columns.len() < 2 {
            return Err(StepError::InsufficientNumericalColumns);
        }
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        let series: Vec<&[Option<f64>]> = columns.iter().filter_map(|c| c.as_numbers()).collect();
        let matrix = correlation_matrix(&series);

        let spec = ChartSpec::Heatmap { title: "Correlation Matrix of Numerical Features".to_string(),
                                        labels: names.clone(),
                                        matrix: matrix.clone() };
        let slot = ChartSlot { item: "correlation".to_string(),
                               subject: "correlation".to_string(),
                               kind: "heatmap".to_string(),
                               stem: "multivariate_correlation_matrix".to_string() };
        let chart = match draw(self.renderer.as_ref(), ctx, slot, &spec, names.clone()) {
            Prepared::Chart { chart, .. } => chart,
            Prepared::Issue(outcome) => return Err(StepError::Render(format!("{:?}", outcome.status))),
        };

        let heatmap = sink.put("correlation", "heatmap", ArtifactPayload::Chart(chart))?;
        let table = sink.put("correlation", "matrix", ArtifactPayload::Stats(matrix_table(&names, &matrix)))?;
        log::info!("Generated correlation matrix over {} columns", names.len());
        Ok(StepExecution::Completed { items: vec![ItemOutcome::produced("correlation", vec![heatmap, table])] })
    }
}

fn matrix_table(names: &[String], matrix: &[Vec<Option<f64>>]) -> StatsTable {
    let mut table = StatsTable::new(names.to_vec());
    for (row_name, row) in names.iter().zip(matrix) {
        let cells: IndexMap<String, MetricValue> =
            names.iter().zip(row).map(|(col, r)| (col.clone(), MetricValue::maybe_number(*r))).collect();
        table.insert(row_name.clone(), MetricValue::Table(cells));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::SvgChartRenderer;
    use serde_json::json;

    fn step(options: Value) -> MultivariateStep {
        MultivariateStep::from_options(&options, Arc::new(SvgChartRenderer::default())).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![Column::numerical("a", vec![Some(1.0), Some(2.0), Some(3.0)]),
                          Column::numerical("b", vec![Some(2.0), Some(4.0), Some(6.5)]),
                          Column::numerical("flat", vec![Some(5.0), Some(5.0), Some(5.0)]),
                          Column::categorical("c", vec![Some("x"), Some("y"), Some("x")])]).unwrap()
    }

    #[test]
    fn invalid_names_are_dropped_and_too_few_columns_fail() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset();
        let ctx = ExecutionContext::new(&ds, None, dir.path());
        let mut sink = ArtifactSink::new(KIND);
        let err = step(json!({"correlation_cols": ["a", "c", "ghost"]})).execute(&ctx, &mut sink).unwrap_err();
        assert_eq!(err, StepError::InsufficientNumericalColumns);
        assert_eq!(err.to_string(), "insufficient numerical columns");
        assert!(sink.is_empty());
    }

    #[test]
    fn heatmap_and_matrix_with_undefined_for_constant_column() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("charts")).unwrap();
        let ds = dataset();
        let ctx = ExecutionContext::new(&ds, None, dir.path());
        let mut sink = ArtifactSink::new(KIND);
        step(json!({})).execute(&ctx, &mut sink).unwrap();

        assert_eq!(sink.names(), vec!["multivariate.correlation.heatmap", "multivariate.correlation.matrix"]);
        let chart = sink.staged()[0].as_chart().unwrap();
        assert_eq!(chart.file, std::path::Path::new("charts/multivariate_correlation_matrix.svg"));
        assert_eq!(chart.source_columns, vec!["a", "b", "flat"]);

        let table = sink.staged()[1].as_stats().unwrap();
        let MetricValue::Table(row) = table.get("a").unwrap() else { panic!("expected row table") };
        assert!(row["b"].as_f64().unwrap() > 0.99);
        assert!(row["flat"].is_undefined());
    }
}
