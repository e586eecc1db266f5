//! Profile: resumen del dataset y de cada columna.
//!
//! Artifacts:
//! - `profile.dataset.overview`: filas, columnas, celdas faltantes, filas
//!   duplicadas.
//! - `profile.dataset.missing_values`: faltantes por columna (sólo columnas
//!   con al menos uno).
//! - `profile.<columna>.summary`: métricas según el tipo de columna.
//! - `profile.<columna>.frequencies`: tabla de frecuencias (categóricas).
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eda_core::{ArtifactPayload, ArtifactSink, ConfigError, ExecutionContext, ItemOutcome, MetricValue, StatsTable,
               StepError, StepExecution};
use eda_domain::{Column, ColumnValues, Dataset};

use super::parse_options;
use crate::stats::{frequencies, NumericSummary};

pub const KIND: &str = "profile";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOptions {}

#[derive(Debug, Clone, Default)]
pub struct ProfileStep {
    options: ProfileOptions,
}

impl ProfileStep {
    pub fn from_options(options: &Value) -> Result<Self, ConfigError> {
        Ok(Self { options: parse_options(KIND, options)? })
    }

    pub fn base_params(&self) -> Value { serde_json::to_value(&self.options).unwrap_or_default() }

    pub fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        let ds = ctx.dataset;
        sink.put("dataset", "overview", ArtifactPayload::Stats(overview(ds)))?;
        sink.put("dataset", "missing_values", ArtifactPayload::Stats(missing_values(ds)))?;

        let mut items = Vec::with_capacity(ds.n_columns());
        for col in ds.columns() {
            let mut names = vec![sink.put(col.name(), "summary", ArtifactPayload::Stats(summary(col, ds.n_rows())))?];
            if let ColumnValues::Categorical(values) = col.values() {
                names.push(sink.put(col.name(), "frequencies", ArtifactPayload::Stats(frequency_table(col, values)))?);
            }
            items.push(ItemOutcome::produced(col.name(), names));
        }
        log::info!("Profiled {} columns", ds.n_columns());
        Ok(StepExecution::Completed { items })
    }
}

fn overview(ds: &Dataset) -> StatsTable {
    let sources = ds.column_names().into_iter().map(str::to_string).collect();
    StatsTable::new(sources).with("rows", MetricValue::count(ds.n_rows()))
                            .with("columns", MetricValue::count(ds.n_columns()))
                            .with("missing_cells", MetricValue::count(ds.missing_cells()))
                            .with("duplicate_rows", MetricValue::count(ds.duplicate_rows()))
}

fn missing_values(ds: &Dataset) -> StatsTable {
    let with_missing: Vec<&Column> = ds.columns().iter().filter(|c| c.missing_count() > 0).collect();
    let mut table = StatsTable::new(with_missing.iter().map(|c| c.name().to_string()).collect());
    for col in with_missing {
        table.insert(col.name(), MetricValue::count(col.missing_count()));
    }
    table
}

fn summary(col: &Column, rows: usize) -> StatsTable {
    let missing = col.missing_count();
    let fraction = if rows == 0 { MetricValue::Undefined } else { MetricValue::number(missing as f64 / rows as f64) };
    let mut table = StatsTable::new(vec![col.name().to_string()]).with("kind", MetricValue::text(col.kind().as_str()))
                                                                 .with("count", MetricValue::count(col.present_count()))
                                                                 .with("missing", MetricValue::count(missing))
                                                                 .with("missing_fraction", fraction);
    match col.values() {
        ColumnValues::Numerical(_) => {
            let s = NumericSummary::from_values(&col.present_numbers());
            for (name, value) in [("mean", s.mean),
                                  ("std", s.std),
                                  ("min", s.min),
                                  ("25%", s.q25),
                                  ("50%", s.median),
                                  ("75%", s.q75),
                                  ("max", s.max)]
            {
                table.insert(name, MetricValue::maybe_number(value));
            }
        }
        ColumnValues::Categorical(values) | ColumnValues::Unknown(values) => {
            let freqs = frequencies(values);
            table.insert("unique", MetricValue::count(freqs.len()));
            match freqs.first() {
                Some((top, freq)) => {
                    table.insert("top", MetricValue::text(top.clone()));
                    table.insert("freq", MetricValue::count(*freq));
                }
                None => {
                    table.insert("top", MetricValue::Undefined);
                    table.insert("freq", MetricValue::Undefined);
                }
            }
        }
        ColumnValues::Datetime(values) => {
            let mut present: Vec<_> = values.iter().flatten().copied().collect();
            present.sort();
            let first = present.first().map(|d| d.to_string());
            let last = present.last().map(|d| d.to_string());
            present.dedup();
            table.insert("unique", MetricValue::count(present.len()));
            table.insert("first", first.map_or(MetricValue::Undefined, MetricValue::text));
            table.insert("last", last.map_or(MetricValue::Undefined, MetricValue::text));
        }
    }
    table
}

fn frequency_table(col: &Column, values: &[Option<String>]) -> StatsTable {
    let mut table = StatsTable::new(vec![col.name().to_string()]);
    for (label, n) in frequencies(values) {
        table.insert(label, MetricValue::count(n));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::new(vec![Column::numerical("price", vec![Some(10.0), Some(20.0), None, Some(40.0)]),
                          Column::categorical("city", vec![Some("Lima"), Some("Quito"), Some("Lima"), None]),
                          Column::numerical("empty", vec![None, None, None, None])]).unwrap()
    }

    fn run(ds: &Dataset) -> ArtifactSink {
        let dir = std::path::Path::new("out");
        let ctx = ExecutionContext::new(ds, None, dir);
        let mut sink = ArtifactSink::new(KIND);
        ProfileStep::default().execute(&ctx, &mut sink).unwrap();
        sink
    }

    fn stats<'a>(sink: &'a ArtifactSink, name: &str) -> &'a StatsTable {
        sink.staged().iter().find(|a| a.name == name).and_then(|a| a.as_stats()).unwrap()
    }

    #[test]
    fn artifact_names_follow_column_order() {
        let sink = run(&dataset());
        assert_eq!(sink.names(),
                   vec!["profile.dataset.overview",
                        "profile.dataset.missing_values",
                        "profile.price.summary",
                        "profile.city.summary",
                        "profile.city.frequencies",
                        "profile.empty.summary"]);
    }

    #[test]
    fn numerical_summary_and_missing_values() {
        let sink = run(&dataset());
        let price = stats(&sink, "profile.price.summary");
        assert_eq!(price.get("count"), Some(&MetricValue::Count(3)));
        assert_eq!(price.get("missing"), Some(&MetricValue::Count(1)));
        assert_eq!(price.get("50%"), Some(&MetricValue::Number(20.0)));
        assert_eq!(price.get("missing_fraction"), Some(&MetricValue::Number(0.25)));

        let missing = stats(&sink, "profile.dataset.missing_values");
        assert_eq!(missing.source_columns, vec!["price", "city", "empty"]);
        assert_eq!(missing.get("empty"), Some(&MetricValue::Count(4)));
    }

    #[test]
    fn all_missing_column_yields_undefined_markers() {
        let sink = run(&dataset());
        let empty = stats(&sink, "profile.empty.summary");
        assert!(empty.get("mean").unwrap().is_undefined());
        assert!(empty.get("std").unwrap().is_undefined());
        assert!(empty.get("max").unwrap().is_undefined());
        assert_eq!(serde_json::to_value(empty.get("mean").unwrap()).unwrap(), json!(null));
    }

    #[test]
    fn categorical_top_and_frequencies() {
        let sink = run(&dataset());
        let city = stats(&sink, "profile.city.summary");
        assert_eq!(city.get("unique"), Some(&MetricValue::Count(2)));
        assert_eq!(city.get("top"), Some(&MetricValue::Text("Lima".into())));
        assert_eq!(city.get("freq"), Some(&MetricValue::Count(2)));

        let freqs = stats(&sink, "profile.city.frequencies");
        let labels: Vec<&String> = freqs.metrics.keys().collect();
        assert_eq!(labels, vec!["Lima", "Quito"]);
    }

    #[test]
    fn datetime_summary_reports_range_and_unique() {
        use eda_domain::loader::parse_datetime;
        let ds = Dataset::new(vec![Column::datetime("sold_at",
                                                    ["2024-03-01", "2024-01-05", "2024-03-01", ""].map(parse_datetime))])
            .unwrap();
        let sink = run(&ds);
        assert_eq!(sink.names(),
                   vec!["profile.dataset.overview", "profile.dataset.missing_values", "profile.sold_at.summary"]);
        let sold = stats(&sink, "profile.sold_at.summary");
        assert_eq!(sold.get("kind"), Some(&MetricValue::Text("datetime".into())));
        assert_eq!(sold.get("count"), Some(&MetricValue::Count(3)));
        assert_eq!(sold.get("unique"), Some(&MetricValue::Count(2)));
        assert_eq!(sold.get("first"), Some(&MetricValue::Text("2024-01-05 00:00:00".into())));
        assert_eq!(sold.get("last"), Some(&MetricValue::Text("2024-03-01 00:00:00".into())));
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = ProfileStep::from_options(&json!({"bins": 3})).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedOptions { .. }));
        assert!(ProfileStep::from_options(&Value::Null).is_ok());
    }
}
