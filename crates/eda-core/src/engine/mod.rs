//! Engine de pipeline: ejecución ordenada de steps con aislamiento de fallos.
//!
//! Provee el engine, su builder y el resumen de corrida.

pub mod builder;
pub mod core;
pub mod summary;

pub use builder::EngineBuilder;
pub use core::{charts_dir_of, EngineOptions, PipelineEngine};
pub use summary::RunSummary;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StepError;
    use crate::model::{ArtifactPayload, MetricValue, StatsTable};
    use crate::plan::{PipelinePlan, StepSpec};
    use crate::registry::StepRegistry;
    use crate::step::{ExecutionContext, StepDefinition, StepExecution};
    use crate::store::ArtifactSink;
    use eda_domain::{Column, Dataset};
    use serde_json::{json, Value};

    #[derive(Debug)]
    enum Probe {
        Count,
        Broken,
    }

    impl StepDefinition for Probe {
        fn kind(&self) -> &str {
            match self {
                Probe::Count => "count",
                Probe::Broken => "broken",
            }
        }

        fn base_params(&self) -> Value { json!({}) }

        fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
            match self {
                Probe::Count => {
                    let table = StatsTable::new(vec![]).with("rows", MetricValue::count(ctx.dataset.n_rows()));
                    sink.put("dataset", "rows", ArtifactPayload::Stats(table))?;
                    Ok(StepExecution::completed())
                }
                Probe::Broken => Err(StepError::MissingColumn("ghost".into())),
            }
        }
    }

    fn registry() -> StepRegistry<Probe> {
        StepRegistry::new().with("count", |_| Ok(Probe::Count))
                           .with("broken", |_| Ok(Probe::Broken))
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![Column::numerical("x", vec![Some(1.0), Some(2.0)])]).unwrap()
    }

    #[test]
    fn event_sequence_records_each_step() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry();
        let plan = PipelinePlan::build(vec![StepSpec::new("broken", json!({})), StepSpec::new("count", json!({}))],
                                       &reg).unwrap();
        let mut engine = PipelineEngine::builder(reg).output_dir(dir.path()).build();
        let summary = engine.run(&dataset(), &plan, None).unwrap();

        assert_eq!(engine.event_variants(summary.run_id), vec!["I", "S", "X", "S", "F", "C"]);
        assert_eq!(summary.manifest.len(), 1);
        assert!(dir.path().join("charts").is_dir());
    }

    #[test]
    fn fail_fast_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry();
        let plan = PipelinePlan::build(vec![StepSpec::new("broken", json!({})), StepSpec::new("count", json!({}))],
                                       &reg).unwrap();
        let mut engine = PipelineEngine::builder(reg).output_dir(dir.path()).fail_fast(true).build();
        let summary = engine.run(&dataset(), &plan, None).unwrap();

        assert!(summary.steps[0].result.is_failed());
        assert!(summary.steps[1].result.is_skipped());
        assert!(summary.manifest.is_empty());
        assert_eq!(engine.event_variants(summary.run_id), vec!["I", "S", "X", "K", "C"]);
    }
}
