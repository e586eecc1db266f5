use std::collections::HashSet;

use eda_core::{ArtifactPayload, ArtifactSink, ConfigError, EngineError, ExecutionContext, ItemOutcome,
               MetricValue, PipelineEngine, PipelinePlan, RunEventKind, RunStatus, StatsTable, StepDefinition,
               StepError, StepExecution, StepRegistry, StepResult, StepSpec};
use eda_domain::{Column, Dataset};
use serde_json::{json, Value};

/// Steps mínimos para ejercitar el engine sin depender de los steps reales.
#[derive(Debug)]
enum TestStep {
    /// Una tabla `count` por columna.
    Counts,
    /// Necesita objetivo; produce `target.summary`.
    Target,
    /// Siempre falla con un error local.
    Broken,
    /// Intenta escribir dos veces la misma clave.
    Duplicate,
    /// Un ítem producido y uno fallido.
    Mixed,
}

impl StepDefinition for TestStep {
    fn kind(&self) -> &str {
        match self {
            TestStep::Counts => "counts",
            TestStep::Target => "target",
            TestStep::Broken => "broken",
            TestStep::Duplicate => "duplicate",
            TestStep::Mixed => "mixed",
        }
    }

    fn requires_target(&self) -> bool { matches!(self, TestStep::Target) }

    fn base_params(&self) -> Value { json!({}) }

    fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        match self {
            TestStep::Counts => {
                for col in ctx.dataset.columns() {
                    let table = StatsTable::new(vec![col.name().to_string()]).with("count",
                                                                                  MetricValue::count(col.present_count()));
                    sink.put(col.name(), "count", ArtifactPayload::Stats(table))?;
                }
                Ok(StepExecution::completed())
            }
            TestStep::Target => {
                let target = ctx.target.ok_or_else(|| StepError::MissingColumn("<target>".into()))?;
                let table = StatsTable::new(vec![target.to_string()]);
                sink.put(target, "summary", ArtifactPayload::Stats(table))?;
                Ok(StepExecution::completed())
            }
            TestStep::Broken => Err(StepError::InsufficientNumericalColumns),
            TestStep::Duplicate => {
                sink.put("x", "count", ArtifactPayload::Stats(StatsTable::new(vec![])))?;
                sink.put("x", "count", ArtifactPayload::Stats(StatsTable::new(vec![])))?;
                Ok(StepExecution::completed())
            }
            TestStep::Mixed => {
                let name = sink.put("x", "count", ArtifactPayload::Stats(StatsTable::new(vec!["x".into()])))?;
                Ok(StepExecution::Completed { items: vec![ItemOutcome::produced("x", vec![name]),
                                                          ItemOutcome::failed("ghost", "column not found")] })
            }
        }
    }
}

fn registry() -> StepRegistry<TestStep> {
    StepRegistry::new().with("counts", |_| Ok(TestStep::Counts))
                       .with("target", |_| Ok(TestStep::Target))
                       .with("broken", |_| Ok(TestStep::Broken))
                       .with("duplicate", |_| Ok(TestStep::Duplicate))
                       .with("mixed", |_| Ok(TestStep::Mixed))
}

fn dataset() -> Dataset {
    Dataset::new(vec![Column::numerical("x", vec![Some(1.0), None, Some(3.0)]),
                      Column::categorical("c", vec![Some("a"), Some("b"), None])]).unwrap()
}

fn plan(kinds: &[(&str, bool)]) -> PipelinePlan {
    let specs = kinds.iter()
                     .map(|(k, on)| if *on { StepSpec::new(*k, json!({})) } else { StepSpec::disabled(*k, json!({})) })
                     .collect();
    PipelinePlan::build(specs, &registry()).unwrap()
}

#[test]
fn results_follow_plan_order_without_disabled_steps() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("mixed", true), ("broken", false), ("counts", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();
    let summary = engine.run(&dataset(), &plan, None).unwrap();

    assert_eq!(summary.step_kinds(), vec!["mixed", "counts"]);
    let names: Vec<_> = summary.manifest.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["mixed.x.count", "counts.x.count", "counts.c.count"]);
}

#[test]
fn unknown_target_aborts_before_any_side_effect() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let plan = plan(&[("counts", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(&out).build();

    let err = engine.run(&dataset(), &plan, Some("price")).unwrap_err();
    assert_eq!(err, EngineError::Config(ConfigError::UnknownTargetColumn("price".into())));
    assert!(engine.event_store().is_empty());
    assert!(!out.exists());
}

#[test]
fn unknown_kind_is_rejected_when_building_the_plan() {
    let specs = vec![StepSpec::new("counts", json!({})), StepSpec::new("clustering", json!({}))];
    let err = PipelinePlan::build(specs, &registry()).unwrap_err();
    assert_eq!(err, ConfigError::UnknownStepKind("clustering".into()));
}

#[test]
fn failed_step_does_not_stop_later_steps() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("broken", true), ("counts", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();
    let summary = engine.run(&dataset(), &plan, None).unwrap();

    assert_eq!(summary.steps[0].result,
               StepResult::Failed { error: StepError::InsufficientNumericalColumns });
    assert!(summary.steps[1].result.is_success());
    assert_eq!(summary.status(), RunStatus::Partial);
    assert!(summary.artifacts_of("broken").next().is_none());
}

#[test]
fn fail_fast_marks_remaining_steps_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("broken", true), ("counts", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).fail_fast(true).build();
    let summary = engine.run(&dataset(), &plan, None).unwrap();

    assert_eq!(summary.steps[1].result,
               StepResult::Skipped { reason: "halted after failure of broken".into() });
    assert_eq!(summary.status(), RunStatus::Failure);
    assert!(summary.manifest.is_empty());
}

#[test]
fn target_step_is_skipped_without_target_and_runs_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("target", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();

    let without = engine.run(&dataset(), &plan, None).unwrap();
    assert_eq!(without.steps[0].result, StepResult::Skipped { reason: "no target variable".into() });
    assert_eq!(without.status(), RunStatus::Success);

    let with = engine.run(&dataset(), &plan, Some("x")).unwrap();
    assert!(with.artifact("target.x.summary").is_some());
}

#[test]
fn item_failures_are_reported_inside_a_successful_step() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("mixed", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();
    let summary = engine.run(&dataset(), &plan, None).unwrap();

    let result = summary.result_for("mixed").unwrap();
    assert!(result.is_success());
    assert_eq!(result.item_failures(), 1);
    assert_eq!(result.artifacts(), ["mixed.x.count".to_string()]);
}

#[test]
fn duplicate_artifact_is_a_fatal_invariant_violation() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("duplicate", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();
    let err = engine.run(&dataset(), &plan, None).unwrap_err();
    assert!(matches!(err, EngineError::Invariant(_)));
}

#[test]
fn repeated_runs_share_fingerprint_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("counts", true), ("mixed", true), ("broken", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();

    let a = engine.run(&dataset(), &plan, None).unwrap();
    let b = engine.run(&dataset(), &plan, None).unwrap();
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.manifest_index(), b.manifest_index());

    let unique: HashSet<_> = a.manifest.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(unique.len(), a.manifest.len());
}

#[test]
fn events_close_with_the_summary_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan(&[("counts", true)]);
    let mut engine = PipelineEngine::builder(registry()).output_dir(dir.path()).build();
    let summary = engine.run(&dataset(), &plan, None).unwrap();

    let events = engine.events_for(summary.run_id);
    let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3]);
    match &events.last().unwrap().kind {
        RunEventKind::RunCompleted { fingerprint } => assert_eq!(fingerprint, &summary.fingerprint),
        other => panic!("unexpected last event: {other:?}"),
    }
}
